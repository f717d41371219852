use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::ecs::Patient;
use crate::error::SimulationError;
use crate::queues::{BedWaitQueues, InterruptLists, TriageQueue, WorkupWaitQueues};
use crate::resources::{BedBoard, EngineFault, TriageNurses, WorkupDoctors};
use crate::sampling::Sampler;
use crate::systems::common::{
    acuity_of, admit_to_workup, allocate_bed, begin_triage, WALK_IN_ZONE_PREFERENCES,
};
use crate::telemetry::EdTelemetry;

/// A walk-in finishes triage: the nurse is freed, the patient heads for a
/// bed on the low-acuity side, and the next queued walk-in starts triage.
pub fn triage_departure_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut sampler: ResMut<Sampler>,
    mut nurses: ResMut<TriageNurses>,
    mut beds: ResMut<BedBoard>,
    mut bed_waits: ResMut<BedWaitQueues>,
    mut doctors: ResMut<WorkupDoctors>,
    mut workup_waits: ResMut<WorkupWaitQueues>,
    mut interrupts: ResMut<InterruptLists>,
    mut triage_queue: ResMut<TriageQueue>,
    mut telemetry: ResMut<EdTelemetry>,
    mut patients: Query<&mut Patient>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::TriageDeparture {
        return;
    }
    if let Err(error) = handle(
        &event.0,
        &mut clock,
        &mut sampler,
        &mut nurses,
        &mut beds,
        &mut bed_waits,
        &mut doctors,
        &mut workup_waits,
        &mut interrupts,
        &mut triage_queue,
        &mut telemetry,
        &mut patients,
    ) {
        fault.record(error);
    }
}

#[allow(clippy::too_many_arguments)]
fn handle(
    event: &Event,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    nurses: &mut TriageNurses,
    beds: &mut BedBoard,
    bed_waits: &mut BedWaitQueues,
    doctors: &mut WorkupDoctors,
    workup_waits: &mut WorkupWaitQueues,
    interrupts: &mut InterruptLists,
    triage_queue: &mut TriageQueue,
    telemetry: &mut EdTelemetry,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    nurses.0.release()?;

    let subject = event
        .patient
        .ok_or_else(|| SimulationError::invariant("triage departure without a patient"))?;
    match allocate_bed(subject, WALK_IN_ZONE_PREFERENCES, beds, patients)? {
        Some(_zone) => admit_to_workup(
            subject,
            clock,
            sampler,
            doctors,
            workup_waits,
            interrupts,
            telemetry,
            patients,
        )?,
        None => {
            let level = acuity_of(patients, subject)?;
            bed_waits.push(level.priority_class(), subject);
        }
    }

    if let Some(next) = triage_queue.0.pop_front() {
        begin_triage(next, clock, sampler, nurses, patients)?;
    }
    Ok(())
}
