use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::ecs::Patient;
use crate::error::SimulationError;
use crate::queues::{BedWaitQueues, InterruptLists, SpecialistQueue, WorkupWaitQueues};
use crate::resources::{BedBoard, EngineFault, Specialists, WorkupDoctors};
use crate::sampling::Sampler;
use crate::systems::common::{begin_procedure, missing_patient, release_bed_and_backfill};
use crate::telemetry::EdTelemetry;

/// A patient leaves the department: the specialist takes the next queued
/// patient, and the freed bed may pull a waiting patient straight into
/// workup admission.
pub fn specialist_departure_system(
    event: Res<CurrentEvent>,
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut sampler: ResMut<Sampler>,
    mut specialists: ResMut<Specialists>,
    mut doctors: ResMut<WorkupDoctors>,
    mut specialist_queue: ResMut<SpecialistQueue>,
    mut beds: ResMut<BedBoard>,
    mut bed_waits: ResMut<BedWaitQueues>,
    mut workup_waits: ResMut<WorkupWaitQueues>,
    mut interrupts: ResMut<InterruptLists>,
    mut telemetry: ResMut<EdTelemetry>,
    mut patients: Query<&mut Patient>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::SpecialistDeparture {
        return;
    }
    if let Err(error) = handle(
        &event.0,
        &mut commands,
        &mut clock,
        &mut sampler,
        &mut specialists,
        &mut doctors,
        &mut specialist_queue,
        &mut beds,
        &mut bed_waits,
        &mut workup_waits,
        &mut interrupts,
        &mut telemetry,
        &mut patients,
    ) {
        fault.record(error);
    }
}

#[allow(clippy::too_many_arguments)]
fn handle(
    event: &Event,
    commands: &mut Commands,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    specialists: &mut Specialists,
    doctors: &mut WorkupDoctors,
    specialist_queue: &mut SpecialistQueue,
    beds: &mut BedBoard,
    bed_waits: &mut BedWaitQueues,
    workup_waits: &mut WorkupWaitQueues,
    interrupts: &mut InterruptLists,
    telemetry: &mut EdTelemetry,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    specialists.0.release()?;
    if let Some(next) = specialist_queue.0.pop_front() {
        begin_procedure(next, clock, sampler, specialists, patients)?;
    }

    telemetry.patients_out += 1;

    let subject = event
        .patient
        .ok_or_else(|| SimulationError::invariant("specialist departure without a patient"))?;
    let zone = patients
        .get(subject)
        .map_err(|_| missing_patient())?
        .zone
        .ok_or_else(|| SimulationError::invariant("departing patient does not hold a bed"))?;

    release_bed_and_backfill(
        zone,
        clock,
        sampler,
        beds,
        bed_waits,
        doctors,
        workup_waits,
        interrupts,
        telemetry,
        patients,
    )?;

    commands.entity(subject).despawn();
    Ok(())
}
