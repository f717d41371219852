use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::ecs::Patient;
use crate::error::SimulationError;
use crate::queues::{InterruptLists, SpecialistQueue, WorkupWaitQueues};
use crate::resources::{EngineFault, Specialists, WorkupDoctors};
use crate::sampling::Sampler;
use crate::systems::common::{begin_procedure, restore_workup_capacity};

/// A workup finishes: the doctor is handed to interrupted or queued work,
/// and the finished patient moves on to a specialist.
pub fn workup_departure_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut sampler: ResMut<Sampler>,
    mut doctors: ResMut<WorkupDoctors>,
    mut specialists: ResMut<Specialists>,
    mut workup_waits: ResMut<WorkupWaitQueues>,
    mut interrupts: ResMut<InterruptLists>,
    mut specialist_queue: ResMut<SpecialistQueue>,
    mut patients: Query<&mut Patient>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::WorkupDeparture {
        return;
    }
    if let Err(error) = handle(
        &event.0,
        &mut clock,
        &mut sampler,
        &mut doctors,
        &mut specialists,
        &mut workup_waits,
        &mut interrupts,
        &mut specialist_queue,
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
    doctors: &mut WorkupDoctors,
    specialists: &mut Specialists,
    workup_waits: &mut WorkupWaitQueues,
    interrupts: &mut InterruptLists,
    specialist_queue: &mut SpecialistQueue,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    doctors.0.release()?;
    restore_workup_capacity(clock, sampler, doctors, workup_waits, interrupts, patients)?;

    let subject = event
        .patient
        .ok_or_else(|| SimulationError::invariant("workup departure without a patient"))?;
    if specialists.0.has_idle() {
        begin_procedure(subject, clock, sampler, specialists, patients)
    } else {
        specialist_queue.0.push_back(subject);
        Ok(())
    }
}
