use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::ecs::{ArrivalMode, InDepartment, Patient};
use crate::error::SimulationError;
use crate::queues::TriageQueue;
use crate::resources::{EngineFault, TriageNurses};
use crate::sampling::Sampler;
use crate::systems::common::begin_triage;
use crate::telemetry::EdTelemetry;

pub fn walk_in_arrival_system(
    event: Res<CurrentEvent>,
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut sampler: ResMut<Sampler>,
    mut nurses: ResMut<TriageNurses>,
    mut triage_queue: ResMut<TriageQueue>,
    mut telemetry: ResMut<EdTelemetry>,
    mut patients: Query<&mut Patient>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::WalkInArrival {
        return;
    }
    if let Err(error) = handle(
        &event.0,
        &mut commands,
        &mut clock,
        &mut sampler,
        &mut nurses,
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
    commands: &mut Commands,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    nurses: &mut TriageNurses,
    triage_queue: &mut TriageQueue,
    telemetry: &mut EdTelemetry,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    // The walk-in stream sustains itself: every arrival books the next one.
    let gap = sampler.interarrival(clock.now(), ArrivalMode::WalkIn)?;
    let next = commands.spawn(Patient::walk_in()).id();
    clock.schedule_at(clock.now() + gap, EventKind::WalkInArrival, Some(next));

    let subject = event
        .patient
        .ok_or_else(|| SimulationError::invariant("walk-in arrival without a patient"))?;
    telemetry.patients_in += 1;
    commands.entity(subject).insert(InDepartment);

    if nurses.0.has_idle() {
        begin_triage(subject, clock, sampler, nurses, patients)
    } else {
        triage_queue.0.push_back(subject);
        Ok(())
    }
}
