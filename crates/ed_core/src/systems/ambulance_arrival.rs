use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::ecs::{InDepartment, Patient};
use crate::error::SimulationError;
use crate::queues::{BedWaitQueues, InterruptLists, WorkupWaitQueues};
use crate::resources::{AmbulanceFleet, BedBoard, EngineFault, WorkupDoctors};
use crate::sampling::Sampler;
use crate::systems::common::{
    acuity_of, admit_to_workup, allocate_bed, ambulance_zone_preferences,
};
use crate::telemetry::EdTelemetry;

/// An ambulance unit reaches a door. Diverted runs only return the unit;
/// conveyed patients enter the department and go through bed allocation.
pub fn ambulance_arrival_system(
    event: Res<CurrentEvent>,
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut sampler: ResMut<Sampler>,
    mut fleet: ResMut<AmbulanceFleet>,
    mut beds: ResMut<BedBoard>,
    mut bed_waits: ResMut<BedWaitQueues>,
    mut doctors: ResMut<WorkupDoctors>,
    mut workup_waits: ResMut<WorkupWaitQueues>,
    mut interrupts: ResMut<InterruptLists>,
    mut telemetry: ResMut<EdTelemetry>,
    mut patients: Query<&mut Patient>,
    mut fault: ResMut<EngineFault>,
) {
    let EventKind::AmbulanceArrival { diverted } = event.0.kind else {
        return;
    };
    if let Err(error) = handle(
        &event.0,
        diverted,
        &mut commands,
        &mut clock,
        &mut sampler,
        &mut fleet,
        &mut beds,
        &mut bed_waits,
        &mut doctors,
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
    diverted: bool,
    commands: &mut Commands,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    fleet: &mut AmbulanceFleet,
    beds: &mut BedBoard,
    bed_waits: &mut BedWaitQueues,
    doctors: &mut WorkupDoctors,
    workup_waits: &mut WorkupWaitQueues,
    interrupts: &mut InterruptLists,
    telemetry: &mut EdTelemetry,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    fleet.receive_back()?;

    let subject = event
        .patient
        .ok_or_else(|| SimulationError::invariant("ambulance arrival without a patient"))?;

    if diverted {
        // The conveyed patient went to another facility; only the unit is back.
        fleet.end_diversion()?;
        commands.entity(subject).despawn();
        return Ok(());
    }

    telemetry.patients_in += 1;
    commands.entity(subject).insert(InDepartment);

    let level = acuity_of(patients, subject)?;
    match allocate_bed(subject, ambulance_zone_preferences(level), beds, patients)? {
        Some(_zone) => admit_to_workup(
            subject,
            clock,
            sampler,
            doctors,
            workup_waits,
            interrupts,
            telemetry,
            patients,
        ),
        None => {
            bed_waits.push(level.priority_class(), subject);
            Ok(())
        }
    }
}
