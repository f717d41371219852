use bevy_ecs::prelude::{Commands, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{ArrivalMode, Patient, TriageLevel};
use crate::error::SimulationError;
use crate::queues::BedWaitQueues;
use crate::resources::{AmbulanceFleet, EngineFault};
use crate::sampling::Sampler;
use crate::scenario::ScenarioParams;
use crate::telemetry::EdTelemetry;

/// Sends an ambulance out for the next call. Level 1/2 patients are always
/// conveyed here; level 3/4 patients are conveyed only while the bed-wait
/// backlog is below the diversion threshold and otherwise go to another
/// facility, with the unit flagged as diverted until it returns.
pub fn ambulance_dispatch_system(
    event: Res<CurrentEvent>,
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut sampler: ResMut<Sampler>,
    mut fleet: ResMut<AmbulanceFleet>,
    bed_waits: Res<BedWaitQueues>,
    params: Res<ScenarioParams>,
    mut telemetry: ResMut<EdTelemetry>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::AmbulanceDispatch {
        return;
    }
    if let Err(error) = handle(
        &mut commands,
        &mut clock,
        &mut sampler,
        &mut fleet,
        &bed_waits,
        &params,
        &mut telemetry,
    ) {
        fault.record(error);
    }
}

fn handle(
    commands: &mut Commands,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    fleet: &mut AmbulanceFleet,
    bed_waits: &BedWaitQueues,
    params: &ScenarioParams,
    telemetry: &mut EdTelemetry,
) -> Result<(), SimulationError> {
    // The fleet cycles continuously; dispatch always rebooks itself.
    let gap = sampler.interarrival(clock.now(), ArrivalMode::Ambulance)?;
    clock.schedule_at(clock.now() + gap, EventKind::AmbulanceDispatch, None);

    let level = sampler.triage_level_for_ambulance();
    let complaint = sampler.complaint(level);

    if fleet.available() == 0 {
        // No unit to send; the call goes unserved this cycle.
        return Ok(());
    }
    fleet.send_out()?;

    let conveyable = matches!(level, TriageLevel::Resuscitation | TriageLevel::Emergent)
        || (matches!(level, TriageLevel::Urgent | TriageLevel::LessUrgent)
            && bed_waits.total() < params.diversion_queue_threshold);

    let patient = commands.spawn(Patient::ambulance(level, complaint)).id();
    if conveyable {
        let travel = sampler.ambulance_travel_time()?;
        clock.schedule_at(
            clock.now() + travel,
            EventKind::AmbulanceArrival { diverted: false },
            Some(patient),
        );
    } else {
        fleet.begin_diversion();
        telemetry.diversions += 1;
        let travel = sampler.diverted_travel_time()?;
        clock.schedule_at(
            clock.now() + travel,
            EventKind::AmbulanceArrival { diverted: true },
            Some(patient),
        );
    }
    Ok(())
}
