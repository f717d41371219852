//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule. Exactly one handler matches per
//! event kind; the statistics capture runs after it on every event.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::ecs::Patient;
use crate::error::SimulationError;
use crate::resources::EngineFault;
use crate::sampling::DurationSampler;
use crate::scenario::{build_scenario, ScenarioParams};
use crate::systems::{
    ambulance_arrival::ambulance_arrival_system, ambulance_dispatch::ambulance_dispatch_system,
    specialist_departure::specialist_departure_system, stats_capture::statistics_capture_system,
    triage_departure::triage_departure_system, walk_in_arrival::walk_in_arrival_system,
    workup_departure::workup_departure_system,
};
use crate::telemetry::{extract_report, StatisticsReport};

// Condition functions for each event kind
fn is_walk_in_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::WalkInArrival)
        .unwrap_or(false)
}

fn is_ambulance_dispatch(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::AmbulanceDispatch)
        .unwrap_or(false)
}

fn is_ambulance_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| matches!(e.0.kind, EventKind::AmbulanceArrival { .. }))
        .unwrap_or(false)
}

fn is_triage_departure(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::TriageDeparture)
        .unwrap_or(false)
}

fn is_workup_departure(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::WorkupDeparture)
        .unwrap_or(false)
}

fn is_specialist_departure(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::SpecialistDeparture)
        .unwrap_or(false)
}

/// Builds the simulation schedule: the per-kind handlers, [apply_deferred]
/// so spawned patients are applied before the next step, then the
/// statistics capture over the post-handler state.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            (
                walk_in_arrival_system.run_if(is_walk_in_arrival),
                ambulance_dispatch_system.run_if(is_ambulance_dispatch),
                ambulance_arrival_system.run_if(is_ambulance_arrival),
                triage_departure_system.run_if(is_triage_departure),
                workup_departure_system.run_if(is_workup_departure),
                specialist_departure_system.run_if(is_specialist_departure),
            ),
            apply_deferred,
            statistics_capture_system,
        )
            .chain(),
    );
    schedule
}

/// Seeds the opening events: an ambulance dispatch and a walk-in arrival at
/// t = 0, and the end-of-simulation marker at the horizon. The marker is
/// scheduled here so it outranks any same-time event booked later.
pub fn initialize_simulation(world: &mut World) {
    let horizon = world.resource::<ScenarioParams>().horizon_min;
    let first_walk_in = world.spawn(Patient::walk_in()).id();

    let mut clock = world.resource_mut::<SimulationClock>();
    clock.schedule_at(0.0, EventKind::AmbulanceDispatch, None);
    clock.schedule_at(0.0, EventKind::WalkInArrival, Some(first_walk_in));
    clock.schedule_at(horizon, EventKind::EndOfSimulation, None);
}

/// Pops and runs a single event; returns it, or None when the list is
/// empty. Does not interpret end-of-simulation; callers decide when to
/// stop.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> Option<Event> {
    let event = world.resource_mut::<SimulationClock>().pop_next()?;
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    Some(event)
}

/// Drives the engine until the end-of-simulation event, aborting on the
/// first handler fault. Events still pending past the horizon are discarded
/// with the clock.
pub fn run_to_horizon(world: &mut World, schedule: &mut Schedule) -> Result<(), SimulationError> {
    run_to_horizon_with_hook(world, schedule, |_, _| {})
}

/// Like [run_to_horizon], invoking `hook` after each processed event.
pub fn run_to_horizon_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<(), SimulationError>
where
    F: FnMut(&World, &Event),
{
    loop {
        let event = match run_next_event(world, schedule) {
            Some(event) => event,
            None => {
                let now = world.resource::<SimulationClock>().now();
                return Err(SimulationError::EventListExhausted(now));
            }
        };
        if let Some(error) = world.resource_mut::<EngineFault>().take() {
            return Err(error);
        }
        hook(world, &event);
        if event.kind == EventKind::EndOfSimulation {
            return Ok(());
        }
    }
}

/// One-shot entry point: build the world, seed the opening events, run to
/// the horizon, and derive the report.
pub fn run_scenario(
    params: &ScenarioParams,
    sampler: Box<dyn DurationSampler>,
) -> Result<StatisticsReport, SimulationError> {
    let mut world = World::new();
    build_scenario(&mut world, params, sampler)?;
    initialize_simulation(&mut world);
    let mut schedule = simulation_schedule();
    run_to_horizon(&mut world, &mut schedule)?;
    Ok(extract_report(&world))
}

/// Runs the default department for the given horizon. The default warm-up is
/// fourteen days, so the horizon must be longer; use [run_scenario] with
/// explicit [ScenarioParams] for anything shorter.
pub fn run(
    horizon_min: f64,
    sampler: Box<dyn DurationSampler>,
) -> Result<StatisticsReport, SimulationError> {
    run_scenario(
        &ScenarioParams::default().with_horizon_min(horizon_min),
        sampler,
    )
}
