#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, Schedule, With, World};

use ed_core::ecs::{ArrivalMode, Complaint, InDepartment, Patient, TriageLevel};
use ed_core::runner::{initialize_simulation, simulation_schedule};
use ed_core::sampling::DurationSampler;
use ed_core::scenario::{build_scenario, ScenarioParams};

/// Replays a fixed sequence, repeating the last value forever.
#[derive(Debug, Clone)]
pub struct Script<T: Copy> {
    values: Vec<T>,
    index: usize,
}

impl<T: Copy> Script<T> {
    pub fn new(values: Vec<T>) -> Self {
        assert!(!values.is_empty(), "a script needs at least one value");
        Self { values, index: 0 }
    }

    pub fn constant(value: T) -> Self {
        Self::new(vec![value])
    }

    pub fn next(&mut self) -> T {
        let value = self.values[self.index.min(self.values.len() - 1)];
        self.index += 1;
        value
    }
}

/// Fully deterministic duration provider for scenario tests. Interarrival
/// gaps and acuity draws replay scripts; service times are constants.
#[derive(Debug, Clone)]
pub struct ScriptedDurations {
    pub walk_in_gaps: Script<f64>,
    pub ambulance_gaps: Script<f64>,
    pub walk_in_levels: Script<TriageLevel>,
    pub ambulance_levels: Script<TriageLevel>,
    pub triage: f64,
    pub workup: f64,
    pub procedure: f64,
    pub travel: f64,
    pub diverted_travel: f64,
}

impl Default for ScriptedDurations {
    fn default() -> Self {
        Self {
            walk_in_gaps: Script::constant(1e9),
            ambulance_gaps: Script::constant(1e9),
            walk_in_levels: Script::constant(TriageLevel::LessUrgent),
            ambulance_levels: Script::constant(TriageLevel::Emergent),
            triage: 5.0,
            workup: 8.0,
            procedure: 6.0,
            travel: 1.0,
            diverted_travel: 1.0,
        }
    }
}

impl DurationSampler for ScriptedDurations {
    fn interarrival(&mut self, _clock_min: f64, mode: ArrivalMode) -> f64 {
        match mode {
            ArrivalMode::WalkIn => self.walk_in_gaps.next(),
            ArrivalMode::Ambulance => self.ambulance_gaps.next(),
        }
    }

    fn triage_duration(&mut self, _patient: &Patient) -> f64 {
        self.triage
    }

    fn workup_duration(&mut self, _patient: &Patient) -> f64 {
        self.workup
    }

    fn procedure_duration(&mut self, _patient: &Patient) -> f64 {
        self.procedure
    }

    fn ambulance_travel_time(&mut self) -> f64 {
        self.travel
    }

    fn diverted_travel_time(&mut self) -> f64 {
        self.diverted_travel
    }

    fn triage_level_for_ambulance(&mut self) -> TriageLevel {
        self.ambulance_levels.next()
    }

    fn triage_level_for_walk_in(&mut self) -> TriageLevel {
        self.walk_in_levels.next()
    }

    fn complaint(&mut self, _level: TriageLevel) -> Complaint {
        Complaint::Primary
    }
}

/// Builds a seeded world plus schedule for a scripted scenario.
pub fn build_world(params: &ScenarioParams, sampler: ScriptedDurations) -> (World, Schedule) {
    let mut world = World::new();
    build_scenario(&mut world, params, Box::new(sampler)).expect("scenario should be valid");
    initialize_simulation(&mut world);
    (world, simulation_schedule())
}

/// Patients currently inside the department.
pub fn in_department_count(world: &mut World) -> usize {
    world
        .query_filtered::<Entity, With<InDepartment>>()
        .iter(world)
        .count()
}

/// First live patient with the given acuity.
pub fn patient_with_acuity(world: &mut World, level: TriageLevel) -> Option<Patient> {
    let mut query = world.query::<&Patient>();
    query
        .iter(world)
        .find(|p| p.acuity == Some(level))
        .copied()
}

/// First live patient with the given arrival mode.
pub fn patient_with_arrival(world: &mut World, mode: ArrivalMode) -> Option<Patient> {
    let mut query = world.query::<&Patient>();
    query.iter(world).find(|p| p.arrival == mode).copied()
}
