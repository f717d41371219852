//! Scenario setup: capacities, horizon, and world construction.

use bevy_ecs::prelude::{Resource, World};

use crate::clock::SimulationClock;
use crate::error::SimulationError;
use crate::queues::{
    BedWaitQueues, InterruptLists, SpecialistQueue, TriageQueue, WorkupWaitQueues,
};
use crate::resources::{
    AmbulanceFleet, BedBoard, EngineFault, ServerPool, Specialists, TriageNurses, WorkupDoctors,
};
use crate::sampling::{DurationSampler, Sampler};
use crate::telemetry::EdTelemetry;

/// Parameters for one simulation run. Defaults model a mid-size department:
/// two triage nurses, two workup doctors, five specialists, forty beds over
/// four zones, a ten-unit ambulance fleet, a fourteen-day warm-up and a
/// 180-day horizon.
#[derive(Debug, Clone, Resource, serde::Serialize)]
pub struct ScenarioParams {
    pub triage_nurses: u32,
    pub workup_doctors: u32,
    pub specialists: u32,
    /// Bed stock per zone, indexed by [crate::ecs::Zone]. Individual zones
    /// may be closed (zero beds).
    pub beds: [u32; 4],
    pub ambulances: u32,
    /// Level 3/4 ambulance patients divert once this many patients are
    /// waiting for a bed.
    pub diversion_queue_threshold: usize,
    /// Statistics before this time are discarded as transient.
    pub warm_up_min: f64,
    pub horizon_min: f64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            triage_nurses: 2,
            workup_doctors: 2,
            specialists: 5,
            beds: [12, 8, 10, 10],
            ambulances: 10,
            diversion_queue_threshold: 5,
            warm_up_min: 14.0 * 24.0 * 60.0,
            horizon_min: 180.0 * 24.0 * 60.0,
        }
    }
}

impl ScenarioParams {
    pub fn with_horizon_min(mut self, horizon_min: f64) -> Self {
        self.horizon_min = horizon_min;
        self
    }

    pub fn with_warm_up_min(mut self, warm_up_min: f64) -> Self {
        self.warm_up_min = warm_up_min;
        self
    }

    pub fn with_staff(mut self, nurses: u32, doctors: u32, specialists: u32) -> Self {
        self.triage_nurses = nurses;
        self.workup_doctors = doctors;
        self.specialists = specialists;
        self
    }

    pub fn with_beds(mut self, beds: [u32; 4]) -> Self {
        self.beds = beds;
        self
    }

    pub fn with_ambulances(mut self, ambulances: u32) -> Self {
        self.ambulances = ambulances;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.horizon_min.is_finite() || self.horizon_min <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "horizon must be positive and finite, got {}",
                self.horizon_min
            )));
        }
        if !self.warm_up_min.is_finite() || self.warm_up_min < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "warm-up must be non-negative and finite, got {}",
                self.warm_up_min
            )));
        }
        if self.warm_up_min >= self.horizon_min {
            return Err(SimulationError::InvalidConfig(format!(
                "warm-up ({}) must end before the horizon ({})",
                self.warm_up_min, self.horizon_min
            )));
        }
        if self.triage_nurses == 0 {
            return Err(SimulationError::InvalidConfig(
                "at least one triage nurse is required".into(),
            ));
        }
        if self.workup_doctors == 0 {
            return Err(SimulationError::InvalidConfig(
                "at least one workup doctor is required".into(),
            ));
        }
        if self.specialists == 0 {
            return Err(SimulationError::InvalidConfig(
                "at least one specialist is required".into(),
            ));
        }
        if self.ambulances == 0 {
            return Err(SimulationError::InvalidConfig(
                "at least one ambulance unit is required".into(),
            ));
        }
        if self.beds.iter().all(|&b| b == 0) {
            return Err(SimulationError::InvalidConfig(
                "at least one zone must have a bed".into(),
            ));
        }
        Ok(())
    }
}

/// Validates the parameters and inserts every engine resource into the
/// world. Call [crate::runner::initialize_simulation] afterwards to seed the
/// first events.
pub fn build_scenario(
    world: &mut World,
    params: &ScenarioParams,
    sampler: Box<dyn DurationSampler>,
) -> Result<(), SimulationError> {
    params.validate()?;

    world.insert_resource(SimulationClock::default());
    world.insert_resource(Sampler(sampler));
    world.insert_resource(TriageNurses(ServerPool::new(params.triage_nurses)));
    world.insert_resource(WorkupDoctors(ServerPool::new(params.workup_doctors)));
    world.insert_resource(Specialists(ServerPool::new(params.specialists)));
    world.insert_resource(BedBoard::new(params.beds));
    world.insert_resource(AmbulanceFleet::new(params.ambulances));
    world.insert_resource(TriageQueue::default());
    world.insert_resource(BedWaitQueues::default());
    world.insert_resource(WorkupWaitQueues::default());
    world.insert_resource(InterruptLists::default());
    world.insert_resource(SpecialistQueue::default());
    world.insert_resource(EdTelemetry::new(params.warm_up_min));
    world.insert_resource(EngineFault::default());
    world.insert_resource(params.clone());

    Ok(())
}
