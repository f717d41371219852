//! Statistics collection: time-weighted accumulators updated after every
//! dispatched event, and the end-of-run report derived from them.

use bevy_ecs::prelude::{Resource, World};

use crate::scenario::ScenarioParams;

/// Aggregate queue categories tracked by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCategory {
    Triage,
    Bed,
    Workup,
    Specialist,
}

impl QueueCategory {
    pub const ALL: [QueueCategory; 4] = [
        QueueCategory::Triage,
        QueueCategory::Bed,
        QueueCategory::Workup,
        QueueCategory::Specialist,
    ];

    pub fn index(self) -> usize {
        match self {
            QueueCategory::Triage => 0,
            QueueCategory::Bed => 1,
            QueueCategory::Workup => 2,
            QueueCategory::Specialist => 3,
        }
    }
}

/// Staff pools tracked for utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerGroup {
    Nurses,
    Doctors,
    Specialists,
}

impl ServerGroup {
    pub fn index(self) -> usize {
        match self {
            ServerGroup::Nurses => 0,
            ServerGroup::Doctors => 1,
            ServerGroup::Specialists => 2,
        }
    }
}

/// Running accumulators. Time-weighted sums and maxima only move once the
/// clock passes the warm-up threshold; plain counters are unwindowed.
#[derive(Debug, Resource)]
pub struct EdTelemetry {
    warm_up_min: f64,
    last_event_min: f64,
    weighted_queue: [f64; 4],
    max_queue: [usize; 4],
    weighted_busy: [f64; 3],
    weighted_diverted: f64,
    pub patients_in: u64,
    pub patients_out: u64,
    pub preemptions: u64,
    pub diversions: u64,
}

impl EdTelemetry {
    pub fn new(warm_up_min: f64) -> Self {
        Self {
            warm_up_min,
            last_event_min: 0.0,
            weighted_queue: [0.0; 4],
            max_queue: [0; 4],
            weighted_busy: [0.0; 3],
            weighted_diverted: 0.0,
            patients_in: 0,
            patients_out: 0,
            preemptions: 0,
            diversions: 0,
        }
    }

    /// Called once per dispatched event with the post-handler state.
    pub fn observe(
        &mut self,
        now: f64,
        queue_lengths: [usize; 4],
        busy_servers: [u32; 3],
        diverted_units: u32,
    ) {
        let delta = now - self.last_event_min;
        self.last_event_min = now;
        if now <= self.warm_up_min {
            return;
        }

        for (i, len) in queue_lengths.iter().enumerate() {
            self.weighted_queue[i] += delta * *len as f64;
            self.max_queue[i] = self.max_queue[i].max(*len);
        }
        for (i, busy) in busy_servers.iter().enumerate() {
            self.weighted_busy[i] += delta * f64::from(*busy);
        }
        self.weighted_diverted += delta * f64::from(diverted_units);
    }

    pub fn weighted_queue(&self, category: QueueCategory) -> f64 {
        self.weighted_queue[category.index()]
    }

    pub fn max_queue(&self, category: QueueCategory) -> usize {
        self.max_queue[category.index()]
    }

    pub fn weighted_busy(&self, group: ServerGroup) -> f64 {
        self.weighted_busy[group.index()]
    }

    pub fn weighted_diverted(&self) -> f64 {
        self.weighted_diverted
    }

    /// Derives the end-of-run report. Time-weighted averages divide by the
    /// horizon; per-patient waits divide by total departures.
    pub fn report(&self, params: &ScenarioParams) -> StatisticsReport {
        let elapsed = params.horizon_min;
        let per_patient = |weighted: f64| {
            if self.patients_out == 0 {
                0.0
            } else {
                weighted / self.patients_out as f64
            }
        };
        let utilization = |group: ServerGroup, capacity: u32| {
            self.weighted_busy(group) / (f64::from(capacity) * elapsed)
        };

        let nurse_utilization = utilization(ServerGroup::Nurses, params.triage_nurses);
        let doctor_utilization = utilization(ServerGroup::Doctors, params.workup_doctors);
        let specialist_utilization = utilization(ServerGroup::Specialists, params.specialists);

        StatisticsReport {
            horizon_min: elapsed,
            patients_in: self.patients_in,
            patients_out: self.patients_out,
            preemptions: self.preemptions,
            ambulance_diversions: self.diversions,
            avg_triage_queue_len: self.weighted_queue(QueueCategory::Triage) / elapsed,
            avg_bed_queue_len: self.weighted_queue(QueueCategory::Bed) / elapsed,
            avg_workup_queue_len: self.weighted_queue(QueueCategory::Workup) / elapsed,
            avg_specialist_queue_len: self.weighted_queue(QueueCategory::Specialist) / elapsed,
            avg_triage_wait_min: per_patient(self.weighted_queue(QueueCategory::Triage)),
            avg_bed_wait_min: per_patient(self.weighted_queue(QueueCategory::Bed)),
            avg_workup_wait_min: per_patient(self.weighted_queue(QueueCategory::Workup)),
            avg_specialist_wait_min: per_patient(self.weighted_queue(QueueCategory::Specialist)),
            max_triage_queue_len: self.max_queue(QueueCategory::Triage),
            max_bed_queue_len: self.max_queue(QueueCategory::Bed),
            max_workup_queue_len: self.max_queue(QueueCategory::Workup),
            max_specialist_queue_len: self.max_queue(QueueCategory::Specialist),
            nurse_uptime_min: self.weighted_busy(ServerGroup::Nurses),
            doctor_uptime_min: self.weighted_busy(ServerGroup::Doctors),
            specialist_uptime_min: self.weighted_busy(ServerGroup::Specialists),
            nurse_utilization,
            doctor_utilization,
            specialist_utilization,
            nurse_idle_fraction: 1.0 - nurse_utilization,
            doctor_idle_fraction: 1.0 - doctor_utilization,
            specialist_idle_fraction: 1.0 - specialist_utilization,
            diversion_time_fraction: self.weighted_diverted
                / (f64::from(params.ambulances) * elapsed),
        }
    }
}

/// Steady-state performance figures for one completed run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StatisticsReport {
    pub horizon_min: f64,
    pub patients_in: u64,
    pub patients_out: u64,
    pub preemptions: u64,
    pub ambulance_diversions: u64,
    pub avg_triage_queue_len: f64,
    pub avg_bed_queue_len: f64,
    pub avg_workup_queue_len: f64,
    pub avg_specialist_queue_len: f64,
    pub avg_triage_wait_min: f64,
    pub avg_bed_wait_min: f64,
    pub avg_workup_wait_min: f64,
    pub avg_specialist_wait_min: f64,
    pub max_triage_queue_len: usize,
    pub max_bed_queue_len: usize,
    pub max_workup_queue_len: usize,
    pub max_specialist_queue_len: usize,
    pub nurse_uptime_min: f64,
    pub doctor_uptime_min: f64,
    pub specialist_uptime_min: f64,
    pub nurse_utilization: f64,
    pub doctor_utilization: f64,
    pub specialist_utilization: f64,
    pub nurse_idle_fraction: f64,
    pub doctor_idle_fraction: f64,
    pub specialist_idle_fraction: f64,
    pub diversion_time_fraction: f64,
}

/// Builds the report from a finished world.
pub fn extract_report(world: &World) -> StatisticsReport {
    let telemetry = world.resource::<EdTelemetry>();
    let params = world.resource::<ScenarioParams>();
    telemetry.report(params)
}
