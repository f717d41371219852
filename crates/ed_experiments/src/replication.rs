//! Parallel replication execution using rayon.
//!
//! Replications are embarrassingly parallel: each gets its own world and its
//! own duration provider, so runs never share state and only the final
//! averaging step joins their results.

use ed_core::error::SimulationError;
use ed_core::runner::run_scenario;
use ed_core::sampling::{ClinicalDurationModel, DurationSampler};
use ed_core::scenario::ScenarioParams;
use ed_core::telemetry::StatisticsReport;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// One batch of independent runs over a fixed scenario. Replication `i` is
/// seeded with `base_seed + i` so batches are reproducible end to end.
#[derive(Debug, Clone)]
pub struct ReplicationPlan {
    pub scenario: ScenarioParams,
    pub replications: usize,
    pub base_seed: u64,
}

impl ReplicationPlan {
    pub fn new(scenario: ScenarioParams, replications: usize, base_seed: u64) -> Self {
        Self {
            scenario,
            replications,
            base_seed,
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.replications == 0 {
            return Err(SimulationError::InvalidConfig(
                "at least one replication is required".into(),
            ));
        }
        self.scenario.validate()
    }
}

/// Run every replication of the plan with the default clinical duration
/// model. Uses rayon's default thread count unless `num_threads` is given.
pub fn run_replications(
    plan: &ReplicationPlan,
    num_threads: Option<usize>,
) -> Result<Vec<StatisticsReport>, SimulationError> {
    run_replications_with_progress(plan, num_threads, false)
}

/// Like [run_replications], optionally rendering a progress bar.
pub fn run_replications_with_progress(
    plan: &ReplicationPlan,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<StatisticsReport>, SimulationError> {
    run_replications_with_sampler(
        plan,
        |seed| Box::new(ClinicalDurationModel::new(seed)),
        num_threads,
        show_progress,
    )
}

/// Run the plan with a caller-supplied duration provider per replication.
/// `sampler_for` receives the replication's seed and must build a fresh,
/// independent provider; results come back in replication order. The first
/// failed replication aborts the batch.
pub fn run_replications_with_sampler<F>(
    plan: &ReplicationPlan,
    sampler_for: F,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<StatisticsReport>, SimulationError>
where
    F: Fn(u64) -> Box<dyn DurationSampler> + Sync,
{
    plan.validate()?;

    let bar = if show_progress {
        let bar = ProgressBar::new(plan.replications as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .expect("progress template is valid")
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .map_err(|error| {
            SimulationError::InvalidConfig(format!("failed to create thread pool: {error}"))
        })?;

    let bar_ref = bar.as_ref();
    let results = pool.install(|| {
        (0..plan.replications)
            .into_par_iter()
            .map(|index| {
                let seed = plan.base_seed + index as u64;
                let report = run_scenario(&plan.scenario, sampler_for(seed))?;
                if let Some(bar) = bar_ref {
                    bar.inc(1);
                }
                Ok(report)
            })
            .collect::<Result<Vec<_>, SimulationError>>()
    });

    if let Some(bar) = bar {
        bar.finish_with_message("Completed");
    }

    results
}

/// Field-wise mean over a batch of per-run reports. Every metric is averaged,
/// maxima included, so the result is the expected report of one run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AveragedReport {
    pub replications: usize,
    pub horizon_min: f64,
    pub patients_in: f64,
    pub patients_out: f64,
    pub preemptions: f64,
    pub ambulance_diversions: f64,
    pub avg_triage_queue_len: f64,
    pub avg_bed_queue_len: f64,
    pub avg_workup_queue_len: f64,
    pub avg_specialist_queue_len: f64,
    pub avg_triage_wait_min: f64,
    pub avg_bed_wait_min: f64,
    pub avg_workup_wait_min: f64,
    pub avg_specialist_wait_min: f64,
    pub max_triage_queue_len: f64,
    pub max_bed_queue_len: f64,
    pub max_workup_queue_len: f64,
    pub max_specialist_queue_len: f64,
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

/// Averages a batch of reports. Returns None for an empty batch.
pub fn average_reports(reports: &[StatisticsReport]) -> Option<AveragedReport> {
    if reports.is_empty() {
        return None;
    }
    let n = reports.len() as f64;
    let mean = |field: fn(&StatisticsReport) -> f64| reports.iter().map(field).sum::<f64>() / n;

    Some(AveragedReport {
        replications: reports.len(),
        horizon_min: mean(|r| r.horizon_min),
        patients_in: mean(|r| r.patients_in as f64),
        patients_out: mean(|r| r.patients_out as f64),
        preemptions: mean(|r| r.preemptions as f64),
        ambulance_diversions: mean(|r| r.ambulance_diversions as f64),
        avg_triage_queue_len: mean(|r| r.avg_triage_queue_len),
        avg_bed_queue_len: mean(|r| r.avg_bed_queue_len),
        avg_workup_queue_len: mean(|r| r.avg_workup_queue_len),
        avg_specialist_queue_len: mean(|r| r.avg_specialist_queue_len),
        avg_triage_wait_min: mean(|r| r.avg_triage_wait_min),
        avg_bed_wait_min: mean(|r| r.avg_bed_wait_min),
        avg_workup_wait_min: mean(|r| r.avg_workup_wait_min),
        avg_specialist_wait_min: mean(|r| r.avg_specialist_wait_min),
        max_triage_queue_len: mean(|r| r.max_triage_queue_len as f64),
        max_bed_queue_len: mean(|r| r.max_bed_queue_len as f64),
        max_workup_queue_len: mean(|r| r.max_workup_queue_len as f64),
        max_specialist_queue_len: mean(|r| r.max_specialist_queue_len as f64),
        nurse_uptime_min: mean(|r| r.nurse_uptime_min),
        doctor_uptime_min: mean(|r| r.doctor_uptime_min),
        specialist_uptime_min: mean(|r| r.specialist_uptime_min),
        nurse_utilization: mean(|r| r.nurse_utilization),
        doctor_utilization: mean(|r| r.doctor_utilization),
        specialist_utilization: mean(|r| r.specialist_utilization),
        nurse_idle_fraction: mean(|r| r.nurse_idle_fraction),
        doctor_idle_fraction: mean(|r| r.doctor_idle_fraction),
        specialist_idle_fraction: mean(|r| r.specialist_idle_fraction),
        diversion_time_fraction: mean(|r| r.diversion_time_fraction),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_plan(replications: usize) -> ReplicationPlan {
        let scenario = ScenarioParams::default()
            .with_warm_up_min(240.0)
            .with_horizon_min(2880.0);
        ReplicationPlan::new(scenario, replications, 7)
    }

    #[test]
    fn zero_replications_are_rejected() {
        assert!(short_plan(0).validate().is_err());
        assert!(short_plan(1).validate().is_ok());
    }

    #[test]
    fn replications_with_identical_providers_agree() {
        let plan = short_plan(3);
        // Ignore the per-replication seed so every run sees the same draws.
        let reports = run_replications_with_sampler(
            &plan,
            |_seed| Box::new(ClinicalDurationModel::new(123)),
            Some(2),
            false,
        )
        .expect("replications complete");

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0], reports[1]);
        assert_eq!(reports[1], reports[2]);

        let averaged = average_reports(&reports).expect("non-empty");
        assert_eq!(averaged.patients_in, reports[0].patients_in as f64);
        assert_eq!(averaged.doctor_utilization, reports[0].doctor_utilization);
    }

    #[test]
    fn distinct_seeds_vary_and_come_back_in_order() {
        let plan = short_plan(2);
        let reports = run_replications(&plan, Some(2)).expect("replications complete");
        assert_eq!(reports.len(), 2);
        assert_ne!(reports[0], reports[1]);

        // Replication order is deterministic: re-running the plan reproduces
        // the batch element for element.
        let again = run_replications(&plan, Some(2)).expect("replications complete");
        assert_eq!(reports, again);
    }

    #[test]
    fn averaging_is_field_wise() {
        let plan = short_plan(2);
        let reports = run_replications(&plan, None).expect("replications complete");
        let averaged = average_reports(&reports).expect("non-empty");

        assert_eq!(averaged.replications, 2);
        assert_eq!(
            averaged.patients_out,
            (reports[0].patients_out as f64 + reports[1].patients_out as f64) / 2.0
        );
        assert_eq!(
            averaged.avg_bed_queue_len,
            (reports[0].avg_bed_queue_len + reports[1].avg_bed_queue_len) / 2.0
        );
        assert_eq!(
            averaged.max_triage_queue_len,
            (reports[0].max_triage_queue_len as f64 + reports[1].max_triage_queue_len as f64)
                / 2.0
        );
    }

    #[test]
    fn empty_batches_average_to_none() {
        assert!(average_reports(&[]).is_none());
    }
}
