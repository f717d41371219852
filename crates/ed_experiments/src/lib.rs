//! Replication driver for the emergency-department simulation.
//!
//! A single run of the engine is one sample of a stochastic system; steady-state
//! answers come from running many independent replications and averaging their
//! reports. This crate provides that outer loop: replications execute in
//! parallel (they share no state), results are averaged field-wise, and the
//! per-run and averaged figures can be exported to JSON or CSV.
//!
//! # Quick Start
//!
//! ```no_run
//! use ed_core::scenario::ScenarioParams;
//! use ed_experiments::{average_reports, run_replications, ReplicationPlan};
//!
//! let plan = ReplicationPlan::new(ScenarioParams::default(), 30, 42);
//! let reports = run_replications(&plan, None).expect("replications complete");
//! let averaged = average_reports(&reports).expect("non-empty results");
//! println!("doctor utilization: {:.1}%", averaged.doctor_utilization * 100.0);
//! ```

pub mod export;
pub mod replication;

pub use export::{export_averaged_to_json, export_to_csv, export_to_json};
pub use replication::{
    average_reports, run_replications, run_replications_with_progress,
    run_replications_with_sampler, AveragedReport, ReplicationPlan,
};
