//! Result export utilities.
//!
//! Per-run reports export to JSON (one object per replication) or CSV (one
//! row per replication); the field-wise average exports to JSON on its own.

use std::fs::File;
use std::path::Path;

use ed_core::telemetry::StatisticsReport;

use crate::replication::AveragedReport;

fn ensure_not_empty<T>(items: &[T]) -> Result<(), Box<dyn std::error::Error>> {
    if items.is_empty() {
        return Err("No results to export".into());
    }
    Ok(())
}

fn create_output_file(path: impl AsRef<Path>) -> Result<File, Box<dyn std::error::Error>> {
    Ok(File::create(path)?)
}

/// Export per-replication reports to a JSON array.
pub fn export_to_json(
    reports: &[StatisticsReport],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_not_empty(reports)?;
    let file = create_output_file(path)?;
    serde_json::to_writer_pretty(file, reports)?;
    Ok(())
}

/// Export the averaged report to a JSON object.
pub fn export_averaged_to_json(
    averaged: &AveragedReport,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = create_output_file(path)?;
    serde_json::to_writer_pretty(file, averaged)?;
    Ok(())
}

/// Export per-replication reports to CSV, one row per replication.
pub fn export_to_csv(
    reports: &[StatisticsReport],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_not_empty(reports)?;
    let file = create_output_file(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "replication",
        "horizon_min",
        "patients_in",
        "patients_out",
        "preemptions",
        "ambulance_diversions",
        "avg_triage_queue_len",
        "avg_bed_queue_len",
        "avg_workup_queue_len",
        "avg_specialist_queue_len",
        "avg_triage_wait_min",
        "avg_bed_wait_min",
        "avg_workup_wait_min",
        "avg_specialist_wait_min",
        "max_triage_queue_len",
        "max_bed_queue_len",
        "max_workup_queue_len",
        "max_specialist_queue_len",
        "nurse_uptime_min",
        "doctor_uptime_min",
        "specialist_uptime_min",
        "nurse_utilization",
        "doctor_utilization",
        "specialist_utilization",
        "nurse_idle_fraction",
        "doctor_idle_fraction",
        "specialist_idle_fraction",
        "diversion_time_fraction",
    ])?;

    for (index, report) in reports.iter().enumerate() {
        wtr.write_record([
            index.to_string(),
            report.horizon_min.to_string(),
            report.patients_in.to_string(),
            report.patients_out.to_string(),
            report.preemptions.to_string(),
            report.ambulance_diversions.to_string(),
            report.avg_triage_queue_len.to_string(),
            report.avg_bed_queue_len.to_string(),
            report.avg_workup_queue_len.to_string(),
            report.avg_specialist_queue_len.to_string(),
            report.avg_triage_wait_min.to_string(),
            report.avg_bed_wait_min.to_string(),
            report.avg_workup_wait_min.to_string(),
            report.avg_specialist_wait_min.to_string(),
            report.max_triage_queue_len.to_string(),
            report.max_bed_queue_len.to_string(),
            report.max_workup_queue_len.to_string(),
            report.max_specialist_queue_len.to_string(),
            report.nurse_uptime_min.to_string(),
            report.doctor_uptime_min.to_string(),
            report.specialist_uptime_min.to_string(),
            report.nurse_utilization.to_string(),
            report.doctor_utilization.to_string(),
            report.specialist_utilization.to_string(),
            report.nurse_idle_fraction.to_string(),
            report.doctor_idle_fraction.to_string(),
            report.specialist_idle_fraction.to_string(),
            report.diversion_time_fraction.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
