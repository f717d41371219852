//! Example: replicated steady-state study of the default department.
//!
//! Runs a batch of independent replications in parallel, averages the
//! reports field-wise, prints the headline figures, and exports the per-run
//! and averaged results.

use ed_core::scenario::ScenarioParams;
use ed_experiments::{
    average_reports, export_averaged_to_json, export_to_csv, run_replications_with_progress,
    ReplicationPlan,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scenario = ScenarioParams::default()
        .with_warm_up_min(14.0 * 1440.0)
        .with_horizon_min(90.0 * 1440.0);
    let plan = ReplicationPlan::new(scenario, 30, 2024);

    println!(
        "Running {} replications of a {:.0}-day horizon...",
        plan.replications,
        plan.scenario.horizon_min / 1440.0
    );
    let reports = run_replications_with_progress(&plan, None, true)?;
    let averaged = average_reports(&reports).expect("at least one replication");

    println!("\n=== Averaged over {} replications ===", averaged.replications);
    println!("Patients treated: {:.0}", averaged.patients_out);
    println!("Preemptions: {:.1}", averaged.preemptions);
    println!("Ambulance diversions: {:.1}", averaged.ambulance_diversions);
    println!("Avg triage queue length: {:.2}", averaged.avg_triage_queue_len);
    println!("Avg bed queue length: {:.2}", averaged.avg_bed_queue_len);
    println!("Avg workup queue length: {:.2}", averaged.avg_workup_queue_len);
    println!(
        "Avg specialist queue length: {:.2}",
        averaged.avg_specialist_queue_len
    );
    println!("Nurse utilization: {:.1}%", averaged.nurse_utilization * 100.0);
    println!("Doctor utilization: {:.1}%", averaged.doctor_utilization * 100.0);
    println!(
        "Specialist utilization: {:.1}%",
        averaged.specialist_utilization * 100.0
    );
    println!(
        "Fleet time on diversion: {:.2}%",
        averaged.diversion_time_fraction * 100.0
    );

    println!("\nExporting results...");
    export_to_csv(&reports, "replication_results.csv")?;
    println!("Exported to replication_results.csv");
    export_averaged_to_json(&averaged, "replication_results_averaged.json")?;
    println!("Exported to replication_results_averaged.json");

    println!("\nStudy complete!");
    Ok(())
}
