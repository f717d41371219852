use criterion::{criterion_group, criterion_main, Criterion};

use ed_core::runner::run_scenario;
use ed_core::sampling::ClinicalDurationModel;
use ed_core::scenario::ScenarioParams;

/// One simulated week through the default department with the clinical
/// duration model; roughly tens of thousands of events per run.
fn bench_week_long_run(c: &mut Criterion) {
    let params = ScenarioParams::default()
        .with_horizon_min(7.0 * 1440.0)
        .with_warm_up_min(1440.0);

    c.bench_function("week_long_run", |b| {
        b.iter(|| {
            run_scenario(&params, Box::new(ClinicalDurationModel::new(99)))
                .expect("benchmark run completes")
        })
    });
}

criterion_group!(benches, bench_week_long_run);
criterion_main!(benches);
