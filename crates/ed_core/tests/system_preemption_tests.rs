mod support;

use ed_core::clock::EventKind;
use ed_core::ecs::TriageLevel;
use ed_core::queues::InterruptLists;
use ed_core::runner::run_to_horizon_with_hook;
use ed_core::scenario::ScenarioParams;
use ed_core::telemetry::extract_report;

use support::{build_world, Script, ScriptedDurations};

/// One doctor, two ambulance patients two minutes apart. The walk-in side
/// is parked in a triage that outlasts the horizon.
fn single_doctor_params() -> ScenarioParams {
    ScenarioParams::default()
        .with_staff(1, 1, 5)
        .with_beds([1, 1, 5, 5])
        .with_warm_up_min(0.0)
        .with_horizon_min(30.0)
}

fn two_conveyances(levels: [TriageLevel; 2]) -> ScriptedDurations {
    ScriptedDurations {
        ambulance_gaps: Script::new(vec![2.0, 1000.0]),
        ambulance_levels: Script::new(levels.to_vec()),
        triage: 1000.0,
        workup: 8.0,
        procedure: 1.0,
        travel: 1.0,
        ..Default::default()
    }
}

fn departure_times(events: &[ed_core::clock::Event], kind: EventKind) -> Vec<f64> {
    events
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.time)
        .collect()
}

/// An emergent arrival seizes the doctor from a less-urgent patient in
/// service; the victim is later re-serviced from scratch, not resumed.
#[test]
fn emergent_arrival_preempts_less_urgent_workup() {
    let sampler = two_conveyances([TriageLevel::LessUrgent, TriageLevel::Emergent]);
    let (mut world, mut schedule) = build_world(&single_doctor_params(), sampler);

    let mut events = Vec::new();
    run_to_horizon_with_hook(&mut world, &mut schedule, |_, event| events.push(*event))
        .expect("run completes");

    // Victim started at t=1 and would have finished at t=9; the preemptor
    // arrives at t=3, runs 3..11, and the victim restarts with a full fresh
    // service, finishing at 11 + 8 = 19.
    assert_eq!(
        departure_times(&events, EventKind::WorkupDeparture),
        vec![11.0, 19.0]
    );
    assert_eq!(
        departure_times(&events, EventKind::SpecialistDeparture),
        vec![12.0, 20.0]
    );

    let report = extract_report(&world);
    assert_eq!(report.preemptions, 1);
    assert_eq!(report.patients_out, 2);
    assert!(world.resource::<InterruptLists>().is_empty());
}

/// A resuscitation arrival may take the doctor from an emergent patient;
/// the victim waits on the emergent interrupt list.
#[test]
fn resuscitation_arrival_preempts_emergent_workup() {
    let sampler = two_conveyances([TriageLevel::Emergent, TriageLevel::Resuscitation]);
    let (mut world, mut schedule) = build_world(&single_doctor_params(), sampler);

    let mut events = Vec::new();
    run_to_horizon_with_hook(&mut world, &mut schedule, |_, event| events.push(*event))
        .expect("run completes");

    assert_eq!(
        departure_times(&events, EventKind::WorkupDeparture),
        vec![11.0, 19.0]
    );
    let report = extract_report(&world);
    assert_eq!(report.preemptions, 1);
    assert_eq!(report.patients_out, 2);
}

/// Equal priority never interrupts: the second emergent patient queues and
/// is served after the first completes.
#[test]
fn equal_priority_waits_instead_of_preempting() {
    let sampler = two_conveyances([TriageLevel::Emergent, TriageLevel::Emergent]);
    let (mut world, mut schedule) = build_world(&single_doctor_params(), sampler);

    let mut events = Vec::new();
    run_to_horizon_with_hook(&mut world, &mut schedule, |_, event| events.push(*event))
        .expect("run completes");

    assert_eq!(
        departure_times(&events, EventKind::WorkupDeparture),
        vec![9.0, 17.0]
    );
    let report = extract_report(&world);
    assert_eq!(report.preemptions, 0);
}

/// Level 3–5 arrivals never preempt anyone, whatever is in service.
#[test]
fn routine_arrivals_never_preempt() {
    let sampler = two_conveyances([TriageLevel::LessUrgent, TriageLevel::Urgent]);
    let (mut world, mut schedule) = build_world(&single_doctor_params(), sampler);

    let mut events = Vec::new();
    run_to_horizon_with_hook(&mut world, &mut schedule, |_, event| events.push(*event))
        .expect("run completes");

    // First-come first-served: the level-4 patient finishes its original
    // service, then the level-3 patient is taken from the wait queue.
    assert_eq!(
        departure_times(&events, EventKind::WorkupDeparture),
        vec![9.0, 17.0]
    );
    let report = extract_report(&world);
    assert_eq!(report.preemptions, 0);
    assert!(world.resource::<InterruptLists>().is_empty());
}
