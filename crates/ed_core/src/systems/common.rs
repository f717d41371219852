//! Shared admission logic: zone preferences, bed allocation and backfill,
//! and workup admission with preemptive priority.

use bevy_ecs::prelude::{Entity, Query};

use crate::clock::{EventId, EventKind, SimulationClock};
use crate::ecs::{Patient, PriorityClass, TriageLevel, Zone};
use crate::error::SimulationError;
use crate::queues::{BedWaitQueues, InterruptLists, WorkupWaitQueues};
use crate::resources::{BedBoard, Specialists, TriageNurses, WorkupDoctors};
use crate::sampling::Sampler;
use crate::telemetry::EdTelemetry;

/// Zones an ambulance patient may bed in, most preferred first.
pub(crate) fn ambulance_zone_preferences(level: TriageLevel) -> &'static [Zone] {
    match level {
        TriageLevel::Resuscitation => &[Zone::Resus, Zone::Acute],
        TriageLevel::Emergent => &[Zone::Acute, Zone::General, Zone::FastTrack],
        TriageLevel::Urgent | TriageLevel::LessUrgent | TriageLevel::NonUrgent => {
            &[Zone::General, Zone::FastTrack]
        }
    }
}

/// Walk-ins bed on the low-acuity side only, fast track first.
pub(crate) const WALK_IN_ZONE_PREFERENCES: &[Zone] = &[Zone::FastTrack, Zone::General];

/// Which bed-wait classes a freed bed in `zone` may serve, in drain order.
pub(crate) fn backfill_order(zone: Zone) -> &'static [PriorityClass] {
    match zone {
        Zone::Resus => &[PriorityClass::Resuscitation],
        Zone::Acute => &[PriorityClass::Resuscitation, PriorityClass::Emergent],
        Zone::General | Zone::FastTrack => &[PriorityClass::Emergent, PriorityClass::Routine],
    }
}

pub(crate) fn missing_patient() -> SimulationError {
    SimulationError::invariant("event references a missing patient")
}

pub(crate) fn acuity_of(
    patients: &Query<&mut Patient>,
    entity: Entity,
) -> Result<TriageLevel, SimulationError> {
    patients
        .get(entity)
        .map_err(|_| missing_patient())?
        .acuity
        .ok_or_else(|| {
            SimulationError::invariant("patient reached admission without a triage level")
        })
}

/// Seizes a nurse, assigns the acuity drawn at triage start, and books the
/// triage departure.
pub(crate) fn begin_triage(
    subject: Entity,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    nurses: &mut TriageNurses,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    nurses.0.occupy()?;
    let level = sampler.triage_level_for_walk_in();
    let complaint = sampler.complaint(level);

    let snapshot = {
        let mut patient = patients.get_mut(subject).map_err(|_| missing_patient())?;
        patient.acuity = Some(level);
        patient.complaint = Some(complaint);
        *patient
    };
    let duration = sampler.triage_duration(&snapshot)?;
    clock.schedule_at(
        clock.now() + duration,
        EventKind::TriageDeparture,
        Some(subject),
    );
    Ok(())
}

/// Seizes a doctor and books the workup departure with a fresh duration.
pub(crate) fn begin_workup(
    subject: Entity,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    doctors: &mut WorkupDoctors,
    patients: &Query<&mut Patient>,
) -> Result<(), SimulationError> {
    doctors.0.occupy()?;
    let snapshot = *patients.get(subject).map_err(|_| missing_patient())?;
    let duration = sampler.workup_duration(&snapshot)?;
    clock.schedule_at(
        clock.now() + duration,
        EventKind::WorkupDeparture,
        Some(subject),
    );
    Ok(())
}

/// Seizes a specialist and books the specialist departure.
pub(crate) fn begin_procedure(
    subject: Entity,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    specialists: &mut Specialists,
    patients: &Query<&mut Patient>,
) -> Result<(), SimulationError> {
    specialists.0.occupy()?;
    let snapshot = *patients.get(subject).map_err(|_| missing_patient())?;
    let duration = sampler.procedure_duration(&snapshot)?;
    clock.schedule_at(
        clock.now() + duration,
        EventKind::SpecialistDeparture,
        Some(subject),
    );
    Ok(())
}

/// Beds the patient in the first preferred zone with capacity; returns the
/// zone, or None when every eligible zone is full.
pub(crate) fn allocate_bed(
    subject: Entity,
    preferences: &[Zone],
    beds: &mut BedBoard,
    patients: &mut Query<&mut Patient>,
) -> Result<Option<Zone>, SimulationError> {
    for &zone in preferences {
        if beds.free_in(zone) > 0 {
            beds.occupy(zone)?;
            patients.get_mut(subject).map_err(|_| missing_patient())?.zone = Some(zone);
            return Ok(Some(zone));
        }
    }
    Ok(None)
}

/// Earliest pending workup departure whose patient is strictly lower
/// priority than `level`. Linear scan over the pending list.
fn find_preemption_victim(
    clock: &SimulationClock,
    patients: &Query<&mut Patient>,
    level: TriageLevel,
) -> Option<(EventId, Entity)> {
    let mut best: Option<(f64, EventId, Entity)> = None;
    for (id, event) in clock.pending() {
        if event.kind != EventKind::WorkupDeparture {
            continue;
        }
        let Some(candidate) = event.patient else {
            continue;
        };
        let Ok(patient) = patients.get(candidate) else {
            continue;
        };
        let Some(candidate_level) = patient.acuity else {
            continue;
        };
        if candidate_level <= level {
            continue;
        }
        let replace = match best {
            None => true,
            Some((time, seq, _)) => event.time < time || (event.time == time && id < seq),
        };
        if replace {
            best = Some((event.time, id, candidate));
        }
    }
    best.map(|(_, id, entity)| (id, entity))
}

/// Puts a bedded patient in front of a doctor. With all doctors busy, level
/// 1 and 2 patients take the doctor from the earliest-finishing workup of
/// strictly lower priority; the victim's remaining service is discarded and
/// it waits on the interrupt list for a full re-service. Level 3–5 patients
/// always queue.
pub(crate) fn admit_to_workup(
    subject: Entity,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    doctors: &mut WorkupDoctors,
    workup_waits: &mut WorkupWaitQueues,
    interrupts: &mut InterruptLists,
    telemetry: &mut EdTelemetry,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    let level = acuity_of(patients, subject)?;
    let class = level.priority_class();

    if doctors.0.has_idle() {
        return begin_workup(subject, clock, sampler, doctors, patients);
    }
    if class == PriorityClass::Routine {
        workup_waits.push(class, subject);
        return Ok(());
    }

    match find_preemption_victim(clock, patients, level) {
        Some((event_id, victim)) => {
            clock.cancel(event_id);
            let victim_level = acuity_of(patients, victim)?;
            interrupts.push(victim_level.priority_class(), victim)?;
            telemetry.preemptions += 1;

            // The victim's doctor passes straight to the new patient.
            let snapshot = *patients.get(subject).map_err(|_| missing_patient())?;
            let duration = sampler.workup_duration(&snapshot)?;
            clock.schedule_at(
                clock.now() + duration,
                EventKind::WorkupDeparture,
                Some(subject),
            );
            Ok(())
        }
        None => {
            workup_waits.push(class, subject);
            Ok(())
        }
    }
}

/// After a workup departure freed one doctor, hands it to the next patient:
/// interrupted work first (emergent, then routine victims), then the wait
/// queues in priority order. At most one patient per freed doctor.
pub(crate) fn restore_workup_capacity(
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    doctors: &mut WorkupDoctors,
    workup_waits: &mut WorkupWaitQueues,
    interrupts: &mut InterruptLists,
    patients: &Query<&mut Patient>,
) -> Result<(), SimulationError> {
    let next = interrupts.pop_next().or_else(|| {
        PriorityClass::ALL
            .iter()
            .find_map(|class| workup_waits.pop(*class))
    });
    if let Some(subject) = next {
        begin_workup(subject, clock, sampler, doctors, patients)?;
    }
    Ok(())
}

/// Returns a bed to `zone` and, if an eligible patient is waiting for one,
/// immediately re-occupies it and sends that patient into workup admission.
pub(crate) fn release_bed_and_backfill(
    zone: Zone,
    clock: &mut SimulationClock,
    sampler: &mut Sampler,
    beds: &mut BedBoard,
    bed_waits: &mut BedWaitQueues,
    doctors: &mut WorkupDoctors,
    workup_waits: &mut WorkupWaitQueues,
    interrupts: &mut InterruptLists,
    telemetry: &mut EdTelemetry,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimulationError> {
    beds.release(zone)?;
    if let Some(next) = bed_waits.pop_first_of(backfill_order(zone)) {
        beds.occupy(zone)?;
        patients.get_mut(next).map_err(|_| missing_patient())?.zone = Some(zone);
        admit_to_workup(
            next,
            clock,
            sampler,
            doctors,
            workup_waits,
            interrupts,
            telemetry,
            patients,
        )?;
    }
    Ok(())
}
