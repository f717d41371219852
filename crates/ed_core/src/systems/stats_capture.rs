use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::CurrentEvent;
use crate::queues::{BedWaitQueues, SpecialistQueue, TriageQueue, WorkupWaitQueues};
use crate::resources::{AmbulanceFleet, Specialists, TriageNurses, WorkupDoctors};
use crate::telemetry::EdTelemetry;

/// Runs after every handled event and folds the post-handler state into the
/// time-weighted accumulators. Interrupt lists are reassignment staging, not
/// a workup queue, so they are not counted here.
pub fn statistics_capture_system(
    event: Res<CurrentEvent>,
    triage_queue: Res<TriageQueue>,
    bed_waits: Res<BedWaitQueues>,
    workup_waits: Res<WorkupWaitQueues>,
    specialist_queue: Res<SpecialistQueue>,
    nurses: Res<TriageNurses>,
    doctors: Res<WorkupDoctors>,
    specialists: Res<Specialists>,
    fleet: Res<AmbulanceFleet>,
    mut telemetry: ResMut<EdTelemetry>,
) {
    telemetry.observe(
        event.0.time,
        [
            triage_queue.0.len(),
            bed_waits.total(),
            workup_waits.total(),
            specialist_queue.0.len(),
        ],
        [nurses.0.busy(), doctors.0.busy(), specialists.0.busy()],
        fleet.diverted(),
    );
}
