use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use bevy_ecs::prelude::{Entity, Resource};

/// Simulated minutes per day; arrival rates cycle over this period.
pub const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Identifies a scheduled event for cancellation (preemption).
pub type EventId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    WalkInArrival,
    /// An ambulance unit is sent out; the conveyed patient is decided by the
    /// dispatch handler, so the event carries no patient.
    AmbulanceDispatch,
    /// The unit reaches a door. When `diverted` is set the conveyed patient
    /// went to another facility and only the unit returns.
    AmbulanceArrival {
        diverted: bool,
    },
    TriageDeparture,
    WorkupDeparture,
    SpecialistDeparture,
    EndOfSimulation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Simulation time in minutes.
    pub time: f64,
    pub kind: EventKind,
    pub patient: Option<Entity>,
}

/// The event most recently popped by the runner; handler systems read it.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug)]
struct ScheduledEvent {
    seq: EventId,
    event: Event,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap; equal times fall
        // back to insertion order so same-time events pop FIFO.
        other
            .event
            .time
            .total_cmp(&self.event.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Future-event list. Pending events pop in non-decreasing time order with a
/// stable FIFO tie-break; `now` tracks the time of the last popped event and
/// only moves forward.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: f64,
    next_seq: EventId,
    events: BinaryHeap<ScheduledEvent>,
    cancelled: HashSet<EventId>,
}

impl SimulationClock {
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule_at(&mut self, time: f64, kind: EventKind, patient: Option<Entity>) -> EventId {
        debug_assert!(
            time >= self.now,
            "event time must be >= current time ({time} < {})",
            self.now
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(ScheduledEvent {
            seq,
            event: Event {
                time,
                kind,
                patient,
            },
        });
        seq
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        while let Some(scheduled) = self.events.pop() {
            if self.cancelled.remove(&scheduled.seq) {
                continue;
            }
            self.now = scheduled.event.time;
            return Some(scheduled.event);
        }
        None
    }

    /// Pending (non-cancelled) events in arbitrary order.
    pub fn pending(&self) -> impl Iterator<Item = (EventId, Event)> + '_ {
        self.events
            .iter()
            .filter(|s| !self.cancelled.contains(&s.seq))
            .map(|s| (s.seq, s.event))
    }

    /// Removes a pending event. Returns false if the id is unknown or was
    /// already cancelled or popped.
    pub fn cancel(&mut self, id: EventId) -> bool {
        let live = self
            .events
            .iter()
            .any(|s| s.seq == id && !self.cancelled.contains(&s.seq));
        if live {
            self.cancelled.insert(id);
        }
        live
    }

    pub fn len(&self) -> usize {
        self.events.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
