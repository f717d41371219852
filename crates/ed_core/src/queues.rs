//! Waiting lists. All lists are FIFO: patients enter at the back and leave
//! from the front.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};

use crate::ecs::PriorityClass;
use crate::error::SimulationError;

/// Walk-ins waiting for a triage nurse.
#[derive(Debug, Default, Resource)]
pub struct TriageQueue(pub VecDeque<Entity>);

/// Patients whose eligible zones are all full, split by priority class.
#[derive(Debug, Default, Resource)]
pub struct BedWaitQueues {
    queues: [VecDeque<Entity>; 3],
}

impl BedWaitQueues {
    pub fn push(&mut self, class: PriorityClass, patient: Entity) {
        self.queues[class.index()].push_back(patient);
    }

    pub fn pop(&mut self, class: PriorityClass) -> Option<Entity> {
        self.queues[class.index()].pop_front()
    }

    /// Pops from the first non-empty class in `order`.
    pub fn pop_first_of(&mut self, order: &[PriorityClass]) -> Option<Entity> {
        order.iter().find_map(|class| self.pop(*class))
    }

    pub fn len(&self, class: PriorityClass) -> usize {
        self.queues[class.index()].len()
    }

    pub fn total(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Patients holding a bed and waiting for a doctor, split by priority class.
#[derive(Debug, Default, Resource)]
pub struct WorkupWaitQueues {
    queues: [VecDeque<Entity>; 3],
}

impl WorkupWaitQueues {
    pub fn push(&mut self, class: PriorityClass, patient: Entity) {
        self.queues[class.index()].push_back(patient);
    }

    pub fn pop(&mut self, class: PriorityClass) -> Option<Entity> {
        self.queues[class.index()].pop_front()
    }

    pub fn len(&self, class: PriorityClass) -> usize {
        self.queues[class.index()].len()
    }

    pub fn total(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }
}

/// Patients whose workup was preempted, awaiting doctor reassignment ahead
/// of every ordinary queue. Only levels 2–5 can be preempted, so there is no
/// resuscitation list.
#[derive(Debug, Default, Resource)]
pub struct InterruptLists {
    emergent: VecDeque<Entity>,
    routine: VecDeque<Entity>,
}

impl InterruptLists {
    pub fn push(&mut self, class: PriorityClass, patient: Entity) -> Result<(), SimulationError> {
        match class {
            PriorityClass::Resuscitation => Err(SimulationError::invariant(
                "a resuscitation patient cannot be preempted",
            )),
            PriorityClass::Emergent => {
                self.emergent.push_back(patient);
                Ok(())
            }
            PriorityClass::Routine => {
                self.routine.push_back(patient);
                Ok(())
            }
        }
    }

    /// Emergent victims are restored before routine victims.
    pub fn pop_next(&mut self) -> Option<Entity> {
        self.emergent
            .pop_front()
            .or_else(|| self.routine.pop_front())
    }

    pub fn emergent_len(&self) -> usize {
        self.emergent.len()
    }

    pub fn routine_len(&self) -> usize {
        self.routine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emergent.is_empty() && self.routine.is_empty()
    }
}

/// Patients done with workup, waiting for a specialist.
#[derive(Debug, Default, Resource)]
pub struct SpecialistQueue(pub VecDeque<Entity>);
