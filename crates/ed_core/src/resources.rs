use bevy_ecs::prelude::Resource;

use crate::ecs::Zone;
use crate::error::SimulationError;

/// Busy/idle bookkeeping for a fixed-size staff pool. Occupancy is checked;
/// going below zero or above capacity is an engine bug surfaced as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerPool {
    busy: u32,
    capacity: u32,
}

impl ServerPool {
    pub fn new(capacity: u32) -> Self {
        Self { busy: 0, capacity }
    }

    pub fn busy(&self) -> u32 {
        self.busy
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn has_idle(&self) -> bool {
        self.busy < self.capacity
    }

    pub fn occupy(&mut self) -> Result<(), SimulationError> {
        if self.busy >= self.capacity {
            return Err(SimulationError::invariant(format!(
                "occupying a server beyond capacity ({}/{})",
                self.busy, self.capacity
            )));
        }
        self.busy += 1;
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), SimulationError> {
        if self.busy == 0 {
            return Err(SimulationError::invariant(
                "releasing a server while none are busy",
            ));
        }
        self.busy -= 1;
        Ok(())
    }
}

#[derive(Debug, Resource)]
pub struct TriageNurses(pub ServerPool);

#[derive(Debug, Resource)]
pub struct WorkupDoctors(pub ServerPool);

#[derive(Debug, Resource)]
pub struct Specialists(pub ServerPool);

/// Free-bed counts per zone.
#[derive(Debug, Resource)]
pub struct BedBoard {
    free: [u32; 4],
    capacity: [u32; 4],
}

impl BedBoard {
    pub fn new(capacity: [u32; 4]) -> Self {
        Self {
            free: capacity,
            capacity,
        }
    }

    pub fn free_in(&self, zone: Zone) -> u32 {
        self.free[zone.index()]
    }

    pub fn capacity_of(&self, zone: Zone) -> u32 {
        self.capacity[zone.index()]
    }

    pub fn occupy(&mut self, zone: Zone) -> Result<(), SimulationError> {
        let slot = &mut self.free[zone.index()];
        if *slot == 0 {
            return Err(SimulationError::invariant(format!(
                "occupying a bed in {zone:?} with none free"
            )));
        }
        *slot -= 1;
        Ok(())
    }

    pub fn release(&mut self, zone: Zone) -> Result<(), SimulationError> {
        let slot = &mut self.free[zone.index()];
        if *slot >= self.capacity[zone.index()] {
            return Err(SimulationError::invariant(format!(
                "releasing a bed in {zone:?} beyond its capacity"
            )));
        }
        *slot += 1;
        Ok(())
    }
}

/// Ambulance unit accounting: `available` units sit at base, `diverted`
/// counts units currently out on a diversion run.
#[derive(Debug, Resource)]
pub struct AmbulanceFleet {
    available: u32,
    capacity: u32,
    diverted: u32,
}

impl AmbulanceFleet {
    pub fn new(capacity: u32) -> Self {
        Self {
            available: capacity,
            capacity,
            diverted: 0,
        }
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn diverted(&self) -> u32 {
        self.diverted
    }

    pub fn send_out(&mut self) -> Result<(), SimulationError> {
        if self.available == 0 {
            return Err(SimulationError::invariant(
                "sending out an ambulance with none available",
            ));
        }
        self.available -= 1;
        Ok(())
    }

    pub fn receive_back(&mut self) -> Result<(), SimulationError> {
        if self.available >= self.capacity {
            return Err(SimulationError::invariant(
                "receiving an ambulance back beyond fleet capacity",
            ));
        }
        self.available += 1;
        Ok(())
    }

    pub fn begin_diversion(&mut self) {
        self.diverted += 1;
    }

    pub fn end_diversion(&mut self) -> Result<(), SimulationError> {
        if self.diverted == 0 {
            return Err(SimulationError::invariant(
                "ending a diversion with none in progress",
            ));
        }
        self.diverted -= 1;
        Ok(())
    }
}

/// First failure raised by a handler; the run loop aborts on it. Systems
/// cannot return `Result`, so errors are latched here instead.
#[derive(Debug, Default, Resource)]
pub struct EngineFault(Option<SimulationError>);

impl EngineFault {
    pub fn record(&mut self, error: SimulationError) {
        self.0.get_or_insert(error);
    }

    pub fn take(&mut self) -> Option<SimulationError> {
        self.0.take()
    }
}
