use bevy_ecs::prelude::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalMode {
    Ambulance,
    WalkIn,
}

/// CTAS-style acuity, level 1 most urgent. The derived `Ord` sorts by
/// urgency, so `a < b` means `a` is more urgent than `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TriageLevel {
    Resuscitation,
    Emergent,
    Urgent,
    LessUrgent,
    NonUrgent,
}

impl TriageLevel {
    pub fn priority_class(self) -> PriorityClass {
        match self {
            TriageLevel::Resuscitation => PriorityClass::Resuscitation,
            TriageLevel::Emergent => PriorityClass::Emergent,
            TriageLevel::Urgent | TriageLevel::LessUrgent | TriageLevel::NonUrgent => {
                PriorityClass::Routine
            }
        }
    }
}

/// Queueing class: levels 1, 2, and 3–5 wait in separate lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityClass {
    Resuscitation,
    Emergent,
    Routine,
}

impl PriorityClass {
    pub const ALL: [PriorityClass; 3] = [
        PriorityClass::Resuscitation,
        PriorityClass::Emergent,
        PriorityClass::Routine,
    ];

    pub fn index(self) -> usize {
        match self {
            PriorityClass::Resuscitation => 0,
            PriorityClass::Emergent => 1,
            PriorityClass::Routine => 2,
        }
    }
}

/// Physical ED sub-area with its own bed stock. Eligibility by acuity:
/// resus bays take level 1 only overflowing to acute; acute takes 1–2;
/// general and fast-track take 2–5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Resus,
    Acute,
    General,
    FastTrack,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Resus, Zone::Acute, Zone::General, Zone::FastTrack];

    pub fn index(self) -> usize {
        match self {
            Zone::Resus => 0,
            Zone::Acute => 1,
            Zone::General => 2,
            Zone::FastTrack => 3,
        }
    }
}

/// Coarse presenting-complaint bucket; only selects which service-time
/// branch the duration provider uses for a given acuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complaint {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Patient {
    pub arrival: ArrivalMode,
    /// Set at dispatch for ambulance patients, at triage start for walk-ins.
    pub acuity: Option<TriageLevel>,
    pub complaint: Option<Complaint>,
    /// Set only while the patient occupies a bed.
    pub zone: Option<Zone>,
}

impl Patient {
    pub fn walk_in() -> Self {
        Self {
            arrival: ArrivalMode::WalkIn,
            acuity: None,
            complaint: None,
            zone: None,
        }
    }

    pub fn ambulance(acuity: TriageLevel, complaint: Complaint) -> Self {
        Self {
            arrival: ArrivalMode::Ambulance,
            acuity: Some(acuity),
            complaint: Some(complaint),
            zone: None,
        }
    }
}

/// Marks a patient counted inside the department: inserted when an arrival
/// is processed, gone when the patient departs (the entity is despawned).
/// Patients riding an ambulance are not yet in the department.
#[derive(Debug, Component)]
pub struct InDepartment;
