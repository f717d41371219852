//! Duration provider boundary and the default clinical duration model.
//!
//! The engine never samples randomness itself: every interval and acuity
//! draw comes through [DurationSampler]. The [Sampler] resource wraps the
//! provider and rejects invalid durations before anything is scheduled with
//! them.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::MINUTES_PER_DAY;
use crate::ecs::{ArrivalMode, Complaint, Patient, TriageLevel};
use crate::error::SimulationError;

/// Source of sampled intervals and acuity draws. All durations are minutes
/// and must be non-negative and finite; `&mut self` lets providers own RNG
/// state.
pub trait DurationSampler: Send + Sync {
    /// Gap until the next arrival of `mode`, given the current clock (for
    /// time-of-day arrival cycles).
    fn interarrival(&mut self, clock_min: f64, mode: ArrivalMode) -> f64;

    fn triage_duration(&mut self, patient: &Patient) -> f64;

    fn workup_duration(&mut self, patient: &Patient) -> f64;

    fn procedure_duration(&mut self, patient: &Patient) -> f64;

    /// Full dispatch-to-door delay for a conveyed patient: outbound and
    /// return legs plus on-scene care.
    fn ambulance_travel_time(&mut self) -> f64;

    /// Full delay until a diverted unit is back at base.
    fn diverted_travel_time(&mut self) -> f64;

    fn triage_level_for_ambulance(&mut self) -> TriageLevel;

    fn triage_level_for_walk_in(&mut self) -> TriageLevel;

    /// Presenting-complaint bucket for a freshly assigned acuity.
    fn complaint(&mut self, level: TriageLevel) -> Complaint;
}

/// The provider as seen by the engine: same calls, with every duration
/// validated at this boundary.
#[derive(Resource)]
pub struct Sampler(pub Box<dyn DurationSampler>);

impl Sampler {
    fn checked(value: f64, quantity: &'static str) -> Result<f64, SimulationError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(SimulationError::InvalidDuration { quantity, value })
        }
    }

    pub fn interarrival(
        &mut self,
        clock_min: f64,
        mode: ArrivalMode,
    ) -> Result<f64, SimulationError> {
        Self::checked(self.0.interarrival(clock_min, mode), "interarrival")
    }

    pub fn triage_duration(&mut self, patient: &Patient) -> Result<f64, SimulationError> {
        Self::checked(self.0.triage_duration(patient), "triage")
    }

    pub fn workup_duration(&mut self, patient: &Patient) -> Result<f64, SimulationError> {
        Self::checked(self.0.workup_duration(patient), "workup")
    }

    pub fn procedure_duration(&mut self, patient: &Patient) -> Result<f64, SimulationError> {
        Self::checked(self.0.procedure_duration(patient), "procedure")
    }

    pub fn ambulance_travel_time(&mut self) -> Result<f64, SimulationError> {
        Self::checked(self.0.ambulance_travel_time(), "ambulance travel")
    }

    pub fn diverted_travel_time(&mut self) -> Result<f64, SimulationError> {
        Self::checked(self.0.diverted_travel_time(), "diverted travel")
    }

    pub fn triage_level_for_ambulance(&mut self) -> TriageLevel {
        self.0.triage_level_for_ambulance()
    }

    pub fn triage_level_for_walk_in(&mut self) -> TriageLevel {
        self.0.triage_level_for_walk_in()
    }

    pub fn complaint(&mut self, level: TriageLevel) -> Complaint {
        self.0.complaint(level)
    }
}

/// Seeded default provider: hour-banded Poisson arrivals over a 24h cycle,
/// uniform/triangular service tables keyed by acuity and complaint.
#[derive(Debug)]
pub struct ClinicalDurationModel {
    rng: StdRng,
}

impl ClinicalDurationModel {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Arrivals per hour for the band the clock falls in. Quiet overnight,
    /// building through the day for walk-ins; ambulances run the opposite
    /// cycle.
    fn hourly_rate(clock_min: f64, mode: ArrivalMode) -> f64 {
        let hour = (clock_min % MINUTES_PER_DAY) / 60.0;
        let walk_in = mode == ArrivalMode::WalkIn;
        if (0.0..=7.0).contains(&hour) || hour == 23.0 {
            if walk_in {
                6.0
            } else {
                14.0
            }
        } else if (7.0..=11.0).contains(&hour) {
            if walk_in {
                9.0
            } else {
                10.0
            }
        } else if (12.0..=17.0).contains(&hour) {
            if walk_in {
                15.0
            } else {
                10.0
            }
        } else if walk_in {
            18.0
        } else {
            12.0
        }
    }

    fn exponential(&mut self, rate_per_min: f64) -> f64 {
        // -ln(1-U)/lambda, U uniform in [0,1)
        let u: f64 = self.rng.gen();
        -(1.0 - u).ln() / rate_per_min
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.rng.gen_range(min..max)
    }

    /// Inverse-CDF triangular sample on [min, max] with the given mode.
    fn triangular(&mut self, min: f64, mode: f64, max: f64) -> f64 {
        let u: f64 = self.rng.gen();
        let cut = (mode - min) / (max - min);
        if u < cut {
            min + ((max - min) * (mode - min) * u).sqrt()
        } else {
            max - ((max - min) * (max - mode) * (1.0 - u)).sqrt()
        }
    }
}

impl DurationSampler for ClinicalDurationModel {
    fn interarrival(&mut self, clock_min: f64, mode: ArrivalMode) -> f64 {
        let per_hour = Self::hourly_rate(clock_min, mode);
        self.exponential(per_hour / 60.0)
    }

    fn triage_duration(&mut self, patient: &Patient) -> f64 {
        // Urgent presentations get expedited triage.
        if patient.acuity == Some(TriageLevel::Urgent) {
            self.uniform(0.75, 2.25)
        } else {
            self.uniform(7.5, 11.25)
        }
    }

    fn workup_duration(&mut self, patient: &Patient) -> f64 {
        let complaint = patient.complaint.unwrap_or(Complaint::Primary);
        match patient.acuity {
            Some(TriageLevel::Resuscitation) => match complaint {
                Complaint::Primary => self.uniform(5.0, 12.0),
                Complaint::Secondary => self.uniform(2.0, 5.0),
            },
            Some(TriageLevel::Emergent) => match complaint {
                Complaint::Primary => self.uniform(5.0, 15.0),
                Complaint::Secondary => 2.0,
            },
            Some(TriageLevel::Urgent) => self.uniform(5.0, 10.0),
            Some(TriageLevel::LessUrgent) => 2.0,
            _ => self.uniform(5.0, 10.0),
        }
    }

    fn procedure_duration(&mut self, patient: &Patient) -> f64 {
        let complaint = patient.complaint.unwrap_or(Complaint::Primary);
        let r1: f64 = self.rng.gen();
        let r2: f64 = self.rng.gen();
        let mut total = 0.0;

        match patient.acuity {
            Some(TriageLevel::Resuscitation) => match complaint {
                Complaint::Primary => {
                    if r1 <= 0.9 {
                        total += self.uniform(3.0, 5.0); // x-ray
                    }
                    if r2 <= 0.8 {
                        total += self.triangular(10.0, 25.0, 50.0); // surgery
                    }
                }
                Complaint::Secondary => {
                    if r1 <= 0.95 {
                        total += self.uniform(7.0, 10.0); // ECG
                    }
                    if r2 <= 0.6 {
                        total += self.triangular(30.0, 45.0, 90.0); // surgery
                    }
                }
            },
            Some(TriageLevel::Emergent) => match complaint {
                Complaint::Primary => {
                    if r1 <= 0.9 {
                        total += self.uniform(10.0, 25.0); // CT scan
                    }
                    if r2 <= 0.8 {
                        total += self.uniform(2.0, 5.0); // medication
                    }
                }
                Complaint::Secondary => {
                    if r1 <= 0.9 {
                        total += self.uniform(5.0, 10.0); // oxygen
                    }
                    if r2 <= 0.7 {
                        total += self.uniform(2.0, 3.0); // nebulizer
                    }
                }
            },
            Some(TriageLevel::Urgent) => {
                if r1 <= 0.8 {
                    total += self.uniform(3.0, 5.0); // x-ray
                }
                if r2 <= 0.7 {
                    total += self.uniform(5.0, 15.0); // cast/splint
                }
            }
            Some(TriageLevel::LessUrgent) => match complaint {
                Complaint::Primary => {
                    if r1 <= 0.75 {
                        total += self.triangular(10.0, 15.0, 25.0); // stitches
                    }
                    if r2 <= 0.3 {
                        total += self.uniform(2.0, 5.0); // tetanus shot
                    }
                }
                Complaint::Secondary => {
                    if r1 <= 0.6 {
                        total += self.uniform(2.0, 3.0); // nebulizer
                    }
                    if r2 <= 0.3 {
                        total += self.uniform(5.0, 10.0); // oxygen
                    }
                }
            },
            _ => {
                if r1 <= 0.9 {
                    total += self.uniform(2.0, 5.0); // medication
                }
            }
        }
        total
    }

    fn ambulance_travel_time(&mut self) -> f64 {
        let leg = self.triangular(5.0, 10.0, 20.0);
        let on_scene = self.uniform(4.0, 10.0);
        leg * 2.0 + on_scene
    }

    fn diverted_travel_time(&mut self) -> f64 {
        let leg = self.triangular(5.0, 10.0, 20.0);
        let on_scene = self.uniform(4.0, 10.0);
        let detour = self.triangular(10.0, 15.0, 25.0);
        leg + on_scene + detour
    }

    fn triage_level_for_ambulance(&mut self) -> TriageLevel {
        let r: f64 = self.rng.gen();
        if r <= 0.2 {
            TriageLevel::Resuscitation
        } else if r <= 0.55 {
            TriageLevel::Emergent
        } else if r <= 0.85 {
            TriageLevel::Urgent
        } else {
            TriageLevel::LessUrgent
        }
    }

    fn triage_level_for_walk_in(&mut self) -> TriageLevel {
        let r: f64 = self.rng.gen();
        if r <= 0.33333 {
            TriageLevel::Urgent
        } else if r <= 0.66667 {
            TriageLevel::LessUrgent
        } else {
            TriageLevel::NonUrgent
        }
    }

    fn complaint(&mut self, level: TriageLevel) -> Complaint {
        match level {
            TriageLevel::Resuscitation | TriageLevel::Emergent | TriageLevel::LessUrgent => {
                if self.rng.gen::<f64>() <= 0.5 {
                    Complaint::Primary
                } else {
                    Complaint::Secondary
                }
            }
            TriageLevel::Urgent | TriageLevel::NonUrgent => Complaint::Primary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(level: TriageLevel, complaint: Complaint) -> Patient {
        Patient {
            arrival: ArrivalMode::Ambulance,
            acuity: Some(level),
            complaint: Some(complaint),
            zone: None,
        }
    }

    #[test]
    fn triage_durations_stay_in_their_bands() {
        let mut model = ClinicalDurationModel::new(7);
        for _ in 0..200 {
            let fast = model.triage_duration(&patient(TriageLevel::Urgent, Complaint::Primary));
            assert!((0.75..2.25).contains(&fast));
            let slow = model.triage_duration(&patient(TriageLevel::NonUrgent, Complaint::Primary));
            assert!((7.5..11.25).contains(&slow));
        }
    }

    #[test]
    fn interarrival_times_are_positive_and_finite() {
        let mut model = ClinicalDurationModel::new(11);
        for step in 0..2000 {
            let clock = step as f64 * 1.7;
            for mode in [ArrivalMode::WalkIn, ArrivalMode::Ambulance] {
                let gap = model.interarrival(clock, mode);
                assert!(gap.is_finite() && gap >= 0.0, "bad gap {gap} at {clock}");
            }
        }
    }

    #[test]
    fn ambulance_acuity_mix_reaches_all_four_levels() {
        let mut model = ClinicalDurationModel::new(3);
        let mut counts = [0usize; 4];
        for _ in 0..10_000 {
            let slot = match model.triage_level_for_ambulance() {
                TriageLevel::Resuscitation => 0,
                TriageLevel::Emergent => 1,
                TriageLevel::Urgent => 2,
                TriageLevel::LessUrgent => 3,
                TriageLevel::NonUrgent => panic!("ambulances never convey level 5"),
            };
            counts[slot] += 1;
        }
        for (slot, count) in counts.iter().enumerate() {
            assert!(*count > 0, "level slot {slot} never drawn");
        }
        // Rough mix check: 20/35/30/15.
        assert!((counts[0] as f64 / 10_000.0 - 0.20).abs() < 0.03);
        assert!((counts[3] as f64 / 10_000.0 - 0.15).abs() < 0.03);
    }

    #[test]
    fn walk_ins_draw_only_levels_three_to_five() {
        let mut model = ClinicalDurationModel::new(5);
        for _ in 0..5000 {
            let level = model.triage_level_for_walk_in();
            assert!(matches!(
                level,
                TriageLevel::Urgent | TriageLevel::LessUrgent | TriageLevel::NonUrgent
            ));
        }
    }

    #[test]
    fn urgent_complaints_never_branch() {
        let mut model = ClinicalDurationModel::new(13);
        for _ in 0..100 {
            assert_eq!(model.complaint(TriageLevel::Urgent), Complaint::Primary);
            assert_eq!(model.complaint(TriageLevel::NonUrgent), Complaint::Primary);
        }
    }

    #[test]
    fn procedure_durations_are_non_negative() {
        let mut model = ClinicalDurationModel::new(17);
        for level in [
            TriageLevel::Resuscitation,
            TriageLevel::Emergent,
            TriageLevel::Urgent,
            TriageLevel::LessUrgent,
            TriageLevel::NonUrgent,
        ] {
            for complaint in [Complaint::Primary, Complaint::Secondary] {
                for _ in 0..100 {
                    let d = model.procedure_duration(&patient(level, complaint));
                    assert!(d >= 0.0 && d.is_finite());
                }
            }
        }
    }

    #[test]
    fn sampler_boundary_rejects_invalid_durations() {
        struct Broken;
        impl DurationSampler for Broken {
            fn interarrival(&mut self, _: f64, _: ArrivalMode) -> f64 {
                -1.0
            }
            fn triage_duration(&mut self, _: &Patient) -> f64 {
                f64::NAN
            }
            fn workup_duration(&mut self, _: &Patient) -> f64 {
                f64::INFINITY
            }
            fn procedure_duration(&mut self, _: &Patient) -> f64 {
                1.0
            }
            fn ambulance_travel_time(&mut self) -> f64 {
                1.0
            }
            fn diverted_travel_time(&mut self) -> f64 {
                1.0
            }
            fn triage_level_for_ambulance(&mut self) -> TriageLevel {
                TriageLevel::Emergent
            }
            fn triage_level_for_walk_in(&mut self) -> TriageLevel {
                TriageLevel::Urgent
            }
            fn complaint(&mut self, _: TriageLevel) -> Complaint {
                Complaint::Primary
            }
        }

        let mut sampler = Sampler(Box::new(Broken));
        let p = patient(TriageLevel::Urgent, Complaint::Primary);
        assert!(sampler.interarrival(0.0, ArrivalMode::WalkIn).is_err());
        assert!(sampler.triage_duration(&p).is_err());
        assert!(sampler.workup_duration(&p).is_err());
        assert!(sampler.procedure_duration(&p).is_ok());
    }

    #[test]
    fn triangular_samples_stay_in_range() {
        let mut model = ClinicalDurationModel::new(23);
        for _ in 0..1000 {
            let t = model.triangular(10.0, 15.0, 25.0);
            assert!((10.0..=25.0).contains(&t));
        }
    }
}
