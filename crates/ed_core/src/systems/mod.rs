pub mod ambulance_arrival;
pub mod ambulance_dispatch;
pub(crate) mod common;
pub mod specialist_departure;
pub mod stats_capture;
pub mod triage_departure;
pub mod walk_in_arrival;
pub mod workup_departure;
