pub mod clock;
pub mod ecs;
pub mod error;
pub mod queues;
pub mod resources;
pub mod runner;
pub mod sampling;
pub mod scenario;
pub mod systems;
pub mod telemetry;
