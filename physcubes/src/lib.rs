pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;
pub mod error;

pub use simulation::states::{PhysState, PhysDeriv, NVec3, NQuat, MIN_MASS};
pub use simulation::forces::{ForceSet, ForceTerm, CentralPull, UniformForce, Spring};
pub use simulation::integrator::{evaluate, evaluate_from, integrate};
pub use simulation::interpolation::interpolate;
pub use simulation::engine::{Engine, TimeSource, InstantClock, ManualClock};
pub use simulation::bounds::Aabb;
pub use simulation::entity::{PhysBox, BoxKind, Pose};
pub use simulation::world::{PhysWorld, BoxHandle, WorldCommand, CollisionObserver};
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, EngineConfig, ForceConfig, BoxConfig, ClampMode};

pub use error::ConfigError;

pub use visualization::{viewer::run_3d, headless::run_headless};

pub use benchmark::benchmark::{bench_integrate, bench_collisions};
