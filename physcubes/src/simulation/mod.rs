pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod interpolation;
pub mod bounds;
pub mod entity;
pub mod world;
pub mod scenario;
