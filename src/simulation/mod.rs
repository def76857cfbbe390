pub mod states;
pub mod params;
pub mod engine;
pub mod scene;
pub mod forces;
pub mod integrator;
pub mod species;
pub mod effects;
pub mod factory;
pub mod animation;
pub mod animator;
pub mod scenario;
