pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Body, Target, ParticleKind, NVec3};
pub use simulation::scene::{Scene, MemoryScene, Visual, VisualId, Part, Shape, Rgb};
pub use simulation::effects::{Effect, EffectKind, Trail};
pub use simulation::animation::{Animation, AnimationKind, Phase};
pub use simulation::animator::{Animator, TickOutcome};
pub use simulation::scenario::{Scenario, RunReport};
pub use simulation::params::Parameters;

pub use configuration::config::{EngineConfig, ParametersConfig, TargetConfig, ScenarioConfig};

pub use error::{AnimationError, ConfigError};

pub use visualization::brsim_vis3d::run_3d;

pub use benchmark::benchmark::{bench_ticks, bench_speed_curve};
