//! High-level runtime engine settings
//!
//! Selects the reaction, projectile species and playback options
//! used when building and running a `Scenario`

use crate::simulation::animation::AnimationKind;
use crate::simulation::states::ParticleKind;

#[derive(Debug, Clone)]
pub struct Engine {
    pub viewer: bool, // false = headless, true = bevy window
    pub reaction: AnimationKind, // elastic, nonelastic or inelastic
    pub projectile: ParticleKind, // projectile species
    pub impact_parameter: f64, // starting height above the target
    pub speed: f64, // speed multiplier
    pub trails: bool, // trail updates on/off
    pub delta: f64, // fixed tick length in seconds
    pub max_ticks: usize, // headless safety limit
}
