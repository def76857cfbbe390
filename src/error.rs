//! Error types for brsim
//!
//! - **AnimationError**: faults raised while advancing an animation tick
//! - **ConfigError**: invalid scenario settings

use thiserror::Error;

use crate::simulation::animation::{AnimationKind, Phase};
use crate::simulation::states::ParticleKind;

/// Faults that abort the current animation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A body or the target lost its visual while still referenced
    #[error("{0} is missing from the scene")]
    MissingVisual(&'static str),

    /// Phase change not present in the transition table
    #[error("illegal {kind:?} transition {from:?} -> {to:?}")]
    IllegalTransition {
        kind: AnimationKind,
        from: Phase,
        to: Phase,
    },

    /// Position or velocity became NaN or infinite
    #[error("non-finite state on {0}")]
    NonFinite(&'static str),
}

/// Scenario and animator setup errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0:?} cannot be used as a projectile")]
    NotAProjectile(ParticleKind),

    #[error("{0} is not in the scene")]
    MissingVisual(&'static str),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
