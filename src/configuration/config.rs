//! Configuration types for loading animation scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`]     – reaction, projectile, playback options
//! - [`ParametersConfig`] – optional overrides of the tuning constants
//! - [`TargetConfig`]     – charge and mass of the target nucleus
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   viewer: true              # false -> headless run
//!   reaction: nonelastic      # elastic | nonelastic | inelastic
//!   projectile: deuteron      # deuteron, triton, helium3, alpha, lithium6, lithium7
//!   impact_parameter: 1.5
//!   speed: 1.0
//!   trails: true
//!   delta: 0.016              # fixed tick length in seconds
//!   max_ticks: 5000           # headless safety limit
//!
//! parameters:                 # every key optional
//!   seed: 7
//!   max_resonance_time: 2.5
//!
//! target:
//!   charge: 82
//!   mass: 208
//! ```
//!
//! `Scenario::build_scenario` validates this and maps it onto the runtime
//! `Engine` and `Parameters` types.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::simulation::animation::AnimationKind;
use crate::simulation::states::ParticleKind;

/// Playback and reaction selection
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_true")]
    pub viewer: bool, // `false` - headless run, `true` - bevy window
    pub reaction: AnimationKind, // which breakup to animate
    pub projectile: ParticleKind, // projectile species
    pub impact_parameter: f64, // start height above the target
    #[serde(default = "default_speed")]
    pub speed: f64, // speed multiplier
    #[serde(default = "default_true")]
    pub trails: bool, // draw particle trails
    pub delta: Option<f64>, // fixed tick in seconds, 0.016 when unset
    pub max_ticks: Option<usize>, // headless cut-off
}

fn default_true() -> bool {
    true
}

fn default_speed() -> f64 {
    1.0
}

/// Overrides for the animation tuning constants; unset keys keep their defaults
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ParametersConfig {
    pub seed: Option<u64>,
    pub start_offset: Option<f64>,
    pub projectile_speed: Option<f64>,
    pub coulomb_strength: Option<f64>,
    pub interaction_radius: Option<f64>,
    pub elastic_breakup_distance: Option<f64>,
    pub nonelastic_breakup_distance: Option<f64>,
    pub inelastic_excitation_distance: Option<f64>,
    pub escape_distance: Option<f64>,
    pub capture_radius: Option<f64>,
    pub absorption_speed: Option<f64>,
    pub escape_speed: Option<f64>,
    pub max_resonance_time: Option<f64>,
    pub trail_length: Option<usize>,
    pub legacy_absorption_phase: Option<bool>,
}

/// Target nucleus, lead-208 unless configured
#[derive(Deserialize, Debug, Clone)]
pub struct TargetConfig {
    pub charge: f64, // Z
    pub mass: f64, // A
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            charge: 82.0,
            mass: 208.0,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // reaction and playback
    #[serde(default)]
    pub parameters: ParametersConfig, // tuning overrides
    #[serde(default)]
    pub target: TargetConfig, // target nucleus
}

impl ScenarioConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Read a scenario file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scenario_fills_defaults() {
        let yaml = "
engine:
  reaction: elastic
  projectile: deuteron
  impact_parameter: 3.0
";
        let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.engine.viewer);
        assert!(cfg.engine.trails);
        assert_eq!(cfg.engine.speed, 1.0);
        assert_eq!(cfg.engine.reaction, AnimationKind::Elastic);
        assert!(cfg.parameters.seed.is_none());
        assert_eq!(cfg.target.mass, 208.0);
    }

    #[test]
    fn parameter_overrides_are_read() {
        let yaml = "
engine:
  viewer: false
  reaction: nonelastic
  projectile: lithium7
  impact_parameter: 1.5
  delta: 0.02
parameters:
  seed: 9
  legacy_absorption_phase: true
target:
  charge: 50
  mass: 120
";
        let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.engine.projectile, ParticleKind::Lithium7);
        assert_eq!(cfg.engine.delta, Some(0.02));
        assert_eq!(cfg.parameters.seed, Some(9));
        assert_eq!(cfg.parameters.legacy_absorption_phase, Some(true));
        assert_eq!(cfg.target.charge, 50.0);
    }

    #[test]
    fn load_reports_io_and_yaml_errors() {
        let missing = ScenarioConfig::load(Path::new("no/such/scenario.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));

        let broken = ScenarioConfig::from_reader("engine: [elastic".as_bytes());
        assert!(matches!(broken, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn bundled_default_scenario_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join("test_file.yaml");
        let cfg = ScenarioConfig::load(&path).unwrap();
        assert_eq!(cfg.engine.projectile, ParticleKind::Deuteron);
    }

    #[test]
    fn misspelled_parameter_is_rejected() {
        let yaml = "
engine:
  reaction: elastic
  projectile: deuteron
  impact_parameter: 3.0
parameters:
  escape_distanse: 20
";
        assert!(serde_yaml::from_str::<ScenarioConfig>(yaml).is_err());
    }
}
