//! Build fully-initialized animation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - tuning constants (`Parameters`)
//! - the animator with its in-memory scene
//! - the target nucleus, already placed in the scene
//!
//! The viewer inserts the scenario into Bevy as a `Resource`; the headless
//! runner drives it directly.

use bevy::prelude::Resource;
use tracing::info;

use crate::configuration::config::ScenarioConfig;
use crate::error::ConfigError;
use crate::simulation::animation::Phase;
use crate::simulation::animator::{Animator, TickOutcome, REFERENCE_DELTA};
use crate::simulation::engine::Engine;
use crate::simulation::factory;
use crate::simulation::params::Parameters;
use crate::simulation::species::breakup_of;
use crate::simulation::states::{NVec3, Target};

const DEFAULT_MAX_TICKS: usize = 5000;

/// Runtime bundle constructed from a [`ScenarioConfig`]
#[derive(Resource)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub animator: Animator,
    pub target: Target,
}

/// What a headless run went through
#[derive(Debug, Clone)]
pub struct RunReport {
    pub ticks: usize,
    pub phases: Vec<Phase>, // distinct phases in the order they were seen
    pub outcome: TickOutcome,
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        // Parameters (runtime) from defaults plus ParametersConfig overrides
        let p_cfg = cfg.parameters;
        let d = Parameters::default();
        let parameters = Parameters {
            seed: p_cfg.seed.unwrap_or(d.seed),
            start_offset: positive("start_offset", p_cfg.start_offset.unwrap_or(d.start_offset))?,
            projectile_speed: positive("projectile_speed", p_cfg.projectile_speed.unwrap_or(d.projectile_speed))?,
            coulomb_strength: p_cfg.coulomb_strength.unwrap_or(d.coulomb_strength),
            interaction_radius: positive("interaction_radius", p_cfg.interaction_radius.unwrap_or(d.interaction_radius))?,
            elastic_breakup_distance: positive(
                "elastic_breakup_distance",
                p_cfg.elastic_breakup_distance.unwrap_or(d.elastic_breakup_distance),
            )?,
            nonelastic_breakup_distance: positive(
                "nonelastic_breakup_distance",
                p_cfg.nonelastic_breakup_distance.unwrap_or(d.nonelastic_breakup_distance),
            )?,
            inelastic_excitation_distance: positive(
                "inelastic_excitation_distance",
                p_cfg.inelastic_excitation_distance.unwrap_or(d.inelastic_excitation_distance),
            )?,
            escape_distance: positive("escape_distance", p_cfg.escape_distance.unwrap_or(d.escape_distance))?,
            capture_radius: positive("capture_radius", p_cfg.capture_radius.unwrap_or(d.capture_radius))?,
            absorption_speed: positive("absorption_speed", p_cfg.absorption_speed.unwrap_or(d.absorption_speed))?,
            escape_speed: positive("escape_speed", p_cfg.escape_speed.unwrap_or(d.escape_speed))?,
            max_resonance_time: positive("max_resonance_time", p_cfg.max_resonance_time.unwrap_or(d.max_resonance_time))?,
            trail_length: p_cfg.trail_length.unwrap_or(d.trail_length).max(1),
            legacy_absorption_phase: p_cfg.legacy_absorption_phase.unwrap_or(d.legacy_absorption_phase),
        };
        if !parameters.coulomb_strength.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "coulomb_strength",
                value: parameters.coulomb_strength,
            });
        }

        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        breakup_of(e_cfg.projectile)?;
        if !e_cfg.impact_parameter.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "impact_parameter",
                value: e_cfg.impact_parameter,
            });
        }
        if !(e_cfg.speed.is_finite() && e_cfg.speed >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "speed",
                value: e_cfg.speed,
            });
        }
        let engine = Engine {
            viewer: e_cfg.viewer,
            reaction: e_cfg.reaction,
            projectile: e_cfg.projectile,
            impact_parameter: e_cfg.impact_parameter,
            speed: e_cfg.speed,
            trails: e_cfg.trails,
            delta: positive("delta", e_cfg.delta.unwrap_or(REFERENCE_DELTA))?,
            max_ticks: e_cfg.max_ticks.unwrap_or(DEFAULT_MAX_TICKS),
        };

        // Animator with the target already in its scene
        let mut animator = Animator::with_memory_scene(parameters.clone());
        animator.set_speed(engine.speed);
        animator.set_trails_enabled(engine.trails);
        let target = factory::create_target(
            animator.scene_mut(),
            NVec3::zeros(),
            positive("target.charge", cfg.target.charge)?,
            positive("target.mass", cfg.target.mass)?,
        );

        Ok(Self {
            engine,
            parameters,
            animator,
            target,
        })
    }

    /// Spawn a fresh projectile and play the configured reaction
    pub fn start(&mut self) -> Result<(), ConfigError> {
        let projectile = factory::create_nucleus(self.animator.scene_mut(), self.engine.projectile, NVec3::zeros());
        let animation = self.animator.create_breakup(
            self.engine.reaction,
            projectile,
            self.target,
            self.engine.impact_parameter,
        )?;
        self.animator.play(animation);
        Ok(())
    }

    /// Play the configured reaction with the fixed delta until it finishes
    pub fn run_headless(&mut self) -> Result<RunReport, ConfigError> {
        self.start()?;
        let mut phases = vec![Phase::Approach];
        let mut outcome = TickOutcome::Idle;
        let mut ticks = 0;

        while ticks < self.engine.max_ticks {
            outcome = self.animator.update(self.engine.delta);
            ticks += 1;
            if let Some(phase) = self.animator.current().map(|a| a.phase) {
                if phases.last() != Some(&phase) {
                    phases.push(phase);
                }
            }
            if outcome.is_finished() {
                break;
            }
        }

        info!(ticks, ?outcome, ?phases, "headless run finished");
        Ok(RunReport { ticks, phases, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::scene::Scene;

    fn cfg(yaml: &str) -> ScenarioConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn rejects_nucleon_projectile() {
        let c = cfg("
engine:
  reaction: elastic
  projectile: proton
  impact_parameter: 3.0
");
        assert!(matches!(Scenario::build_scenario(c), Err(ConfigError::NotAProjectile(_))));
    }

    #[test]
    fn rejects_non_positive_delta() {
        let c = cfg("
engine:
  reaction: elastic
  projectile: deuteron
  impact_parameter: 3.0
  delta: 0.0
");
        assert!(matches!(
            Scenario::build_scenario(c),
            Err(ConfigError::InvalidValue { field: "delta", .. })
        ));
    }

    #[test]
    fn target_is_in_the_scene_after_build() {
        let c = cfg("
engine:
  reaction: inelastic
  projectile: alpha
  impact_parameter: 2.0
  speed: 2.0
  trails: false
");
        let s = Scenario::build_scenario(c).unwrap();
        assert!(s.animator.scene().contains(s.target.visual));
        assert_eq!(s.animator.speed(), 2.0);
        assert!(!s.animator.trails_enabled());
        assert_eq!(s.engine.delta, REFERENCE_DELTA);
    }
}
