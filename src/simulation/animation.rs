//! Animation record, reaction kinds and phase transition table.
//!
//! One `Animation` holds every scene handle a breakup animation created.
//! Phases only move forward; [`allowed`] lists the edges for each kind.

use serde::Deserialize;

use crate::error::AnimationError;
use crate::simulation::effects::{Effect, Trail};
use crate::simulation::scene::VisualId;
use crate::simulation::species::Breakup;
use crate::simulation::states::{Body, Target};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Elastic,
    Nonelastic,
    Inelastic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Approach,
    Breakup,
    Compound,
    Decay,
    /// Older name of `Decay`, kept reachable for nonelastic animations
    Absorption,
    Escape,
    Complete,
}

/// Transition table, one row per edge
const TRANSITIONS: &[(AnimationKind, Phase, Phase)] = &[
    (AnimationKind::Elastic, Phase::Approach, Phase::Breakup),
    (AnimationKind::Elastic, Phase::Breakup, Phase::Complete),
    (AnimationKind::Elastic, Phase::Approach, Phase::Complete),
    (AnimationKind::Nonelastic, Phase::Approach, Phase::Breakup),
    (AnimationKind::Nonelastic, Phase::Breakup, Phase::Compound),
    (AnimationKind::Nonelastic, Phase::Compound, Phase::Decay),
    (AnimationKind::Nonelastic, Phase::Compound, Phase::Absorption),
    (AnimationKind::Nonelastic, Phase::Decay, Phase::Complete),
    (AnimationKind::Nonelastic, Phase::Absorption, Phase::Complete),
    (AnimationKind::Nonelastic, Phase::Approach, Phase::Complete),
    (AnimationKind::Inelastic, Phase::Approach, Phase::Escape),
    (AnimationKind::Inelastic, Phase::Escape, Phase::Complete),
];

pub fn allowed(kind: AnimationKind, from: Phase, to: Phase) -> bool {
    TRANSITIONS.iter().any(|&(k, f, t)| k == kind && f == from && t == to)
}

/// A breakup animation and every scene handle it owns
#[derive(Debug, Clone)]
pub struct Animation {
    pub kind: AnimationKind,
    pub phase: Phase,
    pub elapsed_time: f64,
    pub impact_parameter: f64,
    pub projectile: Option<Body>,
    pub target: Target,
    pub breakup: Breakup,
    pub fragments: Vec<Body>,
    pub trails: Vec<Trail>,
    pub effects: Vec<Effect>,
    pub gamma_rays: Vec<Effect>,
    pub energy_waves: Vec<Effect>,
    pub compound_nucleus: Option<Effect>,
    pub excited_target: Option<Effect>,
    pub absorbed_fragment: Option<Body>,
    pub escaping_fragment: Option<Body>,
    pub resonance_time: f64,
    pub max_resonance_time: f64,
    pub cascade_emitted: bool,
    pub target_hidden: bool,
}

impl Animation {
    pub fn new(
        kind: AnimationKind,
        projectile: Body,
        target: Target,
        breakup: Breakup,
        impact_parameter: f64,
        max_resonance_time: f64,
    ) -> Self {
        Self {
            kind,
            phase: Phase::Approach,
            elapsed_time: 0.0,
            impact_parameter,
            projectile: Some(projectile),
            target,
            breakup,
            fragments: Vec::new(),
            trails: Vec::new(),
            effects: Vec::new(),
            gamma_rays: Vec::new(),
            energy_waves: Vec::new(),
            compound_nucleus: None,
            excited_target: None,
            absorbed_fragment: None,
            escaping_fragment: None,
            resonance_time: 0.0,
            max_resonance_time,
            cascade_emitted: false,
            target_hidden: false,
        }
    }

    /// Move to `to` if the table allows it
    pub fn transition(&mut self, to: Phase) -> Result<(), AnimationError> {
        if !allowed(self.kind, self.phase, to) {
            return Err(AnimationError::IllegalTransition {
                kind: self.kind,
                from: self.phase,
                to,
            });
        }
        tracing::info!(kind = ?self.kind, from = ?self.phase, to = ?to, t = self.elapsed_time, "phase");
        self.phase = to;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn is_target_excited(&self) -> bool {
        self.excited_target.is_some()
    }

    /// Every scene handle owned by this animation (the target is not owned)
    pub fn owned_visuals(&self) -> Vec<VisualId> {
        let bodies = self
            .projectile
            .iter()
            .chain(self.fragments.iter())
            .chain(self.absorbed_fragment.iter())
            .chain(self.escaping_fragment.iter())
            .map(|b| b.visual);
        let effects = self
            .effects
            .iter()
            .chain(self.gamma_rays.iter())
            .chain(self.energy_waves.iter())
            .chain(self.compound_nucleus.iter())
            .chain(self.excited_target.iter())
            .map(|e| e.visual);
        let trails = self.trails.iter().map(|t| t.visual);
        bodies.chain(effects).chain(trails).collect()
    }

    /// Drop every handle; the caller removes them from the scene first
    pub fn clear_owned(&mut self) {
        self.projectile = None;
        self.fragments.clear();
        self.absorbed_fragment = None;
        self.escaping_fragment = None;
        self.effects.clear();
        self.gamma_rays.clear();
        self.energy_waves.clear();
        self.compound_nucleus = None;
        self.excited_target = None;
        self.trails.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_never_go_back() {
        let order = [
            Phase::Approach,
            Phase::Breakup,
            Phase::Compound,
            Phase::Decay,
            Phase::Escape,
            Phase::Complete,
        ];
        for kind in [AnimationKind::Elastic, AnimationKind::Nonelastic, AnimationKind::Inelastic] {
            for (i, from) in order.iter().enumerate() {
                for to in &order[..=i] {
                    assert!(!allowed(kind, *from, *to), "{:?}: {:?} -> {:?}", kind, from, to);
                }
            }
        }
    }

    #[test]
    fn legacy_absorption_is_a_decay_alias() {
        let k = AnimationKind::Nonelastic;
        assert!(allowed(k, Phase::Compound, Phase::Absorption));
        assert!(allowed(k, Phase::Absorption, Phase::Complete));
        assert!(!allowed(AnimationKind::Elastic, Phase::Compound, Phase::Absorption));
        assert!(!allowed(k, Phase::Decay, Phase::Absorption));
    }

    #[test]
    fn inelastic_skips_breakup_phase() {
        let k = AnimationKind::Inelastic;
        assert!(!allowed(k, Phase::Approach, Phase::Breakup));
        assert!(allowed(k, Phase::Approach, Phase::Escape));
    }
}
