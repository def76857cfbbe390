//! Transient visual effects and particle trails.
//!
//! Every effect pairs a scene handle with an [`EffectKind`] carrying its own
//! numeric state. `Effect::update` advances one tick: it moves/fades the
//! visual, burns `decay * rate` of life and reports whether the effect is
//! still alive. Once an effect is dead, further updates are no-ops.

use std::collections::VecDeque;

use crate::simulation::scene::{Shape, Visual, VisualId};
use crate::simulation::states::NVec3;

/// Per-tick velocity damping of explosion sparks
const SPARK_DRAG: f64 = 0.96;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    /// Spark of a breakup burst; velocity is per tick
    Explosion { velocity: NVec3, life: f64, decay: f64 },
    /// Expanding ring plus flash sphere at the capture point
    AbsorptionFlash { life: f64, decay: f64 },
    /// Photon streak flying away from the target
    GammaRay { direction: NVec3, speed: f64, life: f64, decay: f64 },
    /// Expanding spherical shell
    EnergyWave { current_radius: f64, max_radius: f64, growth: f64, life: f64, decay: f64 },
    /// Pulsating compound system; lives until the animator removes it
    CompoundNucleus { pulse: f64, frequency: f64 },
    /// Target with oscillating shells; finite life
    ExcitedTarget { life: f64, decay: f64, oscillation: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub visual: VisualId,
    pub kind: EffectKind,
}

impl Effect {
    pub fn new(visual: VisualId, kind: EffectKind) -> Self {
        Self { visual, kind }
    }

    /// Remaining life in [0, 1]; the compound nucleus always reports 1
    pub fn life(&self) -> f64 {
        match self.kind {
            EffectKind::Explosion { life, .. }
            | EffectKind::AbsorptionFlash { life, .. }
            | EffectKind::GammaRay { life, .. }
            | EffectKind::EnergyWave { life, .. }
            | EffectKind::ExcitedTarget { life, .. } => life,
            EffectKind::CompoundNucleus { .. } => 1.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        match self.kind {
            EffectKind::EnergyWave { current_radius, max_radius, life, .. } => {
                life > 0.0 && current_radius < max_radius
            }
            _ => self.life() > 0.0,
        }
    }

    /// Advance one tick scaled by `rate`; returns false once the effect is dead
    pub fn update(&mut self, visual: &mut Visual, rate: f64) -> bool {
        if !self.is_alive() {
            return false;
        }

        match &mut self.kind {
            EffectKind::Explosion { velocity, life, decay } => {
                visual.position += *velocity * rate;
                *velocity *= SPARK_DRAG.powf(rate);
                *life -= *decay * rate;
                let l = life.max(0.0);
                visual.opacity = l;
                visual.scale = 0.5 + 0.5 * l;
            }
            EffectKind::AbsorptionFlash { life, decay } => {
                *life -= *decay * rate;
                let l = life.max(0.0);
                // part 0 is the ring, part 1 the flash core
                if let Some(ring) = visual.parts.get_mut(0) {
                    ring.scale = 1.0 + 3.0 * (1.0 - l);
                    ring.opacity = l;
                }
                if let Some(core) = visual.parts.get_mut(1) {
                    core.opacity = l * l;
                }
                visual.opacity = l;
            }
            EffectKind::GammaRay { direction, speed, life, decay } => {
                visual.position += *direction * (*speed * rate);
                *life -= *decay * rate;
                visual.opacity = life.max(0.0);
            }
            EffectKind::EnergyWave { current_radius, max_radius, growth, life, decay } => {
                *current_radius += *growth * rate;
                *life -= *decay * rate;
                visual.scale = *current_radius;
                let fade = (1.0 - *current_radius / *max_radius).max(0.0);
                visual.opacity = life.max(0.0) * fade;
            }
            EffectKind::CompoundNucleus { pulse, frequency } => {
                *pulse += *frequency * rate;
                visual.scale = 1.0 + 0.15 * pulse.sin();
                if let Some(glow) = visual.parts.get_mut(1) {
                    glow.opacity = 0.35 + 0.2 * (2.0 * *pulse).sin();
                }
            }
            EffectKind::ExcitedTarget { life, decay, oscillation } => {
                *oscillation += 0.25 * rate;
                *life -= *decay * rate;
                // part 0 is the core, the rest are shells
                for (i, shell) in visual.parts.iter_mut().enumerate().skip(1) {
                    shell.scale = 1.0 + 0.12 * (*oscillation * (1.0 + 0.3 * i as f64)).sin();
                    shell.opacity = 0.6 * life.max(0.0);
                }
            }
        }

        self.is_alive()
    }
}

/// Fixed-length history of positions drawn as a polyline
#[derive(Debug, Clone)]
pub struct Trail {
    pub visual: VisualId, // line visual
    pub follows: VisualId, // body being traced
    points: VecDeque<NVec3>,
    max_len: usize,
}

impl Trail {
    pub fn new(visual: VisualId, follows: VisualId, max_len: usize) -> Self {
        Self {
            visual,
            follows,
            points: VecDeque::with_capacity(max_len),
            max_len,
        }
    }

    /// Newest first
    pub fn points(&self) -> &VecDeque<NVec3> {
        &self.points
    }

    /// Record `head` and refresh the line geometry
    pub fn push(&mut self, head: NVec3, line: &mut Visual) {
        self.points.push_front(head);
        self.points.truncate(self.max_len);
        if let Some(part) = line.parts.get_mut(0) {
            part.shape = Shape::Line {
                points: self.points.iter().copied().collect(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::scene::{Part, Rgb};

    fn visual(parts: usize) -> Visual {
        let parts = (0..parts)
            .map(|_| Part::new(Shape::Sphere { radius: 1.0 }, Rgb::WHITE))
            .collect();
        Visual::new(NVec3::zeros(), parts)
    }

    #[test]
    fn explosion_fades_and_moves() {
        let mut v = visual(1);
        let mut e = Effect::new(
            VisualId(1),
            EffectKind::Explosion { velocity: NVec3::new(0.1, 0.0, 0.0), life: 1.0, decay: 0.25 },
        );
        assert!(e.update(&mut v, 1.0));
        assert!(v.position.x > 0.0);
        assert!((v.opacity - 0.75).abs() < 1e-12);
        for _ in 0..3 {
            e.update(&mut v, 1.0);
        }
        assert!(!e.is_alive());
    }

    #[test]
    fn dead_effects_do_not_mutate() {
        let kinds = vec![
            EffectKind::Explosion { velocity: NVec3::new(1.0, 1.0, 0.0), life: 0.0, decay: 0.1 },
            EffectKind::AbsorptionFlash { life: -0.1, decay: 0.1 },
            EffectKind::GammaRay { direction: NVec3::x(), speed: 1.0, life: 0.0, decay: 0.1 },
            EffectKind::EnergyWave { current_radius: 1.0, max_radius: 5.0, growth: 0.1, life: 0.0, decay: 0.1 },
            EffectKind::ExcitedTarget { life: 0.0, decay: 0.1, oscillation: 0.0 },
        ];
        for kind in kinds {
            let mut e = Effect::new(VisualId(0), kind);
            let mut v = visual(3);
            let before_visual = v.clone();
            let before_effect = e.clone();
            assert!(!e.update(&mut v, 1.0), "{:?} reported alive", e.kind);
            assert_eq!(v, before_visual);
            assert_eq!(e, before_effect);
        }
    }

    #[test]
    fn energy_wave_dies_at_max_radius() {
        let mut v = visual(1);
        let mut e = Effect::new(
            VisualId(0),
            EffectKind::EnergyWave { current_radius: 0.5, max_radius: 1.0, growth: 0.3, life: 1.0, decay: 0.01 },
        );
        assert!(e.update(&mut v, 1.0));
        assert!(!e.update(&mut v, 1.0));
        assert!(e.life() > 0.0, "wave should die on radius, not life");
        let frozen = v.clone();
        assert!(!e.update(&mut v, 1.0));
        assert_eq!(v, frozen);
    }

    #[test]
    fn compound_nucleus_pulses_forever() {
        let mut v = visual(2);
        let mut e = Effect::new(VisualId(0), EffectKind::CompoundNucleus { pulse: 0.0, frequency: 0.3 });
        for _ in 0..1000 {
            assert!(e.update(&mut v, 1.0));
        }
        assert!(v.scale >= 0.85 && v.scale <= 1.15);
    }

    #[test]
    fn zero_rate_freezes_effects() {
        let mut v = visual(1);
        let mut e = Effect::new(
            VisualId(0),
            EffectKind::GammaRay { direction: NVec3::y(), speed: 0.2, life: 1.0, decay: 0.05 },
        );
        e.update(&mut v, 0.0);
        assert_eq!(e.life(), 1.0);
        assert_eq!(v.position, NVec3::zeros());
    }

    #[test]
    fn trail_is_bounded_fifo() {
        let mut line = Visual::new(NVec3::zeros(), vec![Part::new(Shape::Line { points: vec![] }, Rgb::WHITE)]);
        let mut trail = Trail::new(VisualId(1), VisualId(2), 3);
        for i in 0..5 {
            trail.push(NVec3::new(i as f64, 0.0, 0.0), &mut line);
        }
        let xs: Vec<f64> = trail.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![4.0, 3.0, 2.0]);
        match &line.parts[0].shape {
            Shape::Line { points } => assert_eq!(points.len(), 3),
            other => panic!("unexpected shape {:?}", other),
        }
    }
}
