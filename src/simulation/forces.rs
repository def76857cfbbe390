//! Force / acceleration contributors for the breakup animation
//!
//! Every term maps a body and its position relative to the target (the
//! field [`Source`]) to an acceleration. The constants are tuned for looks,
//! not physics.

use crate::simulation::states::{Body, NVec3};

/// Charge the Coulomb strength is calibrated for (lead)
pub const REFERENCE_CHARGE: f64 = 82.0;

/// Where the field comes from: target centre and its charge Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    pub center: NVec3,
    pub charge: f64,
}

/// Collection of acceleration terms acting on a body near the target
/// Each term implements [`Force`] and their contributions are summed
pub struct ForceSet {
    terms: Vec<Box<dyn Force + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add a force term
    pub fn with(mut self, term: impl Force + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    /// Total acceleration on `body` at `position` due to `source`
    pub fn accumulate(&self, body: &Body, position: &NVec3, source: &Source) -> NVec3 {
        let mut total = NVec3::zeros();
        for term in &self.terms {
            total += term.acceleration(body, position, source);
        }
        total
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for acceleration sources centred on the target
pub trait Force {
    fn acceleration(&self, body: &Body, position: &NVec3, source: &Source) -> NVec3;
}

/// Repulsive pseudo-Coulomb push away from the target
///
/// `a = strength * charge * (Z / 82) / d^2` along the outward direction, only inside
/// `range`. Distances below `min_distance` are clamped so a body sitting on
/// the centre does not blow up.
pub struct CoulombRepulsion {
    pub strength: f64,
    pub range: f64,
    pub min_distance: f64,
}

impl CoulombRepulsion {
    pub fn new(strength: f64, range: f64) -> Self {
        Self {
            strength,
            range,
            min_distance: 0.5,
        }
    }
}

impl Force for CoulombRepulsion {
    fn acceleration(&self, body: &Body, position: &NVec3, source: &Source) -> NVec3 {
        if body.charge == 0.0 || source.charge == 0.0 {
            return NVec3::zeros();
        }
        let r = position - source.center;
        let d = r.norm();
        if d >= self.range || d == 0.0 {
            return NVec3::zeros();
        }
        let d_soft = d.max(self.min_distance);
        // outward unit vector scaled by k q Z' / d^2
        let k = self.strength * body.charge * source.charge / REFERENCE_CHARGE;
        (r / d) * (k / (d_soft * d_soft))
    }
}

/// Constant-speed velocity pointing from `position` to `center`
pub fn steer_toward(position: &NVec3, center: &NVec3, speed: f64) -> NVec3 {
    let r = center - position;
    let d = r.norm();
    if d == 0.0 {
        return NVec3::zeros();
    }
    r * (speed / d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::scene::VisualId;
    use crate::simulation::states::ParticleKind;

    fn lead() -> Source {
        Source {
            center: NVec3::zeros(),
            charge: REFERENCE_CHARGE,
        }
    }

    fn body(kind: ParticleKind) -> Body {
        Body {
            visual: VisualId(0),
            kind,
            charge: kind.charge(),
            mass: kind.mass(),
            velocity: NVec3::zeros(),
        }
    }

    #[test]
    fn repulsion_points_away_from_target() {
        let f = CoulombRepulsion::new(2.0, 8.0);
        let a = f.acceleration(&body(ParticleKind::Proton), &NVec3::new(-3.0, 1.0, 0.0), &lead());
        assert!(a.x < 0.0 && a.y > 0.0, "acceleration not outward: {:?}", a);
    }

    #[test]
    fn repulsion_inverse_square() {
        let f = CoulombRepulsion::new(2.0, 8.0);
        let p = body(ParticleKind::Proton);
        let a1 = f.acceleration(&p, &NVec3::new(2.0, 0.0, 0.0), &lead()).norm();
        let a2 = f.acceleration(&p, &NVec3::new(4.0, 0.0, 0.0), &lead()).norm();
        assert!((a1 / a2 - 4.0).abs() < 1e-9, "expected 4x, got {}", a1 / a2);
    }

    #[test]
    fn neutral_and_out_of_range_feel_nothing() {
        let f = CoulombRepulsion::new(2.0, 8.0);
        let n = f.acceleration(&body(ParticleKind::Neutron), &NVec3::new(2.0, 0.0, 0.0), &lead());
        let far = f.acceleration(&body(ParticleKind::Proton), &NVec3::new(9.0, 0.0, 0.0), &lead());
        assert_eq!(n, NVec3::zeros());
        assert_eq!(far, NVec3::zeros());
    }

    #[test]
    fn repulsion_scales_with_target_charge() {
        let f = CoulombRepulsion::new(2.0, 8.0);
        let p = body(ParticleKind::Alpha);
        let x = NVec3::new(-3.0, 0.5, 0.0);
        let tin = Source { charge: 50.0, ..lead() };
        let a_lead = f.acceleration(&p, &x, &lead()).norm();
        let a_tin = f.acceleration(&p, &x, &tin).norm();
        assert!((a_tin / a_lead - 50.0 / 82.0).abs() < 1e-12);
        let bare = Source { charge: 0.0, ..lead() };
        assert_eq!(f.acceleration(&p, &x, &bare), NVec3::zeros());
    }

    #[test]
    fn steering_has_constant_speed() {
        let v = steer_toward(&NVec3::new(3.0, 4.0, 0.0), &NVec3::zeros(), 4.0);
        assert!((v.norm() - 4.0).abs() < 1e-12);
        assert!(v.x < 0.0 && v.y < 0.0);
    }
}
