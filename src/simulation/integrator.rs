//! Fixed-step motion update for animated bodies
//!
//! Semi-implicit Euler: kick the velocity with the summed accelerations,
//! then drift the position with the new velocity. `dt` is already scaled by
//! the animator's speed multiplier.

use super::forces::{ForceSet, Source};
use super::states::{Body, NVec3};

/// Advance `position` by `velocity` over `dt`
pub fn drift(position: &mut NVec3, velocity: &NVec3, dt: f64) {
    *position += velocity * dt;
}

/// Kick `body.velocity` with `forces` from `source`, then drift `position`
pub fn kick_drift(body: &mut Body, position: &mut NVec3, forces: &ForceSet, source: &Source, dt: f64) {
    if !forces.is_empty() {
        let a = forces.accumulate(body, position, source);
        body.velocity += a * dt;
    }
    drift(position, &body.velocity, dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::forces::{CoulombRepulsion, REFERENCE_CHARGE};
    use crate::simulation::scene::VisualId;
    use crate::simulation::states::ParticleKind;

    #[test]
    fn drift_moves_along_velocity() {
        let mut x = NVec3::new(1.0, 0.0, 0.0);
        drift(&mut x, &NVec3::new(2.0, -1.0, 0.0), 0.5);
        assert_eq!(x, NVec3::new(2.0, -0.5, 0.0));
    }

    #[test]
    fn kick_slows_an_approaching_charge() {
        let forces = ForceSet::new().with(CoulombRepulsion::new(2.0, 8.0));
        let mut b = Body {
            visual: VisualId(0),
            kind: ParticleKind::Alpha,
            charge: 2.0,
            mass: 4.0,
            velocity: NVec3::new(6.0, 0.0, 0.0),
        };
        let mut x = NVec3::new(-3.0, 0.0, 0.0);
        let lead = Source {
            center: NVec3::zeros(),
            charge: REFERENCE_CHARGE,
        };
        kick_drift(&mut b, &mut x, &forces, &lead, 0.016);
        assert!(b.velocity.x < 6.0);
        assert!(x.x > -3.0);
    }
}
