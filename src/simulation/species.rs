//! Projectile breakup table.
//!
//! Maps each projectile species to the fragment pair it splits into and the
//! velocity kick each fragment receives on top of the projectile velocity.
//! In nonelastic reactions the first fragment escapes and the second one is
//! absorbed by the target.

use crate::error::ConfigError;
use crate::simulation::states::{NVec3, ParticleKind};

/// One row of the breakup table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakup {
    pub first: ParticleKind,
    pub second: ParticleKind,
    pub first_kick: NVec3,
    pub second_kick: NVec3,
}

/// Offsets of the two fragments from the projectile position at breakup
pub fn fragment_offsets() -> [NVec3; 2] {
    [NVec3::new(0.0, 0.3, 0.0), NVec3::new(0.0, -0.3, 0.0)]
}

/// Look up how `projectile` breaks apart
pub fn breakup_of(projectile: ParticleKind) -> Result<Breakup, ConfigError> {
    use ParticleKind::*;

    let (first, second, spread) = match projectile {
        Deuteron => (Proton, Neutron, 1.5),
        Triton => (Deuteron, Neutron, 1.4),
        Helium3 => (Deuteron, Proton, 1.4),
        Alpha => (Triton, Proton, 1.2),
        Lithium6 => (Alpha, Deuteron, 1.0),
        Lithium7 => (Alpha, Triton, 0.9),
        other => return Err(ConfigError::NotAProjectile(other)),
    };

    // lighter fragment gets the larger transverse kick
    let (m1, m2) = (first.mass(), second.mass());
    let total = m1 + m2;
    Ok(Breakup {
        first,
        second,
        first_kick: NVec3::new(0.5, spread * 2.0 * m2 / total, 0.0),
        second_kick: NVec3::new(0.5, -spread * 2.0 * m1 / total, 0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deuteron_splits_into_proton_and_neutron() {
        let b = breakup_of(ParticleKind::Deuteron).unwrap();
        assert_eq!(b.first, ParticleKind::Proton);
        assert_eq!(b.second, ParticleKind::Neutron);
        assert!(b.first_kick.y > 0.0 && b.second_kick.y < 0.0);
    }

    #[test]
    fn fragments_conserve_nucleons() {
        for p in ParticleKind::PROJECTILES {
            let b = breakup_of(p).unwrap();
            assert_eq!(b.first.mass() + b.second.mass(), p.mass(), "{:?}", p);
            assert_eq!(b.first.charge() + b.second.charge(), p.charge(), "{:?}", p);
        }
    }

    #[test]
    fn transverse_momentum_balances() {
        for p in ParticleKind::PROJECTILES {
            let b = breakup_of(p).unwrap();
            let py = b.first.mass() * b.first_kick.y + b.second.mass() * b.second_kick.y;
            assert!(py.abs() < 1e-12, "{:?} net transverse momentum {}", p, py);
        }
    }

    #[test]
    fn nucleons_and_target_are_rejected() {
        assert!(breakup_of(ParticleKind::Proton).is_err());
        assert!(breakup_of(ParticleKind::Target).is_err());
    }
}
