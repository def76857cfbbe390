//! Core state types for the breakup animation.
//!
//! Defines the particle species and the simulation metadata attached to
//! every moving scene object:
//! - `ParticleKind` nucleons, light composite nuclei and the heavy target
//! - `Body`         a scene handle plus charge, mass and velocity
//! - `Target`       the application-owned target nucleus
//!
//! Positions are not stored here, they live on the scene visual.

use nalgebra::Vector3;
use serde::Deserialize;

use crate::simulation::scene::VisualId;

pub type NVec3 = Vector3<f64>;

/// Nuclear species known to the animation
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ParticleKind {
    Proton,
    Neutron,
    Deuteron,
    Triton,
    #[serde(alias = "he3")]
    Helium3,
    Alpha,
    #[serde(alias = "li6")]
    Lithium6,
    #[serde(alias = "li7")]
    Lithium7,
    Target,
}

impl ParticleKind {
    /// Projectile species in the order the viewer cycles through them
    pub const PROJECTILES: [ParticleKind; 6] = [
        ParticleKind::Deuteron,
        ParticleKind::Triton,
        ParticleKind::Helium3,
        ParticleKind::Alpha,
        ParticleKind::Lithium6,
        ParticleKind::Lithium7,
    ];

    /// (protons, neutrons) of a light species, `None` for the target
    pub fn nucleons(self) -> Option<(u32, u32)> {
        match self {
            ParticleKind::Proton => Some((1, 0)),
            ParticleKind::Neutron => Some((0, 1)),
            ParticleKind::Deuteron => Some((1, 1)),
            ParticleKind::Triton => Some((1, 2)),
            ParticleKind::Helium3 => Some((2, 1)),
            ParticleKind::Alpha => Some((2, 2)),
            ParticleKind::Lithium6 => Some((3, 3)),
            ParticleKind::Lithium7 => Some((3, 4)),
            ParticleKind::Target => None,
        }
    }

    /// Electric charge in units of e
    pub fn charge(self) -> f64 {
        self.nucleons().map(|(z, _)| z as f64).unwrap_or(0.0)
    }

    /// Mass in nucleon units
    pub fn mass(self) -> f64 {
        self.nucleons().map(|(z, n)| (z + n) as f64).unwrap_or(0.0)
    }

    pub fn is_nucleon(self) -> bool {
        matches!(self, ParticleKind::Proton | ParticleKind::Neutron)
    }

    pub fn label(self) -> &'static str {
        match self {
            ParticleKind::Proton => "p",
            ParticleKind::Neutron => "n",
            ParticleKind::Deuteron => "d",
            ParticleKind::Triton => "t",
            ParticleKind::Helium3 => "3He",
            ParticleKind::Alpha => "alpha",
            ParticleKind::Lithium6 => "6Li",
            ParticleKind::Lithium7 => "7Li",
            ParticleKind::Target => "target",
        }
    }
}

/// A moving nucleus in the scene
#[derive(Debug, Clone)]
pub struct Body {
    pub visual: VisualId, // scene handle
    pub kind: ParticleKind, // species
    pub charge: f64, // charge in units of e
    pub mass: f64, // mass in nucleon units
    pub velocity: NVec3, // scene units per second
}

/// The heavy target nucleus; owned by the application, borrowed by animations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub visual: VisualId, // scene handle
    pub charge: f64, // Z
    pub mass: f64, // A
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_charge_and_mass() {
        assert_eq!(ParticleKind::Deuteron.charge(), 1.0);
        assert_eq!(ParticleKind::Lithium7.mass(), 7.0);
        assert_eq!(ParticleKind::Neutron.charge(), 0.0);
        assert!(ParticleKind::Proton.is_nucleon());
        assert!(!ParticleKind::Alpha.is_nucleon());
    }

    #[test]
    fn species_parse_from_yaml_names() {
        let k: ParticleKind = serde_yaml::from_str("lithium6").unwrap();
        assert_eq!(k, ParticleKind::Lithium6);
        let k: ParticleKind = serde_yaml::from_str("he3").unwrap();
        assert_eq!(k, ParticleKind::Helium3);
    }
}
