//! Builders for every scene object the animation uses.
//!
//! Each `create_*` adds one or more visuals to the scene and returns the
//! handle(s) together with the simulation metadata the animator needs.
//! Effects start at `life = 1.0`. Only explosion sparks and gamma rays use
//! randomness, and only for their emission direction and speed.

use std::f64::consts::PI;

use rand::Rng;
use tracing::debug;

use crate::simulation::effects::{Effect, EffectKind, Trail};
use crate::simulation::scene::{Part, Rgb, Scene, Shape, Visual};
use crate::simulation::states::{Body, NVec3, ParticleKind, Target};

pub const NUCLEON_RADIUS: f64 = 0.22;

const SPARK_RADIUS: f64 = 0.08;
const SPARK_DECAY: f64 = 0.03;
const FLASH_DECAY: f64 = 0.04;
const GAMMA_DECAY: f64 = 0.02;
const GAMMA_LENGTH: f64 = 0.8;
const WAVE_GROWTH: f64 = 0.12;
const WAVE_DECAY: f64 = 0.015;
const EXCITED_DECAY: f64 = 0.01;
const PULSE_FREQUENCY: f64 = 0.3;

/// Uniformly distributed direction on the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> NVec3 {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let phi: f64 = rng.gen_range(0.0..2.0 * PI);
    let r = (1.0 - z * z).max(0.0).sqrt();
    NVec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Radius of a nucleus with `a` nucleons, r ~ A^(1/3)
pub fn nuclear_radius(a: f64) -> f64 {
    NUCLEON_RADIUS * 1.6 * a.max(1.0).cbrt()
}

/// Nucleon spheres packed around the origin, protons first
fn nucleon_cluster(protons: u32, neutrons: u32) -> Vec<Part> {
    let n = protons + neutrons;
    if n == 1 {
        let color = if protons == 1 { Rgb::PROTON } else { Rgb::NEUTRON };
        return vec![Part::new(Shape::Sphere { radius: NUCLEON_RADIUS }, color)];
    }

    // fibonacci sphere, alternating species so colors mix
    let spread = NUCLEON_RADIUS * 1.1 * (n as f64).cbrt();
    let golden = PI * (3.0 - 5f64.sqrt());
    let (mut p_left, mut n_left) = (protons, neutrons);
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            let offset = NVec3::new(r * theta.cos(), y, r * theta.sin()) * spread;
            let color = if (i % 2 == 0 && p_left > 0) || n_left == 0 {
                p_left -= 1;
                Rgb::PROTON
            } else {
                n_left -= 1;
                Rgb::NEUTRON
            };
            Part::new(Shape::Sphere { radius: NUCLEON_RADIUS }, color).at(offset)
        })
        .collect()
}

/// Nucleon or light nucleus at rest at `position`
pub fn create_nucleus<S: Scene + ?Sized>(scene: &mut S, kind: ParticleKind, position: NVec3) -> Body {
    let (z, n) = kind.nucleons().unwrap_or((0, 1));
    let visual = scene.add(Visual::new(position, nucleon_cluster(z, n)));
    Body {
        visual,
        kind,
        charge: kind.charge(),
        mass: kind.mass(),
        velocity: NVec3::zeros(),
    }
}

/// Heavy target nucleus with charge `z` and mass number `a`
pub fn create_target<S: Scene + ?Sized>(scene: &mut S, position: NVec3, z: f64, a: f64) -> Target {
    let radius = nuclear_radius(a);
    let parts = vec![
        Part::new(Shape::Sphere { radius }, Rgb::TARGET),
        Part::new(Shape::Sphere { radius: radius * 1.15 }, Rgb::TARGET).with_opacity(0.2),
    ];
    let visual = scene.add(Visual::new(position, parts));
    Target {
        visual,
        charge: z,
        mass: a,
    }
}

/// Empty trail that will follow `body`
pub fn create_trail<S: Scene + ?Sized>(scene: &mut S, body: &Body, max_len: usize) -> Trail {
    let color = if body.charge > 0.0 { Rgb::PROTON } else { Rgb::NEUTRON };
    let line = Part::new(Shape::Line { points: Vec::new() }, color).with_opacity(0.6);
    let visual = scene.add(Visual::new(NVec3::zeros(), vec![line]));
    Trail::new(visual, body.visual, max_len)
}

/// Burst of `count` sparks flying out isotropically from `position`
pub fn create_explosion<S: Scene + ?Sized, R: Rng + ?Sized>(
    scene: &mut S,
    rng: &mut R,
    position: NVec3,
    count: usize,
    color: Rgb,
) -> Vec<Effect> {
    debug!(count, "explosion");
    (0..count)
        .map(|_| {
            let speed: f64 = rng.gen_range(0.05..0.15);
            let velocity = random_unit_vector(rng) * speed;
            let part = Part::new(Shape::Sphere { radius: SPARK_RADIUS }, color);
            let visual = scene.add(Visual::new(position, vec![part]));
            Effect::new(visual, EffectKind::Explosion { velocity, life: 1.0, decay: SPARK_DECAY })
        })
        .collect()
}

/// Expanding ring with a bright core where a fragment was captured
pub fn create_absorption_flash<S: Scene + ?Sized>(scene: &mut S, position: NVec3) -> Effect {
    let parts = vec![
        Part::new(Shape::Ring { inner: 0.3, outer: 0.5 }, Rgb::FLASH),
        Part::new(Shape::Sphere { radius: 0.6 }, Rgb::WHITE),
    ];
    let visual = scene.add(Visual::new(position, parts));
    Effect::new(visual, EffectKind::AbsorptionFlash { life: 1.0, decay: FLASH_DECAY })
}

/// Gamma ray leaving `position` in a random direction
pub fn create_gamma_ray<S: Scene + ?Sized, R: Rng + ?Sized>(scene: &mut S, rng: &mut R, position: NVec3) -> Effect {
    let direction = random_unit_vector(rng);
    let speed: f64 = rng.gen_range(0.2..0.3);
    let streak = Part::new(
        Shape::Line {
            points: vec![NVec3::zeros(), -direction * GAMMA_LENGTH],
        },
        Rgb::GAMMA,
    );
    let visual = scene.add(Visual::new(position, vec![streak]));
    debug!(?direction, "gamma ray");
    Effect::new(visual, EffectKind::GammaRay { direction, speed, life: 1.0, decay: GAMMA_DECAY })
}

/// Shell expanding from `position` until it reaches `max_radius`
pub fn create_energy_wave<S: Scene + ?Sized>(scene: &mut S, position: NVec3, max_radius: f64) -> Effect {
    let ring = Part::new(Shape::Ring { inner: 0.95, outer: 1.0 }, Rgb::WAVE);
    let mut visual = Visual::new(position, vec![ring]);
    let start = 0.5;
    visual.scale = start;
    let visual = scene.add(visual);
    Effect::new(
        visual,
        EffectKind::EnergyWave {
            current_radius: start,
            max_radius,
            growth: WAVE_GROWTH,
            life: 1.0,
            decay: WAVE_DECAY,
        },
    )
}

/// Pulsating compound nucleus of radius `size`
pub fn create_compound_nucleus<S: Scene + ?Sized>(scene: &mut S, position: NVec3, size: f64) -> Effect {
    let parts = vec![
        Part::new(Shape::Sphere { radius: size * 1.05 }, Rgb::COMPOUND),
        Part::new(Shape::Sphere { radius: size * 1.4 }, Rgb::COMPOUND).with_opacity(0.35),
    ];
    let visual = scene.add(Visual::new(position, parts));
    Effect::new(visual, EffectKind::CompoundNucleus { pulse: 0.0, frequency: PULSE_FREQUENCY })
}

/// Excited target: tinted core with three oscillating shells
pub fn create_excited_target<S: Scene + ?Sized>(scene: &mut S, position: NVec3, size: f64) -> Effect {
    let mut parts = vec![Part::new(Shape::Sphere { radius: size }, Rgb::EXCITED)];
    for k in 1..=3 {
        let r = size * (1.0 + 0.3 * k as f64);
        parts.push(Part::new(Shape::Ring { inner: r - 0.05, outer: r }, Rgb::EXCITED).with_opacity(0.6));
    }
    let visual = scene.add(Visual::new(position, parts));
    Effect::new(visual, EffectKind::ExcitedTarget { life: 1.0, decay: EXCITED_DECAY, oscillation: 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::scene::MemoryScene;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn unit_vectors_are_normalised_and_cover_both_hemispheres() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut up = 0;
        for _ in 0..200 {
            let v = random_unit_vector(&mut rng);
            assert!((v.norm() - 1.0).abs() < 1e-9);
            if v.z > 0.0 {
                up += 1;
            }
        }
        assert!(up > 50 && up < 150, "skewed emission: {} of 200 up", up);
    }

    #[test]
    fn composite_has_one_sphere_per_nucleon() {
        let mut scene = MemoryScene::new();
        let li7 = create_nucleus(&mut scene, ParticleKind::Lithium7, NVec3::zeros());
        let visual = scene.get(li7.visual).unwrap();
        assert_eq!(visual.parts.len(), 7);
        let protons = visual.parts.iter().filter(|p| p.color == Rgb::PROTON).count();
        assert_eq!(protons, 3);
        assert_eq!(li7.charge, 3.0);
    }

    #[test]
    fn effects_start_alive_with_full_life() {
        let mut scene = MemoryScene::new();
        let mut rng = StdRng::seed_from_u64(1);
        let p = NVec3::zeros();
        let mut all = create_explosion(&mut scene, &mut rng, p, 5, Rgb::FLASH);
        all.push(create_absorption_flash(&mut scene, p));
        all.push(create_gamma_ray(&mut scene, &mut rng, p));
        all.push(create_energy_wave(&mut scene, p, 6.0));
        all.push(create_compound_nucleus(&mut scene, p, 2.0));
        all.push(create_excited_target(&mut scene, p, 2.0));
        assert_eq!(scene.len(), all.len());
        for e in &all {
            assert_eq!(e.life(), 1.0);
            assert!(e.is_alive());
            assert!(scene.contains(e.visual));
        }
    }
}
