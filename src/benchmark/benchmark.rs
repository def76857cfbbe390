use std::time::Instant;

use crate::simulation::animation::AnimationKind;
use crate::simulation::animator::{Animator, TickOutcome, REFERENCE_DELTA};
use crate::simulation::factory;
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, ParticleKind};

const KINDS: [AnimationKind; 3] = [AnimationKind::Elastic, AnimationKind::Nonelastic, AnimationKind::Inelastic];

/// Play one animation to the end; returns (ticks, wall time in ms, outcome)
fn run_once(kind: AnimationKind, projectile: ParticleKind, impact: f64, speed: f64) -> (usize, f64, TickOutcome) {
    let mut animator = Animator::with_memory_scene(Parameters::default());
    animator.set_speed(speed);
    let target = factory::create_target(animator.scene_mut(), NVec3::zeros(), 82.0, 208.0);
    let body = factory::create_nucleus(animator.scene_mut(), projectile, NVec3::zeros());

    let animation = match animator.create_breakup(kind, body, target, impact) {
        Ok(a) => a,
        Err(e) => {
            println!("{:?} {:?}: {}", kind, projectile, e);
            return (0, 0.0, TickOutcome::Idle);
        }
    };
    animator.play(animation);

    let t0 = Instant::now();
    let mut ticks = 0;
    let mut outcome = TickOutcome::Idle;
    // hard cap so a stuck animation cannot hang the benchmark
    while ticks < 100_000 {
        outcome = animator.update(REFERENCE_DELTA);
        ticks += 1;
        if outcome.is_finished() {
            break;
        }
    }
    (ticks, t0.elapsed().as_secs_f64() * 1000.0, outcome)
}

/// Ticks-to-complete and per-tick cost for every reaction and projectile
pub fn bench_ticks() {
    for kind in KINDS {
        for projectile in ParticleKind::PROJECTILES {
            let (ticks, ms, outcome) = run_once(kind, projectile, 1.5, 1.0);
            let per_tick_us = if ticks > 0 { ms * 1000.0 / ticks as f64 } else { 0.0 };
            println!(
                "{:<10} {:<6} ticks = {:5}, total = {:8.3} ms, per tick = {:7.2} us, {:?}",
                format!("{:?}", kind),
                projectile.label(),
                ticks,
                ms,
                per_tick_us,
                outcome
            );
        }
    }
}

/// Ticks-to-complete against the speed multiplier
/// CSV output, one row per speed
pub fn bench_speed_curve() {
    println!("speed,elastic,nonelastic,inelastic");

    for step in 1..=20 {
        let speed = step as f64 * 0.25;
        let ticks: Vec<String> = KINDS
            .iter()
            .map(|kind| run_once(*kind, ParticleKind::Deuteron, 1.5, speed).0.to_string())
            .collect();
        println!("{:.2},{}", speed, ticks.join(","));
    }
}
