//! Breakup animator: the per-tick state machine.
//!
//! The animator owns the scene, at most one current [`Animation`] and the
//! playback settings. Each `update` call advances the current animation by
//! one tick:
//!
//! 1. phase logic for the animation kind (motion, thresholds, spawning),
//! 2. trail refresh (skipped while trails are disabled),
//! 3. effect updates, dropping dead effects from the scene.
//!
//! Any error raised on the way stops playback and is reported as
//! [`TickOutcome::Faulted`]; it never reaches the render loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::error::{AnimationError, ConfigError};
use crate::simulation::animation::{Animation, AnimationKind, Phase};
use crate::simulation::effects::Effect;
use crate::simulation::factory;
use crate::simulation::forces::{steer_toward, CoulombRepulsion, ForceSet, Source};
use crate::simulation::integrator::{drift, kick_drift};
use crate::simulation::params::Parameters;
use crate::simulation::scene::{MemoryScene, Rgb, Scene, VisualId};
use crate::simulation::species::{breakup_of, fragment_offsets, Breakup};
use crate::simulation::states::{Body, NVec3, Target};

/// Tick length the effect decay rates are tuned for
pub const REFERENCE_DELTA: f64 = 0.016;

/// Cascade emitted once the resonance is this far through its window
const CASCADE_FRACTION: f64 = 0.6;
const BURST_SPARKS: usize = 20;
const WAVE_RADIUS: f64 = 6.0;

/// Result of one `update` call
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing is playing
    Idle,
    Continuing,
    Completed,
    Faulted(AnimationError),
}

impl TickOutcome {
    /// True when playback stopped during this tick
    pub fn is_finished(&self) -> bool {
        matches!(self, TickOutcome::Completed | TickOutcome::Faulted(_))
    }
}

pub struct Animator<S: Scene = MemoryScene> {
    scene: S,
    params: Parameters,
    forces: ForceSet,
    rng: StdRng,
    current: Option<Animation>,
    playing: bool,
    speed: f64,
    trails_enabled: bool,
}

impl<S: Scene> Animator<S> {
    pub fn new(scene: S, params: Parameters) -> Self {
        let forces = ForceSet::new().with(CoulombRepulsion::new(params.coulomb_strength, params.interaction_radius));
        let rng = StdRng::seed_from_u64(params.seed);
        Self {
            scene,
            params,
            forces,
            rng,
            current: None,
            playing: false,
            speed: 1.0,
            trails_enabled: true,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn current(&self) -> Option<&Animation> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Negative or non-finite multipliers freeze the animation
    pub fn set_speed(&mut self, multiplier: f64) {
        self.speed = if multiplier.is_finite() { multiplier.max(0.0) } else { 0.0 };
    }

    pub fn trails_enabled(&self) -> bool {
        self.trails_enabled
    }

    /// Disabling keeps the recorded trail points, it only stops refreshing them
    pub fn set_trails_enabled(&mut self, enabled: bool) {
        self.trails_enabled = enabled;
    }

    pub fn create_elastic_breakup(
        &mut self,
        projectile: Body,
        target: Target,
        impact_parameter: f64,
    ) -> Result<Animation, ConfigError> {
        self.prepare(AnimationKind::Elastic, projectile, target, impact_parameter)
    }

    pub fn create_nonelastic_breakup(
        &mut self,
        projectile: Body,
        target: Target,
        impact_parameter: f64,
    ) -> Result<Animation, ConfigError> {
        self.prepare(AnimationKind::Nonelastic, projectile, target, impact_parameter)
    }

    pub fn create_inelastic_breakup(
        &mut self,
        projectile: Body,
        target: Target,
        impact_parameter: f64,
    ) -> Result<Animation, ConfigError> {
        self.prepare(AnimationKind::Inelastic, projectile, target, impact_parameter)
    }

    /// Dispatch on `kind`
    pub fn create_breakup(
        &mut self,
        kind: AnimationKind,
        projectile: Body,
        target: Target,
        impact_parameter: f64,
    ) -> Result<Animation, ConfigError> {
        match kind {
            AnimationKind::Elastic => self.create_elastic_breakup(projectile, target, impact_parameter),
            AnimationKind::Nonelastic => self.create_nonelastic_breakup(projectile, target, impact_parameter),
            AnimationKind::Inelastic => self.create_inelastic_breakup(projectile, target, impact_parameter),
        }
    }

    /// Place the projectile left of the target at height `impact_parameter`
    ///
    /// A rejected projectile is removed from the scene again.
    fn prepare(
        &mut self,
        kind: AnimationKind,
        mut projectile: Body,
        target: Target,
        impact_parameter: f64,
    ) -> Result<Animation, ConfigError> {
        let row = match self.place(&mut projectile, &target, impact_parameter) {
            Ok(row) => row,
            Err(e) => {
                self.scene.remove(projectile.visual);
                return Err(e);
            }
        };

        debug!(?kind, projectile = projectile.kind.label(), impact_parameter, "created animation");
        Ok(Animation::new(
            kind,
            projectile,
            target,
            row,
            impact_parameter,
            self.params.max_resonance_time,
        ))
    }

    fn place(
        &mut self,
        projectile: &mut Body,
        target: &Target,
        impact_parameter: f64,
    ) -> Result<Breakup, ConfigError> {
        let row = breakup_of(projectile.kind)?;
        if !impact_parameter.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "impact_parameter",
                value: impact_parameter,
            });
        }

        let center = self
            .scene
            .get(target.visual)
            .map(|v| v.position)
            .ok_or(ConfigError::MissingVisual("target"))?;
        let visual = self
            .scene
            .get_mut(projectile.visual)
            .ok_or(ConfigError::MissingVisual("projectile"))?;
        visual.position = center + NVec3::new(-self.params.start_offset, impact_parameter, 0.0);
        projectile.velocity = NVec3::new(self.params.projectile_speed, 0.0, 0.0);
        Ok(row)
    }

    /// Make `animation` current and start playing; the previous one is discarded
    pub fn play(&mut self, animation: Animation) {
        if let Some(previous) = self.current.take() {
            self.discard(previous);
        }
        info!(kind = ?animation.kind, impact_parameter = animation.impact_parameter, "play");
        self.current = Some(animation);
        self.playing = true;
    }

    /// Stop playback and remove everything the current animation added
    pub fn stop(&mut self) {
        self.playing = false;
        if let Some(anim) = self.current.as_mut() {
            remove_owned(&mut self.scene, anim);
            if let Some(target) = self.scene.get_mut(anim.target.visual) {
                target.visible = true;
            }
            anim.target_hidden = false;
        }
    }

    /// `stop`, then forget the animation and show the target again
    pub fn reset(&mut self) {
        self.playing = false;
        if let Some(anim) = self.current.take() {
            info!(kind = ?anim.kind, phase = ?anim.phase, "reset");
            self.discard(anim);
        }
    }

    fn discard(&mut self, mut anim: Animation) {
        remove_owned(&mut self.scene, &mut anim);
        if let Some(target) = self.scene.get_mut(anim.target.visual) {
            target.visible = true;
        }
    }

    /// Advance the current animation by `delta_time` seconds times the speed
    pub fn update(&mut self, delta_time: f64) -> TickOutcome {
        if !self.playing {
            return TickOutcome::Idle;
        }
        let Some(anim) = self.current.as_mut() else {
            self.playing = false;
            return TickOutcome::Idle;
        };

        let dt = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        let mut tick = Tick {
            scene: &mut self.scene,
            params: &self.params,
            forces: &self.forces,
            rng: &mut self.rng,
            step: dt * self.speed,
            rate: self.speed * dt / REFERENCE_DELTA,
            trails_enabled: self.trails_enabled,
            target_charge: anim.target.charge,
        };

        match tick.advance(anim) {
            Ok(()) if anim.is_complete() => {
                self.playing = false;
                info!(kind = ?anim.kind, t = anim.elapsed_time, "complete");
                TickOutcome::Completed
            }
            Ok(()) => TickOutcome::Continuing,
            Err(e) => {
                self.playing = false;
                error!(kind = ?anim.kind, phase = ?anim.phase, error = %e, "animation fault");
                TickOutcome::Faulted(e)
            }
        }
    }
}

impl Animator<MemoryScene> {
    pub fn with_memory_scene(params: Parameters) -> Self {
        Self::new(MemoryScene::new(), params)
    }
}

fn remove_owned<S: Scene + ?Sized>(scene: &mut S, anim: &mut Animation) {
    for id in anim.owned_visuals() {
        scene.remove(id);
    }
    anim.clear_owned();
}

/// Update every effect in `effects`, dropping dead or orphaned ones
fn retain_alive<S: Scene + ?Sized>(effects: &mut Vec<Effect>, scene: &mut S, rate: f64) {
    effects.retain_mut(|e| match scene.get_mut(e.visual) {
        Some(visual) => {
            let alive = e.update(visual, rate);
            if !alive {
                scene.remove(e.visual);
            }
            alive
        }
        None => false,
    });
}

/// Update a single optional effect; false when it died or lost its visual
fn update_single<S: Scene + ?Sized>(effect: &mut Effect, scene: &mut S, rate: f64) -> bool {
    match scene.get_mut(effect.visual) {
        Some(visual) => effect.update(visual, rate),
        None => false,
    }
}

fn is_finite(v: &NVec3) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Borrowed view of the animator for the duration of one tick
struct Tick<'a, S: Scene + ?Sized> {
    scene: &'a mut S,
    params: &'a Parameters,
    forces: &'a ForceSet,
    rng: &'a mut StdRng,
    step: f64, // scaled seconds
    rate: f64, // effect ticks
    trails_enabled: bool,
    target_charge: f64,
}

impl<'a, S: Scene + ?Sized> Tick<'a, S> {
    fn advance(&mut self, anim: &mut Animation) -> Result<(), AnimationError> {
        anim.elapsed_time += self.step;
        let center = self.position_of(anim.target.visual, "target")?;

        match anim.kind {
            AnimationKind::Elastic => self.elastic(anim, &center)?,
            AnimationKind::Nonelastic => self.nonelastic(anim, &center)?,
            AnimationKind::Inelastic => self.inelastic(anim, &center)?,
        }

        self.update_trails(anim);
        self.update_effects(anim, &center);
        Ok(())
    }

    fn position_of(&self, visual: VisualId, name: &'static str) -> Result<NVec3, AnimationError> {
        self.scene
            .get(visual)
            .map(|v| v.position)
            .ok_or(AnimationError::MissingVisual(name))
    }

    /// Move `body` one step, optionally under the target's forces
    fn move_body(
        &mut self,
        body: &mut Body,
        center: &NVec3,
        forced: bool,
        name: &'static str,
    ) -> Result<NVec3, AnimationError> {
        let visual = self
            .scene
            .get_mut(body.visual)
            .ok_or(AnimationError::MissingVisual(name))?;
        if forced {
            let source = Source {
                center: *center,
                charge: self.target_charge,
            };
            kick_drift(body, &mut visual.position, self.forces, &source, self.step);
        } else {
            drift(&mut visual.position, &body.velocity, self.step);
        }
        let position = visual.position;
        if !is_finite(&position) || !is_finite(&body.velocity) {
            return Err(AnimationError::NonFinite(name));
        }
        Ok(position)
    }

    /// Move the intact projectile; returns its distance to the target and its position
    fn move_projectile(&mut self, anim: &mut Animation, center: &NVec3) -> Result<(f64, NVec3), AnimationError> {
        let projectile = anim
            .projectile
            .as_mut()
            .ok_or(AnimationError::MissingVisual("projectile"))?;
        let position = self.move_body(projectile, center, true, "projectile")?;
        Ok(((position - center).norm(), position))
    }

    /// Out of range and moving away, whether it passed the target or bounced off
    fn receding(&self, body: &Body, position: &NVec3, center: &NVec3) -> bool {
        let r = position - center;
        r.norm() > self.params.escape_distance && body.velocity.dot(&r) > 0.0
    }

    /// Intact projectile left without breaking up
    fn missed(&self, anim: &Animation, position: &NVec3, center: &NVec3) -> bool {
        anim.projectile
            .as_ref()
            .is_some_and(|p| self.receding(p, position, center))
    }

    /// Move every fragment; true when all of them are beyond the escape distance
    fn move_fragments(&mut self, anim: &mut Animation, center: &NVec3) -> Result<bool, AnimationError> {
        let mut escaped = true;
        for fragment in anim.fragments.iter_mut() {
            let position = self.move_body(fragment, center, true, "fragment")?;
            if (position - center).norm() <= self.params.escape_distance {
                escaped = false;
            }
        }
        Ok(escaped)
    }

    /// Replace the projectile by its two fragments plus a spark burst
    fn split_projectile(&mut self, anim: &mut Animation) -> Result<(Body, Body), AnimationError> {
        let projectile = anim
            .projectile
            .take()
            .ok_or(AnimationError::MissingVisual("projectile"))?;
        let origin = self.position_of(projectile.visual, "projectile")?;
        self.scene.remove(projectile.visual);

        let row = anim.breakup;
        let [upper, lower] = fragment_offsets();
        let mut first = factory::create_nucleus(&mut *self.scene, row.first, origin + upper);
        first.velocity = projectile.velocity + row.first_kick;
        let mut second = factory::create_nucleus(&mut *self.scene, row.second, origin + lower);
        second.velocity = projectile.velocity + row.second_kick;

        let burst = factory::create_explosion(&mut *self.scene, &mut *self.rng, origin, BURST_SPARKS, Rgb::FLASH);
        anim.effects.extend(burst);

        info!(
            projectile = projectile.kind.label(),
            first = row.first.label(),
            second = row.second.label(),
            "breakup"
        );
        Ok((first, second))
    }

    fn add_trail(&mut self, anim: &mut Animation, body: &Body) {
        let trail = factory::create_trail(&mut *self.scene, body, self.params.trail_length);
        anim.trails.push(trail);
    }

    fn emit_gamma_rays(&mut self, anim: &mut Animation, center: &NVec3, count: usize) {
        for _ in 0..count {
            let ray = factory::create_gamma_ray(&mut *self.scene, &mut *self.rng, *center);
            anim.gamma_rays.push(ray);
        }
        debug!(count, "gamma rays");
    }

    fn emit_energy_wave(&mut self, anim: &mut Animation, center: &NVec3) {
        let wave = factory::create_energy_wave(&mut *self.scene, *center, WAVE_RADIUS);
        anim.energy_waves.push(wave);
    }

    fn set_target_visible(&mut self, anim: &mut Animation, visible: bool) {
        if let Some(target) = self.scene.get_mut(anim.target.visual) {
            target.visible = visible;
        }
        anim.target_hidden = !visible;
    }

    // ---------------------------------------------------------------------
    // elastic: approach -> breakup -> complete
    // ---------------------------------------------------------------------

    fn elastic(&mut self, anim: &mut Animation, center: &NVec3) -> Result<(), AnimationError> {
        match anim.phase {
            Phase::Approach => {
                let (distance, position) = self.move_projectile(anim, center)?;
                if distance < self.params.elastic_breakup_distance {
                    let (first, second) = self.split_projectile(anim)?;
                    self.add_trail(anim, &first);
                    self.add_trail(anim, &second);
                    anim.fragments.push(first);
                    anim.fragments.push(second);
                    anim.transition(Phase::Breakup)?;
                } else if self.missed(anim, &position, center) {
                    anim.transition(Phase::Complete)?;
                }
            }
            Phase::Breakup => {
                if self.move_fragments(anim, center)? {
                    anim.transition(Phase::Complete)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // nonelastic: approach -> breakup -> compound -> decay -> complete
    // ---------------------------------------------------------------------

    fn nonelastic(&mut self, anim: &mut Animation, center: &NVec3) -> Result<(), AnimationError> {
        match anim.phase {
            Phase::Approach => {
                let (distance, position) = self.move_projectile(anim, center)?;
                if distance < self.params.nonelastic_breakup_distance {
                    let (mut escaping, absorbed) = self.split_projectile(anim)?;
                    let from_center = self.position_of(escaping.visual, "escaping fragment")? - center;
                    let outward = if from_center.norm() > 0.0 {
                        from_center.normalize()
                    } else {
                        NVec3::x()
                    };
                    escaping.velocity = outward * self.params.escape_speed;
                    self.add_trail(anim, &escaping);
                    anim.escaping_fragment = Some(escaping);
                    anim.absorbed_fragment = Some(absorbed);
                    anim.transition(Phase::Breakup)?;
                } else if self.missed(anim, &position, center) {
                    anim.transition(Phase::Complete)?;
                }
            }
            Phase::Breakup => {
                self.move_escaping(anim, center)?;
                if self.steer_absorbed(anim, center)? {
                    self.enter_compound(anim, center)?;
                    anim.transition(Phase::Compound)?;
                }
            }
            Phase::Compound => {
                self.move_escaping(anim, center)?;
                anim.resonance_time += self.step;

                if anim.resonance_time > CASCADE_FRACTION * anim.max_resonance_time
                    && anim.gamma_rays.is_empty()
                    && !anim.cascade_emitted
                {
                    let count = self.rng.gen_range(3..=5);
                    self.emit_gamma_rays(anim, center, count);
                    anim.cascade_emitted = true;
                }

                if anim.resonance_time > anim.max_resonance_time {
                    self.enter_decay(anim, center);
                    let next = if self.params.legacy_absorption_phase {
                        Phase::Absorption
                    } else {
                        Phase::Decay
                    };
                    anim.transition(next)?;
                }
            }
            Phase::Decay | Phase::Absorption => {
                let distance = self.move_escaping(anim, center)?;
                if distance > self.params.escape_distance {
                    anim.transition(Phase::Complete)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns the escaping fragment's distance to the target
    fn move_escaping(&mut self, anim: &mut Animation, center: &NVec3) -> Result<f64, AnimationError> {
        let escaping = anim
            .escaping_fragment
            .as_mut()
            .ok_or(AnimationError::MissingVisual("escaping fragment"))?;
        let position = self.move_body(escaping, center, true, "escaping fragment")?;
        Ok((position - center).norm())
    }

    /// Pull the absorbed fragment straight in; true once it is captured
    fn steer_absorbed(&mut self, anim: &mut Animation, center: &NVec3) -> Result<bool, AnimationError> {
        let absorbed = anim
            .absorbed_fragment
            .as_mut()
            .ok_or(AnimationError::MissingVisual("absorbed fragment"))?;
        let current = self.position_of(absorbed.visual, "absorbed fragment")?;
        absorbed.velocity = steer_toward(&current, center, self.params.absorption_speed);
        let position = self.move_body(absorbed, center, false, "absorbed fragment")?;
        Ok((position - center).norm() < self.params.capture_radius)
    }

    fn enter_compound(&mut self, anim: &mut Animation, center: &NVec3) -> Result<(), AnimationError> {
        let absorbed = anim
            .absorbed_fragment
            .take()
            .ok_or(AnimationError::MissingVisual("absorbed fragment"))?;
        self.scene.remove(absorbed.visual);
        self.set_target_visible(anim, false);

        let size = factory::nuclear_radius(anim.target.mass + absorbed.mass);
        anim.compound_nucleus = Some(factory::create_compound_nucleus(&mut *self.scene, *center, size));
        self.emit_energy_wave(anim, center);
        let flash = factory::create_absorption_flash(&mut *self.scene, *center);
        anim.effects.push(flash);
        info!(absorbed = absorbed.kind.label(), "compound nucleus formed");
        Ok(())
    }

    fn enter_decay(&mut self, anim: &mut Animation, center: &NVec3) {
        if let Some(compound) = anim.compound_nucleus.take() {
            self.scene.remove(compound.visual);
        }
        self.set_target_visible(anim, true);
        self.emit_energy_wave(anim, center);
        self.emit_gamma_rays(anim, center, 2);
    }

    // ---------------------------------------------------------------------
    // inelastic: approach (excitation in place) -> escape -> complete
    // ---------------------------------------------------------------------

    fn inelastic(&mut self, anim: &mut Animation, center: &NVec3) -> Result<(), AnimationError> {
        match anim.phase {
            Phase::Approach => {
                if anim.projectile.is_some() {
                    let (distance, _) = self.move_projectile(anim, center)?;
                    if distance < self.params.inelastic_excitation_distance && !anim.is_target_excited() {
                        self.excite(anim, center)?;
                    }
                } else {
                    self.move_fragments(anim, center)?;
                }
                if self.past_target(anim, center)? {
                    anim.transition(Phase::Escape)?;
                }
            }
            Phase::Escape => {
                let escaped = if anim.projectile.is_some() {
                    let (distance, _) = self.move_projectile(anim, center)?;
                    distance > self.params.escape_distance
                } else {
                    self.move_fragments(anim, center)?
                };
                if escaped && anim.gamma_rays.is_empty() && !anim.is_target_excited() {
                    anim.transition(Phase::Complete)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// True once any moving body is right of the target, or all of them are receding out of range
    fn past_target(&self, anim: &Animation, center: &NVec3) -> Result<bool, AnimationError> {
        let bodies: Vec<&Body> = match anim.projectile.as_ref() {
            Some(projectile) => vec![projectile],
            None => anim.fragments.iter().collect(),
        };
        if bodies.is_empty() {
            return Err(AnimationError::MissingVisual("fragment"));
        }

        let mut all_receding = true;
        for body in bodies {
            let position = self.position_of(body.visual, "fragment")?;
            if position.x > center.x {
                return Ok(true);
            }
            if !self.receding(body, &position, center) {
                all_receding = false;
            }
        }
        Ok(all_receding)
    }

    /// Break the projectile up and swap the target for its excited variant
    fn excite(&mut self, anim: &mut Animation, center: &NVec3) -> Result<(), AnimationError> {
        let (first, second) = self.split_projectile(anim)?;
        self.add_trail(anim, &first);
        self.add_trail(anim, &second);
        anim.fragments.push(first);
        anim.fragments.push(second);

        self.set_target_visible(anim, false);
        let size = factory::nuclear_radius(anim.target.mass);
        anim.excited_target = Some(factory::create_excited_target(&mut *self.scene, *center, size));
        info!("target excited");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // shared per-tick updates
    // ---------------------------------------------------------------------

    fn update_trails(&mut self, anim: &mut Animation) {
        if !self.trails_enabled {
            return;
        }
        for trail in anim.trails.iter_mut() {
            let Some(head) = self.scene.get(trail.follows).map(|v| v.position) else {
                continue;
            };
            if let Some(line) = self.scene.get_mut(trail.visual) {
                trail.push(head, line);
            }
        }
    }

    fn update_effects(&mut self, anim: &mut Animation, center: &NVec3) {
        retain_alive(&mut anim.effects, &mut *self.scene, self.rate);
        retain_alive(&mut anim.gamma_rays, &mut *self.scene, self.rate);
        retain_alive(&mut anim.energy_waves, &mut *self.scene, self.rate);

        let lost = match anim.compound_nucleus.as_mut() {
            Some(compound) => !update_single(compound, &mut *self.scene, self.rate),
            None => false,
        };
        if lost {
            warn!("compound nucleus lost its visual");
            anim.compound_nucleus = None;
        }

        let spent = match anim.excited_target.as_mut() {
            Some(excited) => !update_single(excited, &mut *self.scene, self.rate),
            None => false,
        };
        if spent {
            if let Some(excited) = anim.excited_target.take() {
                self.scene.remove(excited.visual);
            }
            self.set_target_visible(anim, true);
            self.emit_gamma_rays(anim, center, 2);
            self.emit_energy_wave(anim, center);
            info!("target de-excited");
        }
    }
}
