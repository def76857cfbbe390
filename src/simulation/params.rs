//! Tuning constants for the breakup animation
//!
//! `Parameters` holds the runtime settings shared by every animation kind:
//! - start geometry and projectile speed,
//! - pseudo-Coulomb strength and range,
//! - phase thresholds (breakup, capture, escape distances),
//! - resonance window, trail length and the random seed
//!
//! Distances are scene units, times are seconds of scaled animation time.

#[derive(Debug, Clone)]
pub struct Parameters {
    pub seed: u64, // deterministic seed for emission directions
    pub start_offset: f64, // projectile starts this far left of the target
    pub projectile_speed: f64, // initial projectile speed along +x
    pub coulomb_strength: f64, // repulsion coefficient, a = k * q * (Z / 82) / d^2
    pub interaction_radius: f64, // repulsion only acts inside this distance
    pub elastic_breakup_distance: f64, // elastic approach -> breakup
    pub nonelastic_breakup_distance: f64, // nonelastic approach -> breakup
    pub inelastic_excitation_distance: f64, // inelastic excitation trigger
    pub escape_distance: f64, // fragments further than this have escaped
    pub capture_radius: f64, // absorbed fragment is captured inside this
    pub absorption_speed: f64, // constant speed of the absorbed fragment
    pub escape_speed: f64, // outward speed of the escaping fragment
    pub max_resonance_time: f64, // lifetime of the compound nucleus
    pub trail_length: usize, // positions kept per trail
    pub legacy_absorption_phase: bool, // compound -> absorption instead of decay
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            seed: 42,
            start_offset: 12.0,
            projectile_speed: 6.0,
            coulomb_strength: 2.0,
            interaction_radius: 8.0,
            elastic_breakup_distance: 3.5,
            nonelastic_breakup_distance: 3.0,
            inelastic_excitation_distance: 3.5,
            escape_distance: 15.0,
            capture_radius: 0.5,
            absorption_speed: 4.0,
            escape_speed: 6.0,
            max_resonance_time: 2.0,
            trail_length: 40,
            legacy_absorption_phase: false,
        }
    }
}
