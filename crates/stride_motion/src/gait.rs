//! Gait synthesizer
//!
//! A phase accumulator whose cadence and intensity follow horizontal speed.
//! Each tick it produces a vertical and a lateral head offset and reports
//! the footsteps whose phase thresholds were crossed: phase 0 plants the
//! right foot, phase π the left.
//!
//! One gait cycle (2π) spans two steps, so the vertical offset uses `sin 2φ`
//! (a peak per step) while the lateral sway uses `sin φ` (one side per foot).

use crate::config::GaitConfig;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f32::consts::{PI, TAU};
use stride_core::Vec3;

const INTENSITY_EPSILON: f32 = 0.001;
const CADENCE_EPSILON: f32 = 0.0001;
const SPEED_GUARD: f32 = 0.001;
const MOVING_EPSILON: f32 = 0.0001;

/// Which foot touched down
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Foot {
    Left,
    Right,
}

impl Foot {
    fn threshold(self) -> f32 {
        match self {
            Foot::Right => 0.0,
            Foot::Left => PI,
        }
    }
}

/// A footstep stamped with controller time (seconds)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FootstepEvent {
    pub foot: Foot,
    pub time: f64,
}

/// Accumulator state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GaitState {
    phase: f32,
    intensity: f32,
    cadence_hz: f32,
}

impl GaitState {
    /// Gait phase in `[0, 2π)`
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Smoothed normalized speed in `[0, 1]`
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Smoothed step cadence (Hz)
    pub fn cadence_hz(&self) -> f32 {
        self.cadence_hz
    }
}

/// Offsets and footsteps from one [`GaitSynthesizer::advance`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GaitOutput {
    /// Offset along world up
    pub vertical: f32,
    /// Offset along the camera's right vector
    pub lateral: f32,
    pub normalized_speed: f32,
    pub amplitude_scale: f32,
    /// Feet planted this tick, in crossing order
    pub footsteps: SmallVec<[Foot; 2]>,
}

#[derive(Clone, Debug)]
pub struct GaitSynthesizer {
    config: GaitConfig,
    state: GaitState,
    skipped_footsteps: u64,
}

impl GaitSynthesizer {
    pub fn new(config: GaitConfig) -> Self {
        Self {
            config,
            state: GaitState::default(),
            skipped_footsteps: 0,
        }
    }

    pub fn config(&self) -> &GaitConfig {
        &self.config
    }

    pub fn state(&self) -> GaitState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Footstep crossings dropped because one tick covered more than one
    /// crossing of the same threshold
    pub fn skipped_footsteps(&self) -> u64 {
        self.skipped_footsteps
    }

    /// Return to the rest state
    pub fn reset(&mut self) {
        self.state = GaitState::default();
    }

    /// Advance by `dt` seconds
    ///
    /// `velocity` is the body velocity after integration, `facing` the
    /// flattened unit view direction, `max_speed` the speed that counts as
    /// full intensity.
    pub fn advance(&mut self, dt: f32, velocity: Vec3, facing: Vec3, max_speed: f32) -> GaitOutput {
        if !self.config.enabled {
            return GaitOutput::default();
        }

        let cfg = &self.config;
        let speed = velocity.horizontal_length();
        let normalized = (speed / max_speed.max(SPEED_GUARD)).clamp(0.0, 1.0);

        let state = &mut self.state;
        state.intensity += (normalized - state.intensity) * (cfg.intensity_smoothing * dt).min(1.0);

        let target_hz = cfg.min_cadence_hz + (cfg.max_cadence_hz - cfg.min_cadence_hz) * normalized;
        state.cadence_hz += (target_hz - state.cadence_hz) * (cfg.cadence_smoothing * dt).min(1.0);

        let mut footsteps = SmallVec::new();
        if state.intensity > INTENSITY_EPSILON && state.cadence_hz > CADENCE_EPSILON {
            let prev = state.phase;
            let (next, wraps) = wrap_phase(prev, state.cadence_hz, dt);
            state.phase = next;
            let skipped = collect_footsteps(prev, next, wraps, &mut footsteps);
            self.skipped_footsteps = self.skipped_footsteps.saturating_add(skipped);
        }

        let phase = self.state.phase;
        let intensity = self.state.intensity;
        let amplitude_scale =
            (1.0 - cfg.speed_amplitude_influence) + cfg.speed_amplitude_influence * normalized;

        let shaped = (2.0 * phase).sin() + cfg.harmonic_weight * (4.0 * phase).sin();
        let vertical = shaped * cfg.vertical_amplitude * intensity * amplitude_scale;

        let forward_align = if speed > MOVING_EPSILON {
            let dir = velocity.horizontal() * (1.0 / speed);
            dir.dot(facing).abs().min(1.0)
        } else {
            0.0
        };
        let lateral_weight =
            cfg.strafe_lateral_factor + (1.0 - cfg.strafe_lateral_factor) * forward_align;
        let lateral =
            phase.sin() * cfg.lateral_amplitude * lateral_weight * intensity * amplitude_scale;

        GaitOutput {
            vertical,
            lateral,
            normalized_speed: normalized,
            amplitude_scale,
            footsteps,
        }
    }
}

/// Advance `phase` by `cadence_hz` cycles per second over `dt`, returning
/// the wrapped phase and the number of full cycles passed
///
/// Accumulates in f64 so any finite `dt` stays finite. The cycle count
/// saturates at `u64::MAX`.
fn wrap_phase(phase: f32, cadence_hz: f32, dt: f32) -> (f32, u64) {
    let cycle = f64::from(TAU);
    let advance = f64::from(cadence_hz) * cycle * f64::from(dt);
    if !advance.is_finite() || advance <= 0.0 {
        return (phase, 0);
    }
    let sum = f64::from(phase) + advance;
    let mut wraps = sum.div_euclid(cycle) as u64;
    let mut next = sum.rem_euclid(cycle) as f32;
    // Rounding back to f32 may land exactly on 2π
    if next >= TAU {
        next = 0.0;
        wraps = wraps.saturating_add(1);
    }
    (next, wraps)
}

/// Push the feet whose thresholds lie in `(prev, next]` on the unwrapped
/// path, ordered by which comes first after `prev`. Returns how many extra
/// crossings were folded away.
fn collect_footsteps(prev: f32, next: f32, wraps: u64, out: &mut SmallVec<[Foot; 2]>) -> u64 {
    let crossings = |foot: Foot| -> u64 {
        let theta = foot.threshold();
        wraps
            .saturating_add(u64::from(next >= theta))
            .saturating_sub(u64::from(prev >= theta))
    };

    let order = if prev < PI {
        [Foot::Left, Foot::Right]
    } else {
        [Foot::Right, Foot::Left]
    };

    let mut skipped: u64 = 0;
    for foot in order {
        let count = crossings(foot);
        if count > 0 {
            out.push(foot);
            skipped = skipped.saturating_add(count - 1);
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, wraps, "gait advanced past multiple steps in one tick");
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const FULL_SPEED: Vec3 = Vec3::new(0.0, 0.0, -2.0);
    const NORTH: Vec3 = Vec3::new(0.0, 0.0, -1.0);

    fn gait() -> GaitSynthesizer {
        GaitSynthesizer::new(GaitConfig::default())
    }

    #[test]
    fn test_crossing_rules() {
        let mut out = SmallVec::new();

        // Plain crossing of π
        assert_eq!(collect_footsteps(3.0, 3.2, 0, &mut out), 0);
        assert_eq!(out.as_slice(), &[Foot::Left]);

        // Landing exactly on π counts
        out.clear();
        collect_footsteps(3.0, PI, 0, &mut out);
        assert_eq!(out.as_slice(), &[Foot::Left]);

        // Leaving π does not count again
        out.clear();
        collect_footsteps(PI, 3.5, 0, &mut out);
        assert!(out.is_empty());

        // Wrap crosses 0
        out.clear();
        collect_footsteps(6.0, 0.2, 1, &mut out);
        assert_eq!(out.as_slice(), &[Foot::Right]);

        // Wrap past both thresholds in one tick, π comes first
        out.clear();
        collect_footsteps(2.0, 0.5, 1, &mut out);
        assert_eq!(out.as_slice(), &[Foot::Left, Foot::Right]);

        // More than a full cycle folds to one event per foot
        out.clear();
        assert_eq!(collect_footsteps(1.0, 2.0, 2, &mut out), 2);
        assert_eq!(out.as_slice(), &[Foot::Left, Foot::Right]);
    }

    #[test]
    fn test_wrap_phase_stays_in_range() {
        // Just below 2π, the sum rounds up to 2π in f32
        let below = f32::from_bits(TAU.to_bits() - 1);
        let (next, wraps) = wrap_phase(below, 1.0, 3e-7 / TAU);
        assert_eq!(next, 0.0);
        assert_eq!(wraps, 1);

        let (next, wraps) = wrap_phase(1.0, 1.0, 3.0);
        assert!((next - 1.0).abs() < 1e-5);
        assert_eq!(wraps, 3);

        // Past f32 range in the product, still finite in f64
        let (next, wraps) = wrap_phase(1.0, 0.8, 1.0e38);
        assert!((0.0..TAU).contains(&next));
        assert_eq!(wraps, u64::MAX);

        assert_eq!(wrap_phase(2.0, 0.8, f32::INFINITY), (2.0, 0));
        assert_eq!(wrap_phase(2.0, 0.8, 0.0), (2.0, 0));
    }

    #[test]
    fn test_huge_dt_keeps_phase_and_counter_sane() {
        let mut gait = gait();
        let mut last_skipped = 0;
        for tick in 0..40 {
            let out = gait.advance(1.0e18, FULL_SPEED, NORTH, 2.0);
            let phase = gait.state().phase();
            assert!((0.0..TAU).contains(&phase), "tick {tick}: phase {phase}");
            assert!(out.vertical.is_finite() && out.lateral.is_finite());
            assert!(out.footsteps.len() <= 2);
            assert!(gait.skipped_footsteps() >= last_skipped);
            last_skipped = gait.skipped_footsteps();
        }
        assert_eq!(last_skipped, u64::MAX);
    }

    #[test]
    fn test_dt_near_f32_max_keeps_phase_finite() {
        let mut gait = gait();
        gait.advance(1.0, FULL_SPEED, NORTH, 2.0);
        let out = gait.advance(1.0e38, FULL_SPEED, NORTH, 2.0);

        let phase = gait.state().phase();
        assert!((0.0..TAU).contains(&phase), "phase {phase} out of range");
        assert!(out.vertical.is_finite() && out.lateral.is_finite());

        // Back to normal ticks afterwards
        let out = gait.advance(1.0 / 60.0, FULL_SPEED, NORTH, 2.0);
        assert!((0.0..TAU).contains(&gait.state().phase()));
        assert!(out.vertical.is_finite());
    }

    #[test]
    fn test_phase_in_range_under_random_dt() {
        let mut gait = gait();
        let mut rng = ChaCha8Rng::seed_from_u64(0x57a1);

        for _ in 0..1_000_000 {
            let dt = 0.1 - rng.random_range(0.0..0.1);
            let speed = rng.random_range(0.0..3.0);
            gait.advance(dt, Vec3::new(speed, 0.0, 0.0), NORTH, 2.0);
            let phase = gait.state().phase();
            assert!((0.0..TAU).contains(&phase), "phase {phase} out of range");
        }
    }

    fn walk(dt: f32, seconds: f32) -> Vec<Foot> {
        let mut gait = gait();
        let ticks = (seconds / dt).round() as usize;
        let mut feet = Vec::new();
        for _ in 0..ticks {
            feet.extend(gait.advance(dt, FULL_SPEED, NORTH, 2.0).footsteps);
        }
        feet
    }

    fn assert_alternates(feet: &[Foot]) {
        for pair in feet.windows(2) {
            assert_ne!(pair[0], pair[1], "feet did not alternate: {feet:?}");
        }
    }

    #[test]
    fn test_footsteps_alternate_small_dt() {
        let feet = walk(1.0 / 120.0, 20.0);
        assert_alternates(&feet);
        // From rest the first threshold reached is π
        assert_eq!(feet.first(), Some(&Foot::Left));

        // ~0.8 Hz for 20 s, two steps per cycle, minus the spin-up
        assert!((28..=33).contains(&feet.len()), "{} steps", feet.len());
    }

    #[test]
    fn test_footsteps_alternate_large_dt() {
        let feet = walk(0.5, 20.0);
        assert_alternates(&feet);
        assert!((28..=33).contains(&feet.len()), "{} steps", feet.len());
    }

    #[test]
    fn test_two_steps_per_cycle_at_steady_cadence() {
        let mut gait = gait();
        let dt = 1.0 / 60.0;
        for _ in 0..600 {
            gait.advance(dt, FULL_SPEED, NORTH, 2.0);
        }

        let mut feet = 0;
        let mut travelled = 0.0_f64;
        for _ in 0..6_000 {
            let before = gait.state().phase();
            feet += gait.advance(dt, FULL_SPEED, NORTH, 2.0).footsteps.len();
            let after = gait.state().phase();
            travelled += f64::from((after - before).rem_euclid(TAU));
        }

        let half_cycles = travelled / f64::from(PI);
        assert!((feet as f64 - half_cycles).abs() <= 1.0);
    }

    #[test]
    fn test_cadence_converges_to_max() {
        let mut gait = gait();
        for _ in 0..600 {
            gait.advance(1.0 / 60.0, FULL_SPEED, NORTH, 2.0);
        }
        assert!((gait.state().cadence_hz() - 0.8).abs() < 1e-4);
        assert!((gait.state().intensity() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rest_keeps_phase() {
        let mut gait = gait();
        let out = gait.advance(0.1, Vec3::ZERO, NORTH, 2.0);
        assert_eq!(gait.state().phase(), 0.0);
        assert_eq!(out.vertical, 0.0);
        assert_eq!(out.lateral, 0.0);
        assert!(out.footsteps.is_empty());
    }

    #[test]
    fn test_strafe_reduces_lateral_sway() {
        let mut forward = gait();
        let mut strafe = gait();
        let sideways = Vec3::new(2.0, 0.0, 0.0);

        let mut fwd_out = GaitOutput::default();
        let mut side_out = GaitOutput::default();
        for _ in 0..40 {
            fwd_out = forward.advance(1.0 / 60.0, FULL_SPEED, NORTH, 2.0);
            side_out = strafe.advance(1.0 / 60.0, sideways, NORTH, 2.0);
        }

        assert_eq!(forward.state(), strafe.state());
        assert!((side_out.lateral - fwd_out.lateral * 0.6).abs() < 1e-6);
        assert_eq!(side_out.vertical, fwd_out.vertical);
    }

    #[test]
    fn test_disabled_is_inert() {
        let mut gait = GaitSynthesizer::new(GaitConfig {
            enabled: false,
            ..Default::default()
        });
        for _ in 0..100 {
            let out = gait.advance(0.05, FULL_SPEED, NORTH, 2.0);
            assert_eq!(out, GaitOutput::default());
        }
        assert_eq!(gait.state(), GaitState::default());
    }
}
