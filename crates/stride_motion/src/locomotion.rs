//! Locomotion integrator
//!
//! Turns the aggregated input into a desired horizontal velocity relative
//! to the camera's facing and moves the body's velocity toward it with
//! asymmetric acceleration. The vertical component belongs to the physics
//! engine and is never touched.

use crate::camera::MoveBasis;
use crate::config::MovementConfig;
use stride_core::{InputChannel, InputSnapshot, Vec3};

/// Result of one integration step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocomotionStep {
    /// Velocity to write back to the body
    pub velocity: Vec3,
    /// Horizontal velocity the body is heading toward
    pub desired: Vec3,
    /// Unit movement direction, or zero without intent
    pub direction: Vec3,
}

impl LocomotionStep {
    /// Horizontal speed after the step
    pub fn speed(&self) -> f32 {
        self.velocity.horizontal_length()
    }
}

/// Velocity integrator driven by one [`MovementConfig`]
#[derive(Clone, Debug, Default)]
pub struct LocomotionIntegrator {
    config: MovementConfig,
}

impl LocomotionIntegrator {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Unit movement direction for this tick's input
    ///
    /// The joystick wins only on the touch channel and only once either axis
    /// leaves the threshold; everything else reads the keyboard flags.
    pub fn intent(&self, basis: &MoveBasis, input: &InputSnapshot) -> Vec3 {
        let axes = input.move_axes;
        let threshold = self.config.joystick_threshold;
        let joystick_active = axes.x.abs() > threshold || axes.y.abs() > threshold;

        let raw = match input.channel() {
            InputChannel::Touch if joystick_active => {
                basis.forward * axes.y + basis.right * axes.x
            }
            _ => {
                let keys = input.keys;
                let mut dir = Vec3::ZERO;
                if keys.forward {
                    dir += basis.forward;
                }
                if keys.back {
                    dir += -basis.forward;
                }
                if keys.right {
                    dir += basis.right;
                }
                if keys.left {
                    dir += -basis.right;
                }
                dir
            }
        };

        raw.horizontal().normalize()
    }

    /// Advance `velocity` by `dt` seconds toward the input's intent
    pub fn step(
        &self,
        dt: f32,
        basis: &MoveBasis,
        velocity: Vec3,
        input: &InputSnapshot,
    ) -> LocomotionStep {
        let direction = self.intent(basis, input);
        let desired = direction * self.config.max_speed;

        let accel = self.config.acceleration;
        let decel = self.config.deceleration;
        let x = move_towards(velocity.x, desired.x, accel, decel, dt);
        let z = move_towards(velocity.z, desired.z, accel, decel, dt);

        LocomotionStep {
            velocity: Vec3::new(x, velocity.y, z),
            desired,
            direction,
        }
    }
}

/// Move `current` toward `target` by at most `rate * dt`
///
/// Speeding up uses `accel`, everything else `decel`. Lands exactly on the
/// target once it is within one step.
pub fn move_towards(current: f32, target: f32, accel: f32, decel: f32, dt: f32) -> f32 {
    let rate = if target.abs() > current.abs() {
        accel
    } else {
        decel
    };
    let max_step = rate * dt;
    let diff = target - current;
    if diff.abs() <= max_step {
        target
    } else {
        current + diff.signum() * max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::LookAngles;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use stride_core::{MovementKeys, Vec2};

    fn integrator() -> LocomotionIntegrator {
        LocomotionIntegrator::new(MovementConfig::default())
    }

    fn facing_north() -> MoveBasis {
        MoveBasis::from_direction(LookAngles::default().direction())
    }

    fn keys(forward: bool, back: bool, left: bool, right: bool) -> InputSnapshot {
        InputSnapshot {
            keys: MovementKeys {
                forward,
                back,
                left,
                right,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_move_towards_rates() {
        // Speeding up uses acceleration
        assert!((move_towards(0.0, 2.0, 18.0, 22.0, 0.1) - 1.8).abs() < 1e-6);
        // Slowing down uses deceleration and snaps
        assert_eq!(move_towards(1.0, 0.0, 18.0, 22.0, 0.1), 0.0);
        assert!((move_towards(-2.0, 0.0, 18.0, 22.0, 0.05) + 0.9).abs() < 1e-6);
        // Zero dt changes nothing
        assert_eq!(move_towards(1.3, -2.0, 18.0, 22.0, 0.0), 1.3);
    }

    #[test]
    fn test_diagonal_speed_is_capped() {
        let loco = integrator();
        let basis = facing_north();
        let input = keys(true, false, false, true);

        let mut velocity = Vec3::ZERO;
        for _ in 0..120 {
            velocity = loco.step(1.0 / 60.0, &basis, velocity, &input).velocity;
        }

        assert!((velocity.horizontal_length() - 2.0).abs() < 1e-5);
        assert!(velocity.x > 0.0 && velocity.z < 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let loco = integrator();
        let basis = facing_north();

        let step = loco.step(0.1, &basis, Vec3::ZERO, &keys(true, true, true, true));
        assert_eq!(step.direction, Vec3::ZERO);
        assert_eq!(step.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_no_overshoot_with_random_dt() {
        let loco = integrator();
        let basis = MoveBasis::from_direction(LookAngles::new(0.6, 0.1).direction());
        let input = keys(true, false, true, false);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let mut velocity = Vec3::ZERO;
        for _ in 0..2_000 {
            let dt = rng.random_range(0.0..0.5);
            velocity = loco.step(dt, &basis, velocity, &input).velocity;
            assert!(velocity.horizontal_length() <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn test_turning_bounds_each_axis() {
        // Per-axis smoothing: while turning the speed can briefly pass the
        // cap even though neither axis overshoots its own target
        let x = move_towards(1.9, 2.0, 18.0, 22.0, 0.01);
        let z = move_towards(0.62, 0.0, 18.0, 22.0, 0.01);
        assert_eq!(x, 2.0);
        assert!((z - 0.40).abs() < 1e-5);
        assert!(x.hypot(z) > 2.0);

        let loco = integrator();
        let basis = facing_north();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let within = |next: f32, from: f32, to: f32| {
            next >= from.min(to) - 1e-5 && next <= from.max(to) + 1e-5
        };

        let mut velocity = Vec3::ZERO;
        for _ in 0..5_000 {
            let input = keys(rng.random(), rng.random(), rng.random(), rng.random());
            let dt = rng.random_range(0.0..0.1);
            let step = loco.step(dt, &basis, velocity, &input);
            assert!(within(step.velocity.x, velocity.x, step.desired.x));
            assert!(within(step.velocity.z, velocity.z, step.desired.z));
            assert!(step.velocity.horizontal_length() <= 2.0 * std::f32::consts::SQRT_2 + 1e-4);
            velocity = step.velocity;
        }
    }

    #[test]
    fn test_zero_input_decays_to_rest_in_time() {
        let loco = integrator();
        let basis = facing_north();
        let idle = InputSnapshot::default();

        let start = Vec3::new(1.2, -0.5, -1.6);
        let dt = 1.0 / 60.0;
        // Worst-case stopping time is |v| / deceleration
        let ticks = (start.horizontal_length() / 22.0 / dt).ceil() as usize;

        let mut velocity = start;
        for _ in 0..ticks {
            velocity = loco.step(dt, &basis, velocity, &idle).velocity;
        }

        assert_eq!(velocity.x, 0.0);
        assert_eq!(velocity.z, 0.0);
        assert_eq!(velocity.y, -0.5);
    }

    #[test]
    fn test_zero_dt_leaves_velocity() {
        let loco = integrator();
        let velocity = Vec3::new(0.4, 1.0, 0.3);
        let step = loco.step(0.0, &facing_north(), velocity, &keys(true, false, false, false));
        assert_eq!(step.velocity, velocity);
    }

    #[test]
    fn test_joystick_only_on_touch_channel() {
        let loco = integrator();
        let basis = facing_north();

        let mut input = InputSnapshot {
            move_axes: Vec2::new(0.0, 1.0),
            ..Default::default()
        };
        // Keyboard channel ignores the stick
        assert_eq!(loco.intent(&basis, &input), Vec3::ZERO);

        input.touch_mode = true;
        let dir = loco.intent(&basis, &input);
        assert!((dir.z + 1.0).abs() < 1e-6);

        // Below the threshold the keyboard flags are used instead
        input.move_axes = Vec2::new(0.0005, 0.0);
        input.keys.right = true;
        let dir = loco.intent(&basis, &input);
        assert!((dir.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_facing_gives_no_intent() {
        let loco = integrator();
        let basis = MoveBasis::from_direction(Vec3::UP);
        let step = loco.step(0.1, &basis, Vec3::ZERO, &keys(true, false, false, false));
        assert_eq!(step.velocity, Vec3::ZERO);
    }
}
