//! Physics body seam
//!
//! The controller never resolves contacts itself. It reads and writes the
//! linear velocity of whatever body the host's physics engine provides and
//! reads its position back for camera placement.

use stride_core::Vec3;

/// Rigid body handle consumed by the controller
pub trait PhysicsBody {
    /// Current linear velocity (m/s)
    fn linear_velocity(&self) -> Vec3;

    /// Overwrite the linear velocity
    fn set_linear_velocity(&mut self, velocity: Vec3);

    /// Body center in world space
    fn position(&self) -> Vec3;

    /// Teleport the body
    fn set_position(&mut self, position: Vec3);
}

/// Minimal kinematic body for headless runs
///
/// Integrates position from velocity, applies the same linear damping
/// formula as common rigid-body engines, and keeps the body resting on a
/// flat ground plane.
#[derive(Clone, Debug)]
pub struct KinematicBody {
    position: Vec3,
    velocity: Vec3,
    /// Linear damping coefficient (1/s), 0 = none
    pub linear_damping: f32,
    /// Lowest allowed body-center height, if the ground is enabled
    pub rest_height: Option<f32>,
}

impl KinematicBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            linear_damping: 0.0,
            rest_height: None,
        }
    }

    /// Rest on a ground plane with the body center at `height`
    pub fn with_rest_height(mut self, height: f32) -> Self {
        self.rest_height = Some(height);
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Advance the body by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        if self.linear_damping > 0.0 {
            self.velocity = self.velocity * (1.0 / (1.0 + dt * self.linear_damping));
        }

        self.position += self.velocity * dt;

        if let Some(rest) = self.rest_height {
            if self.position.y <= rest {
                self.position.y = rest;
                self.velocity.y = self.velocity.y.max(0.0);
            }
        }
    }
}

impl PhysicsBody for KinematicBody {
    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_integrates_and_rests_on_ground() {
        let mut body = KinematicBody::new(Vec3::new(0.0, 1.0, 0.0)).with_rest_height(1.0);
        body.set_linear_velocity(Vec3::new(2.0, -5.0, 0.0));
        body.step(0.5);

        assert_eq!(body.position(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(body.linear_velocity().y, 0.0);
        assert_eq!(body.linear_velocity().x, 2.0);
    }

    #[test]
    fn test_damping_slows_body() {
        let mut body = KinematicBody::new(Vec3::ZERO).with_linear_damping(4.0);
        body.set_linear_velocity(Vec3::new(1.0, 0.0, 0.0));
        body.step(0.25);
        assert!((body.linear_velocity().x - 0.5).abs() < 1e-6);
    }
}
