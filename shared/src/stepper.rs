//! Simulation stepper capability and a deterministic kinematic implementation

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of the simulated actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn of<S: Stepper + ?Sized>(stepper: &S) -> Self {
        Self {
            position: stepper.position(),
            rotation: stepper.rotation(),
        }
    }

    pub fn position_error_sq(&self, other: &Pose) -> f32 {
        (self.position - other.position).length_squared()
    }

    /// Raw quaternion dot product, 1.0 for identical rotations.
    pub fn rotation_dot(&self, other: &Pose) -> f32 {
        self.rotation.dot(other.rotation)
    }
}

/// Fixed-step physics for one actor.
///
/// Implementations must be deterministic: the same state, impulses and `dt`
/// always produce the same resulting state. Client resimulation relies on it.
pub trait Stepper {
    fn step(&mut self, dt: f32);

    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);

    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);

    /// Instantaneous change in momentum. The default assumes unit mass.
    fn apply_impulse(&mut self, impulse: Vec3) {
        let velocity = self.velocity();
        self.set_velocity(velocity + impulse);
    }
}

/// Semi-implicit Euler body with gravity, damping and a flat ground plane.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub gravity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub ground_height: f32,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            gravity: 9.81,
            linear_damping: 0.5,
            angular_damping: 0.5,
            ground_height: 0.0,
        }
    }
}

impl KinematicBody {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.position.y <= self.ground_height
    }
}

impl Stepper for KinematicBody {
    fn step(&mut self, dt: f32) {
        self.velocity.y -= self.gravity * dt;
        self.velocity *= (1.0 - self.linear_damping * dt).max(0.0);
        self.position += self.velocity * dt;

        if self.position.y < self.ground_height {
            self.position.y = self.ground_height;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        }

        let spin = Quat::from_scaled_axis(self.angular_velocity * dt);
        self.rotation = (spin * self.rotation).normalize();
        self.angular_velocity *= (1.0 - self.angular_damping * dt).max(0.0);
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse / self.mass;
    }
}
