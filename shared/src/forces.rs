//! Input-to-impulse mapping shared by prediction and authoritative replay

use crate::{InputCommand, MovementConfig, Stepper};

/// Applies `input` to `stepper` as instantaneous impulses.
///
/// Client prediction, client resimulation and server replay all go through
/// this function so that identical inputs on identical state step identically.
pub fn apply_input_forces<S: Stepper + ?Sized>(
    stepper: &mut S,
    input: &InputCommand,
    movement: &MovementConfig,
) {
    let impulse = movement.impulse;

    if input.forward {
        stepper.apply_impulse(movement.forward * impulse);
    }
    if input.backward {
        stepper.apply_impulse(-movement.forward * impulse);
    }
    if input.left {
        stepper.apply_impulse(-movement.right * impulse);
    }
    if input.right {
        stepper.apply_impulse(movement.right * impulse);
    }
    if input.jump && stepper.position().y <= movement.jump_height_threshold {
        stepper.apply_impulse(movement.up * impulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KinematicBody;
    use assert_approx_eq::assert_approx_eq;
    use glam::Vec3;

    #[test]
    fn test_directional_impulses() {
        let movement = MovementConfig::default();
        let mut body = KinematicBody::default();

        apply_input_forces(&mut body, &InputCommand::forward(), &movement);
        assert_approx_eq!(body.velocity.z, movement.impulse);

        let strafe = InputCommand {
            left: true,
            ..InputCommand::IDLE
        };
        apply_input_forces(&mut body, &strafe, &movement);
        assert_approx_eq!(body.velocity.x, -movement.impulse);
    }

    #[test]
    fn test_opposite_flags_cancel() {
        let movement = MovementConfig::default();
        let mut body = KinematicBody::default();
        let input = InputCommand {
            forward: true,
            backward: true,
            left: true,
            right: true,
            jump: false,
        };
        apply_input_forces(&mut body, &input, &movement);
        assert_eq!(body.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_jump_only_below_threshold() {
        let movement = MovementConfig::default();
        let jump = InputCommand {
            jump: true,
            ..InputCommand::IDLE
        };

        let mut grounded = KinematicBody::default();
        apply_input_forces(&mut grounded, &jump, &movement);
        assert_approx_eq!(grounded.velocity.y, movement.impulse);

        let mut airborne = KinematicBody::at(Vec3::new(0.0, 5.0, 0.0));
        apply_input_forces(&mut airborne, &jump, &movement);
        assert_eq!(airborne.velocity.y, 0.0);
    }

    #[test]
    fn test_camera_relative_basis() {
        let movement = MovementConfig {
            forward: Vec3::X,
            right: Vec3::NEG_Z,
            ..MovementConfig::default()
        };
        let mut body = KinematicBody::default();
        apply_input_forces(&mut body, &InputCommand::forward(), &movement);
        assert_approx_eq!(body.velocity.x, movement.impulse);
        assert_eq!(body.velocity.z, 0.0);
    }
}
