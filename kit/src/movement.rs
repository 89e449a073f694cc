//! Turns the input snapshot into a camera-relative movement direction for the motor.

use crate::{
    body::Body,
    camera::CameraRig,
    constants::{DIAGONAL_INPUT_SCALE, STRAFE_ORBIT_MIN_DISTANCE, STRAFE_ORBIT_SPEED},
    input::{ControlType, InputSnapshot},
    math::{Vec3, flatten, wrap_half_turn},
    motor::CharacterMotor,
};

/// Movement readout for animation observers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Locomotion {
    /// Planar speed (m/s).
    pub speed: f32,
    pub grounded: bool,
}

/// World-space movement for the given input, relative to the camera's flattened forward.
///
/// Fully deflected diagonals are scaled down so they are no faster than a single axis.
pub fn camera_relative_direction(input: &InputSnapshot, camera_forward: &Vec3) -> Vec3 {
    let forward = flatten(camera_forward);
    let right = Vec3::new(forward.z, 0.0, -forward.x);

    let direction = right * input.move_h + forward * input.move_v;
    if input.move_h.abs() == 1.0 && input.move_v.abs() == 1.0 {
        direction * DIAGONAL_INPUT_SCALE
    } else {
        direction
    }
}

/// Sets the motor's movement direction from input and returns the locomotion readout.
///
/// With a stick or touch joystick, strafing while grounded also swings the camera orbit.
pub fn drive(
    input: &InputSnapshot,
    motor: &mut CharacterMotor,
    body: &Body,
    camera: &mut CameraRig,
    dt: f32,
) -> Locomotion {
    motor.set_movement_direction(camera_relative_direction(input, &camera.pose().forward()));

    let grounded = motor.state().grounded;
    let stick = matches!(input.control_type, ControlType::Gamepad | ControlType::Mobile);
    if stick && grounded && camera.distance() < STRAFE_ORBIT_MIN_DISTANCE {
        let orbit = camera.orbit_mut();
        orbit.h = wrap_half_turn(orbit.h + input.move_h * STRAFE_ORBIT_SPEED * dt);
    }

    Locomotion {
        speed: Vec3::new(body.velocity.x, 0.0, body.velocity.z).norm(),
        grounded,
    }
}
