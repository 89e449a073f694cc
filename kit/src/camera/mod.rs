//! Third-person orbit camera with zoom, reset-behind-target and clip-point occlusion.
//!
//! Zoom runs in the variable phase ([`CameraRig::update`]); following, looking, orbiting and
//! the occlusion checks run in the fixed phase ([`CameraRig::fixed_update`]). The occlusion
//! flag is computed at the end of a fixed step and steers the next one.

pub mod clip;
pub mod settings;

pub use clip::{ClipPoints, adjusted_distance, clip_points, obstructed};
pub use settings::{CameraSettings, FollowSettings, Lens, OrbitSettings};

use crate::{
    constants::{CAMERA_RESET_TOLERANCE_DEG, STICK_ZOOM_DIVISOR},
    error::SetupError,
    input::{ControlType, InputSnapshot},
    math::{Pose, Quat, Vec3, is_zero, lerp, orbit_rotation, smooth_nudge, wrap_half_turn, yaw_degrees},
    physics::PhysicsQuery,
};

/// Orbit angles around the anchor (degrees).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitState {
    pub v: f32,
    /// Kept in `[-180, 180]`.
    pub h: f32,
    pub resetting: bool,
}

impl OrbitState {
    /// Adds input deltas, wraps the horizontal angle once and clamps the vertical one.
    pub fn apply(&mut self, dv: f32, dh: f32, settings: &OrbitSettings) {
        self.v += dv;
        self.h = wrap_half_turn(self.h + dh);
        self.v = self.v.clamp(settings.min_v_rotation, settings.max_v_rotation);
    }

    pub fn rotation(&self) -> Quat {
        orbit_rotation(self.v, self.h)
    }
}

/// What the camera follows: the target's pose and whether it is trying to move.
#[derive(Clone, Copy, Debug)]
pub struct CameraTarget {
    pub pose: Pose,
    pub movement_direction: Vec3,
}

pub struct CameraRig {
    settings: CameraSettings,
    pose: Pose,
    orbit: OrbitState,
    distance: f32,
    anchor: Vec3,
    destination: Vec3,
    adjusted_destination: Vec3,
    adjusted_distance: f32,
    colliding: bool,
    desired_clip: ClipPoints,
    adjusted_clip: ClipPoints,
    target_hidden: bool,
}

impl CameraRig {
    /// Places the camera at its desired spot behind `target`, looking at the anchor.
    pub fn new(settings: CameraSettings, target: &Pose) -> Result<Self, SetupError> {
        settings.validate()?;
        let orbit = OrbitState {
            v: settings.orbit.v_rotation,
            h: settings.orbit.h_rotation,
            resetting: false,
        };
        let distance = settings
            .position
            .distance
            .clamp(settings.position.min_zoom, settings.position.max_zoom);
        let anchor = target.position + settings.position.target_offset;
        let destination = orbit.rotation() * -Vec3::z() * distance + anchor;
        let rotation = look_at(&destination, &anchor).unwrap_or_else(Quat::identity);
        let clip = clip_points(&settings.lens, destination, &rotation);

        Ok(Self {
            settings,
            pose: Pose::new(destination, rotation),
            orbit,
            distance,
            anchor,
            destination,
            adjusted_destination: destination,
            adjusted_distance: 0.0,
            colliding: false,
            desired_clip: clip,
            adjusted_clip: clip,
            target_hidden: false,
        })
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitState {
        &mut self.orbit
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Current follow distance (negative, between `min_zoom` and `max_zoom`).
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    pub fn adjusted_destination(&self) -> Vec3 {
        self.adjusted_destination
    }

    pub fn adjusted_distance(&self) -> f32 {
        self.adjusted_distance
    }

    pub fn is_colliding(&self) -> bool {
        self.colliding
    }

    pub fn desired_clip_points(&self) -> &ClipPoints {
        &self.desired_clip
    }

    pub fn adjusted_clip_points(&self) -> &ClipPoints {
        &self.adjusted_clip
    }

    pub fn is_target_hidden(&self) -> bool {
        self.target_hidden
    }

    /// Variable-step phase: zoom.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) {
        let follow = &self.settings.position;
        let delta = match input.control_type {
            ControlType::Keyboard => input.scroll * follow.zoom_speed * dt,
            ControlType::Gamepad | ControlType::Mobile => {
                input.camera_v * follow.zoom_speed / STICK_ZOOM_DIVISOR * dt
            }
        };
        self.distance = (self.distance + delta).clamp(follow.min_zoom, follow.max_zoom);
    }

    /// Fixed-step phase: follow, look, orbit, then refresh clip points and occlusion.
    ///
    /// Returns the new visibility of the target when it changed this step.
    pub fn fixed_update(
        &mut self,
        target: &CameraTarget,
        input: &InputSnapshot,
        scene: &impl PhysicsQuery,
        dt: f32,
    ) -> Option<bool> {
        self.move_to_target(target, scene, dt);
        self.look_at_target(dt);
        self.orbit_target(target, input, dt);

        let lens = &self.settings.lens;
        self.adjusted_clip = clip_points(lens, self.pose.position, &self.pose.rotation);
        self.desired_clip = clip_points(lens, self.destination, &self.pose.rotation);
        self.colliding = obstructed(
            scene,
            self.anchor,
            &self.desired_clip,
            self.settings.collision_mask,
        );

        self.update_hidden()
    }

    fn move_to_target(&mut self, target: &CameraTarget, scene: &impl PhysicsQuery, dt: f32) {
        let follow = &self.settings.position;
        self.anchor = target.pose.position + follow.target_offset;
        let rotation = self.orbit.rotation();
        self.destination = rotation * -Vec3::z() * self.distance + self.anchor;

        let goal = if self.colliding {
            self.adjusted_distance = adjusted_distance(
                scene,
                self.anchor,
                &self.desired_clip,
                self.settings.collision_mask,
            );
            self.adjusted_destination = rotation * Vec3::z() * self.adjusted_distance + self.anchor;
            self.adjusted_destination
        } else {
            self.destination
        };

        self.pose.position = if follow.smooth_follow {
            smooth_nudge(&self.pose.position, &goal, follow.smooth_decay, dt)
        } else {
            goal
        };
    }

    fn look_at_target(&mut self, dt: f32) {
        let Some(goal) = look_at(&self.pose.position, &self.anchor) else {
            return;
        };
        let t = (self.settings.position.look_smooth * dt).clamp(0.0, 1.0);
        self.pose.rotation = self
            .pose
            .rotation
            .try_slerp(&goal, t, 1.0e-6)
            .unwrap_or(goal);
    }

    fn orbit_target(&mut self, target: &CameraTarget, input: &InputSnapshot, dt: f32) {
        let orbit = &self.settings.orbit;
        if input.camera_reset > 0.0 || self.orbit.resetting {
            if is_zero(&target.movement_direction) {
                let behind = yaw_degrees(&target.pose.rotation) - 180.0;
                self.orbit.resetting = true;
                self.orbit.h = lerp(self.orbit.h, behind, orbit.reset_smooth * dt);
                if (self.orbit.h - behind).abs() < CAMERA_RESET_TOLERANCE_DEG {
                    self.orbit.resetting = false;
                }
            } else {
                self.orbit.resetting = false;
            }
        }

        self.orbit.apply(
            input.camera_v * orbit.v_orbit_speed * dt,
            input.camera_h * orbit.h_orbit_speed * dt,
            orbit,
        );
    }

    fn update_hidden(&mut self) -> Option<bool> {
        let hide = (self.anchor - self.pose.position).norm() < self.settings.position.hide_threshold;
        if hide == self.target_hidden {
            return None;
        }
        self.target_hidden = hide;
        log::debug!("camera: target hidden = {hide}");
        Some(hide)
    }
}

/// Rotation whose forward axis points from `eye` to `target`.
fn look_at(eye: &Vec3, target: &Vec3) -> Option<Quat> {
    let direction = target - eye;
    if is_zero(&direction) || is_zero(&direction.cross(&Vec3::y())) {
        return None;
    }
    Some(Quat::face_towards(&direction, &Vec3::y()))
}
