use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector2, Vector3};

use crate::constants::{DIRECTION_EPS_SQ, YAW_EPS};

pub type Vec3 = Vector3<f32>;
pub type Quat = UnitQuaternion<f32>;

/// World up. The kit is Y-up with +Z as the body's forward axis.
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Position and orientation of a body, camera or surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::identity())
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    pub fn from_isometry(iso: &Isometry3<f32>) -> Self {
        Self::new(iso.translation.vector, iso.rotation)
    }
}

pub fn is_zero(v: &Vec3) -> bool {
    v.norm_squared() <= DIRECTION_EPS_SQ
}

/// Drops the vertical component and renormalizes. Zero when `v` is vertical.
pub fn flatten(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
        .try_normalize(0.0)
        .unwrap_or_else(Vec3::zeros)
}

/// Yaw (radians) that faces the planar direction `xz`, measured from +Z toward +X.
pub fn yaw_from_xz(xz: Vector2<f32>) -> Option<f32> {
    if xz.norm_squared() > YAW_EPS {
        return Some(xz[0].atan2(xz[1]));
    }

    None
}

/// Yaw-only rotation facing `direction`. `None` when the direction has no planar part.
pub fn look_rotation_yaw(direction: &Vec3) -> Option<Quat> {
    yaw_from_xz(Vector2::new(direction.x, direction.z))
        .map(|yaw| Quat::from_axis_angle(&Vec3::y_axis(), yaw))
}

/// Heading of `rotation` in degrees, normalized to `[0, 360)`.
pub fn yaw_degrees(rotation: &Quat) -> f32 {
    let f = rotation * Vec3::z();
    f.x.atan2(f.z).to_degrees().rem_euclid(360.0)
}

/// Camera orbit rotation: yaw `h` about world up applied after pitch `v` about X (degrees).
pub fn orbit_rotation(v_deg: f32, h_deg: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), h_deg.to_radians())
        * Quat::from_axis_angle(&Vec3::x_axis(), v_deg.to_radians())
}

/// Wraps an angle that has crossed ±180 by a single turn.
///
/// Orbit input moves at most a fraction of a turn per tick, so one correction is enough.
pub fn wrap_half_turn(deg: f32) -> f32 {
    if deg > 180.0 {
        deg - 360.0
    } else if deg < -180.0 {
        deg + 360.0
    } else {
        deg
    }
}

/// Angle between two vectors in degrees.
pub fn angle_between_deg(a: &Vec3, b: &Vec3) -> f32 {
    if is_zero(a) || is_zero(b) {
        return 0.0;
    }
    a.angle(b).to_degrees()
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Frame-rate independent exponential approach of `current` toward `target`.
pub fn smooth_nudge(current: &Vec3, target: &Vec3, decay_rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, 1.0 - (-decay_rate * dt).exp())
}
