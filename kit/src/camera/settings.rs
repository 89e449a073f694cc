use serde::{Deserialize, Serialize};

use crate::{error::SetupError, layers::LayerMask, math::Vec3};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: FollowSettings,
    pub orbit: OrbitSettings,
    pub lens: Lens,
    /// Layers that block the camera.
    pub collision_mask: LayerMask,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: FollowSettings::default(),
            orbit: OrbitSettings::default(),
            lens: Lens::default(),
            collision_mask: LayerMask::ALL,
        }
    }
}

/// Follow distance, zoom and smoothing.
///
/// Distances are negative: the camera sits behind the anchor along the orbit direction, and
/// `max_zoom` is the closest allowed distance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowSettings {
    /// Offset from the target position to the point the camera orbits and looks at.
    pub target_offset: Vec3,
    pub look_smooth: f32,
    pub distance: f32,
    pub zoom_speed: f32,
    pub max_zoom: f32,
    pub min_zoom: f32,
    /// Hide the target when the camera is closer than this to the anchor.
    pub hide_threshold: f32,
    pub smooth_follow: bool,
    /// Exponential decay rate used when `smooth_follow` is set.
    pub smooth_decay: f32,
}

impl Default for FollowSettings {
    fn default() -> Self {
        Self {
            target_offset: Vec3::new(0.0, 3.4, 0.0),
            look_smooth: 100.0,
            distance: -8.0,
            zoom_speed: 10.0,
            max_zoom: -2.0,
            min_zoom: -15.0,
            hide_threshold: 1.0,
            smooth_follow: false,
            smooth_decay: 10.0,
        }
    }
}

/// Starting orbit angles and orbit limits (degrees, degrees per second).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub v_rotation: f32,
    pub h_rotation: f32,
    pub max_v_rotation: f32,
    pub min_v_rotation: f32,
    pub v_orbit_speed: f32,
    pub h_orbit_speed: f32,
    pub reset_smooth: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            v_rotation: -20.0,
            h_rotation: -180.0,
            max_v_rotation: 25.0,
            min_v_rotation: -85.0,
            v_orbit_speed: 150.0,
            h_orbit_speed: 150.0,
            reset_smooth: 10.0,
        }
    }
}

/// The camera frustum parameters the clip points are built from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Lens {
    pub near_clip: f32,
    /// Vertical field of view (degrees).
    pub fov_deg: f32,
    pub aspect: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            near_clip: 0.3,
            fov_deg: 60.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.position.min_zoom > self.position.max_zoom {
            return Err(SetupError::InvalidSetting {
                field: "camera.position.min_zoom",
                reason: "must not exceed max_zoom",
            });
        }
        if self.orbit.min_v_rotation > self.orbit.max_v_rotation {
            return Err(SetupError::InvalidSetting {
                field: "camera.orbit.min_v_rotation",
                reason: "must not exceed max_v_rotation",
            });
        }
        if self.lens.aspect <= 0.0 {
            return Err(SetupError::InvalidSetting {
                field: "camera.lens.aspect",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
