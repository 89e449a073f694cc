use serde::{Deserialize, Serialize};

use crate::{
    constants::{FORCE_GATE_COOLDOWN_SECS, PROBE_ORIGIN_HEIGHT},
    error::SetupError,
    layers::LayerMask,
    math::Vec3,
};

/// Character motor tuning.
///
/// Notes
/// - Values are expressed in meters, seconds and degrees.
/// - Masks select which collision layers each probe can hit; an empty mask disables the probe.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorSettings {
    pub gravity: GravitySettings,
    pub movement: MovementSettings,
    pub rotation: RotationSettings,
    pub probes: ProbeSettings,
    pub tags: SurfaceTagNames,
    /// How long the force gate stays closed after an accepted injection (seconds).
    pub force_cooldown_secs: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GravitySettings {
    /// Strength of gravity (m/s^2 for a unit-mass body).
    pub force: f32,
    /// Direction gravity pulls when not overridden by the ground surface.
    pub direction: Vec3,
    /// Pull into the surface the character stands on, instead of `direction`.
    ///
    /// Keeps characters from creeping down shallow slopes they are not sliding on.
    pub override_on_surface: bool,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            force: 10.0,
            direction: Vec3::new(0.0, -1.0, 0.0),
            override_on_surface: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Target planar speed for full input (m/s).
    pub speed: f32,
    /// Largest per-axis velocity change per fixed step while grounded (m/s).
    pub grounded_influence: f32,
    /// Largest per-axis velocity change per fixed step while airborne (m/s).
    pub air_influence: f32,
    /// Ground slope above which the character slides (degrees).
    pub slide_limit_deg: f32,
    /// Extra downward force applied while sliding, scaled by the fixed step.
    pub slide_force: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            speed: 8.0,
            grounded_influence: 1.0,
            air_influence: 0.5,
            slide_limit_deg: 35.0,
            slide_force: 5000.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSettings {
    /// Turn rate toward the facing target (slerp factor per second).
    pub speed: f32,
    /// Face the current velocity instead of the movement input.
    pub velocity_rotation: bool,
    /// Turn-rate multiplier while airborne. `1.0` or more turns at full rate in the air.
    pub air_rotation: f32,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            speed: 5.0,
            velocity_rotation: false,
            air_rotation: 0.1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub ground_mask: LayerMask,
    /// Length of the downward grounding ray (meters).
    pub ground_ray_distance: f32,
    pub wall_mask: LayerMask,
    /// Length of the forward wall ray (meters).
    pub wall_ray_distance: f32,
    /// Height above the body origin both rays start from (meters).
    pub origin_height: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            ground_mask: LayerMask::ALL,
            ground_ray_distance: 1.5,
            wall_mask: LayerMask::ALL,
            wall_ray_distance: 1.5,
            origin_height: PROBE_ORIGIN_HEIGHT,
        }
    }
}

/// Surface tag names the motor reacts to. Interned once when the motor is built.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceTagNames {
    /// Surfaces that never cause sliding, however steep.
    pub exempt: String,
    /// Surfaces that always cause sliding.
    pub slide: String,
    /// Surfaces that carry a character standing on them.
    pub moving_platform: String,
}

impl Default for SurfaceTagNames {
    fn default() -> Self {
        Self {
            exempt: "Prop".into(),
            slide: "Slide".into(),
            moving_platform: "Moving Platform".into(),
        }
    }
}

impl Default for MotorSettings {
    fn default() -> Self {
        Self {
            gravity: GravitySettings::default(),
            movement: MovementSettings::default(),
            rotation: RotationSettings::default(),
            probes: ProbeSettings::default(),
            tags: SurfaceTagNames::default(),
            force_cooldown_secs: FORCE_GATE_COOLDOWN_SECS,
        }
    }
}

impl MotorSettings {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.gravity.direction.norm_squared() == 0.0 {
            return Err(SetupError::InvalidSetting {
                field: "motor.gravity.direction",
                reason: "must be non-zero",
            });
        }
        if self.force_cooldown_secs < 0.0 {
            return Err(SetupError::InvalidSetting {
                field: "motor.force_cooldown_secs",
                reason: "must not be negative",
            });
        }
        if self.movement.speed < 0.0 {
            return Err(SetupError::InvalidSetting {
                field: "motor.movement.speed",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
