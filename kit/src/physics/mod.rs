//! The physics seam: scene raycasts and collision-resolved body movement.
//!
//! The motor and camera only talk to the scene through these traits, so they run the same
//! against the Rapier world and against lightweight test scenes.

pub mod rapier_world;

use crate::{
    layers::LayerMask,
    math::{Pose, Vec3},
    surface::{SurfaceId, SurfaceInfo},
};

/// Result of a scene raycast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Distance from the ray origin to `point` (meters).
    pub distance: f32,
    pub surface: SurfaceInfo,
}

/// Read-only scene queries.
pub trait PhysicsQuery {
    /// Casts a ray and returns the closest hit on a surface whose layer is in `mask`.
    ///
    /// `direction` must be unit length. An empty mask never hits.
    fn raycast(
        &self,
        origin: &Vec3,
        direction: &Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;

    /// Current pose of a surface, for surfaces that can move.
    fn surface_pose(&self, _surface: SurfaceId) -> Option<Pose> {
        None
    }
}

/// Collision-corrected translation for one fixed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    pub translation: Vec3,
    pub grounded: bool,
}

/// Resolves a body's desired translation against the scene.
pub trait BodyMover {
    fn move_body(&mut self, pose: &Pose, desired: Vec3, dt: f32) -> MoveOutcome;
}

/// Mover with no obstacles beyond an optional flat floor at `floor_height`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FreeMover {
    pub floor_height: Option<f32>,
}

impl BodyMover for FreeMover {
    fn move_body(&mut self, pose: &Pose, desired: Vec3, _dt: f32) -> MoveOutcome {
        let Some(floor) = self.floor_height else {
            return MoveOutcome {
                translation: desired,
                grounded: false,
            };
        };

        let mut translation = desired;
        let target_y = pose.position.y + desired.y;
        let grounded = target_y <= floor;
        if grounded {
            translation.y = floor - pose.position.y;
        }
        MoveOutcome {
            translation,
            grounded,
        }
    }
}
