//! Rapier-backed level: tagged, layered surfaces that support scene raycasts and the
//! Rapier `KinematicCharacterController`.
//!
//! Surfaces are parentless colliders. Static ones never move; moving platforms are
//! repositioned with [`RapierWorld::set_surface_pose`], which refreshes the broad phase.

// Re-export Rapier so downstream crates can use Rapier macros/types
// without needing to depend on `rapier3d` directly.
pub use rapier3d;

use std::collections::HashMap;

use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;

use crate::{
    layers::{FlagBitmask, Layer, LayerMask},
    math::{Pose, Quat, Vec3},
    physics::{BodyMover, MoveOutcome, PhysicsQuery, RayHit},
    surface::{SurfaceId, SurfaceInfo, Tag, pack_surface, unpack_surface},
};

/// Definition of a level surface.
///
/// Conventions
/// - Units are meters.
/// - For planes, the normal is derived from the pose as `rotation * +Y`.
#[derive(Clone, Debug)]
pub struct SurfaceDef {
    /// Stable unique identifier, also used to order insertion.
    pub id: SurfaceId,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    pub layer: Layer,
    pub tag: Option<Tag>,
}

/// Supported surface shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space) through the pose translation.
    Plane,

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    Sphere { radius: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Rounded cuboid (meters). `border_radius` rounds all edges/corners.
    RoundCuboid {
        half_extents: Vec3,
        border_radius: f32,
    },
}

/// Upright capsule used to sweep a character through the level.
///
/// The body pose is at the capsule's feet, so the shape center sits
/// `half_height + radius` above it.
#[derive(Clone, Copy, Debug)]
pub struct CapsuleDef {
    pub radius: f32,
    pub half_height: f32,
}

impl Default for CapsuleDef {
    fn default() -> Self {
        Self {
            radius: 0.5,
            half_height: 0.5,
        }
    }
}

impl CapsuleDef {
    fn center_offset(&self) -> Vec3 {
        Vec3::new(0.0, self.half_height + self.radius, 0.0)
    }
}

pub struct RapierWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    collision_pipeline: CollisionPipeline,
    handles: HashMap<SurfaceId, ColliderHandle>,
    kcc: KinematicCharacterController,
}

impl RapierWorld {
    /// Build the level from surface definitions, sorted by `id` for deterministic insertion.
    pub fn build(mut defs: Vec<SurfaceDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut colliders = ColliderSet::new();
        let mut handles = HashMap::with_capacity(defs.len());
        for def in defs.iter() {
            if def.layer.mask() == 0 {
                log::warn!(
                    "surface {} uses layer {}, past bit 31; no query mask will hit it",
                    def.id,
                    def.layer.0
                );
            }
            let mut collider = collider_from_def(def);
            collider.user_data = pack_surface(SurfaceInfo {
                id: def.id,
                layer: def.layer,
                tag: def.tag,
            });
            handles.insert(def.id, colliders.insert(collider));
        }

        let kcc = KinematicCharacterController {
            autostep: Some(CharacterAutostep {
                include_dynamic_bodies: false,
                max_height: CharacterLength::Relative(0.4),
                ..CharacterAutostep::default()
            }),
            offset: CharacterLength::Relative(0.025),
            ..KinematicCharacterController::default()
        };

        let mut world = Self {
            bodies: RigidBodySet::new(),
            colliders,
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            collision_pipeline: CollisionPipeline::new(),
            handles,
            kcc,
        };
        world.refresh();
        log::info!("rapier world built with {} surfaces", world.handles.len());
        world
    }

    /// Moves a surface (typically a moving platform). Unknown ids are ignored.
    pub fn set_surface_pose(&mut self, id: SurfaceId, pose: Pose) {
        let Some(collider) = self
            .handles
            .get(&id)
            .and_then(|h| self.colliders.get_mut(*h))
        else {
            log::warn!("set_surface_pose: no surface with id {id}");
            return;
        };
        collider.set_position(pose.to_isometry());
        self.refresh();
    }

    /// A mover that sweeps `capsule` through this world.
    pub fn mover(&self, capsule: CapsuleDef) -> RapierMover<'_> {
        RapierMover {
            world: self,
            capsule,
        }
    }

    // Runs collision detection only (no dynamics) to update the broad-phase BVH and
    // narrow-phase contact graph.
    fn refresh(&mut self) {
        let hooks = ();
        let events = ();
        self.collision_pipeline.step(
            0.0,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &hooks,
            &events,
        );
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl PhysicsQuery for RapierWorld {
    fn raycast(
        &self,
        origin: &Vec3,
        direction: &Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        if mask.is_empty() {
            return None;
        }

        let in_mask =
            |_: ColliderHandle, c: &Collider| mask.contains(unpack_surface(c.user_data).layer);
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&in_mask));
        let ray = Ray::new(Point::from(*origin), *direction);
        let (handle, hit) = pipeline.cast_ray_and_get_normal(&ray, max_distance, true)?;
        let collider = self.colliders.get(handle)?;

        Some(RayHit {
            point: ray.point_at(hit.time_of_impact).coords,
            normal: hit.normal,
            distance: hit.time_of_impact,
            surface: unpack_surface(collider.user_data),
        })
    }

    fn surface_pose(&self, surface: SurfaceId) -> Option<Pose> {
        let handle = self.handles.get(&surface)?;
        self.colliders
            .get(*handle)
            .map(|c| Pose::from_isometry(c.position()))
    }
}

/// [`BodyMover`] backed by the Rapier character controller.
pub struct RapierMover<'a> {
    world: &'a RapierWorld,
    capsule: CapsuleDef,
}

impl BodyMover for RapierMover<'_> {
    fn move_body(&mut self, pose: &Pose, desired: Vec3, dt: f32) -> MoveOutcome {
        let pipeline = self.world.query_pipeline(QueryFilter::default());
        let center = Pose::new(pose.position + self.capsule.center_offset(), pose.rotation);
        let correction = self.world.kcc.move_shape(
            dt,
            &pipeline,
            &Capsule::new_y(self.capsule.half_height, self.capsule.radius),
            &center.to_isometry(),
            desired,
            |_| {},
        );
        MoveOutcome {
            translation: correction.translation,
            grounded: correction.grounded,
        }
    }
}

/// Build a parentless Rapier collider positioned at the definition's pose.
fn collider_from_def(def: &SurfaceDef) -> Collider {
    let pose = Pose::new(def.translation, def.rotation);
    let mut collider = match &def.shape {
        ColliderShapeDef::Plane => {
            // The half-space normal comes from the pose, so the collider itself keeps the
            // pose's rotation with a local +Y normal.
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(Vector::y_axis()))).build()
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build()
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius).build(),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius).build(),

        ColliderShapeDef::RoundCuboid {
            half_extents,
            border_radius,
        } => ColliderBuilder::round_cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
            *border_radius,
        )
        .build(),
    };
    collider.set_position(pose.to_isometry());
    collider
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_and_wall(tags: &mut crate::surface::TagRegistry) -> RapierWorld {
        let prop = tags.intern("Prop");
        RapierWorld::build(vec![
            SurfaceDef {
                id: 2,
                translation: Vec3::new(0.0, 1.0, 5.0),
                rotation: Quat::identity(),
                shape: ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(2.0, 1.0, 0.5),
                },
                layer: Layer(1),
                tag: Some(prop),
            },
            SurfaceDef {
                id: 1,
                translation: Vec3::zeros(),
                rotation: Quat::identity(),
                shape: ColliderShapeDef::Plane,
                layer: Layer(0),
                tag: None,
            },
        ])
    }

    #[test]
    fn raycast_honors_layer_mask() {
        let mut tags = crate::surface::TagRegistry::new();
        let world = floor_and_wall(&mut tags);
        let origin = Vec3::new(0.0, 1.0, 0.0);

        let down = world
            .raycast(&origin, &-Vec3::y(), 1.5, LayerMask::new(0b01))
            .expect("floor hit");
        assert!((down.distance - 1.0).abs() < 1.0e-3);
        assert!((down.normal - Vec3::y()).norm() < 1.0e-3);
        assert_eq!(down.surface.id, 1);

        // The wall is on layer 1 only.
        assert!(
            world
                .raycast(&origin, &Vec3::z(), 10.0, LayerMask::new(0b01))
                .is_none()
        );
        let wall = world
            .raycast(&origin, &Vec3::z(), 10.0, LayerMask::new(0b10))
            .expect("wall hit");
        assert!((wall.distance - 4.5).abs() < 1.0e-3);
        assert_eq!(wall.surface.tag, tags.get("Prop"));

        assert!(world.raycast(&origin, &-Vec3::y(), 1.5, LayerMask::NONE).is_none());
    }

    #[test]
    fn surface_on_an_out_of_range_layer_is_never_hit() {
        let world = RapierWorld::build(vec![SurfaceDef {
            id: 1,
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Plane,
            layer: Layer(32),
            tag: None,
        }]);

        let origin = Vec3::new(0.0, 1.0, 0.0);
        assert!(world.raycast(&origin, &-Vec3::y(), 1.5, LayerMask::ALL).is_none());
        assert!(world.raycast(&origin, &-Vec3::y(), 1.5, LayerMask::new(0b1)).is_none());
    }

    #[test]
    fn moving_a_surface_updates_queries() {
        let mut tags = crate::surface::TagRegistry::new();
        let mut world = floor_and_wall(&mut tags);
        world.set_surface_pose(2, Pose::at(Vec3::new(0.0, 1.0, 8.0)));

        let wall = world
            .raycast(&Vec3::new(0.0, 1.0, 0.0), &Vec3::z(), 10.0, LayerMask::new(0b10))
            .expect("wall hit");
        assert!((wall.distance - 7.5).abs() < 1.0e-3);
        let pose = world.surface_pose(2).expect("known surface");
        assert!((pose.position.z - 8.0).abs() < 1.0e-6);
    }

    #[test]
    fn mover_lands_on_floor() {
        let mut tags = crate::surface::TagRegistry::new();
        let world = floor_and_wall(&mut tags);
        let mut mover = world.mover(CapsuleDef::default());
        let pose = Pose::at(Vec3::new(0.0, 0.5, 0.0));

        let outcome = mover.move_body(&pose, Vec3::new(0.0, -2.0, 0.0), 0.02);
        assert!(outcome.translation.y > -0.6);
        assert!(outcome.grounded);
    }
}
