//! The demo level: flat ground, a walkable slope, a forced-slide ramp, a wall and a moving
//! platform.
//!
//! Surface ids are stable and double as insertion order.

use std::f32::consts::TAU;

use kit::{
    ColliderShapeDef, Layer, Pose, Quat, RapierWorld, SurfaceDef, SurfaceId, TagRegistry, Vec3,
    define_layers,
};

define_layers!(LevelLayer, {
    Ground,
    Wall,
    Platform,
});

pub const PLATFORM_ID: SurfaceId = 5;

/// Platform path: back and forth along X around its rest position.
const PLATFORM_REST: [f32; 3] = [-6.0, 0.25, 8.0];
const PLATFORM_SWING: f32 = 3.0;
const PLATFORM_PERIOD_SECS: f32 = 6.0;

pub fn build(registry: &mut TagRegistry) -> RapierWorld {
    let slide = registry.intern("Slide");
    let platform = registry.intern("Moving Platform");
    let tilt = |deg: f32| Quat::from_axis_angle(&Vec3::x_axis(), -deg.to_radians());

    RapierWorld::build(vec![
        SurfaceDef {
            id: 1,
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Plane,
            layer: Layer::of(LevelLayer::Ground),
            tag: None,
        },
        // Gentle ramp, walkable.
        SurfaceDef {
            id: 2,
            translation: Vec3::new(6.0, 0.0, 10.0),
            rotation: tilt(20.0),
            shape: ColliderShapeDef::RoundCuboid {
                half_extents: Vec3::new(2.0, 0.2, 4.0),
                border_radius: 0.05,
            },
            layer: Layer::of(LevelLayer::Ground),
            tag: None,
        },
        // Shallow but tagged: always slides.
        SurfaceDef {
            id: 3,
            translation: Vec3::new(0.0, 0.0, 14.0),
            rotation: tilt(15.0),
            shape: ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(2.0, 0.2, 3.0),
            },
            layer: Layer::of(LevelLayer::Ground),
            tag: Some(slide),
        },
        SurfaceDef {
            id: 4,
            translation: Vec3::new(0.0, 2.0, 24.0),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(8.0, 2.0, 0.5),
            },
            layer: Layer::of(LevelLayer::Wall),
            tag: None,
        },
        SurfaceDef {
            id: PLATFORM_ID,
            translation: Vec3::from(PLATFORM_REST),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(1.5, 0.25, 1.5),
            },
            layer: Layer::of(LevelLayer::Platform),
            tag: Some(platform),
        },
        // A pillar to hide the camera behind.
        SurfaceDef {
            id: 6,
            translation: Vec3::new(-3.0, 2.0, -4.0),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::CylinderY {
                radius: 0.6,
                half_height: 2.0,
            },
            layer: Layer::of(LevelLayer::Wall),
            tag: None,
        },
    ])
}

/// Pose of the moving platform at `time` seconds.
pub fn platform_pose(time: f32) -> Pose {
    let phase = (time / PLATFORM_PERIOD_SECS * TAU).sin();
    Pose::at(Vec3::from(PLATFORM_REST) + Vec3::x() * PLATFORM_SWING * phase)
}
