//! Near-plane clip points and the occlusion rays cast toward them.

use crate::{
    layers::LayerMask,
    math::{Quat, Vec3},
    physics::PhysicsQuery,
};

use super::settings::Lens;

/// Four near-plane corners (top left, top right, bottom left, bottom right) and a point one
/// unit behind the camera.
pub type ClipPoints = [Vec3; 5];

pub fn clip_points(lens: &Lens, position: Vec3, rotation: &Quat) -> ClipPoints {
    let z = lens.near_clip;
    let x = (lens.fov_deg / 4.0).to_radians().tan() * z;
    let y = x / lens.aspect;

    [
        rotation * Vec3::new(-x, y, z) + position,
        rotation * Vec3::new(x, y, z) + position,
        rotation * Vec3::new(-x, -y, z) + position,
        rotation * Vec3::new(x, -y, z) + position,
        position - rotation * Vec3::z(),
    ]
}

/// Distance from `from` to the closest obstruction on the way to each point, if any.
fn hits<'a>(
    scene: &'a impl PhysicsQuery,
    from: Vec3,
    points: &'a ClipPoints,
    mask: LayerMask,
) -> impl Iterator<Item = f32> + 'a {
    points.iter().filter_map(move |point| {
        let offset = point - from;
        let distance = offset.norm();
        let direction = offset.try_normalize(f32::EPSILON)?;
        scene
            .raycast(&from, &direction, distance, mask)
            .map(|hit| hit.distance)
    })
}

/// True when any ray from `from` to a clip point is blocked.
pub fn obstructed(scene: &impl PhysicsQuery, from: Vec3, points: &ClipPoints, mask: LayerMask) -> bool {
    hits(scene, from, points, mask).next().is_some()
}

/// Rounded distance to the nearest obstruction across all clip rays, or zero when clear.
pub fn adjusted_distance(
    scene: &impl PhysicsQuery,
    from: Vec3,
    points: &ClipPoints,
    mask: LayerMask,
) -> f32 {
    hits(scene, from, points, mask)
        .reduce(f32::min)
        .map_or(0.0, f32::round)
}
