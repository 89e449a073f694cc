use crate::{
    math::Vec3,
    physics::RayHit,
    surface::{SurfaceId, Tag, TagRegistry},
};

use super::settings::SurfaceTagNames;

/// What the motor learned about its surroundings this tick.
///
/// `grounded` and `wall_collision` come from two independent raycasts made every tick;
/// neither is carried over from a previous tick.
#[derive(Clone, Copy, Debug)]
pub struct MotionState {
    pub grounded: bool,
    pub sliding: bool,
    /// Normal of the last ground hit. Kept after leaving the ground, like the hit itself.
    pub ground_normal: Vec3,
    pub ground_hit: Option<RayHit>,
    pub wall_collision: bool,
    pub wall_hit: Option<RayHit>,
    pub on_moving_platform: bool,
    /// Body velocity mirrored at the end of the last fixed step.
    pub velocity: Vec3,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            grounded: false,
            sliding: false,
            ground_normal: Vec3::zeros(),
            ground_hit: None,
            wall_collision: false,
            wall_hit: None,
            on_moving_platform: false,
            velocity: Vec3::zeros(),
        }
    }
}

impl MotionState {
    pub fn wall_normal(&self) -> Vec3 {
        self.wall_hit.map(|hit| hit.normal).unwrap_or_else(Vec3::zeros)
    }
}

/// Which source the body faces this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RotationIntent {
    /// One-shot facing set by a jump or knockback; snaps instantly.
    Override(Vec3),
    /// Face the current velocity (velocity-rotation mode or sliding).
    Velocity,
    /// Face the movement input.
    MovementDirection,
}

/// How an accepted velocity injection treats the velocity already on the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VelocityReset {
    #[default]
    Keep,
    /// Zero vertical velocity so stacked air jumps reach the same height.
    Vertical,
    /// Zero all velocity before adding the injection.
    All,
}

/// An external velocity change submitted through the force gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityImpulse {
    pub delta: Vec3,
    pub reset: VelocityReset,
}

impl VelocityImpulse {
    pub fn add(delta: Vec3) -> Self {
        Self {
            delta,
            reset: VelocityReset::Keep,
        }
    }

    pub fn with_reset(delta: Vec3, reset: VelocityReset) -> Self {
        Self { delta, reset }
    }

    /// Velocity after this impulse is applied on top of `velocity`.
    pub fn apply_to(&self, velocity: Vec3) -> Vec3 {
        let base = match self.reset {
            VelocityReset::Keep => velocity,
            VelocityReset::Vertical => Vec3::new(velocity.x, 0.0, velocity.z),
            VelocityReset::All => Vec3::zeros(),
        };
        base + self.delta
    }
}

/// Serializes external velocity injections: while closed, new requests are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForceGate {
    closed: bool,
}

impl ForceGate {
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the gate if it was open. Returns whether the caller may apply its change.
    pub fn try_close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        true
    }

    pub fn reopen(&mut self) {
        self.closed = false;
    }
}

/// Interned versions of [`SurfaceTagNames`].
#[derive(Clone, Copy, Debug)]
pub struct SurfaceTags {
    pub exempt: Tag,
    pub slide: Tag,
    pub moving_platform: Tag,
}

impl SurfaceTags {
    pub fn resolve(names: &SurfaceTagNames, registry: &mut TagRegistry) -> Self {
        Self {
            exempt: registry.intern(&names.exempt),
            slide: registry.intern(&names.slide),
            moving_platform: registry.intern(&names.moving_platform),
        }
    }
}

/// Sliding rule: steeper than the limit on a non-exempt surface, or any forced-slide surface.
pub fn is_sliding(slope_deg: f32, slide_limit_deg: f32, tag: Option<Tag>, tags: &SurfaceTags) -> bool {
    let steep = slope_deg > slide_limit_deg && tag != Some(tags.exempt);
    steep || tag == Some(tags.slide)
}

/// Link to the platform a character is riding, with the platform pose last applied.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlatformLink {
    pub surface: SurfaceId,
    pub last_pose: Option<crate::math::Pose>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> (TagRegistry, SurfaceTags) {
        let mut registry = TagRegistry::new();
        let tags = SurfaceTags::resolve(&SurfaceTagNames::default(), &mut registry);
        (registry, tags)
    }

    #[test]
    fn sliding_depends_on_slope_and_tags() {
        let (mut registry, tags) = tags();
        let rock = registry.intern("Rock");

        for slope in [0.0, 10.0, 34.9, 35.0, 35.1, 60.0, 89.0] {
            let steep = slope > 35.0;
            assert_eq!(is_sliding(slope, 35.0, None, &tags), steep);
            assert_eq!(is_sliding(slope, 35.0, Some(rock), &tags), steep);
            assert!(!is_sliding(slope, 35.0, Some(tags.exempt), &tags));
            assert!(is_sliding(slope, 35.0, Some(tags.slide), &tags));
        }
    }

    #[test]
    fn gate_admits_one_until_reopened() {
        let mut gate = ForceGate::default();
        assert!(gate.try_close());
        assert!(!gate.try_close());
        gate.reopen();
        assert!(gate.try_close());
    }

    #[test]
    fn impulse_resets() {
        let v = Vec3::new(1.0, -3.0, 2.0);
        let d = Vec3::new(0.0, 10.0, 0.0);
        assert_eq!(VelocityImpulse::add(d).apply_to(v), Vec3::new(1.0, 7.0, 2.0));
        assert_eq!(
            VelocityImpulse::with_reset(d, VelocityReset::Vertical).apply_to(v),
            Vec3::new(1.0, 10.0, 2.0)
        );
        assert_eq!(VelocityImpulse::with_reset(d, VelocityReset::All).apply_to(v), d);
    }
}
