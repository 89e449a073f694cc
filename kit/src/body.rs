use crate::{
    math::{Pose, Vec3},
    physics::{BodyMover, MoveOutcome},
};

/// How a force passed to [`Body::add_force`] is applied at the next integration step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous force, scaled by `dt / mass`.
    Force,
    /// Continuous acceleration, scaled by `dt`.
    Acceleration,
    /// Instant impulse, scaled by `1 / mass`.
    Impulse,
    /// Instant velocity change.
    VelocityChange,
}

/// Simulated character body with frozen rotation physics: it translates under
/// accumulated forces, while orientation is set directly by the motor.
#[derive(Clone, Debug)]
pub struct Body {
    pub pose: Pose,
    pub velocity: Vec3,
    pub mass: f32,
    /// Kinematic bodies ignore forces and do not move on their own.
    pub kinematic: bool,
    acceleration: Vec3,
    velocity_change: Vec3,
}

impl Body {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            velocity: Vec3::zeros(),
            mass: 1.0,
            kinematic: false,
            acceleration: Vec3::zeros(),
            velocity_change: Vec3::zeros(),
        }
    }

    pub fn add_force(&mut self, force: Vec3, mode: ForceMode) {
        let mass = self.mass.max(f32::EPSILON);
        match mode {
            ForceMode::Force => self.acceleration += force / mass,
            ForceMode::Acceleration => self.acceleration += force,
            ForceMode::Impulse => self.velocity_change += force / mass,
            ForceMode::VelocityChange => self.velocity_change += force,
        }
    }

    /// Integrates accumulated forces into velocity, then moves through `mover`.
    ///
    /// Vertical velocity is cancelled when the mover blocks vertical motion (landing or
    /// hitting a ceiling). Accumulators are cleared every step.
    pub fn step(&mut self, dt: f32, mover: &mut impl BodyMover) -> MoveOutcome {
        let acceleration = std::mem::take(&mut self.acceleration);
        let velocity_change = std::mem::take(&mut self.velocity_change);
        if self.kinematic {
            return MoveOutcome {
                translation: Vec3::zeros(),
                grounded: false,
            };
        }

        self.velocity += velocity_change + acceleration * dt;
        let desired = self.velocity * dt;
        let outcome = mover.move_body(&self.pose, desired, dt);
        self.pose.position += outcome.translation;

        const BLOCK_EPS: f32 = 1.0e-5;
        let blocked_down = desired.y < 0.0 && outcome.translation.y > desired.y + BLOCK_EPS;
        let blocked_up = desired.y > 0.0 && outcome.translation.y < desired.y - BLOCK_EPS;
        if blocked_down || blocked_up {
            self.velocity.y = 0.0;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::FreeMover;

    #[test]
    fn force_modes_scale_by_mass_and_dt() {
        let mut body = Body::new(Pose::default());
        body.mass = 2.0;
        body.add_force(Vec3::new(0.0, -10.0, 0.0), ForceMode::Force);
        body.add_force(Vec3::new(4.0, 0.0, 0.0), ForceMode::Impulse);
        body.add_force(Vec3::new(0.0, 0.0, 1.0), ForceMode::VelocityChange);
        body.step(0.1, &mut FreeMover::default());

        assert!((body.velocity - Vec3::new(2.0, -0.5, 1.0)).norm() < 1.0e-6);
        // Accumulators are consumed.
        body.step(0.1, &mut FreeMover::default());
        assert!((body.velocity - Vec3::new(2.0, -0.5, 1.0)).norm() < 1.0e-6);
    }

    #[test]
    fn landing_cancels_vertical_velocity() {
        let mut body = Body::new(Pose::at(Vec3::new(0.0, 0.05, 0.0)));
        body.velocity = Vec3::new(1.0, -5.0, 0.0);
        let mut mover = FreeMover {
            floor_height: Some(0.0),
        };
        let outcome = body.step(0.1, &mut mover);

        assert!(outcome.grounded);
        assert_eq!(body.pose.position.y, 0.0);
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.velocity.x, 1.0);
    }

    #[test]
    fn kinematic_body_ignores_forces() {
        let mut body = Body::new(Pose::default());
        body.kinematic = true;
        body.add_force(Vec3::new(0.0, 100.0, 0.0), ForceMode::VelocityChange);
        body.step(0.1, &mut FreeMover::default());
        assert_eq!(body.velocity, Vec3::zeros());
        assert_eq!(body.pose.position, Vec3::zeros());
    }
}
