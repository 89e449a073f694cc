//! Jump abilities. Each strategy reads the motor's motion state and injects velocity through
//! the motor's force gate; a jump only counts (and spends budget) when the gate accepts it.

use serde::{Deserialize, Serialize};

use crate::{
    body::Body,
    constants::{JUMP_HORIZONTAL_DIVISOR, SPECIAL_JUMP_FORCE_DIVISOR, WALL_JUMP_UP_DIVISOR},
    error::SetupError,
    motor::{CharacterMotor, VelocityImpulse, VelocityReset},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpStyle {
    /// Grounded jumps only.
    Basic,
    /// Grounded jump plus a budget of air jumps.
    Multi,
    /// Multi-jump plus slide jumps off steep ground and wall jumps.
    Advanced,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSettings {
    pub style: JumpStyle,
    /// Vertical launch speed of a basic jump (m/s).
    pub force: f32,
    /// Total jumps in one sequence, the grounded one included.
    pub jump_count: u32,
    /// Snap facing to the movement direction on air jumps.
    pub override_rotation: bool,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            style: JumpStyle::Advanced,
            force: 10.0,
            jump_count: 1,
            override_rotation: true,
        }
    }
}

/// Which jump a strategy performed. Observers use it to trigger animation and audio.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Ground,
    Slide,
    Wall,
    Air,
}

pub trait JumpStrategy {
    fn name(&self) -> &'static str;

    /// Handles a jump request. Returns the jump performed, or `None` when nothing happened.
    fn on_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind>;

    /// Remaining air jumps, for strategies that track a budget.
    fn remaining(&self) -> Option<u32> {
        None
    }
}

/// Builds the configured strategy.
pub fn build_jump(settings: JumpSettings) -> Result<Box<dyn JumpStrategy>, SetupError> {
    if settings.jump_count == 0 {
        return Err(SetupError::InvalidSetting {
            field: "jump.jump_count",
            reason: "must be at least 1",
        });
    }
    Ok(match settings.style {
        JumpStyle::Basic => Box::new(BasicJump { settings }),
        JumpStyle::Multi => Box::new(MultiJump::new(settings)),
        JumpStyle::Advanced => Box::new(AdvancedJump {
            multi: MultiJump::new(settings),
        }),
    })
}

fn base_impulse(motor: &CharacterMotor, force: f32, reset: VelocityReset) -> VelocityImpulse {
    let mut delta = motor.movement_direction() * force / JUMP_HORIZONTAL_DIVISOR;
    delta.y = force;
    VelocityImpulse::with_reset(delta, reset)
}

pub struct BasicJump {
    settings: JumpSettings,
}

impl JumpStrategy for BasicJump {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn on_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind> {
        if !motor.state().grounded {
            return None;
        }
        let impulse = base_impulse(motor, self.settings.force, VelocityReset::Keep);
        motor.request_velocity(body, impulse).map(|_| JumpKind::Ground)
    }
}

/// Remaining air jumps, bounded in `[0, jump_count - 1]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JumpBudget {
    remaining: u32,
    count: u32,
}

impl JumpBudget {
    pub fn new(count: u32) -> Self {
        Self {
            remaining: 0,
            count: count.max(1),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn reset(&mut self) {
        self.remaining = self.count - 1;
    }

    pub fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

pub struct MultiJump {
    settings: JumpSettings,
    budget: JumpBudget,
}

impl MultiJump {
    pub fn new(settings: JumpSettings) -> Self {
        let budget = JumpBudget::new(settings.jump_count);
        Self { settings, budget }
    }

    fn ground_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind> {
        let impulse = base_impulse(motor, self.settings.force, VelocityReset::Keep);
        motor.request_velocity(body, impulse)?;
        self.budget.reset();
        Some(JumpKind::Ground)
    }

    fn air_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind> {
        if self.budget.remaining() == 0 {
            return None;
        }
        let impulse = base_impulse(motor, self.settings.force, VelocityReset::Vertical);
        motor.request_velocity(body, impulse)?;
        self.budget.consume();
        if self.settings.override_rotation {
            motor.override_rotation(motor.movement_direction());
        }
        log::debug!("air jump, {} left", self.budget.remaining());
        Some(JumpKind::Air)
    }
}

impl JumpStrategy for MultiJump {
    fn name(&self) -> &'static str {
        "multi"
    }

    fn on_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind> {
        if motor.state().grounded {
            self.ground_jump(motor, body)
        } else {
            self.air_jump(motor, body)
        }
    }

    fn remaining(&self) -> Option<u32> {
        Some(self.budget.remaining())
    }
}

pub struct AdvancedJump {
    multi: MultiJump,
}

impl AdvancedJump {
    fn slide_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind> {
        let force = self.multi.settings.force / SPECIAL_JUMP_FORCE_DIVISOR;
        let delta = motor.state().ground_normal * (SPECIAL_JUMP_FORCE_DIVISOR * force);
        let velocity =
            motor.request_velocity(body, VelocityImpulse::with_reset(delta, VelocityReset::All))?;
        self.multi.budget.reset();
        motor.override_rotation(velocity);
        motor.set_velocity_movement(true);
        Some(JumpKind::Slide)
    }

    fn wall_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind> {
        let force = self.multi.settings.force / SPECIAL_JUMP_FORCE_DIVISOR;
        let delta = (motor.state().wall_normal() + body.pose.up() / WALL_JUMP_UP_DIVISOR) * force;
        motor.request_velocity(body, VelocityImpulse::with_reset(delta, VelocityReset::All))?;
        motor.override_rotation(delta);
        Some(JumpKind::Wall)
    }
}

impl JumpStrategy for AdvancedJump {
    fn name(&self) -> &'static str {
        "advanced"
    }

    fn on_jump(&mut self, motor: &mut CharacterMotor, body: &Body) -> Option<JumpKind> {
        let state = *motor.state();
        match (state.grounded, state.sliding, state.wall_collision) {
            (true, true, _) => self.slide_jump(motor, body),
            (true, false, _) => self.multi.ground_jump(motor, body),
            (false, _, true) => self.wall_jump(motor, body),
            (false, _, false) => self.multi.air_jump(motor, body),
        }
    }

    fn remaining(&self) -> Option<u32> {
        Some(self.multi.budget.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layers::Layer,
        math::{Pose, Vec3},
        motor::MotorSettings,
        physics::{
            FreeMover,
            testing::{Plane, PlaneScene},
        },
        surface::TagRegistry,
    };

    const DT: f32 = 0.02;

    struct Rig {
        motor: CharacterMotor,
        body: Body,
        registry: TagRegistry,
    }

    impl Rig {
        fn new() -> Self {
            let mut registry = TagRegistry::new();
            let motor =
                CharacterMotor::new(MotorSettings::default(), &mut registry).expect("motor");
            Self {
                motor,
                body: Body::new(Pose::default()),
                registry,
            }
        }

        /// Runs enough frames for the force gate to reopen.
        fn settle(&mut self, scene: &PlaneScene) {
            for _ in 0..8 {
                self.motor.update(&mut self.body, scene, DT);
                self.motor
                    .fixed_update(&mut self.body, &mut FreeMover::default(), DT);
            }
        }

        fn jump(&mut self, strategy: &mut dyn JumpStrategy, scene: &PlaneScene) -> Option<JumpKind> {
            self.motor.update(&mut self.body, scene, DT);
            strategy.on_jump(&mut self.motor, &self.body)
        }
    }

    fn ground() -> PlaneScene {
        PlaneScene::with(vec![Plane::new(Vec3::zeros(), Vec3::y(), 1, Layer(0))])
    }

    fn settings(style: JumpStyle, jump_count: u32) -> JumpSettings {
        JumpSettings {
            style,
            jump_count,
            ..JumpSettings::default()
        }
    }

    #[test]
    fn zero_jump_count_is_rejected() {
        assert!(build_jump(settings(JumpStyle::Multi, 0)).is_err());
    }

    #[test]
    fn basic_jump_needs_ground() {
        let mut rig = Rig::new();
        let mut jump = build_jump(settings(JumpStyle::Basic, 1)).expect("jump");
        let air = PlaneScene::default();
        assert_eq!(rig.jump(jump.as_mut(), &air), None);

        rig.motor.set_movement_direction(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(rig.jump(jump.as_mut(), &ground()), Some(JumpKind::Ground));
        rig.motor
            .fixed_update(&mut rig.body, &mut FreeMover::default(), DT);
        // Horizontal carry is force / 20, before one step of movement and gravity.
        assert!(rig.body.velocity.y > 9.5);
        assert!(rig.body.velocity.z > 0.5);
    }

    #[test]
    fn jump_budget_counts_down_from_grounded_jump() {
        let mut rig = Rig::new();
        let mut jump = build_jump(settings(JumpStyle::Multi, 3)).expect("jump");
        let air = PlaneScene::default();

        assert_eq!(rig.jump(jump.as_mut(), &ground()), Some(JumpKind::Ground));
        assert_eq!(jump.remaining(), Some(2));

        rig.settle(&air);
        assert_eq!(rig.jump(jump.as_mut(), &air), Some(JumpKind::Air));
        assert_eq!(jump.remaining(), Some(1));

        rig.settle(&air);
        assert_eq!(rig.jump(jump.as_mut(), &air), Some(JumpKind::Air));
        assert_eq!(jump.remaining(), Some(0));

        rig.settle(&air);
        assert_eq!(rig.jump(jump.as_mut(), &air), None);
        assert_eq!(jump.remaining(), Some(0));
        assert!(!rig.motor.is_gate_closed());
    }

    #[test]
    fn dropped_request_does_not_spend_budget() {
        let mut rig = Rig::new();
        let mut jump = build_jump(settings(JumpStyle::Multi, 2)).expect("jump");
        let air = PlaneScene::default();

        assert_eq!(rig.jump(jump.as_mut(), &ground()), Some(JumpKind::Ground));
        // Gate still closed from the grounded jump.
        assert_eq!(rig.jump(jump.as_mut(), &air), None);
        assert_eq!(jump.remaining(), Some(1));
    }

    #[test]
    fn air_jump_zeroes_vertical_velocity_and_overrides_facing() {
        let mut rig = Rig::new();
        let mut jump = build_jump(settings(JumpStyle::Multi, 2)).expect("jump");
        let air = PlaneScene::default();
        rig.jump(jump.as_mut(), &ground());
        rig.settle(&air);
        rig.body.velocity.y = -6.0;

        rig.motor.set_movement_direction(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(rig.jump(jump.as_mut(), &air), Some(JumpKind::Air));
        assert!(matches!(
            rig.motor.rotation_intent(),
            crate::motor::RotationIntent::Override(_)
        ));
        rig.motor
            .fixed_update(&mut rig.body, &mut FreeMover::default(), DT);
        assert!((rig.body.velocity.y - (10.0 - 10.0 * DT)).abs() < 1.0e-4);
    }

    #[test]
    fn wall_jump_is_free() {
        let mut rig = Rig::new();
        let mut jump = build_jump(settings(JumpStyle::Advanced, 2)).expect("jump");
        let wall = PlaneScene::with(vec![Plane::new(
            Vec3::new(0.0, 0.0, 1.0),
            -Vec3::z(),
            2,
            Layer(0),
        )]);

        rig.jump(jump.as_mut(), &ground());
        rig.settle(&wall);
        assert_eq!(rig.jump(jump.as_mut(), &wall), Some(JumpKind::Wall));
        assert_eq!(jump.remaining(), Some(1));

        rig.motor
            .fixed_update(&mut rig.body, &mut FreeMover::default(), DT);
        // Pushed away from the wall and upward.
        assert!(rig.body.velocity.z < 0.0);
        assert!(rig.body.velocity.y > 0.0);
    }

    #[test]
    fn slide_jump_launches_along_ground_normal() {
        let mut rig = Rig::new();
        let slide = rig.registry.intern("Slide");
        let mut jump = build_jump(settings(JumpStyle::Advanced, 2)).expect("jump");
        let rad = 45.0f32.to_radians();
        let normal = Vec3::new(rad.sin(), rad.cos(), 0.0);
        let slope = PlaneScene::with(vec![
            Plane::new(Vec3::zeros(), normal, 1, Layer(0)).tagged(slide),
        ]);
        rig.body.velocity = Vec3::new(-3.0, -3.0, 0.0);

        assert_eq!(rig.jump(jump.as_mut(), &slope), Some(JumpKind::Slide));
        assert!(rig.motor.velocity_movement());
        assert_eq!(jump.remaining(), Some(1));
        match rig.motor.rotation_intent() {
            crate::motor::RotationIntent::Override(direction) => {
                // Previous velocity is discarded; the launch is normal * force.
                assert!((direction - normal * 10.0).norm() < 1.0e-4);
            }
            other => panic!("expected override, got {other:?}"),
        }
    }
}
