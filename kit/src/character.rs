//! Character aggregates. Every collaborator is handed in explicitly through
//! [`CharacterBuilder`]. Missing a motor fails at build time; missing health degrades to
//! defaults.

use crate::{
    body::Body,
    camera::{CameraRig, CameraTarget},
    enemy::{EnemyAi, MeleeHit},
    error::SetupError,
    health::{Health, HealthEvent},
    input::{AxisSource, InputAggregator},
    jump::{JumpKind, JumpStrategy},
    math::Vec3,
    motor::CharacterMotor,
    movement,
    observer::Presentation,
    physics::{BodyMover, MoveOutcome, PhysicsQuery},
};

/// What happened to a character during one variable step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharacterFrame {
    pub jump: Option<JumpKind>,
    pub health_events: Vec<HealthEvent>,
}

pub struct Character {
    body: Body,
    motor: CharacterMotor,
    jump: Option<Box<dyn JumpStrategy>>,
    health: Health,
    presentation: Option<Box<dyn Presentation>>,
}

pub struct CharacterBuilder {
    body: Body,
    motor: Option<CharacterMotor>,
    jump: Option<Box<dyn JumpStrategy>>,
    health: Option<Health>,
    presentation: Option<Box<dyn Presentation>>,
}

impl CharacterBuilder {
    pub fn new(body: Body) -> Self {
        Self {
            body,
            motor: None,
            jump: None,
            health: None,
            presentation: None,
        }
    }

    pub fn motor(mut self, motor: CharacterMotor) -> Self {
        self.motor = Some(motor);
        self
    }

    pub fn jump(mut self, jump: Box<dyn JumpStrategy>) -> Self {
        self.jump = Some(jump);
        self
    }

    pub fn health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    pub fn presentation(mut self, presentation: Box<dyn Presentation>) -> Self {
        self.presentation = Some(presentation);
        self
    }

    pub fn build(self) -> Result<Character, SetupError> {
        let Some(motor) = self.motor else {
            return Err(match &self.jump {
                Some(jump) => SetupError::AbilityWithoutMotor(jump.name()),
                None => SetupError::MissingMotor,
            });
        };
        let health = self.health.unwrap_or_else(|| {
            log::warn!("character built without health; using defaults with respawn in place");
            Health::respawning(self.body.pose)
        });

        Ok(Character {
            body: self.body,
            motor,
            jump: self.jump,
            health,
            presentation: self.presentation,
        })
    }
}

impl Character {
    pub fn builder(body: Body) -> CharacterBuilder {
        CharacterBuilder::new(body)
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn motor(&self) -> &CharacterMotor {
        &self.motor
    }

    pub fn motor_mut(&mut self) -> &mut CharacterMotor {
        &mut self.motor
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn jump_remaining(&self) -> Option<u32> {
        self.jump.as_ref().and_then(|jump| jump.remaining())
    }

    /// Mutable access to the parts another character interacts with (stomps, melee).
    pub fn combat_parts(&mut self) -> (&mut CharacterMotor, &mut Body, &mut Health) {
        (&mut self.motor, &mut self.body, &mut self.health)
    }

    pub fn damage(&mut self, amount: i32, origin: Option<Vec3>) -> bool {
        self.health
            .damage(amount, origin, &mut self.motor, &mut self.body)
    }

    pub fn heal(&mut self, amount: i32) {
        self.health.heal(amount);
    }

    /// Variable-step phase: motor probes and rotation, then the jump, then health timers.
    pub fn update(
        &mut self,
        scene: &impl PhysicsQuery,
        jump_pressed: bool,
        dt: f32,
    ) -> CharacterFrame {
        self.motor.update(&mut self.body, scene, dt);

        let jump = match self.jump.as_mut() {
            Some(strategy) if jump_pressed => strategy.on_jump(&mut self.motor, &self.body),
            _ => None,
        };

        self.health.update(dt);
        let health_events = self.health.drain_events();

        if let Some(presentation) = self.presentation.as_mut() {
            if let Some(kind) = jump {
                presentation.on_jump(kind);
            }
            for event in &health_events {
                presentation.on_health_event(event);
            }
        }
        CharacterFrame {
            jump,
            health_events,
        }
    }

    pub fn fixed_update(&mut self, mover: &mut impl BodyMover, dt: f32) -> MoveOutcome {
        self.motor.fixed_update(&mut self.body, mover, dt)
    }

    fn presentation(&mut self) -> Option<&mut (dyn Presentation + 'static)> {
        self.presentation.as_deref_mut()
    }
}

/// The controlled character with its input and camera.
pub struct Player {
    pub character: Character,
    input: InputAggregator,
    camera: CameraRig,
}

impl Player {
    pub fn new(character: Character, input: InputAggregator, camera: CameraRig) -> Self {
        Self {
            character,
            input,
            camera,
        }
    }

    pub fn input(&self) -> &InputAggregator {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputAggregator {
        &mut self.input
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Variable-step phase: input, movement, motor, jump, then camera zoom.
    pub fn update(
        &mut self,
        source: &impl AxisSource,
        scene: &impl PhysicsQuery,
        dt: f32,
    ) -> CharacterFrame {
        if let Some(name) = self.input.update(source) {
            if let Some(presentation) = self.character.presentation() {
                presentation.on_scheme_changed(&name);
            }
        }
        let snapshot = *self.input.snapshot();

        let character = &mut self.character;
        let locomotion = movement::drive(
            &snapshot,
            &mut character.motor,
            &character.body,
            &mut self.camera,
            dt,
        );
        if let Some(presentation) = character.presentation() {
            presentation.on_locomotion(locomotion);
        }

        let frame = character.update(scene, snapshot.jump_pressed, dt);
        self.camera.update(&snapshot, dt);
        frame
    }

    /// Fixed-step phase: body integration, then the camera follows the new pose.
    pub fn fixed_update(
        &mut self,
        mover: &mut impl BodyMover,
        scene: &impl PhysicsQuery,
        dt: f32,
    ) -> MoveOutcome {
        let outcome = self.character.fixed_update(mover, dt);

        let target = CameraTarget {
            pose: self.character.body.pose,
            movement_direction: self.character.motor.movement_direction(),
        };
        let hidden = self
            .camera
            .fixed_update(&target, self.input.snapshot(), scene, dt);
        if let (Some(hidden), Some(presentation)) = (hidden, self.character.presentation()) {
            presentation.on_hide_target(hidden);
        }
        outcome
    }
}

/// An AI-driven character.
pub struct Enemy {
    pub character: Character,
    ai: EnemyAi,
    removed: bool,
}

impl Enemy {
    pub fn new(character: Character, ai: EnemyAi) -> Self {
        Self {
            character,
            ai,
            removed: false,
        }
    }

    pub fn ai(&self) -> &EnemyAi {
        &self.ai
    }

    /// True once the enemy died and its removal delay elapsed.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Variable-step phase. `target` is the position of a visible player, if any.
    pub fn update(
        &mut self,
        scene: &impl PhysicsQuery,
        target: Option<Vec3>,
        dt: f32,
    ) -> Option<MeleeHit> {
        let frame = self.character.update(scene, false, dt);
        for event in &frame.health_events {
            self.ai.on_health_event(event, &self.character.health);
            if *event == HealthEvent::Removed {
                self.removed = true;
            }
        }
        let character = &mut self.character;
        self.ai
            .update(&mut character.motor, &character.body, target, dt)
    }

    /// Lets `player` land on this enemy; see [`EnemyAi::try_stomp`].
    pub fn try_stomp(&mut self, player: &mut Character) -> bool {
        let Character {
            motor: player_motor,
            body: player_body,
            ..
        } = player;
        self.ai.try_stomp(
            self.character.combat_parts(),
            player_motor,
            player_body,
        )
    }

    pub fn fixed_update(&mut self, mover: &mut impl BodyMover, dt: f32) -> MoveOutcome {
        self.character.fixed_update(mover, dt)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        camera::CameraSettings,
        enemy::{EnemySettings, EnemyState},
        health::{HealthSettings, RemoveOnDeath, RespawnOnDeath},
        input::{ControlScheme, InputSettings},
        jump::{JumpSettings, build_jump},
        layers::Layer,
        math::Pose,
        motor::MotorSettings,
        physics::{
            FreeMover,
            testing::{Plane, PlaneScene},
        },
        surface::TagRegistry,
    };

    const DT: f32 = 0.02;

    struct Pressed(&'static str);

    impl AxisSource for Pressed {
        fn axis(&self, _name: &str) -> f32 {
            0.0
        }

        fn button_down(&self, name: &str) -> bool {
            name == self.0
        }
    }

    fn ground() -> PlaneScene {
        PlaneScene::with(vec![Plane::new(Vec3::zeros(), Vec3::y(), 1, Layer(0))])
    }

    fn character(registry: &mut TagRegistry, pose: Pose, enemy: bool) -> Character {
        let motor = CharacterMotor::new(MotorSettings::default(), registry).expect("motor");
        let response: Box<dyn crate::health::DamageResponse> = if enemy {
            Box::new(RemoveOnDeath::default())
        } else {
            Box::new(RespawnOnDeath::new(pose))
        };
        Character::builder(Body::new(pose))
            .motor(motor)
            .jump(build_jump(JumpSettings::default()).expect("jump"))
            .health(Health::new(HealthSettings::default(), response).expect("health"))
            .build()
            .expect("character")
    }

    #[test]
    fn jump_without_motor_fails_fast() {
        let result = Character::builder(Body::new(Pose::default()))
            .jump(build_jump(JumpSettings::default()).expect("jump"))
            .build();
        assert!(matches!(result, Err(SetupError::AbilityWithoutMotor("advanced"))));
    }

    #[test]
    fn missing_health_falls_back_to_defaults() {
        let spawn = Pose::at(Vec3::new(2.0, 0.0, -1.0));
        let motor = CharacterMotor::new(MotorSettings::default(), &mut TagRegistry::new())
            .expect("motor");
        let mut character = Character::builder(Body::new(spawn))
            .motor(motor)
            .build()
            .expect("character without health still builds");

        assert_eq!(character.health().current(), HealthSettings::default().max_health);
        assert_eq!(character.health().response_name(), "respawn");

        character.body_mut().pose = Pose::at(Vec3::new(9.0, -4.0, 0.0));
        assert!(character.damage(100, None));
        assert_eq!(character.body().pose, spawn);
    }

    #[test]
    fn player_frame_jumps_off_the_ground() {
        let mut registry = TagRegistry::new();
        let character = character(&mut registry, Pose::default(), false);
        let input = InputAggregator::new(vec![ControlScheme::keyboard()], InputSettings::default())
            .expect("input");
        let camera = CameraRig::new(CameraSettings::default(), &Pose::default()).expect("camera");
        let mut player = Player::new(character, input, camera);
        let scene = ground();
        let mut mover = FreeMover {
            floor_height: Some(0.0),
        };

        let frame = player.update(&Pressed("Jump"), &scene, DT);
        assert_eq!(frame.jump, Some(JumpKind::Ground));
        player.fixed_update(&mut mover, &scene, DT);
        assert!(player.character.body().pose.position.y > 0.1);
        assert!(player.character.body().velocity.y > 9.0);

        // The camera followed the body.
        let anchor = player.character.body().pose.position + Vec3::new(0.0, 3.4, 0.0);
        assert!((player.camera().anchor() - anchor).norm() < 1.0e-5);
    }

    #[test]
    fn damage_events_surface_on_next_update() {
        let mut registry = TagRegistry::new();
        let mut player = character(&mut registry, Pose::default(), false);

        assert!(player.damage(2, None));
        let frame = player.update(&ground(), false, DT);
        assert!(
            frame
                .health_events
                .contains(&HealthEvent::Changed { current: 3, max: 5 })
        );
    }

    #[test]
    fn stomped_enemy_is_damaged_then_chases_again() {
        let mut registry = TagRegistry::new();
        let enemy_character = character(&mut registry, Pose::default(), true);
        let mut enemy = {
            let mut character = enemy_character;
            let ai = EnemyAi::new(
                EnemySettings::default(),
                character.motor_mut(),
                &mut StdRng::seed_from_u64(3),
            );
            Enemy::new(character, ai)
        };
        let mut player = character(&mut registry, Pose::at(Vec3::new(0.0, 1.2, 0.0)), false);
        player.body_mut().velocity.y = -3.0;

        assert!(enemy.try_stomp(&mut player));
        enemy.update(&ground(), Some(player.body().pose.position), DT);
        assert_eq!(enemy.ai().state(), EnemyState::Damaged);
        assert_eq!(enemy.character.health().current(), 4);

        for _ in 0..60 {
            enemy.update(&ground(), Some(Vec3::new(0.0, 0.0, 10.0)), DT);
        }
        assert_eq!(enemy.ai().state(), EnemyState::Chase);
        assert!(!enemy.is_removed());
    }
}
