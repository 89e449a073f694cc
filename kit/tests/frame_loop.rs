use std::collections::HashMap;

use kit::{
    AxisSource, Body, CameraRig, CameraSettings, CapsuleDef, Character, CharacterMotor,
    ColliderShapeDef, ControlScheme, FrameClock, Health, HealthSettings, InputAggregator,
    InputSettings, JumpKind, JumpSettings, Layer, MotorSettings, Player, Pose, Quat, RapierWorld,
    RespawnOnDeath, SurfaceDef, TagRegistry, Vec3, build_jump,
};

const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct Script {
    axes: HashMap<&'static str, f32>,
    pressed: Vec<&'static str>,
}

impl AxisSource for Script {
    fn axis(&self, name: &str) -> f32 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }

    fn button_down(&self, name: &str) -> bool {
        self.pressed.contains(&name)
    }
}

fn level() -> RapierWorld {
    RapierWorld::build(vec![
        SurfaceDef {
            id: 1,
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Plane,
            layer: Layer(0),
            tag: None,
        },
        SurfaceDef {
            id: 2,
            translation: Vec3::new(0.0, 2.0, 6.5),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(5.0, 2.0, 0.5),
            },
            layer: Layer(1),
            tag: None,
        },
    ])
}

fn player() -> Player {
    let spawn = Pose::at(Vec3::new(0.0, 0.05, 0.0));
    let mut registry = TagRegistry::new();
    let motor = CharacterMotor::new(MotorSettings::default(), &mut registry).expect("motor");
    let character = Character::builder(Body::new(spawn))
        .motor(motor)
        .jump(build_jump(JumpSettings::default()).expect("jump"))
        .health(
            Health::new(HealthSettings::default(), Box::new(RespawnOnDeath::new(spawn)))
                .expect("health"),
        )
        .build()
        .expect("character");
    let input = InputAggregator::new(vec![ControlScheme::keyboard()], InputSettings::default())
        .expect("input");
    let camera = CameraRig::new(CameraSettings::default(), &spawn).expect("camera");
    Player::new(character, input, camera)
}

/// Runs one rendered frame and returns the jump performed, if any.
fn frame(
    player: &mut Player,
    world: &RapierWorld,
    clock: &mut FrameClock,
    script: &Script,
) -> Option<JumpKind> {
    let (dt, steps) = clock.advance(FRAME_DT);
    let jump = player.update(script, world, dt).jump;
    for _ in 0..steps {
        let mut mover = world.mover(CapsuleDef::default());
        player.fixed_update(&mut mover, world, clock.fixed_dt());
    }
    jump
}

#[test]
fn walks_forward_until_the_wall() {
    let world = level();
    let mut player = player();
    let mut clock = FrameClock::new(50.0);
    let mut script = Script::default();
    script.axes.insert("Vertical", 1.0);

    for _ in 0..180 {
        frame(&mut player, &world, &mut clock, &script);
    }

    let body = player.character.body();
    let state = player.character.motor().state();
    assert!(body.pose.position.z > 4.0, "walked {:?}", body.pose.position);
    assert!(body.pose.position.z < 5.6, "passed the wall {:?}", body.pose.position);
    assert!(body.pose.position.y.abs() < 0.3);
    assert!(state.grounded);
    assert!(state.wall_collision);
}

#[test]
fn jumps_and_lands_again() {
    let world = level();
    let mut player = player();
    let mut clock = FrameClock::new(50.0);
    let idle = Script::default();

    for _ in 0..10 {
        frame(&mut player, &world, &mut clock, &idle);
    }
    assert!(player.character.motor().state().grounded);

    let press = Script {
        pressed: vec!["Jump"],
        ..Script::default()
    };
    assert_eq!(
        frame(&mut player, &world, &mut clock, &press),
        Some(JumpKind::Ground)
    );

    let mut peak: f32 = 0.0;
    for _ in 0..240 {
        frame(&mut player, &world, &mut clock, &idle);
        peak = peak.max(player.character.body().pose.position.y);
    }
    assert!(peak > 2.0, "peak {peak}");
    assert!(player.character.body().pose.position.y < 0.3);
    assert!(player.character.motor().state().grounded);
}
