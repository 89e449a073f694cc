//! Headless sandbox: builds the demo level, a player and a few enemies, then runs the two-phase
//! frame loop against scripted input and logs what happens.

mod level;
mod script;

use std::path::PathBuf;

use clap::Parser;
use kit::{
    Body, CameraRig, CapsuleDef, Character, CharacterMotor, ConfigError, Enemy, EnemyAi,
    FrameClock, Health, InputAggregator, KitConfig, LayerMask, LogPresentation, Player, Pose,
    RemoveOnDeath, RespawnOnDeath, TagRegistry, Vec3, build_jump,
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{level::LevelLayer, script::ScriptedInput};

/// Enemies only chase a player within this distance (meters).
const SIGHT_RANGE: f32 = 12.0;

#[derive(Debug, Parser)]
#[command(name = "sandbox", about = "Run the character kit headless against scripted input")]
struct Args {
    /// TOML file overriding the default tuning.
    #[arg(long, env = "KIT_CONFIG")]
    config: Option<PathBuf>,

    /// Rendered frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Simulated render rate (Hz).
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Fixed physics rate (Hz).
    #[arg(long, default_value_t = 50.0)]
    fixed_hz: f32,

    /// Seed for per-enemy variance.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> Result<(), ConfigError> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => KitConfig::load(path)?,
        None => {
            let mut config = KitConfig::default();
            // The moving platform should not pull the camera in.
            config.camera.collision_mask =
                LayerMask::of(&[LevelLayer::Ground, LevelLayer::Wall]);
            config
        }
    };
    config.validate()?;

    let mut registry = TagRegistry::new();
    let mut world = level::build(&mut registry);
    let mut player = spawn_player(&config, &mut registry)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut enemies = [Vec3::new(4.0, 0.05, 6.0), Vec3::new(-4.0, 0.05, 12.0)]
        .into_iter()
        .enumerate()
        .map(|(i, at)| spawn_enemy(&config, &mut registry, &mut rng, i, at))
        .collect::<Result<Vec<_>, _>>()?;

    let mut script = ScriptedInput::default();
    let mut clock = FrameClock::new(args.fixed_hz);
    let frame_dt = 1.0 / args.fps;
    let mut time = 0.0;

    log::info!(
        "sandbox: {} frames at {} fps, fixed step {:.4}s, {} enemies",
        args.frames,
        args.fps,
        clock.fixed_dt(),
        enemies.len()
    );

    for frame in 0..args.frames {
        let (dt, steps) = clock.advance(frame_dt);
        time += dt;
        script.advance(time);
        world.set_surface_pose(level::PLATFORM_ID, level::platform_pose(time));

        // ---------------------------------------------------------------------
        // Variable phase
        // ---------------------------------------------------------------------
        player.update(&script, &world, dt);

        let target = player.character.body().pose.position;
        for enemy in enemies.iter_mut() {
            let seen = (enemy.character.body().pose.position - target).norm() <= SIGHT_RANGE;
            if let Some(hit) = enemy.update(&world, seen.then_some(target), dt) {
                player.character.damage(hit.damage, Some(hit.origin));
            }
            if enemy.try_stomp(&mut player.character) {
                log::info!("sandbox: stomped an enemy at frame {frame}");
            }
        }

        // ---------------------------------------------------------------------
        // Fixed phase
        // ---------------------------------------------------------------------
        for _ in 0..steps {
            let fixed_dt = clock.fixed_dt();
            let mut mover = world.mover(CapsuleDef::default());
            player.fixed_update(&mut mover, &world, fixed_dt);
            for enemy in enemies.iter_mut() {
                enemy.fixed_update(&mut mover, fixed_dt);
            }
        }

        enemies.retain(|enemy| !enemy.is_removed());

        if frame % 60 == 0 {
            report(frame, &player, &enemies);
        }
    }

    report(args.frames, &player, &enemies);
    Ok(())
}

fn spawn_player(config: &KitConfig, registry: &mut TagRegistry) -> Result<Player, ConfigError> {
    let spawn = Pose::at(Vec3::new(0.0, 0.05, 0.0));
    let character = Character::builder(Body::new(spawn))
        .motor(CharacterMotor::new(config.motor.clone(), registry)?)
        .jump(build_jump(config.jump.clone())?)
        .health(Health::new(
            config.health.clone(),
            Box::new(RespawnOnDeath::new(spawn)),
        )?)
        .presentation(Box::new(LogPresentation {
            name: "player".into(),
        }))
        .build()?;
    let input = InputAggregator::new(config.input.schemes.clone(), config.input.settings.clone())?;
    let camera = CameraRig::new(config.camera.clone(), &spawn)?;
    Ok(Player::new(character, input, camera))
}

fn spawn_enemy(
    config: &KitConfig,
    registry: &mut TagRegistry,
    rng: &mut StdRng,
    index: usize,
    at: Vec3,
) -> Result<Enemy, ConfigError> {
    let mut motor = CharacterMotor::new(config.motor.clone(), registry)?;
    let ai = EnemyAi::new(config.enemy.clone(), &mut motor, rng);
    let character = Character::builder(Body::new(Pose::at(at)))
        .motor(motor)
        .health(Health::new(
            config.health.clone(),
            Box::new(RemoveOnDeath::default()),
        )?)
        .presentation(Box::new(LogPresentation {
            name: format!("enemy-{index}"),
        }))
        .build()?;
    Ok(Enemy::new(character, ai))
}

fn report(frame: u32, player: &Player, enemies: &[Enemy]) {
    let body = player.character.body();
    let state = player.character.motor().state();
    log::info!(
        "frame {frame}: player at ({:.2}, {:.2}, {:.2}) grounded={} hp={} camera distance {:.1}",
        body.pose.position.x,
        body.pose.position.y,
        body.pose.position.z,
        state.grounded,
        player.character.health().current(),
        player.camera().distance(),
    );
    for enemy in enemies {
        log::debug!(
            "  enemy {:?} at ({:.2}, {:.2})",
            enemy.ai().state(),
            enemy.character.body().pose.position.x,
            enemy.character.body().pose.position.z,
        );
    }
}
