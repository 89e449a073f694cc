//! Enemy brain: chases a target, attacks in melee and can be stomped on.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    body::Body,
    constants::{JUMP_HORIZONTAL_DIVISOR, STOMP_CONTACT_RADIUS},
    health::{Health, HealthEvent},
    math::Vec3,
    motor::{CharacterMotor, VelocityImpulse, VelocityReset},
    timer::Timers,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Chase,
    Attack,
    Damaged,
    Dead,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackSettings {
    pub range: f32,
    pub cooldown_secs: f32,
    /// Wind-up between starting a melee and the hit landing.
    pub animation_secs: f32,
    pub damage: i32,
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self {
            range: 1.5,
            cooldown_secs: 2.0,
            animation_secs: 1.0,
            damage: 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub attack: AttackSettings,
    /// Spread applied once to the motor's movement speed at spawn, so a pack splits up.
    pub movement_variance: f32,
    /// Spread applied once to the motor's rotation speed at spawn.
    pub rotation_variance: f32,
    /// Upward speed given to a player bouncing off this enemy's head.
    pub bounce_factor: f32,
    /// How far above the enemy origin a player must be to stomp it.
    pub stomp_height: f32,
    /// A player rising faster than this cannot stomp.
    pub stomp_max_vertical_speed: f32,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            attack: AttackSettings::default(),
            movement_variance: 0.0,
            rotation_variance: 0.0,
            bounce_factor: 10.0,
            stomp_height: 0.7,
            stomp_max_vertical_speed: 0.2,
        }
    }
}

/// Facing thresholds on the raw (unnormalized) offset to the target.
const ENGAGE_FACING: f32 = 0.8;
const HIT_FACING: f32 = 0.5;

/// A melee hit that landed on the target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeleeHit {
    pub damage: i32,
    /// Attacker position, used as the knockback origin.
    pub origin: Vec3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EnemyTimer {
    MeleeLands,
}

pub struct EnemyAi {
    settings: EnemySettings,
    state: EnemyState,
    attack_timer: f32,
    attacking: bool,
    timers: Timers<EnemyTimer>,
}

impl EnemyAi {
    /// Builds the brain and applies the spawn-time speed variance to `motor`.
    pub fn new(settings: EnemySettings, motor: &mut CharacterMotor, rng: &mut impl Rng) -> Self {
        let motor_settings = motor.settings_mut();
        if settings.movement_variance > 0.0 {
            let spread = settings.movement_variance;
            motor_settings.movement.speed += rng.gen_range(-spread..spread);
        }
        if settings.rotation_variance > 0.0 {
            let spread = settings.rotation_variance;
            motor_settings.rotation.speed += rng.gen_range(-spread..spread);
        }

        Self {
            attack_timer: settings.attack.cooldown_secs,
            settings,
            state: EnemyState::Idle,
            attacking: false,
            timers: Timers::new(),
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    pub fn attack_timer(&self) -> f32 {
        self.attack_timer
    }

    /// Runs one variable step. `target` is the position of whatever the enemy is chasing,
    /// if it can currently see one. Returns a hit when a melee lands this step.
    pub fn update(
        &mut self,
        motor: &mut CharacterMotor,
        body: &Body,
        target: Option<Vec3>,
        dt: f32,
    ) -> Option<MeleeHit> {
        self.attack_timer -= dt;

        let mut landed = None;
        for timer in self.timers.tick(dt) {
            match timer {
                EnemyTimer::MeleeLands => landed = self.resolve_melee(body, target),
            }
        }

        if self.attacking {
            return landed;
        }
        match self.state {
            EnemyState::Idle => {
                if target.is_some() {
                    self.state = EnemyState::Chase;
                }
            }
            EnemyState::Chase => {
                match target {
                    None => self.state = EnemyState::Idle,
                    Some(target) if self.in_reach(body, target, ENGAGE_FACING) => {
                        self.state = EnemyState::Attack;
                    }
                    Some(_) => {}
                }
                self.steer(motor, body, target);
            }
            EnemyState::Attack => {
                if let Some(target) = target {
                    if !self.in_reach(body, target, ENGAGE_FACING) {
                        self.state = EnemyState::Chase;
                    }
                    if self.attack_timer <= 0.0 {
                        self.attacking = true;
                        self.timers
                            .schedule(EnemyTimer::MeleeLands, self.settings.attack.animation_secs);
                        log::debug!("enemy: melee started");
                    }
                }
            }
            EnemyState::Damaged | EnemyState::Dead => {}
        }
        landed
    }

    /// Reacts to the enemy's own health events.
    pub fn on_health_event(&mut self, event: &HealthEvent, health: &Health) {
        match event {
            HealthEvent::Hit { .. } if self.state != EnemyState::Dead => {
                self.state = EnemyState::Damaged;
            }
            HealthEvent::InvincibilityEnded if health.current() > 0 => {
                self.state = EnemyState::Chase;
            }
            HealthEvent::Died => {
                log::info!("enemy: died");
                self.state = EnemyState::Dead;
                self.attacking = false;
                self.timers.cancel(EnemyTimer::MeleeLands);
            }
            _ => {}
        }
    }

    /// Handles a player landing on top of this enemy: the enemy takes a hit and the player
    /// bounces off through its own force gate. Returns whether it counted as a stomp.
    pub fn try_stomp(
        &self,
        enemy: (&mut CharacterMotor, &mut Body, &mut Health),
        player_motor: &mut CharacterMotor,
        player_body: &Body,
    ) -> bool {
        let (enemy_motor, enemy_body, enemy_health) = enemy;
        if enemy_health.is_dead() {
            return false;
        }
        let offset = player_body.pose.position - enemy_body.pose.position;
        if offset.xz().norm() > STOMP_CONTACT_RADIUS
            || offset.y < self.settings.stomp_height
            || player_body.velocity.y >= self.settings.stomp_max_vertical_speed
        {
            return false;
        }

        enemy_health.damage(1, Some(enemy_body.pose.position), enemy_motor, enemy_body);

        let bounce = self.settings.bounce_factor;
        let mut velocity = enemy_motor.movement_direction() * bounce / JUMP_HORIZONTAL_DIVISOR;
        velocity.y = bounce;
        player_motor.request_velocity(
            player_body,
            VelocityImpulse::with_reset(velocity, VelocityReset::All),
        );
        true
    }

    fn in_reach(&self, body: &Body, target: Vec3, facing: f32) -> bool {
        let offset = target - body.pose.position;
        offset.dot(&body.pose.forward()) > facing && offset.norm() <= self.settings.attack.range
    }

    fn steer(&self, motor: &mut CharacterMotor, body: &Body, target: Option<Vec3>) {
        let direction = match (self.state, target) {
            (EnemyState::Chase, Some(target)) => (target - body.pose.position)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vec3::zeros),
            _ => Vec3::zeros(),
        };
        motor.set_movement_direction(direction);
    }

    fn resolve_melee(&mut self, body: &Body, target: Option<Vec3>) -> Option<MeleeHit> {
        if self.state == EnemyState::Dead {
            return None;
        }
        let attack = &self.settings.attack;
        let hit = target.and_then(|target| {
            let offset = target - body.pose.position;
            (offset.dot(&body.pose.forward()) > HIT_FACING && offset.norm() < attack.range)
                .then_some(MeleeHit {
                    damage: attack.damage,
                    origin: body.pose.position,
                })
        });
        self.state = EnemyState::Idle;
        self.attacking = false;
        self.attack_timer = attack.cooldown_secs;
        hit
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        health::{HealthSettings, RemoveOnDeath},
        math::Pose,
        motor::MotorSettings,
        surface::TagRegistry,
    };

    fn motor() -> CharacterMotor {
        CharacterMotor::new(MotorSettings::default(), &mut TagRegistry::new()).expect("motor")
    }

    fn enemy() -> (EnemyAi, CharacterMotor, Body) {
        let mut motor = motor();
        let ai = EnemyAi::new(
            EnemySettings::default(),
            &mut motor,
            &mut StdRng::seed_from_u64(1),
        );
        (ai, motor, Body::new(Pose::default()))
    }

    #[test]
    fn chases_visible_target_and_idles_without_one() {
        let (mut ai, mut motor, body) = enemy();
        let target = Vec3::new(3.0, 0.0, 4.0);

        ai.update(&mut motor, &body, Some(target), 0.1);
        assert_eq!(ai.state(), EnemyState::Chase);
        ai.update(&mut motor, &body, Some(target), 0.1);
        assert!((motor.movement_direction() - Vec3::new(0.6, 0.0, 0.8)).norm() < 1.0e-5);

        ai.update(&mut motor, &body, None, 0.1);
        assert_eq!(ai.state(), EnemyState::Idle);
        assert_eq!(motor.movement_direction(), Vec3::zeros());
    }

    #[test]
    fn attacks_only_targets_ahead_and_in_range() {
        let (mut ai, mut motor, body) = enemy();
        ai.update(&mut motor, &body, Some(Vec3::new(0.0, 0.0, 1.0)), 0.1);

        // Behind the enemy: keep chasing.
        ai.update(&mut motor, &body, Some(Vec3::new(0.0, 0.0, -1.0)), 0.1);
        assert_eq!(ai.state(), EnemyState::Chase);

        ai.update(&mut motor, &body, Some(Vec3::new(0.0, 0.0, 1.0)), 0.1);
        assert_eq!(ai.state(), EnemyState::Attack);
        assert_eq!(motor.movement_direction(), Vec3::zeros());

        ai.update(&mut motor, &body, Some(Vec3::new(0.0, 0.0, 3.0)), 0.1);
        assert_eq!(ai.state(), EnemyState::Chase);
    }

    #[test]
    fn melee_lands_after_wind_up() {
        let (mut ai, mut motor, body) = enemy();
        let target = Some(Vec3::new(0.0, 0.0, 1.0));

        let mut hits = Vec::new();
        for _ in 0..6 {
            hits.push(ai.update(&mut motor, &body, target, 0.5));
        }
        // Attack timer starts at the cooldown (2s), the wind-up adds another second.
        assert!(hits[..5].iter().all(Option::is_none));
        assert_eq!(
            hits[5],
            Some(MeleeHit {
                damage: 1,
                origin: Vec3::zeros()
            })
        );
        assert!(!ai.is_attacking());
        assert_eq!(ai.attack_timer(), 2.0);
    }

    #[test]
    fn melee_misses_a_target_that_stepped_away() {
        let (mut ai, mut motor, body) = enemy();
        let near = Some(Vec3::new(0.0, 0.0, 1.0));
        for _ in 0..4 {
            ai.update(&mut motor, &body, near, 0.5);
        }
        assert!(ai.is_attacking());

        let far = Some(Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(ai.update(&mut motor, &body, far, 0.5), None);
        assert_eq!(ai.update(&mut motor, &body, far, 0.5), None);
        assert!(!ai.is_attacking());
    }

    #[test]
    fn health_events_drive_damaged_and_dead() {
        let (mut ai, mut motor, mut body) = enemy();
        let mut health = Health::new(HealthSettings::default(), Box::new(RemoveOnDeath::default()))
            .expect("health");

        health.damage(1, None, &mut motor, &mut body);
        for event in health.drain_events() {
            ai.on_health_event(&event, &health);
        }
        assert_eq!(ai.state(), EnemyState::Damaged);

        health.update(1.01);
        for event in health.drain_events() {
            ai.on_health_event(&event, &health);
        }
        assert_eq!(ai.state(), EnemyState::Chase);

        health.damage(10, None, &mut motor, &mut body);
        for event in health.drain_events() {
            ai.on_health_event(&event, &health);
        }
        assert_eq!(ai.state(), EnemyState::Dead);
        ai.update(&mut motor, &body, Some(Vec3::new(0.0, 0.0, 1.0)), 0.1);
        assert_eq!(ai.state(), EnemyState::Dead);
    }

    #[test]
    fn stomp_hurts_enemy_and_bounces_player() {
        let (ai, mut enemy_motor, mut enemy_body) = enemy();
        let mut enemy_health =
            Health::new(HealthSettings::default(), Box::new(RemoveOnDeath::default()))
                .expect("health");
        let mut player_motor = motor();
        let mut player_body = Body::new(Pose::at(Vec3::new(0.0, 1.0, 0.0)));

        player_body.velocity.y = 1.0;
        assert!(!ai.try_stomp(
            (&mut enemy_motor, &mut enemy_body, &mut enemy_health),
            &mut player_motor,
            &player_body,
        ));

        player_body.velocity.y = -4.0;
        assert!(ai.try_stomp(
            (&mut enemy_motor, &mut enemy_body, &mut enemy_health),
            &mut player_motor,
            &player_body,
        ));
        assert_eq!(enemy_health.current(), 4);
        assert!(player_motor.is_gate_closed());
    }

    #[test]
    fn stomp_needs_the_player_overhead() {
        let (ai, mut enemy_motor, mut enemy_body) = enemy();
        let mut enemy_health =
            Health::new(HealthSettings::default(), Box::new(RemoveOnDeath::default()))
                .expect("health");
        let mut player_motor = motor();
        let mut player_body = Body::new(Pose::at(Vec3::new(3.0, 1.0, 0.0)));
        player_body.velocity.y = -4.0;

        assert!(!ai.try_stomp(
            (&mut enemy_motor, &mut enemy_body, &mut enemy_health),
            &mut player_motor,
            &player_body,
        ));
        assert_eq!(enemy_health.current(), 5);
        assert!(!player_motor.is_gate_closed());
    }

    #[test]
    fn spawn_variance_stays_in_range() {
        let mut motor = motor();
        let settings = EnemySettings {
            movement_variance: 1.0,
            rotation_variance: 0.5,
            ..EnemySettings::default()
        };
        EnemyAi::new(settings, &mut motor, &mut StdRng::seed_from_u64(42));

        let speed = motor.settings().movement.speed;
        let turn = motor.settings().rotation.speed;
        assert!((7.0..9.0).contains(&speed));
        assert!((4.5..5.5).contains(&turn));
    }
}
