//! Discrete hit points with knockback, a damage flash and an invincibility window.
//!
//! What happens at zero health is a [`DamageResponse`] strategy: players respawn at the
//! pose captured when they were built, enemies freeze and are removed after a delay.

use serde::{Deserialize, Serialize};

use crate::{
    body::Body,
    constants::ENEMY_REMOVAL_DELAY_SECS,
    error::SetupError,
    math::{Pose, Vec3, up},
    motor::{CharacterMotor, VelocityImpulse, VelocityReset},
    timer::Timers,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub max_health: i32,
    /// Damage is ignored for this long after a hit (seconds). Zero disables the window.
    pub invincibility_secs: f32,
    pub knockback: bool,
    pub knockback_force: f32,
    /// Tint the character while invincible.
    pub flash: bool,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            max_health: 5,
            invincibility_secs: 1.0,
            knockback: true,
            knockback_force: 10.0,
            flash: true,
        }
    }
}

impl HealthSettings {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.max_health <= 0 {
            return Err(SetupError::InvalidSetting {
                field: "health.max_health",
                reason: "must be positive",
            });
        }
        if self.invincibility_secs < 0.0 {
            return Err(SetupError::InvalidSetting {
                field: "health.invincibility_secs",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

/// Something observers may want to react to. Drained with [`Health::drain_events`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HealthEvent {
    Changed { current: i32, max: i32 },
    /// A non-lethal hit landed.
    Hit { amount: i32 },
    KnockedBack { velocity: Vec3 },
    FlashStarted,
    FlashEnded,
    InvincibilityEnded,
    Died,
    Respawned,
    /// The removal delay after death elapsed; the owner should drop the entity.
    Removed,
}

/// What a death did to the character.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DeathOutcome {
    /// Health refills; the character stays in play.
    Respawn,
    /// The character is out of play and goes away after `delay_secs`.
    Remove { delay_secs: f32 },
}

pub trait DamageResponse {
    fn name(&self) -> &'static str;

    /// Velocity change for a hit from `origin`, scaled by `force`.
    fn knockback(&self, body: &Body, origin: Option<Vec3>, force: f32) -> VelocityImpulse;

    fn on_death(&mut self, motor: &mut CharacterMotor, body: &mut Body) -> DeathOutcome;
}

/// Player behaviour: knocked away from the hit and up, back to the spawn pose on death.
#[derive(Clone, Copy, Debug)]
pub struct RespawnOnDeath {
    spawn: Pose,
}

impl RespawnOnDeath {
    pub fn new(spawn: Pose) -> Self {
        Self { spawn }
    }

    pub fn spawn(&self) -> Pose {
        self.spawn
    }
}

impl DamageResponse for RespawnOnDeath {
    fn name(&self) -> &'static str {
        "respawn"
    }

    fn knockback(&self, body: &Body, origin: Option<Vec3>, force: f32) -> VelocityImpulse {
        let away = origin
            .map(|origin| body.pose.position - origin)
            .unwrap_or_else(|| -body.pose.forward());
        VelocityImpulse::with_reset((away + up()) * force, VelocityReset::All)
    }

    fn on_death(&mut self, motor: &mut CharacterMotor, body: &mut Body) -> DeathOutcome {
        log::info!("health: respawning at {:?}", self.spawn.position);
        body.pose = self.spawn;
        body.velocity = Vec3::zeros();
        motor.teleport(self.spawn);
        DeathOutcome::Respawn
    }
}

/// Enemy behaviour: pushed straight back on a hit, frozen and removed on death.
#[derive(Clone, Copy, Debug)]
pub struct RemoveOnDeath {
    pub delay_secs: f32,
}

impl Default for RemoveOnDeath {
    fn default() -> Self {
        Self {
            delay_secs: ENEMY_REMOVAL_DELAY_SECS,
        }
    }
}

impl DamageResponse for RemoveOnDeath {
    fn name(&self) -> &'static str {
        "remove"
    }

    fn knockback(&self, body: &Body, _origin: Option<Vec3>, force: f32) -> VelocityImpulse {
        VelocityImpulse::with_reset(-body.pose.forward() * force, VelocityReset::All)
    }

    fn on_death(&mut self, motor: &mut CharacterMotor, body: &mut Body) -> DeathOutcome {
        body.kinematic = true;
        body.velocity = Vec3::zeros();
        motor.set_movement_direction(Vec3::zeros());
        DeathOutcome::Remove {
            delay_secs: self.delay_secs,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum HealthTimer {
    Invincibility,
    Flash,
    Removal,
}

pub struct Health {
    settings: HealthSettings,
    current: i32,
    invincible: bool,
    flashing: bool,
    dead: bool,
    response: Box<dyn DamageResponse>,
    timers: Timers<HealthTimer>,
    events: Vec<HealthEvent>,
}

impl Health {
    pub fn new(
        settings: HealthSettings,
        response: Box<dyn DamageResponse>,
    ) -> Result<Self, SetupError> {
        settings.validate()?;
        Ok(Self::from_valid(settings, response))
    }

    /// Default settings, respawning at `spawn`. Used when a character is built without health.
    pub fn respawning(spawn: Pose) -> Self {
        Self::from_valid(HealthSettings::default(), Box::new(RespawnOnDeath::new(spawn)))
    }

    fn from_valid(settings: HealthSettings, response: Box<dyn DamageResponse>) -> Self {
        Self {
            current: settings.max_health,
            settings,
            invincible: false,
            flashing: false,
            dead: false,
            response,
            timers: Timers::new(),
            events: Vec::new(),
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.settings.max_health
    }

    pub fn settings(&self) -> &HealthSettings {
        &self.settings
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    pub fn is_flashing(&self) -> bool {
        self.flashing
    }

    /// True once a removal response has taken the character out of play.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn response_name(&self) -> &'static str {
        self.response.name()
    }

    /// Applies a hit. Returns false when it was ignored (invincible or already dead).
    pub fn damage(
        &mut self,
        amount: i32,
        origin: Option<Vec3>,
        motor: &mut CharacterMotor,
        body: &mut Body,
    ) -> bool {
        if self.invincible || self.dead {
            log::debug!("health: ignoring {amount} damage");
            return false;
        }

        self.change(-amount);
        if self.current <= 0 {
            self.die(motor, body);
            return true;
        }

        self.events.push(HealthEvent::Hit { amount });
        if self.settings.knockback {
            let impulse = self
                .response
                .knockback(body, origin, self.settings.knockback_force);
            if let Some(velocity) = motor.request_velocity(body, impulse) {
                self.events.push(HealthEvent::KnockedBack { velocity });
            }
        }
        if self.settings.flash {
            self.flashing = true;
            self.timers
                .schedule(HealthTimer::Flash, self.settings.invincibility_secs);
            self.events.push(HealthEvent::FlashStarted);
        }
        if self.settings.invincibility_secs > 0.0 {
            self.invincible = true;
            self.timers
                .schedule(HealthTimer::Invincibility, self.settings.invincibility_secs);
        }
        true
    }

    pub fn heal(&mut self, amount: i32) {
        if self.dead {
            return;
        }
        self.change(amount);
    }

    /// Advances the invincibility, flash and removal timers.
    pub fn update(&mut self, dt: f32) {
        for timer in self.timers.tick(dt) {
            match timer {
                HealthTimer::Invincibility => {
                    self.invincible = false;
                    self.events.push(HealthEvent::InvincibilityEnded);
                }
                HealthTimer::Flash => {
                    self.flashing = false;
                    self.events.push(HealthEvent::FlashEnded);
                }
                HealthTimer::Removal => {
                    log::info!("health: removal delay elapsed");
                    self.events.push(HealthEvent::Removed);
                }
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<HealthEvent> {
        std::mem::take(&mut self.events)
    }

    fn change(&mut self, amount: i32) {
        let next = (self.current + amount).clamp(0, self.settings.max_health);
        if next != self.current {
            self.current = next;
            self.events.push(HealthEvent::Changed {
                current: next,
                max: self.settings.max_health,
            });
        }
    }

    fn die(&mut self, motor: &mut CharacterMotor, body: &mut Body) {
        log::info!("health: died ({} response)", self.response.name());
        self.events.push(HealthEvent::Died);

        // A death ends any pending hit feedback.
        self.invincible = false;
        self.timers.cancel(HealthTimer::Invincibility);
        if self.timers.cancel(HealthTimer::Flash) {
            self.flashing = false;
            self.events.push(HealthEvent::FlashEnded);
        }

        match self.response.on_death(motor, body) {
            DeathOutcome::Respawn => {
                self.change(self.settings.max_health);
                self.events.push(HealthEvent::Respawned);
            }
            DeathOutcome::Remove { delay_secs } => {
                self.dead = true;
                self.timers.schedule(HealthTimer::Removal, delay_secs);
            }
        }
    }
}
