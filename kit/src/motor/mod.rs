//! Character motor: grounding and wall probes, rotation resolution, gravity, velocity-clamped
//! movement and the force gate that serializes external velocity changes.
//!
//! The motor runs in two phases per frame:
//! - [`CharacterMotor::update`] (variable step): probes, platform carry, rotation.
//! - [`CharacterMotor::fixed_update`] (fixed step): queued injections, gravity, movement and
//!   collision-resolved integration of the body.
//!
//! The body's velocity and position are only written here; everything else submits
//! changes through [`CharacterMotor::request_velocity`].

pub mod settings;
pub mod state;

pub use settings::{
    GravitySettings, MotorSettings, MovementSettings, ProbeSettings, RotationSettings,
    SurfaceTagNames,
};
pub use state::{
    ForceGate, MotionState, RotationIntent, SurfaceTags, VelocityImpulse, VelocityReset,
    is_sliding,
};

use std::f32::consts::PI;

use crate::{
    body::{Body, ForceMode},
    error::SetupError,
    math::{Pose, Quat, Vec3, angle_between_deg, is_zero, look_rotation_yaw, up},
    physics::{BodyMover, MoveOutcome, PhysicsQuery},
    surface::TagRegistry,
    timer::Timers,
};
use state::PlatformLink;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MotorTimer {
    ReopenForceGate,
}

pub struct CharacterMotor {
    settings: MotorSettings,
    tags: SurfaceTags,
    state: MotionState,
    movement_direction: Vec3,
    velocity_movement: bool,
    rotation_override: Option<Vec3>,
    gate: ForceGate,
    timers: Timers<MotorTimer>,
    pending: Vec<VelocityImpulse>,
    teleport: Option<Pose>,
    platform: Option<PlatformLink>,
}

impl CharacterMotor {
    /// Builds a motor, interning its surface tags into `registry`.
    ///
    /// Empty probe masks are allowed but logged: the probe simply never hits.
    pub fn new(settings: MotorSettings, registry: &mut TagRegistry) -> Result<Self, SetupError> {
        settings.validate()?;
        if settings.probes.ground_mask.is_empty() {
            log::warn!("motor: ground mask is empty, the character will never be grounded");
        }
        if settings.probes.wall_mask.is_empty() {
            log::warn!("motor: wall mask is empty, wall contact will never be reported");
        }

        let tags = SurfaceTags::resolve(&settings.tags, registry);
        Ok(Self {
            settings,
            tags,
            state: MotionState::default(),
            movement_direction: Vec3::zeros(),
            velocity_movement: false,
            rotation_override: None,
            gate: ForceGate::default(),
            timers: Timers::new(),
            pending: Vec::new(),
            teleport: None,
            platform: None,
        })
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn settings(&self) -> &MotorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut MotorSettings {
        &mut self.settings
    }

    pub fn tags(&self) -> &SurfaceTags {
        &self.tags
    }

    pub fn movement_direction(&self) -> Vec3 {
        self.movement_direction
    }

    /// Desired world-space movement, magnitude up to one.
    pub fn set_movement_direction(&mut self, direction: Vec3) {
        self.movement_direction = direction;
    }

    pub fn velocity_movement(&self) -> bool {
        self.velocity_movement
    }

    /// While set and there is no movement input, velocity is left to external impulses.
    pub fn set_velocity_movement(&mut self, enabled: bool) {
        self.velocity_movement = enabled;
    }

    /// Face `direction` instantly, once. Cleared by the next fixed step.
    pub fn override_rotation(&mut self, direction: Vec3) {
        self.rotation_override = Some(direction);
    }

    pub fn rotation_intent(&self) -> RotationIntent {
        if let Some(direction) = self.rotation_override {
            RotationIntent::Override(direction)
        } else if self.settings.rotation.velocity_rotation || self.state.sliding {
            RotationIntent::Velocity
        } else {
            RotationIntent::MovementDirection
        }
    }

    pub fn is_gate_closed(&self) -> bool {
        self.gate.is_closed()
    }

    /// Moves the body to `pose` at the next fixed step, with zero velocity. That step does
    /// not integrate, so the body is exactly at `pose` once it has run.
    pub fn teleport(&mut self, pose: Pose) {
        self.teleport = Some(pose);
    }

    /// Submits an external velocity change through the force gate.
    ///
    /// Returns the velocity the body will have once the change is applied, or `None` when
    /// the gate is closed and the request was dropped.
    pub fn request_velocity(&mut self, body: &Body, impulse: VelocityImpulse) -> Option<Vec3> {
        if !self.gate.try_close() {
            log::debug!("force gate closed, dropping velocity change {:?}", impulse.delta);
            return None;
        }
        self.timers
            .schedule(MotorTimer::ReopenForceGate, self.settings.force_cooldown_secs);

        self.pending.push(impulse);
        Some(
            self.pending
                .iter()
                .fold(body.velocity, |v, pending| pending.apply_to(v)),
        )
    }

    /// Variable-step phase: timers, platform carry, ground and wall probes, rotation.
    pub fn update(&mut self, body: &mut Body, scene: &impl PhysicsQuery, dt: f32) {
        for timer in self.timers.tick(dt) {
            match timer {
                MotorTimer::ReopenForceGate => self.gate.reopen(),
            }
        }

        self.carry_with_platform(body, scene);
        self.check_grounded(body, scene);
        self.check_wall(body, scene);
        self.rotate(body, dt);
        self.state.velocity = body.velocity;
    }

    /// Fixed-step phase: queued teleport and injections, gravity, movement, then integration.
    pub fn fixed_update(
        &mut self,
        body: &mut Body,
        mover: &mut impl BodyMover,
        dt: f32,
    ) -> MoveOutcome {
        if let Some(pose) = self.teleport.take() {
            // The arrival step holds the pose: no injections, gravity or integration.
            body.pose = pose;
            body.velocity = Vec3::zeros();
            self.pending.clear();
            self.rotation_override = None;
            self.detach_platform();
            self.state.velocity = body.velocity;
            return MoveOutcome {
                translation: Vec3::zeros(),
                grounded: self.state.grounded,
            };
        }
        for impulse in self.pending.drain(..) {
            body.velocity = impulse.apply_to(body.velocity);
        }

        self.apply_gravity(body);
        self.apply_movement(body, dt);

        // The override is one-shot: apply it if the variable phase has not, then drop it.
        if let Some(rotation) = self
            .rotation_override
            .take()
            .and_then(|direction| look_rotation_yaw(&direction))
        {
            body.pose.rotation = rotation;
        }

        let outcome = body.step(dt, mover);
        self.state.velocity = body.velocity;
        outcome
    }

    fn check_grounded(&mut self, body: &Body, scene: &impl PhysicsQuery) {
        self.state.sliding = false;

        let probes = &self.settings.probes;
        let origin = body.pose.position + up() * probes.origin_height;
        let hit = scene.raycast(
            &origin,
            &-body.pose.up(),
            probes.ground_ray_distance,
            probes.ground_mask,
        );
        self.state.ground_hit = hit;

        let Some(hit) = hit else {
            self.state.grounded = false;
            self.detach_platform();
            return;
        };

        self.state.ground_normal = hit.normal;
        let slope = angle_between_deg(&hit.normal, &up());
        self.state.sliding = is_sliding(
            slope,
            self.settings.movement.slide_limit_deg,
            hit.surface.tag,
            &self.tags,
        );
        self.state.grounded = true;

        // Landing hands control back to input, unless an injection is still queued.
        if body.velocity.y <= 0.0 && self.pending.is_empty() {
            self.velocity_movement = false;
        }

        let on_platform = hit.surface.tag == Some(self.tags.moving_platform);
        match self.platform {
            Some(link) if on_platform && link.surface == hit.surface.id => {}
            _ if on_platform => {
                log::debug!("motor: attached to platform {}", hit.surface.id);
                self.platform = Some(PlatformLink {
                    surface: hit.surface.id,
                    last_pose: scene.surface_pose(hit.surface.id),
                });
            }
            Some(_) => self.detach_platform(),
            None => {}
        }
        self.state.on_moving_platform = self.platform.is_some();
    }

    fn check_wall(&mut self, body: &Body, scene: &impl PhysicsQuery) {
        let probes = &self.settings.probes;
        let origin = body.pose.position + up() * probes.origin_height;
        self.state.wall_hit = scene.raycast(
            &origin,
            &body.pose.forward(),
            probes.wall_ray_distance,
            probes.wall_mask,
        );
        self.state.wall_collision = self.state.wall_hit.is_some();
    }

    fn carry_with_platform(&mut self, body: &mut Body, scene: &impl PhysicsQuery) {
        let Some(link) = self.platform.as_mut() else {
            return;
        };
        let Some(current) = scene.surface_pose(link.surface) else {
            return;
        };

        if let Some(last) = link.last_pose {
            let delta = current.rotation * last.rotation.inverse();
            body.pose.position = current.position + delta * (body.pose.position - last.position);
            if let Some(rotation) = look_rotation_yaw(&(delta * body.pose.forward())) {
                body.pose.rotation = rotation;
            }
        }
        link.last_pose = Some(current);
    }

    fn detach_platform(&mut self) {
        if let Some(link) = self.platform.take() {
            log::debug!("motor: detached from platform {}", link.surface);
        }
        self.state.on_moving_platform = false;
    }

    fn rotate(&mut self, body: &mut Body, dt: f32) {
        let intent = self.rotation_intent();
        let target = match intent {
            RotationIntent::Override(direction) => direction,
            RotationIntent::Velocity => body.velocity,
            RotationIntent::MovementDirection => self.movement_direction,
        };
        let Some(rotation) = look_rotation_yaw(&target) else {
            return;
        };

        if let RotationIntent::Override(_) = intent {
            body.pose.rotation = rotation;
            return;
        }

        let settings = &self.settings.rotation;
        let mut speed = settings.speed;
        if settings.air_rotation < 1.0 && !self.state.grounded {
            speed *= settings.air_rotation;
        }
        let t = (dt * speed).clamp(0.0, 1.0);
        body.pose.rotation = body
            .pose
            .rotation
            .try_slerp(&rotation, t, 1.0e-6)
            // Exactly opposite facings have no unique slerp path; turn about up.
            .unwrap_or_else(|| body.pose.rotation * Quat::from_axis_angle(&Vec3::y_axis(), PI * t));
    }

    fn apply_gravity(&self, body: &mut Body) {
        let gravity = &self.settings.gravity;
        let direction = if gravity.override_on_surface && self.state.grounded {
            -self.state.ground_normal
        } else {
            gravity.direction
        };
        body.add_force(direction * gravity.force, ForceMode::Force);
    }

    fn apply_movement(&self, body: &mut Body, dt: f32) {
        if self.velocity_movement && is_zero(&self.movement_direction) {
            return;
        }

        let movement = &self.settings.movement;
        let cap = if self.state.grounded {
            movement.grounded_influence
        } else {
            movement.air_influence
        };
        let mut change = self.movement_direction * movement.speed - body.velocity;
        change.x = change.x.clamp(-cap, cap);
        change.z = change.z.clamp(-cap, cap);
        change.y = 0.0;
        body.add_force(change, ForceMode::VelocityChange);

        if self.state.sliding {
            body.add_force(
                Vec3::new(0.0, -1.0, 0.0) * movement.slide_force * dt,
                ForceMode::Force,
            );
        }
    }
}
