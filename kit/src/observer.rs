//! Presentation hooks. Animation, audio and UI only observe the simulation; every hook
//! defaults to doing nothing.

use crate::{health::HealthEvent, jump::JumpKind, movement::Locomotion};

pub trait Presentation {
    fn on_jump(&mut self, _kind: JumpKind) {}

    fn on_scheme_changed(&mut self, _name: &str) {}

    fn on_health_event(&mut self, _event: &HealthEvent) {}

    fn on_hide_target(&mut self, _hidden: bool) {}

    fn on_locomotion(&mut self, _locomotion: Locomotion) {}
}

/// Logs what a real presentation layer would react to.
#[derive(Debug, Default)]
pub struct LogPresentation {
    pub name: String,
}

impl Presentation for LogPresentation {
    fn on_jump(&mut self, kind: JumpKind) {
        log::info!("{}: {kind:?} jump", self.name);
    }

    fn on_scheme_changed(&mut self, name: &str) {
        log::info!("{}: now using `{name}` controls", self.name);
    }

    fn on_health_event(&mut self, event: &HealthEvent) {
        match event {
            HealthEvent::Changed { current, max } => {
                log::info!("{}: health {current}/{max}", self.name);
            }
            HealthEvent::Died | HealthEvent::Respawned | HealthEvent::Removed => {
                log::info!("{}: {event:?}", self.name);
            }
            _ => log::debug!("{}: {event:?}", self.name),
        }
    }

    fn on_hide_target(&mut self, hidden: bool) {
        log::debug!("{}: model hidden = {hidden}", self.name);
    }
}
