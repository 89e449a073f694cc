//! Cooperative one-shot timers and the two-phase frame clock.

use crate::constants::{DEFAULT_FIXED_HZ, MAX_FRAME_DT_SECS};

/// Per-entity scheduled events, evaluated each tick.
///
/// At most one timer exists per key: scheduling an existing key restarts it, which is how
/// re-triggered damage replaces a pending colour revert instead of racing it.
#[derive(Clone, Debug)]
pub struct Timers<K> {
    pending: Vec<(K, f32)>,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: K, delay_secs: f32) {
        self.cancel(key);
        self.pending.push((key, delay_secs.max(0.0)));
    }

    /// Returns true when a pending timer was removed.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(k, _)| *k != key);
        before != self.pending.len()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.iter().any(|(k, _)| *k == key)
    }

    pub fn remaining(&self, key: K) -> Option<f32> {
        self.pending
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, secs)| *secs)
    }

    /// Advances every timer by `dt` and returns the keys that fired, earliest first.
    pub fn tick(&mut self, dt: f32) -> Vec<K> {
        let mut fired: Vec<(K, f32)> = Vec::new();
        self.pending.retain_mut(|(key, secs)| {
            *secs -= dt;
            if *secs <= 0.0 {
                fired.push((*key, *secs));
                false
            } else {
                true
            }
        });
        fired.sort_by(|a, b| a.1.total_cmp(&b.1));
        fired.into_iter().map(|(key, _)| key).collect()
    }
}

/// Splits variable frame time into fixed physics steps.
///
/// Frame deltas are clamped to [`MAX_FRAME_DT_SECS`], so a stalled frame can never
/// demand an unbounded burst of fixed steps.
#[derive(Clone, Debug)]
pub struct FrameClock {
    fixed_dt: f32,
    accumulator: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_HZ)
    }
}

impl FrameClock {
    pub fn new(fixed_hz: f32) -> Self {
        Self {
            fixed_dt: 1.0 / fixed_hz.max(1.0),
            accumulator: 0.0,
        }
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Clamps `frame_dt`, banks it and returns how many fixed steps are due.
    pub fn advance(&mut self, frame_dt: f32) -> (f32, u32) {
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT_SECS);
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        (dt, steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum Event {
        Flash,
        Invincibility,
    }

    #[test]
    fn fires_in_expiry_order() {
        let mut timers = Timers::new();
        timers.schedule(Event::Invincibility, 1.0);
        timers.schedule(Event::Flash, 0.5);

        assert!(timers.tick(0.4).is_empty());
        assert_eq!(timers.tick(0.7), vec![Event::Flash, Event::Invincibility]);
        assert!(!timers.is_pending(Event::Flash));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = Timers::new();
        timers.schedule(Event::Flash, 0.5);
        assert!(timers.cancel(Event::Flash));
        assert!(!timers.cancel(Event::Flash));
        assert!(timers.tick(1.0).is_empty());
    }

    #[test]
    fn rescheduling_restarts_instead_of_stacking() {
        let mut timers = Timers::new();
        timers.schedule(Event::Flash, 1.0);
        timers.tick(0.8);
        timers.schedule(Event::Flash, 1.0);

        assert!(timers.tick(0.5).is_empty());
        assert_eq!(timers.tick(0.5), vec![Event::Flash]);
        assert!(timers.tick(1.0).is_empty());
    }

    #[test]
    fn clock_banks_remainder_and_clamps_stalls() {
        let mut clock = FrameClock::new(50.0);
        assert_eq!(clock.advance(0.03).1, 1);
        assert_eq!(clock.advance(0.015).1, 1);

        let (dt, steps) = clock.advance(10.0);
        assert_eq!(dt, MAX_FRAME_DT_SECS);
        assert_eq!(steps, 6);
    }
}
