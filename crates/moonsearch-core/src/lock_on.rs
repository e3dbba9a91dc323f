//! Timed lock-on for the active target.
//!
//! A countdown runs only while the same target stays active and within the
//! lenient threshold. Any break resets it; there is no partial credit.
//! Once a target has been acquired it can never start another countdown,
//! even if it is selected again before the consumer marks it visited.

use smallvec::SmallVec;

use crate::config::LockOnConfig;
use crate::targets::TargetId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LockState {
    Idle,
    Tracking { target: TargetId, distance: f32 },
    Locking { target: TargetId, started_at: f64 },
    Acquired { target: TargetId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockEvent {
    Started(TargetId),
    Cancelled(TargetId),
    Acquired(TargetId),
}

/// Snapshot of the active target for one orientation sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveTarget {
    pub id: TargetId,
    pub distance: f32,
}

pub type LockEvents = SmallVec<[LockEvent; 2]>;

#[derive(Debug)]
pub struct LockOn {
    config: LockOnConfig,
    state: LockState,
    spent: SmallVec<[TargetId; 4]>,
}

impl LockOn {
    pub fn new(config: LockOnConfig) -> Self {
        Self {
            config,
            state: LockState::Idle,
            spent: SmallVec::new(),
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn config(&self) -> &LockOnConfig {
        &self.config
    }

    pub fn is_spent(&self, id: TargetId) -> bool {
        self.spent.contains(&id)
    }

    /// Seconds into the running countdown; zero when not locking.
    pub fn elapsed(&self, now: f64) -> f64 {
        match self.state {
            LockState::Locking { started_at, .. } => (now - started_at).max(0.0),
            _ => 0.0,
        }
    }

    /// Countdown progress in 0..=1.
    pub fn progress(&self, now: f64) -> f32 {
        match self.state {
            LockState::Acquired { .. } => 1.0,
            LockState::Locking { .. } => {
                (self.elapsed(now) / self.config.duration_sec).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    /// Evaluate one sample. `active` is the currently selected target and
    /// its distance, computed from the same orientation snapshot.
    pub fn update(&mut self, active: Option<ActiveTarget>, now: f64) -> LockEvents {
        let mut events = LockEvents::new();
        if matches!(self.state, LockState::Acquired { .. }) {
            return events;
        }

        let Some(active) = active else {
            if let LockState::Locking { target, .. } = self.state {
                events.push(LockEvent::Cancelled(target));
            }
            self.state = LockState::Idle;
            return events;
        };

        let within = active.distance < self.config.threshold();
        let spent = self.is_spent(active.id);

        match self.state {
            LockState::Locking { target, started_at } if target == active.id && within => {
                if now - started_at >= self.config.duration_sec {
                    self.acquire(target, &mut events);
                }
            }
            previous => {
                if let LockState::Locking { target, .. } = previous {
                    log::debug!("[lock] cancelled {:?}", target);
                    events.push(LockEvent::Cancelled(target));
                }
                if within && !spent {
                    log::debug!("[lock] started {:?} at {:.1}°", active.id, active.distance);
                    self.state = LockState::Locking {
                        target: active.id,
                        started_at: now,
                    };
                    events.push(LockEvent::Started(active.id));
                } else {
                    self.state = LockState::Tracking {
                        target: active.id,
                        distance: active.distance,
                    };
                }
            }
        }
        events
    }

    /// Complete a countdown whose time has run out between samples.
    pub fn poll(&mut self, now: f64) -> Option<LockEvent> {
        match self.state {
            LockState::Locking { target, started_at }
                if now - started_at >= self.config.duration_sec =>
            {
                let mut events = LockEvents::new();
                self.acquire(target, &mut events);
                events.pop()
            }
            _ => None,
        }
    }

    /// Leave the acquired state so the next sample starts a new cycle.
    pub fn clear_acquired(&mut self) {
        if matches!(self.state, LockState::Acquired { .. }) {
            self.state = LockState::Idle;
        }
    }

    /// Drop any running countdown, e.g. on phase teardown.
    pub fn reset(&mut self) {
        if !matches!(self.state, LockState::Acquired { .. }) {
            self.state = LockState::Idle;
        }
    }

    fn acquire(&mut self, target: TargetId, events: &mut LockEvents) {
        log::info!("[lock] acquired {:?}", target);
        self.state = LockState::Acquired { target };
        if !self.spent.contains(&target) {
            self.spent.push(target);
        }
        events.push(LockEvent::Acquired(target));
    }
}
