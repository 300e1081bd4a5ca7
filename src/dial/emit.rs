use crate::dial::sections::Section;
use std::time::{Duration, Instant};

/// What listeners get told after one or more accepted commits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Update {
    pub angle: f64,
    pub radius: f64,
    /// Set only when the secondary angle moved.
    pub angle_x: Option<f64>,
    /// Set only when the snap bucket moved.
    pub section: Option<Section>,
}

impl Update {
    /// Folds a later update into this one without losing a secondary change.
    pub fn coalesce(self, newer: Update) -> Update {
        Update {
            angle: newer.angle,
            radius: newer.radius,
            angle_x: newer.angle_x.or(self.angle_x),
            section: newer.section.or(self.section),
        }
    }
}

/// Scheduling policy between the state machine and the listeners.
pub trait RateLimit: Send {
    /// Returns the update to deliver now, if any.
    fn offer(&mut self, update: Update, now: Instant) -> Option<Update>;

    /// Releases a held update once its window has elapsed.
    fn poll(&mut self, now: Instant) -> Option<Update>;

    /// Releases a held update unconditionally.
    fn flush(&mut self, now: Instant) -> Option<Update>;

    /// Drops a held update.
    fn clear(&mut self);

    /// When `poll` will next have something to deliver.
    fn deadline(&self) -> Option<Instant> {
        None
    }
}

pub fn for_interval(interval: Duration) -> Box<dyn RateLimit> {
    if interval.is_zero() {
        Box::new(Immediate)
    } else {
        Box::new(Throttle::new(interval))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl RateLimit for Immediate {
    fn offer(&mut self, update: Update, _now: Instant) -> Option<Update> {
        Some(update)
    }

    fn poll(&mut self, _now: Instant) -> Option<Update> {
        None
    }

    fn flush(&mut self, _now: Instant) -> Option<Update> {
        None
    }

    fn clear(&mut self) {}
}

/// Leading and trailing edge throttle: the first update in a quiet period goes
/// out at once, later ones are merged and delivered when the window closes.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<Update>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn ready(&self, now: Instant) -> bool {
        self.last_emit
            .is_none_or(|t| now.saturating_duration_since(t) >= self.interval)
    }

    fn emit(&mut self, update: Update, now: Instant) -> Option<Update> {
        self.last_emit = Some(now);
        Some(update)
    }
}

impl RateLimit for Throttle {
    fn offer(&mut self, update: Update, now: Instant) -> Option<Update> {
        let merged = match self.pending.take() {
            Some(held) => held.coalesce(update),
            None => update,
        };

        if self.ready(now) {
            self.emit(merged, now)
        } else {
            self.pending = Some(merged);
            None
        }
    }

    fn poll(&mut self, now: Instant) -> Option<Update> {
        if !self.ready(now) {
            return None;
        }
        let held = self.pending.take()?;
        self.emit(held, now)
    }

    fn flush(&mut self, now: Instant) -> Option<Update> {
        let held = self.pending.take()?;
        self.emit(held, now)
    }

    fn clear(&mut self) {
        self.pending = None;
    }

    fn deadline(&self) -> Option<Instant> {
        self.pending.and(self.last_emit).map(|t| t + self.interval)
    }
}
