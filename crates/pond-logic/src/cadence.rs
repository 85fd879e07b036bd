//! UI/observation cadence: a throttled view of the simulation stream.
//!
//! The simulation store may tick far faster than anything needs to be
//! re-derived. [`ObservationThrottle`] caps how often snapshots reach
//! theme evaluation, composition, diagnostics and the pool, while always
//! delivering the *latest* value once the interval elapses.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Update rates for the two cadences this crate controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Maximum observations per second.
    pub ui_hz: f64,
    /// Target motion-loop frame rate.
    pub motion_hz: f64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            ui_hz: 30.0,
            motion_hz: 60.0,
        }
    }
}

impl CadenceConfig {
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (name, hz) in [("ui_hz", self.ui_hz), ("motion_hz", self.motion_hz)] {
            if !hz.is_finite() || hz <= 0.0 {
                errors.push(ConfigError::InvalidCadence(name, hz));
            }
        }
        errors
    }
}

/// Rate limiter that keeps the most recent value pending.
///
/// Time is supplied by the caller in seconds, so the throttle works the
/// same under a wall clock and a simulated one.
#[derive(Debug, Clone)]
pub struct ObservationThrottle<T> {
    interval: f64,
    last_emit: Option<f64>,
    pending: Option<T>,
}

impl<T> ObservationThrottle<T> {
    pub fn new(max_hz: f64) -> Self {
        Self {
            interval: if max_hz > 0.0 { 1.0 / max_hz } else { 0.0 },
            last_emit: None,
            pending: None,
        }
    }

    /// Offer a new value. Returns it straight back if the interval has
    /// elapsed, otherwise holds it (replacing any older pending value).
    pub fn offer(&mut self, now: f64, value: T) -> Option<T> {
        if self.ready(now) {
            self.pending = None;
            self.last_emit = Some(now);
            Some(value)
        } else {
            if self.pending.is_some() {
                log::trace!("observation superseded before emission");
            }
            self.pending = Some(value);
            None
        }
    }

    /// Emit the pending value if the interval has elapsed.
    pub fn poll(&mut self, now: f64) -> Option<T> {
        if self.pending.is_some() && self.ready(now) {
            self.last_emit = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn ready(&self, now: f64) -> bool {
        match self.last_emit {
            None => true,
            // Small tolerance so a 30 Hz clock fed at exactly 1/30 s
            // steps is not rejected by rounding.
            Some(last) => now - last >= self.interval - 1e-9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_offer_passes() {
        let mut t = ObservationThrottle::new(30.0);
        assert_eq!(t.offer(0.0, 1), Some(1));
    }

    #[test]
    fn fast_offers_are_held() {
        let mut t = ObservationThrottle::new(10.0);
        assert_eq!(t.offer(0.0, 1), Some(1));
        assert_eq!(t.offer(0.01, 2), None);
        assert_eq!(t.offer(0.02, 3), None);
        assert!(t.has_pending());
        // Latest value wins once the interval elapses.
        assert_eq!(t.poll(0.05), None);
        assert_eq!(t.poll(0.1), Some(3));
        assert!(!t.has_pending());
        assert_eq!(t.poll(0.5), None);
    }

    #[test]
    fn offer_after_interval_passes_and_clears_pending() {
        let mut t = ObservationThrottle::new(10.0);
        t.offer(0.0, 1);
        t.offer(0.05, 2);
        assert_eq!(t.offer(0.1, 3), Some(3));
        assert!(!t.has_pending());
    }

    #[test]
    fn caps_emission_rate() {
        // 120 Hz source for one second through a 30 Hz throttle.
        let mut t = ObservationThrottle::new(30.0);
        let mut emitted = 0;
        for i in 0..120 {
            let now = i as f64 / 120.0;
            if t.offer(now, i).is_some() {
                emitted += 1;
            }
        }
        assert!((29..=31).contains(&emitted), "emitted {}", emitted);
    }

    #[test]
    fn invalid_cadence_rejected() {
        let config = CadenceConfig {
            ui_hz: f64::NAN,
            motion_hz: -1.0,
        };
        assert_eq!(config.validate().len(), 2);
    }
}
