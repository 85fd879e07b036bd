//! Animation-quality tiers and the frame-rate governor that picks them.
//!
//! Quality scales only the *cost* of the motion loop. It never touches
//! how many fish exist or what health they show.
//!
//! | Quality | Motion step | Notes |
//! |---------|-------------|-------|
//! | `high` | every frame | |
//! | `medium` | every 2nd frame | skipped frames' dt carried over |
//! | `low` | every 4th frame | skipped frames' dt carried over |
//! | `disabled` | never | motion frozen, carried dt discarded |
//!
//! ```
//! use pond_logic::quality::{AnimationQuality, QualityIntervals};
//!
//! let intervals = QualityIntervals::default();
//! assert!(intervals.should_step(AnimationQuality::High, 1));
//! assert!(!intervals.should_step(AnimationQuality::Low, 1));
//! assert!(!intervals.should_step(AnimationQuality::Disabled, 0));
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::biome::PerformanceReading;
use crate::config::ConfigError;

/// Performance-driven hint for how much effort to spend on animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationQuality {
    High,
    Medium,
    Low,
    Disabled,
}

impl AnimationQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationQuality::High => "high",
            AnimationQuality::Medium => "medium",
            AnimationQuality::Low => "low",
            AnimationQuality::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AnimationQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motion-step interval per quality tier, in frames.
///
/// `1` steps every frame, `4` every 4th frame, `0` never.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIntervals {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub disabled: u32,
}

impl Default for QualityIntervals {
    fn default() -> Self {
        Self {
            high: 1,
            medium: 2,
            low: 4,
            disabled: 0,
        }
    }
}

impl QualityIntervals {
    pub fn interval_for(&self, quality: AnimationQuality) -> u32 {
        match quality {
            AnimationQuality::High => self.high,
            AnimationQuality::Medium => self.medium,
            AnimationQuality::Low => self.low,
            AnimationQuality::Disabled => self.disabled,
        }
    }

    /// Whether frame number `frame` runs a motion step at this quality.
    pub fn should_step(&self, quality: AnimationQuality, frame: u64) -> bool {
        let interval = self.interval_for(quality);
        if interval == 0 {
            return false;
        }
        frame % u64::from(interval) == 0
    }

    pub fn validate(&self) -> Vec<ConfigError> {
        // High quality must actually animate.
        if self.high == 0 {
            vec![ConfigError::FrozenHighQuality]
        } else {
            Vec::new()
        }
    }
}

/// Frame-rate cut-offs for each quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Number of frame times averaged.
    pub window: usize,
    pub high_min_fps: f32,
    pub medium_min_fps: f32,
    pub low_min_fps: f32,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            window: 120,
            high_min_fps: 50.0,
            medium_min_fps: 30.0,
            low_min_fps: 15.0,
        }
    }
}

impl GovernorConfig {
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.window == 0 {
            errors.push(ConfigError::EmptyGovernorWindow);
        }
        let ordered = self.low_min_fps > 0.0
            && self.medium_min_fps > self.low_min_fps
            && self.high_min_fps > self.medium_min_fps
            && self.high_min_fps.is_finite();
        if !ordered {
            errors.push(ConfigError::GovernorThresholdOrder);
        }
        errors
    }

    pub fn quality_for_fps(&self, fps: f32) -> AnimationQuality {
        if fps >= self.high_min_fps {
            AnimationQuality::High
        } else if fps >= self.medium_min_fps {
            AnimationQuality::Medium
        } else if fps >= self.low_min_fps {
            AnimationQuality::Low
        } else {
            AnimationQuality::Disabled
        }
    }
}

/// Rolling frame-time window that turns measured frame rate into an
/// [`AnimationQuality`] hint.
#[derive(Debug, Clone)]
pub struct PerformanceGovernor {
    config: GovernorConfig,
    frame_times: VecDeque<f32>,
}

impl PerformanceGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(config.window),
            config,
        }
    }

    /// Record one frame's duration in seconds. Non-positive or non-finite
    /// samples are ignored.
    pub fn record_frame(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        if self.frame_times.len() >= self.config.window.max(1) {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);
    }

    /// Average FPS over the window. With no samples yet, assumes the
    /// display is keeping up and reports the high-tier cut-off.
    pub fn fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return self.config.high_min_fps;
        }
        let avg = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn quality(&self) -> AnimationQuality {
        self.config.quality_for_fps(self.fps())
    }

    pub fn reading(&self) -> PerformanceReading {
        PerformanceReading {
            current_fps: self.fps(),
            animation_quality: self.quality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_intervals() {
        let q = QualityIntervals::default();
        assert_eq!(q.interval_for(AnimationQuality::High), 1);
        assert_eq!(q.interval_for(AnimationQuality::Medium), 2);
        assert_eq!(q.interval_for(AnimationQuality::Low), 4);
        assert_eq!(q.interval_for(AnimationQuality::Disabled), 0);
    }

    #[test]
    fn medium_steps_every_other_frame() {
        let q = QualityIntervals::default();
        let steps: Vec<bool> = (0..4).map(|f| q.should_step(AnimationQuality::Medium, f)).collect();
        assert_eq!(steps, vec![true, false, true, false]);
    }

    #[test]
    fn disabled_never_steps() {
        let q = QualityIntervals::default();
        assert!((0..100).all(|f| !q.should_step(AnimationQuality::Disabled, f)));
    }

    #[test]
    fn frozen_high_quality_rejected() {
        let q = QualityIntervals {
            high: 0,
            ..Default::default()
        };
        assert_eq!(q.validate(), vec![ConfigError::FrozenHighQuality]);
    }

    #[test]
    fn governor_reports_high_at_60fps() {
        let mut gov = PerformanceGovernor::new(GovernorConfig::default());
        for _ in 0..60 {
            gov.record_frame(1.0 / 60.0);
        }
        assert!((gov.fps() - 60.0).abs() < 0.5);
        assert_eq!(gov.quality(), AnimationQuality::High);
    }

    #[test]
    fn governor_degrades_with_slow_frames() {
        let mut gov = PerformanceGovernor::new(GovernorConfig::default());
        for _ in 0..120 {
            gov.record_frame(1.0 / 40.0);
        }
        assert_eq!(gov.quality(), AnimationQuality::Medium);
        for _ in 0..120 {
            gov.record_frame(1.0 / 20.0);
        }
        assert_eq!(gov.quality(), AnimationQuality::Low);
        for _ in 0..120 {
            gov.record_frame(0.2);
        }
        assert_eq!(gov.quality(), AnimationQuality::Disabled);
        assert_eq!(gov.reading().animation_quality, AnimationQuality::Disabled);
    }

    #[test]
    fn governor_window_is_rolling() {
        let mut gov = PerformanceGovernor::new(GovernorConfig {
            window: 4,
            ..Default::default()
        });
        for _ in 0..4 {
            gov.record_frame(0.1);
        }
        for _ in 0..4 {
            gov.record_frame(1.0 / 60.0);
        }
        assert_eq!(gov.quality(), AnimationQuality::High);
    }

    #[test]
    fn governor_ignores_bad_samples() {
        let mut gov = PerformanceGovernor::new(GovernorConfig::default());
        gov.record_frame(f32::NAN);
        gov.record_frame(-0.5);
        gov.record_frame(0.0);
        assert_eq!(gov.quality(), AnimationQuality::High);
    }

    #[test]
    fn unordered_cutoffs_rejected() {
        let config = GovernorConfig {
            medium_min_fps: 60.0,
            ..Default::default()
        };
        assert!(config.validate().contains(&ConfigError::GovernorThresholdOrder));
    }

    #[test]
    fn quality_serializes_lowercase() {
        let q: AnimationQuality = serde_json::from_str("\"disabled\"").unwrap();
        assert_eq!(q, AnimationQuality::Disabled);
        assert_eq!(AnimationQuality::Medium.to_string(), "medium");
    }
}
