//! Ecological theme classification.
//!
//! Maps a [`BiomeState`] snapshot onto one of three discrete themes by
//! checking two threshold tiers, most severe first:
//!
//! | Tier | Selected when |
//! |------|---------------|
//! | `collapsed` | any collapsed condition holds |
//! | `polluted` | any polluted condition holds |
//! | `healthy` | neither tier triggers |
//!
//! Thresholds are data ([`ThemeThresholds`]), validated once when the
//! evaluator is built. Evaluation itself is total: no errors, no state.
//!
//! ```
//! use pond_logic::biome::BiomeState;
//! use pond_logic::theme::{Theme, ThemeEvaluator, ThemeThresholds};
//!
//! let evaluator = ThemeEvaluator::new(ThemeThresholds::default()).unwrap();
//! let clear = BiomeState {
//!     small_fish: 200.0,
//!     dissolved_oxygen: 80.0,
//!     nutrients: 20.0,
//!     phytoplankton: 10.0,
//!     water_turbidity: 15.0,
//!     ..Default::default()
//! };
//! assert_eq!(evaluator.evaluate(&clear), Theme::Healthy);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::biome::BiomeState;
use crate::config::ConfigError;
use crate::error::{PondError, Result};
use crate::fish::HealthClass;

/// Discrete ecological classification of the pond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Healthy,
    Polluted,
    Collapsed,
}

impl Theme {
    /// Health class every organism takes on under this theme.
    pub fn health(self) -> HealthClass {
        match self {
            Theme::Healthy => HealthClass::Healthy,
            Theme::Polluted => HealthClass::Sick,
            Theme::Collapsed => HealthClass::Dead,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Healthy => "healthy",
            Theme::Polluted => "polluted",
            Theme::Collapsed => "collapsed",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditions for one threshold tier. Any single condition triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThemeRule {
    pub dissolved_oxygen_below: f32,
    pub small_fish_below: f32,
    pub nutrients_above: f32,
    pub phytoplankton_above: f32,
    pub water_turbidity_above: f32,
}

impl ThemeRule {
    fn triggers(&self, s: &BiomeState) -> bool {
        s.dissolved_oxygen < self.dissolved_oxygen_below
            || s.small_fish < self.small_fish_below
            || s.nutrients > self.nutrients_above
            || s.phytoplankton > self.phytoplankton_above
            || s.water_turbidity > self.water_turbidity_above
    }

    fn fields(&self) -> [(&'static str, f32); 5] {
        [
            ("dissolved_oxygen_below", self.dissolved_oxygen_below),
            ("small_fish_below", self.small_fish_below),
            ("nutrients_above", self.nutrients_above),
            ("phytoplankton_above", self.phytoplankton_above),
            ("water_turbidity_above", self.water_turbidity_above),
        ]
    }
}

/// Both threshold tiers. Every field is required in the tuning document;
/// a missing key fails the load instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThemeThresholds {
    pub collapsed: ThemeRule,
    pub polluted: ThemeRule,
}

impl Default for ThemeThresholds {
    fn default() -> Self {
        Self {
            collapsed: ThemeRule {
                dissolved_oxygen_below: 20.0,
                small_fish_below: 10.0,
                nutrients_above: 90.0,
                phytoplankton_above: 90.0,
                water_turbidity_above: 85.0,
            },
            polluted: ThemeRule {
                dissolved_oxygen_below: 45.0,
                small_fish_below: 40.0,
                nutrients_above: 60.0,
                phytoplankton_above: 65.0,
                water_turbidity_above: 55.0,
            },
        }
    }
}

impl ThemeThresholds {
    /// Check every threshold is a usable number and that the collapsed
    /// tier is at least as severe as the polluted tier on every field.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (tier, rule) in [("collapsed", &self.collapsed), ("polluted", &self.polluted)] {
            for (name, value) in rule.fields() {
                if !value.is_finite() {
                    errors.push(ConfigError::NonFiniteThreshold(format!("{tier}.{name}")));
                } else if value < 0.0 {
                    errors.push(ConfigError::NegativeThreshold(format!("{tier}.{name}")));
                }
            }
        }

        let c = &self.collapsed;
        let p = &self.polluted;
        // "below" fields: collapsed fires on a lower reading than polluted.
        if c.dissolved_oxygen_below > p.dissolved_oxygen_below {
            errors.push(ConfigError::ThresholdOrder("dissolved_oxygen_below"));
        }
        if c.small_fish_below > p.small_fish_below {
            errors.push(ConfigError::ThresholdOrder("small_fish_below"));
        }
        // "above" fields: collapsed fires on a higher reading than polluted.
        if c.nutrients_above < p.nutrients_above {
            errors.push(ConfigError::ThresholdOrder("nutrients_above"));
        }
        if c.phytoplankton_above < p.phytoplankton_above {
            errors.push(ConfigError::ThresholdOrder("phytoplankton_above"));
        }
        if c.water_turbidity_above < p.water_turbidity_above {
            errors.push(ConfigError::ThresholdOrder("water_turbidity_above"));
        }

        errors
    }
}

/// Pure classifier over a validated threshold table.
#[derive(Debug, Clone)]
pub struct ThemeEvaluator {
    thresholds: ThemeThresholds,
}

impl ThemeEvaluator {
    /// Build an evaluator, rejecting an unusable threshold table up front.
    pub fn new(thresholds: ThemeThresholds) -> Result<Self> {
        let errors = thresholds.validate();
        if !errors.is_empty() {
            return Err(PondError::Config(errors));
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &ThemeThresholds {
        &self.thresholds
    }

    /// Classify a snapshot. Degraded fields are clamped to zero first.
    pub fn evaluate(&self, state: &BiomeState) -> Theme {
        let (state, _) = state.sanitized();
        if self.thresholds.collapsed.triggers(&state) {
            Theme::Collapsed
        } else if self.thresholds.polluted.triggers(&state) {
            Theme::Polluted
        } else {
            Theme::Healthy
        }
    }
}
