//! Target fish count for a given ecological state.
//!
//! | Theme | Target |
//! |-------|--------|
//! | `healthy` | fixed full population |
//! | `polluted` | `min(cap, max(floor, round(small_fish / divisor)))` |
//! | `collapsed` | as `polluted`, with a smaller floor |
//!
//! A healthy pond always shows the full population, whatever the
//! small-fish indicator says. Floors are validated to be at least 1, so
//! no ecological state ever empties the pool. The cap is validated to
//! be at least every floor and the healthy target, so it only bites on
//! implausibly large indicator values. Performance hints never enter
//! this calculation.

use serde::{Deserialize, Serialize};

use crate::biome::BiomeState;
use crate::config::ConfigError;
use crate::theme::Theme;

/// Scaled population with a guaranteed minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorRule {
    /// Minimum target, must be >= 1.
    pub floor: u32,
    /// Small-fish indicator units per rendered fish.
    pub divisor: f32,
}

impl FloorRule {
    fn target(&self, small_fish: f32, cap: u32) -> usize {
        // `sanitized` has already removed negatives and NaN, so this is
        // in `[0, cap]` before the cast.
        let scaled = (small_fish / self.divisor).round().min(cap as f32);
        (scaled as usize).max(self.floor as usize).min(cap as usize)
    }
}

/// Theme → target count mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationRules {
    pub healthy_target: u32,
    pub polluted: FloorRule,
    pub collapsed: FloorRule,
    /// Upper bound on any target.
    pub max_population: u32,
}

impl Default for PopulationRules {
    fn default() -> Self {
        Self {
            healthy_target: 15,
            polluted: FloorRule {
                floor: 8,
                divisor: 20.0,
            },
            collapsed: FloorRule {
                floor: 3,
                divisor: 50.0,
            },
            max_population: 60,
        }
    }
}

impl PopulationRules {
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.healthy_target == 0 {
            errors.push(ConfigError::ZeroHealthyTarget);
        }
        for (name, rule) in [("polluted", &self.polluted), ("collapsed", &self.collapsed)] {
            if rule.floor == 0 {
                errors.push(ConfigError::ZeroPopulationFloor(name));
            }
            if !rule.divisor.is_finite() || rule.divisor <= 0.0 {
                errors.push(ConfigError::InvalidDivisor(name, rule.divisor));
            }
        }
        let required = self
            .healthy_target
            .max(self.polluted.floor)
            .max(self.collapsed.floor);
        if self.max_population < required {
            errors.push(ConfigError::PopulationCapTooLow {
                cap: self.max_population,
                required,
            });
        }
        errors
    }

    /// Number of fish the pool should converge to.
    pub fn target(&self, theme: Theme, state: &BiomeState) -> usize {
        let (state, _) = state.sanitized();
        match theme {
            Theme::Healthy => self.healthy_target.min(self.max_population) as usize,
            Theme::Polluted => self.polluted.target(state.small_fish, self.max_population),
            Theme::Collapsed => self.collapsed.target(state.small_fish, self.max_population),
        }
    }
}
