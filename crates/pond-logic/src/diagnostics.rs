//! Diagnostics panel: read-only arc gauges over selected biome fields.
//!
//! Each gauge maps `value / max` (clamped to `[0, 1]`) to a status tier
//! and a filled arc. The panel carries the theme and its accent color so
//! a renderer can frame it without consulting the palette itself.

use serde::{Deserialize, Serialize};

use crate::biome::{BiomeField, BiomeState};
use crate::config::ConfigError;
use crate::theme::Theme;

/// Which field one gauge shows and how to scale it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeDef {
    pub field: BiomeField,
    pub label: String,
    pub max: f32,
    pub unit: String,
}

impl GaugeDef {
    fn new(field: BiomeField, label: &str, max: f32, unit: &str) -> Self {
        Self {
            field,
            label: label.into(),
            max,
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// Ratio strictly above which a gauge is good.
    pub good_above: f32,
    /// Ratio strictly above which a gauge is at least warn.
    pub warn_above: f32,
    /// Sweep of a full gauge, degrees.
    pub arc_degrees: f32,
    pub gauges: Vec<GaugeDef>,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            good_above: 0.7,
            warn_above: 0.3,
            arc_degrees: 270.0,
            gauges: vec![
                GaugeDef::new(BiomeField::SmallFish, "Small fish", 100.0, "fish"),
                GaugeDef::new(BiomeField::DissolvedOxygen, "Dissolved oxygen", 100.0, "mg/L"),
                GaugeDef::new(BiomeField::Nutrients, "Nutrients", 100.0, "mg/L"),
            ],
        }
    }
}

impl GaugeConfig {
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let (good, warn) = (self.good_above, self.warn_above);
        if !(warn >= 0.0 && warn < good && good <= 1.0) {
            errors.push(ConfigError::InvalidGaugeRatios { good, warn });
        }
        if !(self.arc_degrees > 0.0 && self.arc_degrees <= 360.0) {
            errors.push(ConfigError::InvalidArc(self.arc_degrees));
        }
        for gauge in &self.gauges {
            if !gauge.max.is_finite() || gauge.max <= 0.0 {
                errors.push(ConfigError::InvalidGaugeMax(gauge.label.clone()));
            }
        }
        errors
    }

    pub fn status_for(&self, ratio: f32) -> GaugeStatus {
        if ratio > self.good_above {
            GaugeStatus::Good
        } else if ratio > self.warn_above {
            GaugeStatus::Warn
        } else {
            GaugeStatus::Danger
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeStatus {
    Good,
    Warn,
    Danger,
}

/// One rendered gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub label: String,
    pub unit: String,
    pub value: f32,
    pub max: f32,
    pub ratio: f32,
    pub status: GaugeStatus,
    pub arc_fill_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub theme: Theme,
    pub accent: String,
    pub gauges: Vec<Gauge>,
}

/// Build every configured gauge for one snapshot.
pub fn read_gauges(
    state: &BiomeState,
    theme: Theme,
    config: &GaugeConfig,
    accent: &str,
) -> DiagnosticsReport {
    let (state, _) = state.sanitized();
    let gauges = config
        .gauges
        .iter()
        .map(|gauge| {
            let value = state.field(gauge.field);
            let ratio = if gauge.max > 0.0 {
                (value / gauge.max).clamp(0.0, 1.0)
            } else {
                0.0
            };
            Gauge {
                label: gauge.label.clone(),
                unit: gauge.unit.clone(),
                value,
                max: gauge.max,
                ratio,
                status: config.status_for(ratio),
                arc_fill_degrees: ratio * config.arc_degrees,
            }
        })
        .collect();

    DiagnosticsReport {
        theme,
        accent: accent.to_string(),
        gauges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(state: &BiomeState) -> DiagnosticsReport {
        read_gauges(state, Theme::Healthy, &GaugeConfig::default(), "#10b981")
    }

    #[test]
    fn default_panel_has_three_gauges() {
        let r = report(&BiomeState::default());
        let labels: Vec<&str> = r.gauges.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["Small fish", "Dissolved oxygen", "Nutrients"]);
        assert_eq!(r.accent, "#10b981");
    }

    #[test]
    fn status_tiers_are_strict() {
        let config = GaugeConfig::default();
        assert_eq!(config.status_for(0.71), GaugeStatus::Good);
        assert_eq!(config.status_for(0.7), GaugeStatus::Warn);
        assert_eq!(config.status_for(0.31), GaugeStatus::Warn);
        assert_eq!(config.status_for(0.3), GaugeStatus::Danger);
        assert_eq!(config.status_for(0.0), GaugeStatus::Danger);
    }

    #[test]
    fn ratio_clamps_and_arc_follows() {
        let state = BiomeState {
            small_fish: 250.0,
            dissolved_oxygen: 50.0,
            nutrients: -5.0,
            ..Default::default()
        };
        let r = report(&state);
        assert_eq!(r.gauges[0].ratio, 1.0);
        assert_eq!(r.gauges[0].arc_fill_degrees, 270.0);
        assert_eq!(r.gauges[0].status, GaugeStatus::Good);
        assert_eq!(r.gauges[1].ratio, 0.5);
        assert_eq!(r.gauges[1].arc_fill_degrees, 135.0);
        assert_eq!(r.gauges[1].status, GaugeStatus::Warn);
        assert_eq!(r.gauges[2].value, 0.0);
        assert_eq!(r.gauges[2].status, GaugeStatus::Danger);
    }

    #[test]
    fn custom_gauge_set() {
        let config = GaugeConfig {
            gauges: vec![GaugeDef::new(BiomeField::WaterTurbidity, "Turbidity", 200.0, "NTU")],
            ..Default::default()
        };
        let state = BiomeState {
            water_turbidity: 100.0,
            ..Default::default()
        };
        let r = read_gauges(&state, Theme::Polluted, &config, "#f59e0b");
        assert_eq!(r.gauges.len(), 1);
        assert_eq!(r.gauges[0].ratio, 0.5);
        assert_eq!(r.theme, Theme::Polluted);
    }

    #[test]
    fn validate_rejects_inverted_ratios() {
        let config = GaugeConfig {
            good_above: 0.3,
            warn_above: 0.7,
            arc_degrees: 0.0,
            gauges: vec![GaugeDef::new(BiomeField::Nutrients, "Nutrients", 0.0, "mg/L")],
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigError::InvalidGaugeMax("Nutrients".into())));
    }
}
