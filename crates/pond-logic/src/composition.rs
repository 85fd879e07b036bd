//! Scene composition: the ambient layer around the fish pool.
//!
//! Pure derivation from one observed snapshot: how many plants and
//! decorative fish to draw, the water tint, which overlays are on, and a
//! one-line HUD. Owns no agent state; the pool renders into the region
//! this layer describes.

use serde::{Deserialize, Serialize};

use crate::biome::{BiomeState, EngineFlags, PerformanceReading, AERATOR_ACTIVE};
use crate::config::ConfigError;
use crate::fish::HealthClass;
use crate::theme::Theme;

/// Water tint opacity as a function of turbidity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpacityConfig {
    pub base: f32,
    pub per_turbidity: f32,
    pub min: f32,
    pub max: f32,
}

impl OpacityConfig {
    /// `base + turbidity * per_turbidity`, clamped to `[min, max]`.
    pub fn for_turbidity(&self, turbidity: f32) -> f32 {
        (self.base + turbidity * self.per_turbidity).clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgaeLogic {
    And,
    Or,
}

/// When the algae overlay shows. A minimum left out never triggers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgaeOverlay {
    pub logic: AlgaeLogic,
    #[serde(default)]
    pub phytoplankton_min: Option<f32>,
    #[serde(default)]
    pub water_turbidity_min: Option<f32>,
}

impl AlgaeOverlay {
    pub fn visible(&self, state: &BiomeState) -> bool {
        let phyto = self.phytoplankton_min.map_or(false, |min| state.phytoplankton >= min);
        let murky = self
            .water_turbidity_min
            .map_or(false, |min| state.water_turbidity >= min);
        match self.logic {
            AlgaeLogic::And => phyto && murky,
            AlgaeLogic::Or => phyto || murky,
        }
    }
}

/// CSS-style colors for one theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub water: String,
    pub plant: String,
    pub accent: String,
}

impl ThemeColors {
    fn new(water: &str, plant: &str, accent: &str) -> Self {
        Self {
            water: water.into(),
            plant: plant.into(),
            accent: accent.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub healthy: ThemeColors,
    pub polluted: ThemeColors,
    pub collapsed: ThemeColors,
}

impl Palette {
    pub fn for_theme(&self, theme: Theme) -> &ThemeColors {
        match theme {
            Theme::Healthy => &self.healthy,
            Theme::Polluted => &self.polluted,
            Theme::Collapsed => &self.collapsed,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            healthy: ThemeColors::new("#4fa3d1", "#3e9b4f", "#10b981"),
            polluted: ThemeColors::new("#7a8f5a", "#8a9a3c", "#f59e0b"),
            collapsed: ThemeColors::new("#5b4a3a", "#6b5a45", "#ef4444"),
        }
    }
}

/// Composition tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// Plant indicator units per drawn plant.
    pub plant_divisor: f32,
    pub max_plants: u32,
    /// Fish indicator units per decorative fish.
    pub fish_divisor: f32,
    pub max_small_fish: u32,
    pub max_large_fish: u32,
    pub opacity: OpacityConfig,
    pub algae: AlgaeOverlay,
    pub palette: Palette,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            plant_divisor: 20.0,
            max_plants: 6,
            fish_divisor: 20.0,
            max_small_fish: 8,
            max_large_fish: 4,
            opacity: OpacityConfig {
                base: 0.35,
                per_turbidity: 0.005,
                min: 0.2,
                max: 0.9,
            },
            algae: AlgaeOverlay {
                logic: AlgaeLogic::Or,
                phytoplankton_min: Some(70.0),
                water_turbidity_min: Some(60.0),
            },
            palette: Palette::default(),
        }
    }
}

impl CompositionConfig {
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for (name, divisor) in [("plant", self.plant_divisor), ("fish", self.fish_divisor)] {
            if !divisor.is_finite() || divisor <= 0.0 {
                errors.push(ConfigError::InvalidDivisor(name, divisor));
            }
        }

        let o = &self.opacity;
        if !(0.0..=1.0).contains(&o.min) || !(0.0..=1.0).contains(&o.max) || o.min > o.max {
            errors.push(ConfigError::InvalidOpacityRange { min: o.min, max: o.max });
        }
        for (name, v) in [("base", o.base), ("per_turbidity", o.per_turbidity)] {
            if !v.is_finite() || v < 0.0 {
                errors.push(ConfigError::InvalidOpacity(name, v));
            }
        }

        for (theme, colors) in [
            (Theme::Healthy, &self.palette.healthy),
            (Theme::Polluted, &self.palette.polluted),
            (Theme::Collapsed, &self.palette.collapsed),
        ] {
            for (slot, value) in [
                ("water", &colors.water),
                ("plant", &colors.plant),
                ("accent", &colors.accent),
            ] {
                if value.trim().is_empty() {
                    errors.push(ConfigError::EmptyColor(format!("{}.{}", theme, slot)));
                }
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterMotion {
    Calm,
    Turbulent,
}

/// Everything the ambient layer draws for one observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneComposition {
    pub theme: Theme,
    pub plant_count: u32,
    pub plant_state: HealthClass,
    pub decorative_small_fish: u32,
    pub decorative_large_fish: u32,
    pub water_color: String,
    pub plant_color: String,
    pub water_opacity: f32,
    pub water_motion: WaterMotion,
    pub show_algae: bool,
    pub show_bubbles: bool,
    pub hud: String,
}

fn scaled_count(value: f32, divisor: f32, cap: u32) -> u32 {
    ((value / divisor).round() as u32).min(cap)
}

/// Derive the ambient scene. Reads the sanitized snapshot, so degraded
/// input never yields negative counts or NaN opacity.
pub fn compose_scene(
    state: &BiomeState,
    theme: Theme,
    flags: &EngineFlags,
    performance: &PerformanceReading,
    config: &CompositionConfig,
) -> SceneComposition {
    let (state, _) = state.sanitized();
    let colors = config.palette.for_theme(theme);

    SceneComposition {
        theme,
        plant_count: scaled_count(state.aquatic_plants, config.plant_divisor, config.max_plants),
        plant_state: theme.health(),
        decorative_small_fish: scaled_count(
            state.small_fish,
            config.fish_divisor,
            config.max_small_fish,
        ),
        decorative_large_fish: scaled_count(
            state.large_fish,
            config.fish_divisor,
            config.max_large_fish,
        ),
        water_color: colors.water.clone(),
        plant_color: colors.plant.clone(),
        water_opacity: config.opacity.for_turbidity(state.water_turbidity),
        water_motion: if theme == Theme::Collapsed {
            WaterMotion::Turbulent
        } else {
            WaterMotion::Calm
        },
        show_algae: config.algae.visible(&state),
        show_bubbles: flags.is_set(AERATOR_ACTIVE),
        hud: format!(
            "tick {} | {} | {:.0} fps ({})",
            state.tick, theme, performance.current_fps, performance.animation_quality
        ),
    }
}
