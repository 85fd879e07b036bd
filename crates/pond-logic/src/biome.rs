//! Biome snapshot contract: the values the simulation store hands us.
//!
//! The store ticks on its own cadence and republishes a fresh
//! [`BiomeState`] every tick. Nothing in this crate mutates a snapshot;
//! consumers read it, optionally after [`BiomeState::sanitized`] has
//! clamped degraded input back into the non-negative range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::quality::AnimationQuality;

/// Numeric state vector of the pond for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BiomeState {
    /// Small-fish population indicator.
    pub small_fish: f32,
    /// Large-fish population indicator.
    pub large_fish: f32,
    /// Aquatic-plant indicator.
    pub aquatic_plants: f32,
    /// Dissolved oxygen (0..100 scale).
    pub dissolved_oxygen: f32,
    /// Nutrient load (0..100 scale).
    pub nutrients: f32,
    /// Phytoplankton density.
    pub phytoplankton: f32,
    /// Water turbidity (0..100 scale).
    pub water_turbidity: f32,
    /// Simulation tick counter, monotonically non-decreasing.
    pub tick: u64,
}

/// Named field of [`BiomeState`], used by configuration to point gauges
/// at a value without hard-coding the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeField {
    SmallFish,
    LargeFish,
    AquaticPlants,
    DissolvedOxygen,
    Nutrients,
    Phytoplankton,
    WaterTurbidity,
}

impl BiomeState {
    /// Read a field by name.
    pub fn field(&self, field: BiomeField) -> f32 {
        match field {
            BiomeField::SmallFish => self.small_fish,
            BiomeField::LargeFish => self.large_fish,
            BiomeField::AquaticPlants => self.aquatic_plants,
            BiomeField::DissolvedOxygen => self.dissolved_oxygen,
            BiomeField::Nutrients => self.nutrients,
            BiomeField::Phytoplankton => self.phytoplankton,
            BiomeField::WaterTurbidity => self.water_turbidity,
        }
    }

    /// Copy of this snapshot with every negative or non-finite field
    /// clamped to zero.
    ///
    /// Returns the clamped snapshot and whether anything had to change.
    /// Upstream glitches (a transient negative count) are recoverable;
    /// they must never turn into negative pool targets or NaN positions.
    pub fn sanitized(&self) -> (BiomeState, bool) {
        let mut clamped = false;
        let mut fix = |v: f32| {
            if v.is_finite() && v >= 0.0 {
                v
            } else {
                clamped = true;
                0.0
            }
        };
        let out = BiomeState {
            small_fish: fix(self.small_fish),
            large_fish: fix(self.large_fish),
            aquatic_plants: fix(self.aquatic_plants),
            dissolved_oxygen: fix(self.dissolved_oxygen),
            nutrients: fix(self.nutrients),
            phytoplankton: fix(self.phytoplankton),
            water_turbidity: fix(self.water_turbidity),
            tick: self.tick,
        };
        (out, clamped)
    }
}

/// Flag set by the aerator control.
pub const AERATOR_ACTIVE: &str = "aerator_active";

/// Named boolean switches exposed by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineFlags(BTreeMap<String, bool>);

impl EngineFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.0.insert(name.into(), value);
    }

    /// `true` only if the flag exists and is set. Unknown flags read as off.
    pub fn is_set(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

/// Frame-rate measurement and the quality tier derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReading {
    pub current_fps: f32,
    pub animation_quality: AnimationQuality,
}

impl Default for PerformanceReading {
    fn default() -> Self {
        Self {
            current_fps: 60.0,
            animation_quality: AnimationQuality::High,
        }
    }
}

/// Everything the simulation store exposes at UI rate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UiSnapshot {
    pub biome: BiomeState,
    pub flags: EngineFlags,
    pub performance: PerformanceReading,
}
