//! Tuning document for the whole visualizer core.
//!
//! Every threshold and formula constant lives here as data so the same
//! engine can be retuned without code changes. The bundled document is
//! `data/pond_config.json`; [`PondConfig::default`] mirrors it.
//!
//! Loading parses then validates, and reports every problem at once:
//!
//! ```
//! use pond_logic::config::PondConfig;
//!
//! let config = PondConfig::default();
//! assert!(config.validate().is_empty());
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cadence::CadenceConfig;
use crate::composition::CompositionConfig;
use crate::diagnostics::GaugeConfig;
use crate::error::{PondError, Result};
use crate::motion::MotionConfig;
use crate::population::PopulationRules;
use crate::quality::GovernorConfig;
use crate::theme::ThemeThresholds;

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Threshold is NaN or infinite (dotted field path).
    NonFiniteThreshold(String),
    /// Threshold is below zero (dotted field path).
    NegativeThreshold(String),
    /// Collapsed tier is milder than the polluted tier on this field.
    ThresholdOrder(&'static str),
    /// Healthy population target of zero.
    ZeroHealthyTarget,
    /// Population floor of zero for this theme.
    ZeroPopulationFloor(&'static str),
    /// Divisor that is zero, negative, or non-finite.
    InvalidDivisor(&'static str, f32),
    /// Population cap below a floor or the healthy target.
    PopulationCapTooLow { cap: u32, required: u32 },
    /// Edge margin or spawn inset out of range.
    InvalidMargin(f32),
    /// Probability outside `[0, 1]`.
    InvalidProbability(&'static str, f64),
    /// Speed-like value negative or non-finite.
    InvalidSpeed(&'static str, f32),
    /// Frame dt cap not positive.
    InvalidFrameDt(f32),
    /// High quality configured to never step.
    FrozenHighQuality,
    /// Governor averaging window of zero frames.
    EmptyGovernorWindow,
    /// Governor FPS cut-offs not strictly descending from high to low.
    GovernorThresholdOrder,
    /// Update rate not positive.
    InvalidCadence(&'static str, f64),
    /// Gauge ratios must satisfy `0 <= warn < good <= 1`.
    InvalidGaugeRatios { good: f32, warn: f32 },
    /// Gauge maximum not positive (gauge label).
    InvalidGaugeMax(String),
    /// Gauge arc outside `(0, 360]`.
    InvalidArc(f32),
    /// Water opacity range must satisfy `0 <= min <= max <= 1`.
    InvalidOpacityRange { min: f32, max: f32 },
    /// Opacity coefficient negative or non-finite.
    InvalidOpacity(&'static str, f32),
    /// Palette entry left empty (dotted field path).
    EmptyColor(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonFiniteThreshold(field) => {
                write!(f, "threshold {} is not finite", field)
            }
            ConfigError::NegativeThreshold(field) => write!(f, "threshold {} is negative", field),
            ConfigError::ThresholdOrder(field) => {
                write!(f, "collapsed.{} is milder than polluted.{}", field, field)
            }
            ConfigError::ZeroHealthyTarget => write!(f, "healthy population target is zero"),
            ConfigError::ZeroPopulationFloor(theme) => {
                write!(f, "{} population floor is zero", theme)
            }
            ConfigError::InvalidDivisor(name, v) => write!(f, "{} divisor {} must be > 0", name, v),
            ConfigError::PopulationCapTooLow { cap, required } => {
                write!(f, "max_population {} is below the minimum target {}", cap, required)
            }
            ConfigError::InvalidMargin(v) => write!(f, "margin {} out of range", v),
            ConfigError::InvalidProbability(name, p) => {
                write!(f, "{} = {} is not a probability", name, p)
            }
            ConfigError::InvalidSpeed(name, v) => {
                write!(f, "{} = {} must be finite and >= 0", name, v)
            }
            ConfigError::InvalidFrameDt(v) => write!(f, "max_frame_dt {} must be > 0", v),
            ConfigError::FrozenHighQuality => write!(f, "high quality interval must be >= 1"),
            ConfigError::EmptyGovernorWindow => write!(f, "governor window must be >= 1 frame"),
            ConfigError::GovernorThresholdOrder => {
                write!(f, "governor fps cut-offs must descend high > medium > low > 0")
            }
            ConfigError::InvalidCadence(name, hz) => write!(f, "{} = {} Hz must be > 0", name, hz),
            ConfigError::InvalidGaugeRatios { good, warn } => {
                write!(f, "gauge ratios need 0 <= warn ({}) < good ({}) <= 1", warn, good)
            }
            ConfigError::InvalidGaugeMax(label) => write!(f, "gauge '{}' max must be > 0", label),
            ConfigError::InvalidArc(deg) => write!(f, "gauge arc {} outside (0, 360]", deg),
            ConfigError::InvalidOpacityRange { min, max } => {
                write!(f, "opacity range needs 0 <= min ({}) <= max ({}) <= 1", min, max)
            }
            ConfigError::InvalidOpacity(name, v) => write!(f, "opacity {} = {} invalid", name, v),
            ConfigError::EmptyColor(field) => write!(f, "palette color {} is empty", field),
        }
    }
}

/// Complete tuning document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PondConfig {
    pub theme: ThemeThresholds,
    pub population: PopulationRules,
    pub motion: MotionConfig,
    pub governor: GovernorConfig,
    pub cadence: CadenceConfig,
    pub composition: CompositionConfig,
    pub diagnostics: GaugeConfig,
}

impl PondConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PondConfig = serde_json::from_str(json)?;
        config.checked()
    }

    /// Read, parse and validate a JSON document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Every validation problem in the document.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.theme.validate());
        errors.extend(self.population.validate());
        errors.extend(self.motion.validate());
        errors.extend(self.motion.quality.validate());
        errors.extend(self.governor.validate());
        errors.extend(self.cadence.validate());
        errors.extend(self.composition.validate());
        errors.extend(self.diagnostics.validate());
        errors
    }

    fn checked(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(PondError::Config(errors))
        }
    }
}
