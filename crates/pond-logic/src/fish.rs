//! Fish agents: identity, fixed traits and health-driven appearance.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::motion::{Bounds, MotionConfig};

/// Stable per-manager identifier. Never reused while the manager lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FishId(pub u64);

impl fmt::Display for FishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fish-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Large,
}

impl SizeClass {
    /// Visual footprint (width, height) in surface units.
    pub fn footprint(self) -> (f32, f32) {
        match self {
            SizeClass::Small => (32.0, 16.0),
            SizeClass::Large => (48.0, 24.0),
        }
    }
}

/// Health tag, driven only by the ecological theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthClass {
    Healthy,
    Sick,
    Dead,
}

/// Fixed temperament chosen at spawn. Sets the base swim speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Active,
    Calm,
    Lazy,
}

impl Personality {
    pub const ALL: [Personality; 3] = [Personality::Active, Personality::Calm, Personality::Lazy];
}

/// HSL color tag picked at spawn (saturation 70%, lightness 60%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FishColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl FishColor {
    pub fn from_hue(hue: u16) -> Self {
        Self {
            hue: hue % 360,
            saturation: 70,
            lightness: 60,
        }
    }

    pub fn lighten(self, percent: u8) -> Self {
        Self {
            lightness: self.lightness.saturating_add(percent).min(100),
            ..self
        }
    }

    pub fn darken(self, percent: u8) -> Self {
        Self {
            lightness: self.lightness.saturating_sub(percent),
            ..self
        }
    }
}

impl fmt::Display for FishColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// Where and which way a fish is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Draw rotation in degrees. Dead fish are drawn belly-up at 90°.
    pub rotation: f32,
}

/// How a fish is drawn, derived from its fixed traits and health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub size: SizeClass,
    pub health: HealthClass,
    pub body: FishColor,
    pub highlight: FishColor,
    pub shade: FishColor,
    pub opacity: f32,
    pub grayscale: f32,
    pub belly_up: bool,
}

/// One animated fish owned by the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fish {
    pub id: FishId,
    pub size: SizeClass,
    pub health: HealthClass,
    pub x: f32,
    pub y: f32,
    /// Swim direction in degrees, kept in `[0, 360)`.
    pub heading: f32,
    /// Effective speed in surface units per second.
    pub speed: f32,
    pub personality: Personality,
    pub color: FishColor,
}

impl Fish {
    /// Spawn a healthy fish at a random position inside `bounds`, inset
    /// further by the configured spawn inset where the surface allows it.
    pub fn spawn<R: Rng + ?Sized>(
        id: FishId,
        bounds: &Bounds,
        config: &MotionConfig,
        rng: &mut R,
    ) -> Self {
        let size = if rng.gen_bool(config.large_probability) {
            SizeClass::Large
        } else {
            SizeClass::Small
        };
        let personality = Personality::ALL[rng.gen_range(0..Personality::ALL.len())];
        let color = FishColor::from_hue(rng.gen_range(0..360));

        let area = bounds.inset(config.spawn_inset - config.margin);
        let x = sample(rng, area.min_x, area.max_x);
        let y = sample(rng, area.min_y, area.max_y);

        let mut fish = Self {
            id,
            size,
            health: HealthClass::Healthy,
            x,
            y,
            heading: rng.gen_range(0.0..360.0),
            speed: 0.0,
            personality,
            color,
        };
        fish.speed = config.effective_speed(personality, HealthClass::Healthy);
        fish
    }

    /// Re-tag health in place. Returns `true` if the tag changed.
    ///
    /// Speed is recomputed from the personality base, so repeated
    /// re-tags never compound.
    pub fn set_health(&mut self, health: HealthClass, config: &MotionConfig) -> bool {
        if self.health == health {
            return false;
        }
        self.health = health;
        self.speed = config.effective_speed(self.personality, health);
        true
    }

    pub fn pose(&self) -> Pose {
        Pose {
            x: self.x,
            y: self.y,
            rotation: if self.health == HealthClass::Dead {
                90.0
            } else {
                self.heading
            },
        }
    }

    pub fn appearance(&self) -> Appearance {
        let (opacity, grayscale) = match self.health {
            HealthClass::Healthy => (1.0, 0.0),
            HealthClass::Sick => (0.7, 0.3),
            HealthClass::Dead => (0.4, 1.0),
        };
        Appearance {
            size: self.size,
            health: self.health,
            body: self.color,
            highlight: self.color.lighten(20),
            shade: self.color.darken(20),
            opacity,
            grayscale,
            belly_up: self.health == HealthClass::Dead,
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}
