//! Per-fish motion: straight swimming with wall reflection, occasional
//! wander, and sinking for dead fish.
//!
//! Algorithm for a living fish, per step:
//! 1. Advance along the heading by `speed * dt`
//! 2. On each axis, if the fish reached a wall while moving outward,
//!    reflect the heading about that wall's normal
//! 3. Clamp the position into bounds
//! 4. With a small probability, nudge the heading by a bounded delta
//!
//! Dead fish skip all of that and drift downward until they rest on the
//! lower bound.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::fish::{Fish, HealthClass, Personality};
use crate::quality::QualityIntervals;

/// Axis-aligned region a fish may occupy (surface minus margin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    /// `[margin, extent - margin]` on each axis. A surface narrower than
    /// two margins collapses that axis onto its midpoint.
    pub fn for_surface(width: f32, height: f32, margin: f32) -> Self {
        let (min_x, max_x) = axis(width, margin);
        let (min_y, max_y) = axis(height, margin);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Shrink by `by` on every side, never past the center.
    pub fn inset(&self, by: f32) -> Self {
        let by = by.max(0.0);
        let (min_x, max_x) = shrink(self.min_x, self.max_x, by);
        let (min_y, max_y) = shrink(self.min_y, self.max_y, by);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(self.min_x, self.max_x),
            y.clamp(self.min_y, self.max_y),
        )
    }
}

fn axis(extent: f32, margin: f32) -> (f32, f32) {
    let lo = margin.min(extent / 2.0);
    let hi = (extent - margin).max(lo);
    (lo, hi)
}

fn shrink(lo: f32, hi: f32, by: f32) -> (f32, f32) {
    if hi - lo >= 2.0 * by {
        (lo + by, hi - by)
    } else {
        let mid = (lo + hi) / 2.0;
        (mid, mid)
    }
}

/// Base swim speed per personality, surface units per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalitySpeeds {
    pub active: f32,
    pub calm: f32,
    pub lazy: f32,
}

/// Speed multiplier per health class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthFactors {
    pub healthy: f32,
    pub sick: f32,
    pub dead: f32,
}

/// Motion tuning for the fish pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Distance kept from every surface edge.
    pub margin: f32,
    /// Distance from the edges for newly spawned fish.
    pub spawn_inset: f32,
    /// Chance a new fish is large.
    pub large_probability: f64,
    pub speeds: PersonalitySpeeds,
    pub health_factors: HealthFactors,
    /// Downward drift of dead fish, units per second.
    pub sink_rate: f32,
    /// Chance per motion step that a swimming fish changes course.
    pub wander_probability: f64,
    /// Largest course change, either direction, in degrees.
    pub wander_max_degrees: f32,
    /// Upper bound on a single frame's dt, seconds.
    pub max_frame_dt: f32,
    /// Fixed rng seed for reproducible runs.
    pub seed: Option<u64>,
    pub quality: QualityIntervals,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            margin: 30.0,
            spawn_inset: 60.0,
            large_probability: 0.3,
            speeds: PersonalitySpeeds {
                active: 48.0,
                calm: 30.0,
                lazy: 18.0,
            },
            health_factors: HealthFactors {
                healthy: 1.0,
                sick: 0.6,
                dead: 0.1,
            },
            sink_rate: 6.0,
            wander_probability: 0.02,
            wander_max_degrees: 15.0,
            max_frame_dt: 0.25,
            seed: None,
            quality: QualityIntervals::default(),
        }
    }
}

impl MotionConfig {
    pub fn effective_speed(&self, personality: Personality, health: HealthClass) -> f32 {
        let base = match personality {
            Personality::Active => self.speeds.active,
            Personality::Calm => self.speeds.calm,
            Personality::Lazy => self.speeds.lazy,
        };
        let factor = match health {
            HealthClass::Healthy => self.health_factors.healthy,
            HealthClass::Sick => self.health_factors.sick,
            HealthClass::Dead => self.health_factors.dead,
        };
        base * factor
    }

    /// Non-finite or negative dt becomes 0; large dt is capped.
    pub fn sanitize_dt(&self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            dt.min(self.max_frame_dt)
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !self.margin.is_finite() || self.margin <= 0.0 {
            errors.push(ConfigError::InvalidMargin(self.margin));
        }
        if !self.spawn_inset.is_finite() || self.spawn_inset < self.margin {
            errors.push(ConfigError::InvalidMargin(self.spawn_inset));
        }
        for (name, p) in [
            ("large_probability", self.large_probability),
            ("wander_probability", self.wander_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(ConfigError::InvalidProbability(name, p));
            }
        }
        for (name, v) in [
            ("speeds.active", self.speeds.active),
            ("speeds.calm", self.speeds.calm),
            ("speeds.lazy", self.speeds.lazy),
            ("health_factors.healthy", self.health_factors.healthy),
            ("health_factors.sick", self.health_factors.sick),
            ("health_factors.dead", self.health_factors.dead),
            ("sink_rate", self.sink_rate),
            ("wander_max_degrees", self.wander_max_degrees),
        ] {
            if !v.is_finite() || v < 0.0 {
                errors.push(ConfigError::InvalidSpeed(name, v));
            }
        }
        if !self.max_frame_dt.is_finite() || self.max_frame_dt <= 0.0 {
            errors.push(ConfigError::InvalidFrameDt(self.max_frame_dt));
        }

        errors
    }
}

/// Advance one fish by `dt` seconds inside `bounds`.
pub fn step_fish<R: Rng + ?Sized>(
    fish: &mut Fish,
    bounds: &Bounds,
    dt: f32,
    config: &MotionConfig,
    rng: &mut R,
) {
    if fish.health == HealthClass::Dead {
        // Sinks, never reflects; rests on the lower bound.
        fish.x = fish.x.clamp(bounds.min_x, bounds.max_x);
        fish.y = (fish.y + config.sink_rate * dt).clamp(bounds.min_y, bounds.max_y);
        return;
    }

    let (sin, cos) = fish.heading.to_radians().sin_cos();
    fish.x += cos * fish.speed * dt;
    fish.y += sin * fish.speed * dt;

    if (fish.x <= bounds.min_x && cos < 0.0) || (fish.x >= bounds.max_x && cos > 0.0) {
        fish.heading = 180.0 - fish.heading;
    }
    if (fish.y <= bounds.min_y && sin < 0.0) || (fish.y >= bounds.max_y && sin > 0.0) {
        fish.heading = -fish.heading;
    }
    let (x, y) = bounds.clamp(fish.x, fish.y);
    fish.x = x;
    fish.y = y;

    if config.wander_max_degrees > 0.0 && rng.gen_bool(config.wander_probability) {
        let max = config.wander_max_degrees;
        fish.heading += rng.gen_range(-max..=max);
    }
    let heading = fish.heading.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negatives.
    fish.heading = if heading >= 360.0 { 0.0 } else { heading };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::{FishColor, FishId, SizeClass};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fish_at(x: f32, y: f32, heading: f32) -> Fish {
        Fish {
            id: FishId(0),
            size: SizeClass::Small,
            health: HealthClass::Healthy,
            x,
            y,
            heading,
            speed: 60.0,
            personality: Personality::Active,
            color: FishColor::from_hue(0),
        }
    }

    fn still_config() -> MotionConfig {
        MotionConfig {
            wander_probability: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn bounds_apply_margin() {
        let b = Bounds::for_surface(800.0, 420.0, 30.0);
        assert_eq!(
            b,
            Bounds {
                min_x: 30.0,
                max_x: 770.0,
                min_y: 30.0,
                max_y: 390.0
            }
        );
    }

    #[test]
    fn narrow_surface_collapses_axis() {
        let b = Bounds::for_surface(40.0, 420.0, 30.0);
        assert_eq!(b.min_x, 20.0);
        assert_eq!(b.max_x, 20.0);
    }

    #[test]
    fn inset_never_inverts() {
        let b = Bounds::for_surface(100.0, 100.0, 30.0).inset(30.0);
        assert!(b.min_x <= b.max_x);
        assert!(b.min_y <= b.max_y);
        assert_eq!(b.min_x, 50.0);
    }

    #[test]
    fn swims_along_heading() {
        let b = Bounds::for_surface(800.0, 420.0, 30.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut fish = fish_at(100.0, 200.0, 0.0);
        step_fish(&mut fish, &b, 0.5, &still_config(), &mut rng);
        assert!((fish.x - 130.0).abs() < 1e-3);
        assert!((fish.y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn reflects_off_right_wall() {
        let b = Bounds::for_surface(800.0, 420.0, 30.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut fish = fish_at(765.0, 200.0, 30.0);
        step_fish(&mut fish, &b, 0.25, &still_config(), &mut rng);
        assert_eq!(fish.x, 770.0);
        // 180 - 30 = 150: now heading left, same vertical component
        assert!((fish.heading - 150.0).abs() < 1e-3);
    }

    #[test]
    fn reflects_off_top_wall() {
        let b = Bounds::for_surface(800.0, 420.0, 30.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut fish = fish_at(400.0, 32.0, 270.0);
        step_fish(&mut fish, &b, 0.25, &still_config(), &mut rng);
        assert_eq!(fish.y, 30.0);
        assert!((fish.heading - 90.0).abs() < 1e-3);
    }

    #[test]
    fn does_not_reflect_when_moving_away_from_wall() {
        let b = Bounds::for_surface(800.0, 420.0, 30.0);
        let mut rng = StdRng::seed_from_u64(0);
        // Sitting on the left wall, heading right: no reflection.
        let mut fish = fish_at(30.0, 200.0, 0.0);
        step_fish(&mut fish, &b, 0.1, &still_config(), &mut rng);
        assert!(fish.x > 30.0);
        assert!(fish.heading.abs() < 1e-3);
    }

    #[test]
    fn dead_fish_sink_and_rest_on_bottom() {
        let b = Bounds::for_surface(800.0, 420.0, 30.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut fish = fish_at(400.0, 385.0, 45.0);
        fish.health = HealthClass::Dead;
        step_fish(&mut fish, &b, 0.5, &still_config(), &mut rng);
        assert!((fish.y - 388.0).abs() < 1e-3);
        assert_eq!(fish.x, 400.0);
        step_fish(&mut fish, &b, 1.0, &still_config(), &mut rng);
        assert_eq!(fish.y, 390.0);
        assert_eq!(fish.heading, 45.0);
    }

    #[test]
    fn wander_stays_bounded() {
        let b = Bounds::for_surface(800.0, 420.0, 30.0);
        let mut rng = StdRng::seed_from_u64(9);
        let config = MotionConfig {
            wander_probability: 1.0,
            ..Default::default()
        };
        let mut fish = fish_at(400.0, 200.0, 100.0);
        fish.speed = 0.0;
        step_fish(&mut fish, &b, 0.016, &config, &mut rng);
        assert!((fish.heading - 100.0).abs() <= 15.0 + 1e-3);
    }

    #[test]
    fn sanitize_dt() {
        let config = MotionConfig::default();
        assert_eq!(config.sanitize_dt(f32::NAN), 0.0);
        assert_eq!(config.sanitize_dt(-1.0), 0.0);
        assert_eq!(config.sanitize_dt(10.0), 0.25);
        assert_eq!(config.sanitize_dt(0.016), 0.016);
    }

    #[test]
    fn invalid_motion_config_reported() {
        let config = MotionConfig {
            margin: 0.0,
            large_probability: 1.5,
            sink_rate: -1.0,
            ..Default::default()
        };
        let errors = config.validate();
        assert!(errors.contains(&ConfigError::InvalidMargin(0.0)));
        assert!(errors.contains(&ConfigError::InvalidProbability("large_probability", 1.5)));
        assert!(errors.contains(&ConfigError::InvalidSpeed("sink_rate", -1.0)));
    }
}
