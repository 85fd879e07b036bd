//! Top-level data flow for one pond view.
//!
//! ```text
//! UiSnapshot ──► ObservationThrottle (ui_hz)
//!                  │
//!                  ▼
//!            ThemeEvaluator ──► compose_scene ──┐
//!                  │          └► read_gauges ───┼──► PondFrame
//!                  ▼                            │
//!            FishManager (retarget on change) ──┘
//! ```
//!
//! The pool is retargeted only when the theme or the small-fish indicator
//! changed since the last observation, and the quality hint is forwarded
//! only when it changed. Everything else is recomputed per observation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::biome::UiSnapshot;
use crate::cadence::ObservationThrottle;
use crate::composition::{compose_scene, CompositionConfig, SceneComposition};
use crate::config::PondConfig;
use crate::diagnostics::{read_gauges, DiagnosticsReport, GaugeConfig};
use crate::error::{PondError, Result};
use crate::manager::FishManager;
use crate::quality::AnimationQuality;
use crate::render::{RenderAdapter, Surface};
use crate::scheduler::FrameScheduler;
use crate::theme::{Theme, ThemeEvaluator};

/// Everything derived from one observed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PondFrame {
    pub tick: u64,
    pub theme: Theme,
    pub scene: SceneComposition,
    pub diagnostics: DiagnosticsReport,
    /// Live fish after this observation was applied.
    pub population: usize,
}

pub struct PondVisualizer<A: RenderAdapter> {
    evaluator: ThemeEvaluator,
    composition: CompositionConfig,
    gauges: GaugeConfig,
    throttle: ObservationThrottle<UiSnapshot>,
    pool: FishManager<A>,
    last_theme: Option<Theme>,
    last_small_fish: Option<f32>,
    last_quality: Option<AnimationQuality>,
}

impl<A: RenderAdapter> PondVisualizer<A> {
    /// Validate the whole document and build an unbound visualizer.
    pub fn new(config: &PondConfig, scheduler: Arc<dyn FrameScheduler>) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(PondError::Config(errors));
        }
        Ok(Self {
            evaluator: ThemeEvaluator::new(config.theme)?,
            composition: config.composition.clone(),
            gauges: config.diagnostics.clone(),
            throttle: ObservationThrottle::new(config.cadence.ui_hz),
            pool: FishManager::from_config(config, scheduler)?,
            last_theme: None,
            last_small_fish: None,
            last_quality: None,
        })
    }

    pub fn initialize(&mut self, surface: Surface, adapter: A) -> Result<()> {
        self.pool.initialize(surface, adapter)?;
        // A fresh binding starts empty: the next observation must retarget.
        self.last_small_fish = None;
        Ok(())
    }

    /// Offer a snapshot from the simulation store. Returns a frame if the
    /// throttle let it through.
    pub fn offer(&mut self, now: f64, snapshot: UiSnapshot) -> Result<Option<PondFrame>> {
        match self.throttle.offer(now, snapshot) {
            Some(snapshot) => self.observe(snapshot).map(Some),
            None => Ok(None),
        }
    }

    /// Flush a held snapshot once the throttle interval has passed.
    pub fn poll(&mut self, now: f64) -> Result<Option<PondFrame>> {
        match self.throttle.poll(now) {
            Some(snapshot) => self.observe(snapshot).map(Some),
            None => Ok(None),
        }
    }

    pub fn resize_surface(&mut self, width: f32, height: f32) -> Result<()> {
        Ok(self.pool.resize_surface(width, height)?)
    }

    pub fn pool(&self) -> &FishManager<A> {
        &self.pool
    }

    pub fn current_theme(&self) -> Option<Theme> {
        self.last_theme
    }

    /// Tear down the pool. The visualizer can be re-initialized afterwards.
    pub fn shutdown(&mut self) {
        self.pool.destroy();
        self.last_small_fish = None;
    }

    fn observe(&mut self, snapshot: UiSnapshot) -> Result<PondFrame> {
        let theme = self.evaluator.evaluate(&snapshot.biome);
        if self.last_theme != Some(theme) {
            let tick = snapshot.biome.tick;
            match self.last_theme {
                Some(prev) => log::info!("pond theme {} -> {} at tick {}", prev, theme, tick),
                None => log::info!("pond theme {} at tick {}", theme, tick),
            }
        }

        let quality = snapshot.performance.animation_quality;
        if self.last_quality != Some(quality) {
            self.pool.set_performance_quality(quality);
            self.last_quality = Some(quality);
        }

        let small_fish = snapshot.biome.sanitized().0.small_fish;
        if self.last_theme != Some(theme) || self.last_small_fish != Some(small_fish) {
            self.pool.apply_ecological_state(theme, &snapshot.biome)?;
            self.last_small_fish = Some(small_fish);
        }
        self.last_theme = Some(theme);

        let scene = compose_scene(
            &snapshot.biome,
            theme,
            &snapshot.flags,
            &snapshot.performance,
            &self.composition,
        );
        let accent = &self.composition.palette.for_theme(theme).accent;
        let diagnostics = read_gauges(&snapshot.biome, theme, &self.gauges, accent);

        Ok(PondFrame {
            tick: snapshot.biome.tick,
            theme,
            scene,
            diagnostics,
            population: self.pool.population_count(),
        })
    }
}
