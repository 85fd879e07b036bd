//! Fish pool manager. Owns the live fish, resizes the pool incrementally
//! toward the ecological target, re-tags health in place, and runs the
//! motion loop on a scheduler of the host's choosing.
//!
//! Pool state sits behind a single mutex shared with the motion task.
//! Every structural change (grow, shrink, re-tag, surface resize) happens
//! under one lock acquisition, so a motion step never observes a
//! half-resized pool.
//!
//! Lifecycle: `new` → `initialize` → (`apply_ecological_state`,
//! `set_performance_quality`, `resize_surface`)* → `destroy`, after which
//! `initialize` may bind again. Mutators called while unbound are
//! reported as [`PoolError`]s rather than ignored.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::biome::BiomeState;
use crate::config::PondConfig;
use crate::error::{PondError, Result};
use crate::fish::{Fish, FishId, HealthClass};
use crate::motion::{step_fish, Bounds, MotionConfig};
use crate::population::PopulationRules;
use crate::quality::AnimationQuality;
use crate::render::{RenderAdapter, Surface};
use crate::scheduler::{lock, FrameScheduler, ScheduledTask};
use crate::theme::Theme;

/// Lifecycle misuse of the pool.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolError {
    /// Mutator called before `initialize`.
    NotInitialized,
    /// `initialize` called while already bound to a surface.
    AlreadyBound,
    /// Mutator called after `destroy` without re-initializing.
    Destroyed,
    /// Surface with a non-positive or non-finite dimension.
    InvalidSurface { width: f32, height: f32 },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::NotInitialized => write!(f, "fish pool used before initialize()"),
            PoolError::AlreadyBound => write!(f, "fish pool is already bound to a surface"),
            PoolError::Destroyed => write!(f, "fish pool used after destroy()"),
            PoolError::InvalidSurface { width, height } => {
                write!(f, "invalid surface {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Structural outcome of one `apply_ecological_state` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopulationChange {
    pub target: usize,
    pub created: Vec<FishId>,
    pub removed: Vec<FishId>,
    /// Surviving fish whose health tag changed.
    pub retagged: usize,
}

impl PopulationChange {
    pub fn is_structural(&self) -> bool {
        !self.created.is_empty() || !self.removed.is_empty()
    }
}

struct LiveFish<H> {
    fish: Fish,
    handle: H,
}

struct PoolState<A: RenderAdapter> {
    adapter: A,
    fish: Vec<LiveFish<A::Handle>>,
    bounds: Bounds,
    motion: MotionConfig,
    quality: AnimationQuality,
    frame: u64,
    carried_dt: f32,
    next_id: u64,
    rng: StdRng,
}

impl<A: RenderAdapter> PoolState<A> {
    fn grow(&mut self, count: usize, health: HealthClass) -> Vec<FishId> {
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let id = FishId(self.next_id);
            self.next_id += 1;
            let mut fish = Fish::spawn(id, &self.bounds, &self.motion, &mut self.rng);
            fish.set_health(health, &self.motion);
            let handle = self.adapter.create(&fish);
            self.fish.push(LiveFish { fish, handle });
            created.push(id);
        }
        created
    }

    /// Drop fish from the tail; order in the pool carries no meaning.
    fn shrink(&mut self, target: usize) -> Vec<FishId> {
        let removed: Vec<LiveFish<A::Handle>> = self.fish.drain(target..).collect();
        removed
            .into_iter()
            .map(|live| {
                self.adapter.destroy(live.handle);
                live.fish.id
            })
            .collect()
    }

    fn retag(&mut self, health: HealthClass) -> usize {
        let mut changed = 0;
        for live in &mut self.fish {
            if live.fish.set_health(health, &self.motion) {
                self.adapter.update_appearance(&mut live.handle, &live.fish.appearance());
                self.adapter.update_pose(&mut live.handle, &live.fish.pose());
                changed += 1;
            }
        }
        changed
    }

    fn clear(&mut self) -> usize {
        let count = self.fish.len();
        for live in self.fish.drain(..) {
            self.adapter.destroy(live.handle);
        }
        count
    }

    fn rebind(&mut self, surface: Surface) {
        self.bounds = Bounds::for_surface(surface.width, surface.height, self.motion.margin);
        for live in &mut self.fish {
            let (x, y) = self.bounds.clamp(live.fish.x, live.fish.y);
            live.fish.x = x;
            live.fish.y = y;
            self.adapter.update_pose(&mut live.handle, &live.fish.pose());
        }
    }

    /// One motion-loop frame.
    fn tick(&mut self, dt: f32) {
        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);

        if self.motion.quality.interval_for(self.quality) == 0 {
            // Frozen: don't bank time for a jump on resume.
            self.carried_dt = 0.0;
            return;
        }
        self.carried_dt += self.motion.sanitize_dt(dt);
        if !self.motion.quality.should_step(self.quality, frame) {
            return;
        }
        let step = std::mem::take(&mut self.carried_dt);

        for live in &mut self.fish {
            step_fish(&mut live.fish, &self.bounds, step, &self.motion, &mut self.rng);
            self.adapter.update_pose(&mut live.handle, &live.fish.pose());
        }
    }
}

enum Lifecycle {
    Unbound,
    Bound,
    Destroyed,
}

/// Owner of the live fish pool.
pub struct FishManager<A: RenderAdapter> {
    motion: MotionConfig,
    rules: PopulationRules,
    scheduler: Arc<dyn FrameScheduler>,
    lifecycle: Lifecycle,
    state: Option<Arc<Mutex<PoolState<A>>>>,
    motion_task: Option<ScheduledTask>,
    /// Quality hint received while unbound, applied on `initialize`.
    quality: AnimationQuality,
    next_id: u64,
}

impl<A: RenderAdapter> FishManager<A> {
    /// Build an unbound manager. Rejects invalid motion or population
    /// tuning up front.
    pub fn new(
        motion: MotionConfig,
        rules: PopulationRules,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> Result<Self> {
        let mut errors = motion.validate();
        errors.extend(motion.quality.validate());
        errors.extend(rules.validate());
        if !errors.is_empty() {
            return Err(PondError::Config(errors));
        }
        Ok(Self {
            motion,
            rules,
            scheduler,
            lifecycle: Lifecycle::Unbound,
            state: None,
            motion_task: None,
            quality: AnimationQuality::High,
            next_id: 0,
        })
    }

    pub fn from_config(config: &PondConfig, scheduler: Arc<dyn FrameScheduler>) -> Result<Self> {
        Self::new(config.motion.clone(), config.population, scheduler)
    }

    /// Bind to a render surface and start the motion loop.
    pub fn initialize(&mut self, surface: Surface, adapter: A) -> Result<()> {
        if matches!(self.lifecycle, Lifecycle::Bound) {
            return Err(PoolError::AlreadyBound.into());
        }
        let surface = Surface::new(surface.width, surface.height)?;

        let rng = match self.motion.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = Arc::new(Mutex::new(PoolState {
            adapter,
            fish: Vec::new(),
            bounds: Bounds::for_surface(surface.width, surface.height, self.motion.margin),
            motion: self.motion.clone(),
            quality: self.quality,
            frame: 0,
            carried_dt: 0.0,
            next_id: self.next_id,
            rng,
        }));

        let weak: Weak<Mutex<PoolState<A>>> = Arc::downgrade(&state);
        let task = self.scheduler.schedule_repeating(Box::new(move |dt| {
            if let Some(state) = weak.upgrade() {
                lock(&state).tick(dt);
            }
        }))?;

        self.state = Some(state);
        self.motion_task = Some(task);
        self.lifecycle = Lifecycle::Bound;
        log::info!(
            "fish pool bound to {}x{} surface",
            surface.width,
            surface.height
        );
        Ok(())
    }

    /// Store the animation-quality hint for the next motion frame.
    ///
    /// Never fails and never touches the population. A hint given while
    /// unbound is kept and applied when the pool binds.
    pub fn set_performance_quality(&mut self, quality: AnimationQuality) {
        if self.quality != quality {
            log::debug!("animation quality {} -> {}", self.quality, quality);
        }
        self.quality = quality;
        if let Some(state) = &self.state {
            lock(state).quality = quality;
        }
    }

    pub fn performance_quality(&self) -> AnimationQuality {
        self.quality
    }

    /// Converge the pool to the target for `(theme, biome)` and re-tag
    /// every fish's health from the theme.
    pub fn apply_ecological_state(
        &mut self,
        theme: Theme,
        biome: &BiomeState,
    ) -> std::result::Result<PopulationChange, PoolError> {
        let state = self.bound_state()?;

        let (clean, clamped) = biome.sanitized();
        if clamped {
            log::warn!(
                "biome snapshot at tick {} had out-of-range fields; clamped to zero",
                biome.tick
            );
        }
        let target = self.rules.target(theme, &clean);
        let health = theme.health();

        let mut pool = lock(state);
        let current = pool.fish.len();
        let mut change = PopulationChange {
            target,
            ..Default::default()
        };
        // Re-tag survivors before growing so new fish are not counted.
        if target < current {
            change.removed = pool.shrink(target);
        }
        change.retagged = pool.retag(health);
        if target > current {
            change.created = pool.grow(target - current, health);
        }

        if change.is_structural() {
            log::debug!(
                "pool {} -> {} ({}): +{} -{}",
                current,
                target,
                theme,
                change.created.len(),
                change.removed.len()
            );
        }
        Ok(change)
    }

    /// Rebind to a new surface size, clamping every fish into the new
    /// bounds immediately.
    pub fn resize_surface(
        &mut self,
        width: f32,
        height: f32,
    ) -> std::result::Result<(), PoolError> {
        let surface = Surface::new(width, height)?;
        let state = self.bound_state()?;
        lock(state).rebind(surface);
        Ok(())
    }

    /// Stop the motion loop, destroy every fish and its visual, and
    /// release the surface. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if !matches!(self.lifecycle, Lifecycle::Bound) {
            return;
        }
        // Cancel first: blocks until any in-flight frame has finished.
        if let Some(task) = self.motion_task.take() {
            task.cancel();
        }
        if let Some(state) = self.state.take() {
            let mut pool = lock(&state);
            let removed = pool.clear();
            self.next_id = pool.next_id;
            log::info!("fish pool destroyed ({} fish removed)", removed);
        }
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// Live fish count. Zero while unbound.
    pub fn population_count(&self) -> usize {
        self.state.as_ref().map(|s| lock(s).fish.len()).unwrap_or(0)
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Bound)
    }

    /// Copy of every live fish, in pool order.
    pub fn fish(&self) -> Vec<Fish> {
        self.state
            .as_ref()
            .map(|s| lock(s).fish.iter().map(|l| l.fish.clone()).collect())
            .unwrap_or_default()
    }

    /// Current motion bounds, if bound.
    pub fn bounds(&self) -> Option<Bounds> {
        self.state.as_ref().map(|s| lock(s).bounds)
    }

    fn bound_state(&self) -> std::result::Result<&Arc<Mutex<PoolState<A>>>, PoolError> {
        match self.lifecycle {
            Lifecycle::Unbound => Err(PoolError::NotInitialized),
            Lifecycle::Destroyed => Err(PoolError::Destroyed),
            Lifecycle::Bound => self.state.as_ref().ok_or(PoolError::NotInitialized),
        }
    }
}

impl<A: RenderAdapter> Drop for FishManager<A> {
    fn drop(&mut self) {
        self.destroy();
    }
}
