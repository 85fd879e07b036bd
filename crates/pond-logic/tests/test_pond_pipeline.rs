//! Integration tests for the full observation pipeline.
//!
//! Exercises: PondConfig → PondVisualizer → ThemeEvaluator → FishManager
//! → HeadlessAdapter, driven by the fixed-timestep ManualScheduler.
//!
//! All tests are pure logic. No renderer, no wall clock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pond_logic::biome::{BiomeState, EngineFlags, PerformanceReading, UiSnapshot, AERATOR_ACTIVE};
use pond_logic::config::PondConfig;
use pond_logic::fish::HealthClass;
use pond_logic::manager::{FishManager, PoolError};
use pond_logic::population::PopulationRules;
use pond_logic::quality::{AnimationQuality, PerformanceGovernor};
use pond_logic::render::{HeadlessAdapter, RenderLedger, Surface};
use pond_logic::scheduler::{ManualScheduler, ThreadScheduler};
use pond_logic::theme::Theme;
use pond_logic::visualizer::PondVisualizer;
use pond_logic::PondError;

// ── Helpers ────────────────────────────────────────────────────────────

const DT: f32 = 1.0 / 60.0;
const BUNDLED: &str = include_str!("../../../data/pond_config.json");

fn config() -> PondConfig {
    let mut config = PondConfig::from_json_str(BUNDLED).unwrap();
    config.motion.seed = Some(2024);
    config
}

fn ledger(l: &Arc<Mutex<RenderLedger>>) -> MutexGuard<'_, RenderLedger> {
    l.lock().unwrap_or_else(PoisonError::into_inner)
}

fn pond(small_fish: f32) -> BiomeState {
    BiomeState {
        small_fish,
        large_fish: 25.0,
        aquatic_plants: 90.0,
        dissolved_oxygen: 75.0,
        nutrients: 25.0,
        phytoplankton: 20.0,
        water_turbidity: 15.0,
        tick: 0,
    }
}

fn ui(biome: BiomeState) -> UiSnapshot {
    UiSnapshot {
        biome,
        ..Default::default()
    }
}

fn bound_pool() -> (FishManager<HeadlessAdapter>, ManualScheduler, Arc<Mutex<RenderLedger>>) {
    let sched = ManualScheduler::new();
    let mut mgr = FishManager::from_config(&config(), Arc::new(sched.clone())).unwrap();
    let adapter = HeadlessAdapter::new();
    let l = adapter.ledger();
    mgr.initialize(Surface::new(960.0, 540.0).unwrap(), adapter).unwrap();
    (mgr, sched, l)
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn scenario_targets_by_theme() {
    let (mut mgr, _sched, _l) = bound_pool();
    for (theme, fish, expected) in [
        (Theme::Healthy, 300.0, 15),
        (Theme::Polluted, 100.0, 8),
        (Theme::Collapsed, 100.0, 3),
    ] {
        mgr.apply_ecological_state(theme, &pond(fish)).unwrap();
        assert_eq!(mgr.population_count(), expected, "{} with {} fish", theme, fish);
    }
}

#[test]
fn scenario_polluted_shrink_keeps_eight_sick() {
    let (mut mgr, sched, l) = bound_pool();
    mgr.apply_ecological_state(Theme::Healthy, &pond(300.0)).unwrap();
    sched.run_frames(30, DT);

    let change = mgr.apply_ecological_state(Theme::Polluted, &pond(40.0)).unwrap();
    assert_eq!(change.removed.len(), 7);
    assert_eq!(mgr.population_count(), 8);
    assert!(mgr.fish().iter().all(|f| f.health == HealthClass::Sick));
    assert_eq!(ledger(&l).live.len(), 8);
}

#[test]
fn scenario_destroy_then_count_is_zero() {
    let (mut mgr, sched, l) = bound_pool();
    mgr.apply_ecological_state(Theme::Healthy, &pond(300.0)).unwrap();
    sched.run_frames(10, DT);
    mgr.destroy();

    assert_eq!(mgr.population_count(), 0);
    let poses = ledger(&l).pose_updates;
    sched.run_frames(60, DT);
    assert_eq!(ledger(&l).pose_updates, poses);
    assert_eq!(sched.active_tasks(), 0);
}

// ── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn misuse_is_reported_not_ignored() {
    let sched = ManualScheduler::new();
    let mut mgr: FishManager<HeadlessAdapter> =
        FishManager::from_config(&config(), Arc::new(sched)).unwrap();
    assert_eq!(
        mgr.apply_ecological_state(Theme::Healthy, &pond(0.0)),
        Err(PoolError::NotInitialized)
    );
    assert_eq!(mgr.resize_surface(100.0, 100.0), Err(PoolError::NotInitialized));

    mgr.initialize(Surface::new(400.0, 300.0).unwrap(), HeadlessAdapter::new())
        .unwrap();
    assert!(matches!(
        mgr.initialize(Surface::new(400.0, 300.0).unwrap(), HeadlessAdapter::new()),
        Err(PondError::Pool(PoolError::AlreadyBound))
    ));
    mgr.destroy();
    assert_eq!(
        mgr.apply_ecological_state(Theme::Healthy, &pond(0.0)),
        Err(PoolError::Destroyed)
    );
}

#[test]
fn dropping_manager_stops_thread_loop() {
    let adapter = HeadlessAdapter::new();
    let l = adapter.ledger();
    {
        let mut mgr = FishManager::new(
            config().motion,
            PopulationRules::default(),
            Arc::new(ThreadScheduler::with_hz(200.0)),
        )
        .unwrap();
        mgr.initialize(Surface::new(640.0, 480.0).unwrap(), adapter)
            .unwrap();
        mgr.apply_ecological_state(Theme::Healthy, &pond(0.0)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(60));
        assert!(ledger(&l).pose_updates > 0);
    }
    let l = ledger(&l);
    assert!(l.live.is_empty());
    assert_eq!(l.destroyed, 15);
}

// ── Data flow ──────────────────────────────────────────────────────────

#[test]
fn degrading_pond_walks_through_themes() {
    let sched = ManualScheduler::new();
    let mut vis = PondVisualizer::new(&config(), Arc::new(sched.clone())).unwrap();
    vis.initialize(Surface::new(960.0, 540.0).unwrap(), HeadlessAdapter::new())
        .unwrap();

    let mut themes = Vec::new();
    let mut now = 0.0;
    for step in 0..=10u64 {
        let severity = step as f32 / 10.0;
        let biome = BiomeState {
            small_fish: 200.0 * (1.0 - severity),
            large_fish: 20.0,
            aquatic_plants: 100.0 * (1.0 - severity),
            dissolved_oxygen: 85.0 - 75.0 * severity,
            nutrients: 20.0 + 60.0 * severity,
            phytoplankton: 15.0 + 60.0 * severity,
            water_turbidity: 10.0 + 60.0 * severity,
            tick: step,
        };
        let frame = vis.offer(now, ui(biome)).unwrap().unwrap();
        sched.run_frames(4, DT);
        themes.push(frame.theme);
        assert!(frame.population > 0);
        now += 0.5;
    }
    assert_eq!(themes.first(), Some(&Theme::Healthy));
    assert_eq!(themes.last(), Some(&Theme::Collapsed));
    assert!(themes.contains(&Theme::Polluted));
    // Severity only rises, so the theme never improves.
    let rank = |t: &Theme| match t {
        Theme::Healthy => 0,
        Theme::Polluted => 1,
        Theme::Collapsed => 2,
    };
    assert!(themes.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));
}

#[test]
fn fast_store_is_throttled_to_ui_rate() {
    let sched = ManualScheduler::new();
    let mut vis = PondVisualizer::new(&config(), Arc::new(sched)).unwrap();
    vis.initialize(Surface::new(960.0, 540.0).unwrap(), HeadlessAdapter::new())
        .unwrap();

    // 240 Hz store for two seconds.
    let mut frames = 0;
    for tick in 0..480u64 {
        let now = tick as f64 / 240.0;
        let mut biome = pond(150.0);
        biome.tick = tick;
        if vis.offer(now, ui(biome)).unwrap().is_some() {
            frames += 1;
        }
    }
    assert!((58..=62).contains(&frames), "observed {} frames", frames);
}

#[test]
fn scene_reflects_flags_and_performance() {
    let sched = ManualScheduler::new();
    let mut vis = PondVisualizer::new(&config(), Arc::new(sched)).unwrap();
    vis.initialize(Surface::new(960.0, 540.0).unwrap(), HeadlessAdapter::new())
        .unwrap();

    let mut flags = EngineFlags::new();
    flags.set(AERATOR_ACTIVE, true);
    let snapshot = UiSnapshot {
        biome: pond(120.0),
        flags,
        performance: PerformanceReading {
            current_fps: 22.0,
            animation_quality: AnimationQuality::Low,
        },
    };
    let frame = vis.offer(0.0, snapshot).unwrap().unwrap();
    assert!(frame.scene.show_bubbles);
    assert!(frame.scene.hud.contains("low"));
    assert_eq!(frame.population, 15);
    assert_eq!(vis.pool().performance_quality(), AnimationQuality::Low);
}

#[test]
fn governor_reading_feeds_quality_without_touching_population() {
    let (mut mgr, sched, _l) = bound_pool();
    mgr.apply_ecological_state(Theme::Polluted, &pond(300.0)).unwrap();
    let mut governor = PerformanceGovernor::new(config().governor);

    for dt in [1.0 / 60.0, 1.0 / 40.0, 1.0 / 20.0, 1.0 / 8.0] {
        for _ in 0..200 {
            governor.record_frame(dt);
        }
        mgr.set_performance_quality(governor.quality());
        sched.run_frames(20, dt);
        assert_eq!(mgr.population_count(), 15);
    }
    assert_eq!(governor.quality(), AnimationQuality::Disabled);
}
