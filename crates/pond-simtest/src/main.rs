//! Pond Visualizer Headless Harness
//!
//! Drives the full data flow (synthetic simulation store → UI throttle →
//! theme → scene + gauges + fish pool) in-process without a renderer.
//!
//! Usage:
//!   cargo run -p pond-simtest
//!   cargo run -p pond-simtest -- --verbose
//!   cargo run -p pond-simtest -- --json
//!   RUST_LOG=debug cargo run -p pond-simtest

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pond_logic::biome::{BiomeState, EngineFlags, PerformanceReading, UiSnapshot, AERATOR_ACTIVE};
use pond_logic::config::PondConfig;
use pond_logic::fish::HealthClass;
use pond_logic::manager::FishManager;
use pond_logic::quality::{AnimationQuality, PerformanceGovernor};
use pond_logic::render::{HeadlessAdapter, RenderLedger, Surface};
use pond_logic::scheduler::{ManualScheduler, ThreadScheduler};
use pond_logic::theme::{Theme, ThemeEvaluator};
use pond_logic::visualizer::{PondFrame, PondVisualizer};
use pond_logic::PondError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

// ── Tuning document (same JSON the library bundles) ─────────────────────
const CONFIG_JSON: &str = include_str!("../../../data/pond_config.json");

const SURFACE: (f32, f32) = (960.0, 540.0);

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn ledger(l: &Arc<Mutex<RenderLedger>>) -> MutexGuard<'_, RenderLedger> {
    l.lock().unwrap_or_else(PoisonError::into_inner)
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    println!("=== Pond Visualizer Harness ===\n");

    let config = match PondConfig::from_json_str(CONFIG_JSON) {
        Ok(mut c) => {
            c.motion.seed = Some(0x504f_4e44);
            c
        }
        Err(e) => {
            println!("  ✗ config_load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Theme thresholds
    results.extend(validate_theme_table(&config));

    // 2. Population scenarios
    results.extend(validate_population_scenarios(&config));

    // 3. Motion containment and sinking
    results.extend(validate_motion(&config));

    // 4. Quality tiers
    results.extend(validate_quality(&config));

    // 5. Full data flow from a drifting pond
    results.extend(validate_data_flow(&config, verbose));

    // 6. Threaded motion loop teardown
    results.extend(validate_thread_loop(&config));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(text) => println!("{}", text),
            Err(e) => log::error!("could not serialize results: {}", e),
        }
    } else {
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn bound_pool(
    config: &PondConfig,
) -> Option<(FishManager<HeadlessAdapter>, ManualScheduler, Arc<Mutex<RenderLedger>>)> {
    let sched = ManualScheduler::new();
    let mut mgr = FishManager::from_config(config, Arc::new(sched.clone())).ok()?;
    let adapter = HeadlessAdapter::new();
    let l = adapter.ledger();
    let surface = Surface::new(SURFACE.0, SURFACE.1).ok()?;
    mgr.initialize(surface, adapter).ok()?;
    Some((mgr, sched, l))
}

fn setup_failed(name: &str) -> Vec<TestResult> {
    vec![check(name, false, "could not build a bound fish pool")]
}

// ── 1. Theme Table ──────────────────────────────────────────────────────

fn validate_theme_table(config: &PondConfig) -> Vec<TestResult> {
    println!("--- Theme Table ---");
    let evaluator = match ThemeEvaluator::new(config.theme) {
        Ok(e) => e,
        Err(e) => return vec![check("theme_evaluator", false, e.to_string())],
    };
    let clear = BiomeState {
        small_fish: 150.0,
        large_fish: 20.0,
        aquatic_plants: 80.0,
        dissolved_oxygen: 80.0,
        nutrients: 20.0,
        phytoplankton: 15.0,
        water_turbidity: 10.0,
        tick: 0,
    };
    let cases = [
        ("clear", clear, Theme::Healthy),
        ("low_oxygen", BiomeState { dissolved_oxygen: 40.0, ..clear }, Theme::Polluted),
        ("bloom", BiomeState { phytoplankton: 95.0, ..clear }, Theme::Collapsed),
        ("fish_kill", BiomeState { small_fish: 5.0, ..clear }, Theme::Collapsed),
        ("murky", BiomeState { water_turbidity: 60.0, ..clear }, Theme::Polluted),
        ("negative_input", BiomeState { nutrients: -20.0, ..clear }, Theme::Healthy),
    ];

    cases
        .iter()
        .map(|(name, state, expected)| {
            let got = evaluator.evaluate(state);
            check(
                &format!("theme_{}", name),
                got == *expected,
                format!("expected {}, got {}", expected, got),
            )
        })
        .collect()
}

// ── 2. Population Scenarios ─────────────────────────────────────────────

fn validate_population_scenarios(config: &PondConfig) -> Vec<TestResult> {
    println!("--- Population ---");
    let Some((mut mgr, _sched, l)) = bound_pool(config) else {
        return setup_failed("population_setup");
    };
    let fish = |n: f32| BiomeState {
        small_fish: n,
        ..Default::default()
    };
    let mut results = Vec::new();

    for (name, theme, n, expected) in [
        ("scenario_a_healthy", Theme::Healthy, 300.0, 15),
        ("scenario_b_polluted", Theme::Polluted, 100.0, 8),
        ("scenario_c_collapsed", Theme::Collapsed, 100.0, 3),
    ] {
        let count = mgr
            .apply_ecological_state(theme, &fish(n))
            .map(|_| mgr.population_count());
        results.push(check(
            name,
            count == Ok(expected),
            format!("{} with {} fish → {:?}", theme, n, count),
        ));
    }

    // Scenario D from a full healthy pool.
    if let Err(e) = mgr.apply_ecological_state(Theme::Healthy, &fish(300.0)) {
        results.push(check("scenario_d_refill", false, e.to_string()));
        return results;
    }
    let survivors: Vec<_> = mgr.fish().iter().take(8).map(|f| f.id).collect();
    match mgr.apply_ecological_state(Theme::Polluted, &fish(40.0)) {
        Ok(change) => {
            let now = mgr.fish();
            let ids: Vec<_> = now.iter().map(|f| f.id).collect();
            let all_sick = now.iter().all(|f| f.health == HealthClass::Sick);
            results.push(check(
                "scenario_d_shrink",
                change.removed.len() == 7 && ids == survivors && all_sick,
                format!(
                    "removed {}, {} remain, all sick: {}",
                    change.removed.len(),
                    ids.len(),
                    all_sick
                ),
            ));
        }
        Err(e) => results.push(check("scenario_d_shrink", false, e.to_string())),
    }

    let again = mgr.apply_ecological_state(Theme::Polluted, &fish(40.0));
    results.push(check(
        "idempotent_reapply",
        matches!(&again, Ok(c) if !c.is_structural()),
        format!("{:?}", again.map(|c| c.is_structural())),
    ));

    mgr.destroy();
    let live = ledger(&l).live.len();
    results.push(check(
        "scenario_e_destroy",
        mgr.population_count() == 0 && live == 0,
        format!("count {}, live handles {}", mgr.population_count(), live),
    ));
    results
}

// ── 3. Motion ───────────────────────────────────────────────────────────

fn validate_motion(config: &PondConfig) -> Vec<TestResult> {
    println!("--- Motion ---");
    let Some((mut mgr, sched, _l)) = bound_pool(config) else {
        return setup_failed("motion_setup");
    };
    let mut results = Vec::new();
    if let Err(e) = mgr.apply_ecological_state(Theme::Healthy, &BiomeState::default()) {
        results.push(check("motion_populate", false, e.to_string()));
        return results;
    }
    let Some(bounds) = mgr.bounds() else {
        return setup_failed("motion_bounds");
    };

    let mut escapes = 0;
    for _ in 0..600 {
        sched.advance(1.0 / 60.0);
        escapes += mgr.fish().iter().filter(|f| !bounds.contains(f.x, f.y)).count();
    }
    results.push(check(
        "containment_10s",
        escapes == 0,
        format!("{} out-of-bounds samples over 600 frames", escapes),
    ));

    if let Err(e) = mgr.resize_surface(480.0, 270.0) {
        results.push(check("resize_clamps", false, e.to_string()));
        return results;
    }
    let small = mgr.bounds();
    let inside = small.map_or(false, |b| mgr.fish().iter().all(|f| b.contains(f.x, f.y)));
    results.push(check("resize_clamps", inside, "all fish inside shrunken surface"));

    if let Err(e) = mgr.apply_ecological_state(Theme::Collapsed, &BiomeState::default()) {
        results.push(check("dead_fish_sink", false, e.to_string()));
        return results;
    }
    let mut rising = 0;
    let mut last: Vec<f32> = mgr.fish().iter().map(|f| f.y).collect();
    for _ in 0..3600 {
        sched.advance(1.0 / 60.0);
        let now: Vec<f32> = mgr.fish().iter().map(|f| f.y).collect();
        rising += last.iter().zip(&now).filter(|(a, b)| b < a).count();
        last = now;
    }
    let rested = small.map_or(false, |b| last.iter().all(|y| (*y - b.max_y).abs() < 1e-3));
    results.push(check(
        "dead_fish_sink",
        rising == 0 && rested,
        format!("{} upward moves, all resting on bottom: {}", rising, rested),
    ));
    results
}

// ── 4. Quality ──────────────────────────────────────────────────────────

fn validate_quality(config: &PondConfig) -> Vec<TestResult> {
    println!("--- Quality ---");
    let mut results = Vec::new();

    for (quality, frames, expected_steps) in [
        (AnimationQuality::High, 12, 12),
        (AnimationQuality::Medium, 12, 6),
        (AnimationQuality::Low, 12, 3),
        (AnimationQuality::Disabled, 12, 0),
    ] {
        let Some((mut mgr, sched, l)) = bound_pool(config) else {
            return setup_failed("quality_setup");
        };
        if let Err(e) = mgr.apply_ecological_state(Theme::Polluted, &BiomeState::default()) {
            results.push(check(&format!("quality_{}", quality), false, e.to_string()));
            continue;
        }
        mgr.set_performance_quality(quality);
        let count = mgr.population_count();
        let before = ledger(&l).pose_updates;
        sched.run_frames(frames, 1.0 / 60.0);
        let steps = (ledger(&l).pose_updates - before) / count as u64;
        results.push(check(
            &format!("quality_{}", quality),
            steps == expected_steps && mgr.population_count() == count,
            format!("{} motion steps in {} frames", steps, frames),
        ));
    }

    let mut governor = PerformanceGovernor::new(config.governor);
    let mut tiers = Vec::new();
    for fps in [60.0f32, 40.0, 20.0, 10.0] {
        for _ in 0..config.governor.window {
            governor.record_frame(1.0 / fps);
        }
        tiers.push(governor.quality());
    }
    results.push(check(
        "governor_tiers",
        tiers
            == [
                AnimationQuality::High,
                AnimationQuality::Medium,
                AnimationQuality::Low,
                AnimationQuality::Disabled,
            ],
        format!("{:?}", tiers),
    ));
    results
}

// ── 5. Data Flow ────────────────────────────────────────────────────────

/// Pond that degrades from clear to collapsed and back over `duration`
/// seconds, with measurement noise.
struct SyntheticStore {
    rng: StdRng,
    tick: u64,
    aerator_from: f64,
}

impl SyntheticStore {
    fn sample(&mut self, now: f64, duration: f64) -> UiSnapshot {
        self.tick += 1;
        // 0 → 1 → 0 over the run.
        let phase = (now / duration * std::f64::consts::PI).sin() as f32;
        let mut noise = |scale: f32| self.rng.gen_range(-scale..=scale);
        let biome = BiomeState {
            small_fish: 220.0 * (1.0 - phase) + noise(4.0),
            large_fish: 30.0 * (1.0 - phase) + noise(1.0),
            aquatic_plants: 110.0 * (1.0 - phase) + noise(2.0),
            dissolved_oxygen: 85.0 - 80.0 * phase + noise(1.0),
            nutrients: 15.0 + 80.0 * phase + noise(1.0),
            phytoplankton: 10.0 + 85.0 * phase + noise(1.0),
            water_turbidity: 10.0 + 80.0 * phase + noise(1.0),
            tick: self.tick,
        };
        let mut flags = EngineFlags::new();
        flags.set(AERATOR_ACTIVE, now >= self.aerator_from);
        UiSnapshot {
            biome,
            flags,
            performance: PerformanceReading::default(),
        }
    }
}

fn validate_data_flow(config: &PondConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Data Flow ---");
    let mut results = Vec::new();
    let sched = ManualScheduler::new();
    let mut vis = match PondVisualizer::new(config, Arc::new(sched.clone())) {
        Ok(v) => v,
        Err(e) => return vec![check("visualizer_new", false, e.to_string())],
    };
    let adapter = HeadlessAdapter::new();
    let l = adapter.ledger();
    let bound = Surface::new(SURFACE.0, SURFACE.1)
        .map_err(PondError::from)
        .and_then(|s| vis.initialize(s, adapter));
    if let Err(e) = bound {
        return vec![check("visualizer_init", false, e.to_string())];
    }

    let mut store = SyntheticStore {
        rng: StdRng::seed_from_u64(7),
        tick: 0,
        aerator_from: 6.0,
    };
    // 120 Hz store and 60 Hz motion for 12 simulated seconds.
    let duration = 12.0;
    let store_hz = 120.0;
    let motion_per_store = (config.cadence.motion_hz / store_hz).max(1.0) as u32;
    let mut frames: Vec<PondFrame> = Vec::new();
    let mut errors = Vec::new();

    for i in 0..(duration * store_hz) as u64 {
        let now = i as f64 / store_hz;
        let snapshot = store.sample(now, duration);
        match vis.offer(now, snapshot) {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => {}
            Err(e) => errors.push(e.to_string()),
        }
        if i % 2 == 0 {
            sched.run_frames(motion_per_store, (1.0 / config.cadence.motion_hz) as f32);
        }
    }
    if let Ok(Some(frame)) = vis.poll(duration + 1.0) {
        frames.push(frame);
    }

    let rate = frames.len() as f64 / duration;
    results.push(check(
        "ui_rate_capped",
        rate <= config.cadence.ui_hz + 1.0,
        format!("{} observations in {}s ({:.1}/s)", frames.len(), duration, rate),
    ));
    results.push(check(
        "no_pipeline_errors",
        errors.is_empty(),
        errors.first().cloned().unwrap_or_else(|| "clean".into()),
    ));

    let saw = |t: Theme| frames.iter().any(|f| f.theme == t);
    results.push(check(
        "themes_traversed",
        saw(Theme::Healthy) && saw(Theme::Polluted) && saw(Theme::Collapsed),
        format!(
            "healthy {} polluted {} collapsed {}",
            saw(Theme::Healthy),
            saw(Theme::Polluted),
            saw(Theme::Collapsed)
        ),
    ));

    let never_empty = frames.iter().all(|f| f.population > 0);
    let handles_match = ledger(&l).live.len() == vis.pool().population_count();
    results.push(check(
        "pool_never_empty",
        never_empty && handles_match,
        format!("one handle per fish: {}", handles_match),
    ));

    // Store ticks start at 1 for sample 0.
    let bubbles_follow = frames.iter().all(|f| {
        let sampled_at = (f.tick - 1) as f64 / store_hz;
        f.scene.show_bubbles == (sampled_at >= store.aerator_from)
    });
    results.push(check("bubbles_follow_flag", bubbles_follow, "aerator overlay tracks flag"));

    if verbose {
        if let Some(last) = frames.last() {
            println!("    last HUD: {}", last.scene.hud);
            for g in &last.diagnostics.gauges {
                println!(
                    "    gauge {:<18} {:>6.1} {:<5} {:?}",
                    g.label, g.value, g.unit, g.status
                );
            }
        }
    }

    vis.shutdown();
    results.push(check(
        "shutdown_releases_handles",
        ledger(&l).live.is_empty() && sched.active_tasks() == 0,
        "pool destroyed, motion task cancelled",
    ));
    results
}

// ── 6. Threaded Loop ────────────────────────────────────────────────────

fn validate_thread_loop(config: &PondConfig) -> Vec<TestResult> {
    println!("--- Threaded Loop ---");
    let scheduler = Arc::new(ThreadScheduler::with_hz(config.cadence.motion_hz));
    let mut mgr = match FishManager::from_config(config, scheduler) {
        Ok(m) => m,
        Err(e) => return vec![check("thread_setup", false, e.to_string())],
    };
    let adapter = HeadlessAdapter::new();
    let l = adapter.ledger();
    let bound = Surface::new(SURFACE.0, SURFACE.1)
        .map_err(PondError::from)
        .and_then(|s| mgr.initialize(s, adapter));
    if let Err(e) = bound {
        return vec![check("thread_setup", false, e.to_string())];
    }
    if let Err(e) = mgr.apply_ecological_state(Theme::Healthy, &BiomeState::default()) {
        return vec![check("thread_populate", false, e.to_string())];
    }

    std::thread::sleep(Duration::from_millis(150));
    let moving = ledger(&l).pose_updates;
    mgr.destroy();
    let after = ledger(&l).pose_updates;
    std::thread::sleep(Duration::from_millis(50));
    let settled = ledger(&l).pose_updates;
    log::info!("threaded loop ran {} pose updates", after);

    vec![
        check("thread_loop_runs", moving > 0, format!("{} pose updates in 150ms", moving)),
        check(
            "thread_loop_stops",
            settled == after && ledger(&l).live.is_empty(),
            format!("{} updates after destroy", settled - after),
        ),
    ]
}
