use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use pond_logic::biome::BiomeState;
use pond_logic::fish::{Fish, FishId};
use pond_logic::manager::FishManager;
use pond_logic::motion::{step_fish, Bounds, MotionConfig};
use pond_logic::population::PopulationRules;
use pond_logic::render::{HeadlessAdapter, Surface};
use pond_logic::scheduler::ManualScheduler;
use pond_logic::theme::Theme;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_step_fish(c: &mut Criterion) {
    let config = MotionConfig::default();
    let bounds = Bounds::for_surface(1920.0, 1080.0, config.margin);
    let mut group = c.benchmark_group("step_fish");
    for count in [15usize, 500, 5000] {
        group.bench_function(format!("fish{}", count), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(0xF15A);
                    let fish: Vec<Fish> = (0..count as u64)
                        .map(|i| Fish::spawn(FishId(i), &bounds, &config, &mut rng))
                        .collect();
                    (fish, rng)
                },
                |(mut fish, mut rng)| {
                    for _ in 0..60 {
                        for f in &mut fish {
                            step_fish(f, &bounds, 1.0 / 60.0, &config, &mut rng);
                        }
                    }
                    fish
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_pool_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_frames");
    for theme in [Theme::Healthy, Theme::Collapsed] {
        let sched = ManualScheduler::new();
        let motion = MotionConfig {
            seed: Some(1),
            ..Default::default()
        };
        let rules = PopulationRules {
            healthy_target: 400,
            max_population: 400,
            ..Default::default()
        };
        let Ok(mut mgr) = FishManager::new(motion, rules, Arc::new(sched.clone())) else {
            continue;
        };
        let Ok(surface) = Surface::new(1920.0, 1080.0) else {
            continue;
        };
        if mgr.initialize(surface, HeadlessAdapter::new()).is_err() {
            continue;
        }
        let state = BiomeState {
            small_fish: 20_000.0,
            ..Default::default()
        };
        if mgr.apply_ecological_state(theme, &state).is_err() {
            continue;
        }

        group.bench_function(format!("{}_{}fish_60frames", theme, mgr.population_count()), |b| {
            b.iter(|| sched.run_frames(60, 1.0 / 60.0));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step_fish, bench_pool_frames);
criterion_main!(benches);
