//! Pond ecosystem visualizer core.
//!
//! This crate turns a stream of simulation snapshots into a themed scene
//! and a live, animated fish population. It has no renderer or runtime
//! dependencies: drawing goes through [`render::RenderAdapter`], frame
//! timing through [`scheduler::FrameScheduler`], so the same logic runs
//! under a browser frame callback, a game loop, or a fixed-timestep test
//! harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`biome`] | Simulation snapshot, engine flags, UI snapshot contract |
//! | [`cadence`] | UI observation throttle and update rates |
//! | [`composition`] | Plants, water tint, overlays and HUD for a snapshot |
//! | [`config`] | Tuning document loading and validation |
//! | [`diagnostics`] | Arc gauges with good/warn/danger tiers |
//! | [`error`] | Top-level error type |
//! | [`fish`] | Fish identity, traits, pose and appearance |
//! | [`manager`] | Fish pool: incremental resize, health re-tag, motion loop |
//! | [`motion`] | Swim, reflect, wander and sink for one fish |
//! | [`population`] | Theme → target fish count |
//! | [`quality`] | Animation quality tiers and the FPS governor |
//! | [`render`] | Render-handle seam and a headless adapter |
//! | [`scheduler`] | Cancellable repeating frame tasks |
//! | [`theme`] | Threshold-table theme classification |
//! | [`visualizer`] | Throttle → theme → scene + gauges + pool data flow |

pub mod biome;
pub mod cadence;
pub mod composition;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fish;
pub mod manager;
pub mod motion;
pub mod population;
pub mod quality;
pub mod render;
pub mod scheduler;
pub mod theme;
pub mod visualizer;

pub use error::{PondError, Result};
