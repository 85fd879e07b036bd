//! Render-handle seam between fish data and whatever draws them.
//!
//! The pool owns fish *data*. A [`RenderAdapter`] maps each fish to one
//! visual handle (a DOM node, a sprite, a canvas record) and is told when
//! the fish moves or changes look. Exactly one handle exists per live
//! fish; the pool destroys it when the fish leaves the pool.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::fish::{Appearance, Fish, FishId, Pose};
use crate::manager::PoolError;
use crate::scheduler::lock;

/// Size of the render region the pool draws into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f32,
    pub height: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Result<Self, PoolError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PoolError::InvalidSurface { width, height });
        }
        Ok(Self { width, height })
    }
}

/// Adapter from fish data to visual handles.
pub trait RenderAdapter: Send + 'static {
    type Handle: Send + 'static;

    /// Attach a visual for a newly spawned fish.
    fn create(&mut self, fish: &Fish) -> Self::Handle;
    fn update_pose(&mut self, handle: &mut Self::Handle, pose: &Pose);
    fn update_appearance(&mut self, handle: &mut Self::Handle, appearance: &Appearance);
    /// Detach and discard the visual.
    fn destroy(&mut self, handle: Self::Handle);
}

/// What a headless adapter knows about one attached visual.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualRecord {
    pub pose: Pose,
    pub appearance: Appearance,
    pub pose_updates: u64,
}

/// Shared record of everything a [`HeadlessAdapter`] has been asked to do.
#[derive(Debug, Default)]
pub struct RenderLedger {
    pub live: BTreeMap<FishId, VisualRecord>,
    pub created: u64,
    pub destroyed: u64,
    pub pose_updates: u64,
    pub appearance_updates: u64,
}

/// Adapter that draws nothing and records every call. Used by the
/// harness and by tests to check the one-handle-per-fish invariant.
#[derive(Debug, Clone, Default)]
pub struct HeadlessAdapter {
    ledger: Arc<Mutex<RenderLedger>>,
}

impl HeadlessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the ledger, readable while the pool owns the adapter.
    pub fn ledger(&self) -> Arc<Mutex<RenderLedger>> {
        Arc::clone(&self.ledger)
    }
}

impl RenderAdapter for HeadlessAdapter {
    type Handle = FishId;

    fn create(&mut self, fish: &Fish) -> FishId {
        let mut ledger = lock(&self.ledger);
        ledger.created += 1;
        ledger.live.insert(
            fish.id,
            VisualRecord {
                pose: fish.pose(),
                appearance: fish.appearance(),
                pose_updates: 0,
            },
        );
        fish.id
    }

    fn update_pose(&mut self, handle: &mut FishId, pose: &Pose) {
        let mut ledger = lock(&self.ledger);
        ledger.pose_updates += 1;
        if let Some(record) = ledger.live.get_mut(handle) {
            record.pose = *pose;
            record.pose_updates += 1;
        }
    }

    fn update_appearance(&mut self, handle: &mut FishId, appearance: &Appearance) {
        let mut ledger = lock(&self.ledger);
        ledger.appearance_updates += 1;
        if let Some(record) = ledger.live.get_mut(handle) {
            record.appearance = *appearance;
        }
    }

    fn destroy(&mut self, handle: FishId) {
        let mut ledger = lock(&self.ledger);
        ledger.destroyed += 1;
        ledger.live.remove(&handle);
    }
}
