//! Frame scheduling seam for the motion loop.
//!
//! The pool does not own a clock. It hands a repeating task to a
//! [`FrameScheduler`] and keeps the returned [`ScheduledTask`]; the same
//! pool logic then runs under a host frame callback, a dedicated thread
//! ([`ThreadScheduler`]), or a fixed-timestep harness
//! ([`ManualScheduler`]).
//!
//! Cancellation is deterministic: once [`ScheduledTask::cancel`] returns
//! (or the handle is dropped) the task will never run again and its
//! closure has been dropped. A task must not cancel itself from inside
//! its own body.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Body of a repeating frame task. Receives the frame's dt in seconds.
pub type FrameTask = Box<dyn FnMut(f32) + Send + 'static>;

/// Something that can run a task once per frame until cancelled.
pub trait FrameScheduler: Send + Sync {
    fn schedule_repeating(&self, task: FrameTask) -> Result<ScheduledTask>;
}

/// Handle to a scheduled task. Dropping it cancels the task.
pub struct ScheduledTask {
    cancelled: Arc<AtomicBool>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ScheduledTask {
    fn new(cancelled: Arc<AtomicBool>, on_cancel: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            cancelled,
            on_cancel: Some(on_cancel),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stop the task. Blocks until any in-flight run has finished.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(finish) = self.on_cancel.take() {
            finish();
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type TaskBody = Arc<Mutex<Option<FrameTask>>>;

struct ManualTask {
    cancelled: Arc<AtomicBool>,
    body: TaskBody,
}

/// Fixed-timestep scheduler driven explicitly by the caller.
///
/// Clones share the same task list, so a test can keep one clone and
/// hand another to the pool.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Arc<Mutex<Vec<ManualTask>>>,
    frames: Arc<AtomicU64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every live task once with `dt`.
    pub fn advance(&self, dt: f32) {
        let live: Vec<(Arc<AtomicBool>, TaskBody)> = {
            let mut tasks = lock(&self.tasks);
            tasks.retain(|t| !t.cancelled.load(Ordering::Acquire));
            tasks
                .iter()
                .map(|t| (Arc::clone(&t.cancelled), Arc::clone(&t.body)))
                .collect()
        };
        for (cancelled, body) in live {
            let mut guard = lock(&body);
            if cancelled.load(Ordering::Acquire) {
                continue;
            }
            if let Some(task) = guard.as_mut() {
                task(dt);
            }
        }
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Advance `frames` times with a fixed `dt`.
    pub fn run_frames(&self, frames: u32, dt: f32) {
        for _ in 0..frames {
            self.advance(dt);
        }
    }

    pub fn active_tasks(&self) -> usize {
        lock(&self.tasks)
            .iter()
            .filter(|t| !t.cancelled.load(Ordering::Acquire))
            .count()
    }

    /// Frames advanced so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_repeating(&self, task: FrameTask) -> Result<ScheduledTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let body: TaskBody = Arc::new(Mutex::new(Some(task)));
        lock(&self.tasks).push(ManualTask {
            cancelled: Arc::clone(&cancelled),
            body: Arc::clone(&body),
        });
        Ok(ScheduledTask::new(
            cancelled,
            Box::new(move || {
                // Waits out an in-flight run, then releases the closure.
                lock(&body).take();
            }),
        ))
    }
}

/// Runs each task on its own thread at a target frame interval, passing
/// the measured time since the previous frame.
#[derive(Debug, Clone)]
pub struct ThreadScheduler {
    frame_interval: Duration,
}

impl ThreadScheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }

    pub fn with_hz(hz: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz.max(1.0)))
    }
}

impl FrameScheduler for ThreadScheduler {
    fn schedule_repeating(&self, mut task: FrameTask) -> Result<ScheduledTask> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let interval = self.frame_interval;

        let worker = thread::Builder::new()
            .name("pond-motion".into())
            .spawn(move || {
                let mut last = Instant::now();
                loop {
                    thread::sleep(interval);
                    if flag.load(Ordering::Acquire) {
                        break;
                    }
                    let now = Instant::now();
                    task(now.duration_since(last).as_secs_f32());
                    last = now;
                }
            })?;

        Ok(ScheduledTask::new(
            cancelled,
            Box::new(move || {
                if worker.join().is_err() {
                    log::error!("motion thread panicked");
                }
            }),
        ))
    }
}
