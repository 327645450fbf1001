//! Resettable one-shot round deadline.
//!
//! A [`RoundTimer`] runs its callback on a tokio task once the deadline
//! passes. Every arm and every stop bumps a generation counter under the
//! timer's lock; the firing task re-checks its generation under the same
//! lock before taking the callback. A firing that raced with a reset or
//! stop therefore finds a newer generation and does nothing, even if the
//! task was already past its sleep when the reset happened.
//!
//! The callback runs after the lock is released, so it may itself reset
//! or stop the timer.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::EngineError;

type Callback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct TimerState {
    generation: u64,
    callback: Option<Callback>,
    task: Option<JoinHandle<()>>,
}

/// A one-shot alarm that can be re-armed or cancelled from any thread.
pub struct RoundTimer {
    runtime: Handle,
    state: Arc<Mutex<TimerState>>,
}

impl RoundTimer {
    /// A disarmed timer on the current tokio runtime.
    pub fn new() -> Result<Self, EngineError> {
        let runtime = Handle::try_current().map_err(|e| EngineError::NoRuntime {
            reason: e.to_string(),
        })?;
        Ok(Self::with_runtime(runtime))
    }

    /// A disarmed timer spawning onto `runtime`.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime,
            state: Arc::new(Mutex::new(TimerState::default())),
        }
    }

    /// Run `on_fire` once `duration` elapses. Replaces any pending alarm.
    pub fn start(&self, duration: Duration, on_fire: impl FnOnce() + Send + 'static) {
        self.arm(duration, Box::new(on_fire));
    }

    /// Cancel any pending alarm and arm a new one.
    pub fn reset(&self, duration: Duration, on_fire: impl FnOnce() + Send + 'static) {
        self.arm(duration, Box::new(on_fire));
    }

    /// Cancel any pending alarm. Safe to call any number of times.
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation = state.generation.wrapping_add(1);
        state.callback = None;
        if let Some(task) = state.task.take() {
            task.abort();
        }
    }

    /// Whether an alarm is pending.
    pub fn is_armed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callback
            .is_some()
    }

    fn arm(&self, duration: Duration, on_fire: Callback) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;
        state.callback = Some(on_fire);
        if let Some(previous) = state.task.take() {
            previous.abort();
        }

        let shared = Arc::clone(&self.state);
        state.task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            let callback = {
                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if state.generation != generation {
                    debug!(generation, current = state.generation, "Stale round timer ignored");
                    return;
                }
                state.task = None;
                state.callback.take()
            };
            if let Some(callback) = callback {
                callback();
            }
        }));
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for RoundTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RoundTimer")
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}
