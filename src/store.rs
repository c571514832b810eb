//! Single-slot latest-value stores.
//!
//! One `Latest<T>` per sensor domain: the owning task publishes a complete
//! snapshot each cycle, any number of readers (HTTP handlers, diagnostics)
//! copy it out at their own pace. Latest wins — a slow consumer sees a
//! stale value, a fast producer overwrites. There is deliberately no
//! history and no backpressure.

use std::sync::{Arc, Mutex};

use crate::gps::GpsFix;
use crate::sensors::EnvSnapshot;
use crate::tasks::TaskState;

/// Mutex-guarded single slot holding the most recently published value.
///
/// The lock is held only for the copy-in/copy-out, never across a bus
/// transaction or a render call. Before the first publish, readers get
/// `T::default()`.
#[derive(Debug, Default)]
pub struct Latest<T: Clone + Default> {
    slot: Mutex<T>,
}

impl<T: Clone + Default> Latest<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(T::default()),
        }
    }

    /// Replace the current value. Atomic with respect to `snapshot()`:
    /// a reader never observes a mix of two publishes.
    pub fn publish(&self, value: T) {
        match self.slot.lock() {
            Ok(mut guard) => *guard = value,
            // A poisoned lock means a reader panicked mid-copy. The slot
            // itself is still a fully-formed T, so keep publishing.
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// Copy out the most recent fully-published value. Never blocks
    /// indefinitely, never fails.
    pub fn snapshot(&self) -> T {
        match self.slot.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// The full set of stores shared between acquisition tasks and readers.
///
/// Constructed once at boot; tasks hold an `Arc` and publish, consumers
/// hold an `Arc` and read. No other memory is shared between them.
#[derive(Debug, Default)]
pub struct SensorStores {
    /// Environmental triple published by the env task each cycle.
    pub env: Latest<EnvSnapshot>,
    /// Latest time-of-flight distance (mm); last non-zero value is held.
    pub distance_mm: Latest<u16>,
    /// Latest GPS fix published by the gps task.
    pub gps: Latest<GpsFix>,
    /// Env task lifecycle state, for the status surface.
    pub env_status: Latest<TaskState>,
    /// GPS task lifecycle state.
    pub gps_status: Latest<TaskState>,
}

impl SensorStores {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}
