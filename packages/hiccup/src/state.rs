use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::{Observers, Settings, duration_as_nanos};

/// Everything shared between a [`StallMonitor`][crate::StallMonitor] and its detection thread.
///
/// The detection thread keeps this alive on its own, which is what lets the loop outlive the
/// monitor that started it.
#[derive(Debug, Default)]
pub(crate) struct MonitorState {
    pub(crate) settings: Settings,
    pub(crate) observers: Observers,

    total_stall_nanos: AtomicU64,
    stall_count: AtomicU64,

    shutdown_requested: AtomicBool,
}

impl MonitorState {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Adds a detected stall to the running totals.
    ///
    /// Only the detection thread calls this, so the two counters are never raced by writers.
    /// Readers may briefly see the new total with the old count.
    pub(crate) fn record_stall(&self, overrun: Duration) {
        let overrun_nanos = duration_as_nanos(overrun);

        // The closure always returns Some, so this cannot fail.
        let _previous = self.total_stall_nanos.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |total| Some(total.saturating_add(overrun_nanos)),
        );

        // Saturating for the same reason as the total. Not reachable in practice.
        let _previous = self.stall_count.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |count| Some(count.saturating_add(1)),
        );
    }

    pub(crate) fn total_stall_duration(&self) -> Duration {
        Duration::from_nanos(self.total_stall_nanos.load(Ordering::Relaxed))
    }

    pub(crate) fn stall_count(&self) -> u64 {
        self.stall_count.load(Ordering::Relaxed)
    }

    pub(crate) fn request_shutdown(&self) {
        // Release pairs with the Acquire in is_shutdown_requested(), so the detection thread
        // sees everything the stopping thread did before asking it to stop.
        self.shutdown_requested.store(true, Ordering::Release);
    }

    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }
}
