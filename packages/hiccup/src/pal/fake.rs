//! Fake platform implementation for testing.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::pal::Platform;

/// Real time spent in each fake sleep, so background loops driven by a fake platform
/// do not spin a processor at full speed.
const REAL_PACING: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct FakePlatformState {
    elapsed: Duration,
    pending_stall: Option<Duration>,
    requested_sleeps: Vec<Duration>,
}

/// Fake implementation of the platform abstraction with a virtual clock.
///
/// A sleep advances the virtual clock by exactly the requested duration, so a loop driven by
/// this platform never observes any overrun unless the test injects one via
/// [`inject_stall()`][Self::inject_stall]. Clones share the same clock.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    origin: Instant,
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Arc::new(Mutex::new(FakePlatformState {
                elapsed: Duration::ZERO,
                pending_stall: None,
                requested_sleeps: Vec::new(),
            })),
        }
    }

    /// Makes the next sleep take `blocked_for` of virtual time instead of the requested duration,
    /// as if the sleeping thread had been blocked for that long.
    pub(crate) fn inject_stall(&self, blocked_for: Duration) {
        self.state.lock().pending_stall = Some(blocked_for);
    }

    /// Advances the virtual clock without sleeping, as if time passed between two clock reads.
    pub(crate) fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.elapsed = state
            .elapsed
            .checked_add(duration)
            .expect("virtual clock overflow is not a realistic test scenario");
    }

    /// Every sleep duration requested so far, in order.
    pub(crate) fn requested_sleeps(&self) -> Vec<Duration> {
        self.state.lock().requested_sleeps.clone()
    }
}

impl Platform for FakePlatform {
    fn now(&self) -> Instant {
        self.origin
            .checked_add(self.state.lock().elapsed)
            .expect("virtual clock overflow is not a realistic test scenario")
    }

    fn sleep(&self, duration: Duration) {
        {
            let mut state = self.state.lock();
            state.requested_sleeps.push(duration);

            let slept = state.pending_stall.take().unwrap_or(duration);
            state.elapsed = state
                .elapsed
                .checked_add(slept)
                .expect("virtual clock overflow is not a realistic test scenario");
        }

        thread::sleep(REAL_PACING);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn clock_does_not_move_on_its_own() {
        let platform = FakePlatform::new();

        assert_eq!(platform.now(), platform.now());
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn sleep_advances_by_requested_duration() {
        let platform = FakePlatform::new();
        let before = platform.now();

        platform.sleep(Duration::from_millis(16));

        assert_eq!(platform.now().duration_since(before), Duration::from_millis(16));
        assert_eq!(platform.requested_sleeps(), vec![Duration::from_millis(16)]);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn injected_stall_replaces_one_sleep() {
        let platform = FakePlatform::new();
        platform.inject_stall(Duration::from_millis(250));
        let before = platform.now();

        platform.sleep(Duration::from_millis(16));
        assert_eq!(platform.now().duration_since(before), Duration::from_millis(250));

        platform.sleep(Duration::from_millis(16));
        assert_eq!(platform.now().duration_since(before), Duration::from_millis(266));
    }

    #[test]
    fn clones_share_the_clock() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.advance(Duration::from_millis(100));

        assert_eq!(platform1.now(), platform2.now());
        assert_eq!(
            platform2.now().duration_since(platform2.origin),
            Duration::from_millis(100)
        );
    }
}
