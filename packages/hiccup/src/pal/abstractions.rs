use std::fmt::Debug;
use std::time::{Duration, Instant};

/// The time-related capabilities the detection loop needs from the operating system.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Captures the current timestamp from a monotonic clock.
    fn now(&self) -> Instant;

    /// Suspends the current thread for at least `duration`.
    ///
    /// The actual suspension may be longer, subject to scheduling. That difference is exactly
    /// what the detection loop measures.
    fn sleep(&self, duration: Duration);
}
