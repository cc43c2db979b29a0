//! Detection threshold and poll interval, readable by the detection loop while callers update them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::{Error, Result};

/// The detection threshold used unless configured otherwise.
///
/// Shorter overruns are considered ordinary scheduling jitter.
pub const DEFAULT_DETECTION_THRESHOLD: Duration = Duration::from_millis(100);

/// The poll interval used unless configured otherwise. This is one frame at 60 Hz.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Both values are stored as whole nanoseconds. Each is independent of the other, so relaxed
/// atomic access is sufficient to rule out torn reads.
#[derive(Debug)]
pub(crate) struct Settings {
    detection_threshold_nanos: AtomicU64,
    poll_interval_nanos: AtomicU64,
}

impl Settings {
    pub(crate) fn new(detection_threshold: Duration, poll_interval: Duration) -> Result<Self> {
        Ok(Self {
            detection_threshold_nanos: AtomicU64::new(validate_detection_threshold(
                detection_threshold,
            )?),
            poll_interval_nanos: AtomicU64::new(validate_poll_interval(poll_interval)?),
        })
    }

    pub(crate) fn detection_threshold(&self) -> Duration {
        Duration::from_nanos(self.detection_threshold_nanos.load(Ordering::Relaxed))
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_nanos(self.poll_interval_nanos.load(Ordering::Relaxed))
    }

    pub(crate) fn set_detection_threshold(&self, value: Duration) -> Result<()> {
        let nanos = validate_detection_threshold(value)?;
        self.detection_threshold_nanos
            .store(nanos, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn set_poll_interval(&self, value: Duration) -> Result<()> {
        let nanos = validate_poll_interval(value)?;
        self.poll_interval_nanos.store(nanos, Ordering::Relaxed);
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection_threshold_nanos: AtomicU64::new(duration_as_nanos(
                DEFAULT_DETECTION_THRESHOLD,
            )),
            poll_interval_nanos: AtomicU64::new(duration_as_nanos(DEFAULT_POLL_INTERVAL)),
        }
    }
}

/// Validates a detection threshold, returning it in nanoseconds.
///
/// Zero is allowed and means every positive overrun counts as a stall.
pub(crate) fn validate_detection_threshold(value: Duration) -> Result<u64> {
    to_nanos("detection threshold", value)
}

/// Validates a poll interval, returning it in nanoseconds.
pub(crate) fn validate_poll_interval(value: Duration) -> Result<u64> {
    if value.is_zero() {
        return Err(Error::InvalidPollInterval);
    }

    to_nanos("poll interval", value)
}

fn to_nanos(what: &'static str, value: Duration) -> Result<u64> {
    match u64::try_from(value.as_nanos()) {
        Ok(nanos) => Ok(nanos),
        Err(_) => Err(Error::DurationOutOfRange { what, value }),
    }
}

/// Converts a duration to nanoseconds, saturating at `u64::MAX` (about 584 years).
pub(crate) fn duration_as_nanos(value: Duration) -> u64 {
    u64::try_from(value.as_nanos()).unwrap_or(u64::MAX)
}
