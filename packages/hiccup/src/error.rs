use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when configuring or starting a [`StallMonitor`][crate::StallMonitor].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The poll interval was zero, which would turn the detection loop into a busy loop.
    #[error("poll interval must be greater than zero")]
    InvalidPollInterval,

    /// A duration was too large to be represented in the internal nanosecond resolution.
    #[error("{what} of {value:?} exceeds the supported maximum of u64::MAX nanoseconds")]
    DurationOutOfRange {
        /// Which setting the duration was provided for.
        what: &'static str,

        /// The rejected duration.
        value: Duration,
    },

    /// The monitor has already been started. Each monitor runs at most one detection loop.
    #[error("the stall monitor has already been started")]
    AlreadyStarted,

    /// The monitor has been stopped and cannot be started again.
    #[error("the stall monitor has been stopped and cannot be restarted")]
    Stopped,

    /// The operating system refused to create the background thread for the detection loop.
    #[error("failed to spawn the stall detection thread")]
    Spawn(#[source] io::Error),
}

/// A specialized `Result` type for stall monitor operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
