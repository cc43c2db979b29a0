#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Detects when the current process stalls.
//!
//! A [`StallMonitor`] runs a timer on a background thread that sleeps for a short poll interval
//! and then checks how much time actually passed. If the sleep overran by more than the
//! detection threshold, the process was not running for that long: it was stopped at a debugger
//! breakpoint, paused by a runtime, starved by the operating system scheduler or similar.
//!
//! Each detected stall is added to a running total and delivered to registered observers.
//! What to do about it (log it, count it, discount it from a timeout) is up to the observers.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use hiccup::StallMonitor;
//!
//! let monitor = StallMonitor::builder()
//!     .detection_threshold(Duration::from_millis(100))
//!     .poll_interval(Duration::from_millis(16))
//!     .start_immediately(true)
//!     .build()?;
//!
//! monitor.add_observer(hiccup::print_stall);
//!
//! std::thread::sleep(Duration::from_millis(50));
//!
//! println!("Total stall duration: {:?}", monitor.total_stall_duration());
//! monitor.stop();
//! # Ok::<(), hiccup::Error>(())
//! ```
//!
//! # Shared instance
//!
//! Code that does not want to pass a monitor around can use [`StallMonitor::shared()`], a
//! process-wide instance with default settings. It is created on first access but only starts
//! when someone calls [`start()`][StallMonitor::start] on it.
//!
//! # How a stall is measured
//!
//! The reported duration is the overrun, i.e. the measured time minus the intended sleep.
//! With a 16 ms poll interval, a thread blocked for 250 ms reports a 234 ms stall. Overruns at or
//! below the detection threshold are treated as scheduling jitter and ignored.
//!
//! # Logging
//!
//! Detected stalls and observer panics are reported via [`tracing`](https://docs.rs/tracing).
//! The package does not install a subscriber.

mod detector;
mod error;
mod monitor;
mod observers;
mod pal;
mod settings;
mod state;

pub(crate) use detector::*;
pub use error::*;
pub use monitor::*;
pub(crate) use observers::Observers;
pub use observers::print_stall;
pub use settings::{DEFAULT_DETECTION_THRESHOLD, DEFAULT_POLL_INTERVAL};
pub(crate) use settings::{
    Settings, duration_as_nanos, validate_detection_threshold, validate_poll_interval,
};
pub(crate) use state::*;
