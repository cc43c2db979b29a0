//! The drift measurement at the heart of stall detection.
//!
//! Each iteration sleeps for the poll interval and then checks how much longer than that the
//! sleep actually took. Only the overrun is compared against the detection threshold, so a
//! 500 ms stall is reported as roughly 500 ms no matter which poll interval is configured.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::MonitorState;
use crate::pal::{Platform, PlatformFacade};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum IterationResult {
    /// The monitor was asked to stop. The loop must exit.
    Shutdown,

    /// The overrun stayed within the detection threshold.
    Quiet,

    /// A stall was detected, recorded and delivered to observers.
    Stalled(Duration),
}

#[derive(Debug)]
pub(crate) struct Detector<'a> {
    state: &'a MonitorState,
    platform: &'a PlatformFacade,
}

impl<'a> Detector<'a> {
    pub(crate) fn new(state: &'a MonitorState, platform: &'a PlatformFacade) -> Self {
        Self { state, platform }
    }

    pub(crate) fn run_one_iteration(&self) -> IterationResult {
        if self.state.is_shutdown_requested() {
            return IterationResult::Shutdown;
        }

        let poll_interval = self.state.settings.poll_interval();

        let started_at = self.platform.now();
        self.platform.sleep(poll_interval);
        let elapsed = self.platform.now().saturating_duration_since(started_at);

        // A sleep that returns early is not a stall, so this saturates at zero.
        let overrun = elapsed.saturating_sub(poll_interval);

        if overrun <= self.state.settings.detection_threshold() {
            return IterationResult::Quiet;
        }

        // The total is updated first, so observers reading it see their own stall included.
        self.state.record_stall(overrun);

        warn!(
            ?overrun,
            total = ?self.state.total_stall_duration(),
            "process stall detected"
        );

        self.state.observers.notify(overrun);

        IterationResult::Stalled(overrun)
    }
}

/// Runs detection iterations until shutdown is requested.
pub(crate) fn detection_loop(state: &MonitorState, platform: &PlatformFacade) {
    debug!(
        poll_interval = ?state.settings.poll_interval(),
        detection_threshold = ?state.settings.detection_threshold(),
        "stall detection loop started"
    );

    let detector = Detector::new(state, platform);

    loop {
        match detector.run_one_iteration() {
            IterationResult::Shutdown => break,
            IterationResult::Quiet => trace!("no stall"),
            IterationResult::Stalled(_) => {}
        }
    }

    debug!("stall detection loop exiting");
}
