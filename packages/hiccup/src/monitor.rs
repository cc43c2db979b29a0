use std::any::type_name;
use std::fmt;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::pal::PlatformFacade;
use crate::{
    DEFAULT_DETECTION_THRESHOLD, DEFAULT_POLL_INTERVAL, Error, MonitorState, Result, Settings,
    detection_loop, validate_detection_threshold, validate_poll_interval,
};

const THREAD_NAME: &str = "hiccup-stall-detector";

static SHARED: LazyLock<StallMonitor> = LazyLock::new(StallMonitor::new);

/// Detects stalls of the current process by watching a background timer for unexpected drift.
///
/// Once started, the monitor owns a dedicated thread that repeatedly sleeps for the poll interval
/// and measures how long the sleep actually took. If the overrun (actual minus intended sleep)
/// exceeds the detection threshold, the process is considered to have stalled: the overrun is
/// added to the running total and every registered observer is called with it.
///
/// Typical causes are a debugger breakpoint, a stop-the-world pause or the operating system not
/// scheduling the process. The monitor does not try to tell these apart.
///
/// # Lifetime
///
/// The detection loop runs until [`stop()`][Self::stop] is called. Dropping the monitor does not
/// stop the loop, so a monitor can be started and forgotten.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use hiccup::StallMonitor;
///
/// let monitor = StallMonitor::new();
/// monitor.add_observer(|overrun| println!("stalled for {overrun:?}"));
/// monitor.start_with_threshold(Duration::from_millis(250))?;
///
/// // ...
///
/// println!("total stall time: {:?}", monitor.total_stall_duration());
/// monitor.stop();
/// # Ok::<(), hiccup::Error>(())
/// ```
pub struct StallMonitor {
    state: Arc<MonitorState>,
    platform: PlatformFacade,

    started: AtomicBool,
    detection_thread: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for StallMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("state", &self.state)
            .field("platform", &self.platform)
            .field("started", &self.started.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl StallMonitor {
    /// Creates a monitor with default settings that has not yet been started.
    ///
    /// Use [`StallMonitor::builder()`] for custom configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(Settings::default(), PlatformFacade::real())
    }

    /// Creates a monitor with default settings and immediately starts it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the detection thread cannot be created.
    pub fn start_new() -> Result<Self> {
        Self::builder().start_immediately(true).build()
    }

    /// Creates a builder for configuring a monitor.
    pub fn builder() -> StallMonitorBuilder {
        StallMonitorBuilder::new()
    }

    /// The process-wide shared monitor, created with default settings on first access.
    ///
    /// The shared monitor is not started implicitly. Call
    /// [`start()`][Self::start] on it from whichever call site owns the decision.
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED
    }

    fn from_parts(settings: Settings, platform: PlatformFacade) -> Self {
        Self {
            state: Arc::new(MonitorState::new(settings)),
            platform,
            started: AtomicBool::new(false),
            detection_thread: Mutex::new(None),
        }
    }

    /// Registers a callback to be called with the overrun of every stall detected from now on.
    ///
    /// Observers are called in registration order, synchronously on the detection thread, and may
    /// be registered at any time. Long-running observers delay the next measurement, so they
    /// should hand off any heavy work. An observer that panics is logged and skipped without
    /// affecting other observers or the detection loop.
    pub fn add_observer<F>(&self, observer: F)
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.state.observers.push(Arc::new(observer));
    }

    /// Starts the detection loop with the currently configured settings.
    ///
    /// The loop runs on a dedicated background thread; this call returns immediately.
    ///
    /// # Errors
    ///
    /// * [`Error::AlreadyStarted`] if the monitor was already started.
    /// * [`Error::Stopped`] if the monitor was stopped.
    /// * [`Error::Spawn`] if the detection thread cannot be created.
    pub fn start(&self) -> Result<()> {
        self.claim_start()?;
        self.spawn_detection_thread()
    }

    /// Starts the detection loop with the given detection threshold and the default poll interval.
    ///
    /// # Errors
    ///
    /// Fails if the threshold is out of range or for any reason [`start()`][Self::start] fails.
    pub fn start_with_threshold(&self, detection_threshold: Duration) -> Result<()> {
        self.start_with(detection_threshold, DEFAULT_POLL_INTERVAL)
    }

    /// Starts the detection loop with the given detection threshold and poll interval.
    ///
    /// # Errors
    ///
    /// Fails if either duration is invalid or for any reason [`start()`][Self::start] fails.
    /// Invalid durations are rejected before anything else, leaving the monitor unstarted.
    pub fn start_with(&self, detection_threshold: Duration, poll_interval: Duration) -> Result<()> {
        validate_detection_threshold(detection_threshold)?;
        validate_poll_interval(poll_interval)?;

        self.claim_start()?;

        self.state
            .settings
            .set_detection_threshold(detection_threshold)?;
        self.state.settings.set_poll_interval(poll_interval)?;

        self.spawn_detection_thread()
    }

    fn claim_start(&self) -> Result<()> {
        if self.state.is_shutdown_requested() {
            return Err(Error::Stopped);
        }

        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyStarted);
        }

        Ok(())
    }

    fn spawn_detection_thread(&self) -> Result<()> {
        let state = Arc::clone(&self.state);
        let platform = self.platform.clone();

        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || detection_loop(&state, &platform));

        match spawned {
            Ok(handle) => {
                *self.detection_thread.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                // Nothing is running, so a later attempt is allowed to try again.
                self.started.store(false, Ordering::Release);
                Err(Error::Spawn(e))
            }
        }
    }

    /// Stops the detection loop and waits for the detection thread to exit.
    ///
    /// The loop notices the request before its next measurement, so this may block for up to one
    /// poll interval plus the time observers of an in-progress stall take. Calling this from an
    /// observer signals the loop without waiting for it.
    ///
    /// A stopped monitor cannot be started again. Stopping is idempotent, and stopping a monitor
    /// that was never started just prevents it from starting.
    pub fn stop(&self) {
        self.state.request_shutdown();

        let Some(handle) = self.detection_thread.lock().take() else {
            return;
        };

        if handle.thread().id() == thread::current().id() {
            // Joining our own thread would deadlock. The loop exits once the observer returns.
            return;
        }

        if let Err(payload) = handle.join() {
            // Observer panics are caught inside the loop, so reaching this means the detection
            // machinery itself is broken. Do not hide that.
            panic::resume_unwind(payload);
        }

        debug!("stall detection thread joined");
    }

    /// Whether the monitor has been started. Remains `true` after the monitor is stopped.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// The sum of the overruns of all stalls detected so far.
    #[must_use]
    pub fn total_stall_duration(&self) -> Duration {
        self.state.total_stall_duration()
    }

    /// The number of stalls detected so far.
    #[must_use]
    pub fn stall_count(&self) -> u64 {
        self.state.stall_count()
    }

    /// The minimum overrun that counts as a stall.
    #[must_use]
    pub fn detection_threshold(&self) -> Duration {
        self.state.settings.detection_threshold()
    }

    /// How long each detection iteration intentionally sleeps.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.state.settings.poll_interval()
    }

    /// Sets the minimum overrun that counts as a stall. Takes effect from the next measurement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DurationOutOfRange`] if the duration cannot be represented in whole
    /// nanoseconds as a `u64`. The previous value is kept.
    pub fn set_detection_threshold(&self, detection_threshold: Duration) -> Result<()> {
        self.state
            .settings
            .set_detection_threshold(detection_threshold)
    }

    /// Sets how long each detection iteration sleeps. Takes effect from the next iteration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPollInterval`] for a zero duration and
    /// [`Error::DurationOutOfRange`] for a duration that cannot be represented in whole
    /// nanoseconds as a `u64`. The previous value is kept.
    pub fn set_poll_interval(&self, poll_interval: Duration) -> Result<()> {
        self.state.settings.set_poll_interval(poll_interval)
    }
}

impl Default for StallMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring a [`StallMonitor`].
#[derive(Debug)]
#[must_use]
pub struct StallMonitorBuilder {
    detection_threshold: Duration,
    poll_interval: Duration,
    start_immediately: bool,
    platform: PlatformFacade,
}

impl StallMonitorBuilder {
    fn new() -> Self {
        Self {
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            poll_interval: DEFAULT_POLL_INTERVAL,
            start_immediately: false,
            platform: PlatformFacade::real(),
        }
    }

    /// Sets the minimum overrun that counts as a stall.
    ///
    /// Default is 100 milliseconds.
    pub fn detection_threshold(mut self, value: Duration) -> Self {
        self.detection_threshold = value;
        self
    }

    /// Sets how long each detection iteration intentionally sleeps.
    ///
    /// Default is 16 milliseconds.
    pub fn poll_interval(mut self, value: Duration) -> Self {
        self.poll_interval = value;
        self
    }

    /// Sets whether [`build()`][Self::build] also starts the detection loop.
    ///
    /// Default is `false`.
    pub fn start_immediately(mut self, value: bool) -> Self {
        self.start_immediately = value;
        self
    }

    #[cfg(test)]
    pub(crate) fn platform(mut self, platform: impl Into<PlatformFacade>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Builds the monitor with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured duration is invalid or, when starting immediately, if
    /// the detection thread cannot be created.
    pub fn build(self) -> Result<StallMonitor> {
        let settings = Settings::new(self.detection_threshold, self.poll_interval)?;
        let monitor = StallMonitor::from_parts(settings, self.platform);

        if self.start_immediately {
            monitor.start()?;
        }

        Ok(monitor)
    }
}
