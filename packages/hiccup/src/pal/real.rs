use std::thread;
use std::time::{Duration, Instant};

use crate::pal::Platform;

/// The platform that the crate was compiled for, backed by the Rust standard library.
///
/// `std::time::Instant` is monotonic on every supported target, so no OS-specific clock
/// bindings are needed.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
