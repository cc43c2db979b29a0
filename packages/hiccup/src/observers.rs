//! Append-only registry of stall observers and the fan-out that notifies them.

use std::any::{Any, type_name};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::error;

/// A callback notified with the overrun of each detected stall.
pub(crate) type Observer = Arc<dyn Fn(Duration) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    // Only ever appended to. Registration order is delivery order.
    list: Mutex<Vec<Observer>>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Observers {
    pub(crate) fn push(&self, observer: Observer) {
        self.list.lock().push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.list.lock().len()
    }

    /// Invokes every registered observer in registration order on the current thread.
    ///
    /// The lock is not held while observers run, so an observer may register further observers.
    /// Those are first notified about the next stall. A panicking observer is logged and skipped;
    /// the remaining observers are still notified.
    pub(crate) fn notify(&self, overrun: Duration) {
        let snapshot = self.list.lock().clone();

        for (index, observer) in snapshot.iter().enumerate() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| observer(overrun))) {
                error!(
                    observer_index = index,
                    panic_message = panic_message(payload.as_ref()),
                    "stall observer panicked, continuing with the remaining observers"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// An observer that prints each detected stall to stdout, e.g. `Stall detected: 234ms`.
///
/// Register it with [`StallMonitor::add_observer()`][crate::StallMonitor::add_observer] when all
/// you need is a quick indication that the process stalled.
#[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
pub fn print_stall(overrun: Duration) {
    println!("Stall detected: {}ms", overrun.as_millis());
}
