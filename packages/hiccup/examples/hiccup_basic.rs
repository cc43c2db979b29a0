//! Registers an observer on the shared monitor, then stalls the process a few times.
//!
//! Run it under a debugger and pause it for a while to see the pause reported as well.

use std::thread;
use std::time::Duration;

use hiccup::StallMonitor;

fn main() -> Result<(), hiccup::Error> {
    let monitor = StallMonitor::shared();

    monitor.add_observer(hiccup::print_stall);
    monitor.start()?;

    // Sleeping the main thread is not a stall: the detection thread keeps running.
    thread::sleep(Duration::from_millis(200));
    println!("Hello");
    thread::sleep(Duration::from_millis(200));
    println!("Nice to meet you");
    thread::sleep(Duration::from_millis(200));
    println!("Bye");

    println!(
        "Total stall duration: {}ms",
        monitor.total_stall_duration().as_millis()
    );

    monitor.stop();
    Ok(())
}
