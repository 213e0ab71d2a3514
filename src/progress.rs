// Progress tracking for long searches
//
// Workers bump a lock-free counter once per finished batch. A background
// reporter thread wakes at a fixed cadence and logs how far the search got.
// None of this affects results.

use log::info;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Lock-free state shared between workers, the reporter and the caller
#[derive(Debug, Default)]
pub struct SearchProgress {
    /// Work units finished so far (candidates or opponent games)
    processed: AtomicU64,
    /// Work units in the whole run
    total: AtomicU64,
    /// Set to stop workers at the next batch boundary
    cancelled: AtomicBool,
}

impl SearchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run of `total` units; does not clear cancellation
    pub fn reset(&self, total: u64) {
        self.processed.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    pub fn add(&self, units: u64) {
        self.processed.fetch_add(units, Ordering::AcqRel);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Asks running workers to stop after their current batch
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Background thread logging progress until finished
pub struct ProgressReporter {
    stop: Arc<(Mutex<bool>, Condvar)>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressReporter {
    /// Spawns the reporter
    ///
    /// # Arguments
    /// * `progress` - Counter shared with the workers
    /// * `interval` - Time between progress lines
    /// * `unit` - What one unit of work is called in the log ("engines", "matches")
    pub fn spawn(progress: Arc<SearchProgress>, interval: Duration, unit: &'static str) -> Self {
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let stop_thread = stop.clone();

        let handle = thread::spawn(move || {
            let start = Instant::now();
            let (lock, cvar) = &*stop_thread;
            let mut done = lock.lock();
            while !*done {
                cvar.wait_for(&mut done, interval);
                if *done {
                    break;
                }
                log_line(&progress, start.elapsed(), unit);
            }
            log_line(&progress, start.elapsed(), unit);
        });

        ProgressReporter {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops the reporter after a final progress line
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let (lock, cvar) = &*self.stop;
        *lock.lock() = true;
        cvar.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn log_line(progress: &SearchProgress, elapsed: Duration, unit: &str) {
    let done = progress.processed();
    let total = progress.total();
    let percent = if total > 0 {
        done as f64 / total as f64 * 100.0
    } else {
        100.0
    };
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        info!(
            "Progress: {} / {} {} ({:.2}%), Speed: {:.0} {}/s",
            done,
            total,
            unit,
            percent,
            done as f64 / secs,
            unit
        );
    } else {
        info!("Progress: {} / {} {} ({:.2}%)", done, total, unit, percent);
    }
}
