//! Event processing task
//!
//! Woken by the edge interrupt through the notifier. Each wake-up drains
//! every pending signal and runs one unit of work per signal. The work is
//! supplied by the caller and must be short and bounded: anything long here
//! delays the response to the next interrupt.

use crate::notifier::EventNotifier;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant};
use portable_atomic::{AtomicU32, Ordering};

/// Number of events processed since boot. Written only by the event
/// processing task; everyone else just reads it.
pub struct ActivationCounter(AtomicU32);

impl ActivationCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Returns the new count.
    pub fn increment(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for ActivationCounter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventProcessingTask<'a, M: RawMutex, W> {
    notifier: &'a EventNotifier<M>,
    counter: &'a ActivationCounter,
    work: W,
    last_work: Duration,
}

impl<'a, M: RawMutex, W: FnMut(u32)> EventProcessingTask<'a, M, W> {
    /// `work` receives the activation number of the event it handles.
    pub fn new(notifier: &'a EventNotifier<M>, counter: &'a ActivationCounter, work: W) -> Self {
        Self {
            notifier,
            counter,
            work,
            last_work: Duration::from_ticks(0),
        }
    }

    /// How long the most recent unit of work took.
    pub fn last_work_duration(&self) -> Duration {
        self.last_work
    }

    /// Waits for the next batch of signals and processes all of them.
    /// Returns the size of the batch.
    pub async fn process_next(&mut self) -> u32 {
        let batch = self.notifier.wait_and_drain().await;

        for _ in 0..batch {
            let activation = self.counter.increment();
            let begin = Instant::now();

            (self.work)(activation);

            self.last_work = begin.elapsed();
            crate::trace!(
                "activation {} took {} us",
                activation,
                self.last_work.as_micros()
            );
        }
        batch
    }

    pub async fn run(mut self) -> ! {
        loop {
            self.process_next().await;
        }
    }
}
