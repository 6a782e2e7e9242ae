use crate::{
    config::{HEARTBEAT_PERIOD, HEARTBEAT_REPORT_EVERY},
    notifier::EventNotifier,
    processing::ActivationCounter,
    queue::ConfigQueue,
};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Ticker;
use embedded_hal::digital::{OutputPin, PinState};

// Liveness and diagnostics. The LED blinks for as long as the thread
// executor keeps getting scheduled. Every few beats the activation count,
// queue depth and pending notifications are logged. Nothing here writes to
// the shared state.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub activations: u32,
    pub queued: usize,
    pub pending: u32,
}

pub struct Heartbeat<'a, P, M: RawMutex> {
    led: P,
    counter: &'a ActivationCounter,
    queue: &'a ConfigQueue<M>,
    notifier: &'a EventNotifier<M>,
    beats: u32,
}

impl<'a, P: OutputPin, M: RawMutex> Heartbeat<'a, P, M> {
    pub fn new(
        led: P,
        counter: &'a ActivationCounter,
        queue: &'a ConfigQueue<M>,
        notifier: &'a EventNotifier<M>,
    ) -> Self {
        Self {
            led,
            counter,
            queue,
            notifier,
            beats: 0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            activations: self.counter.get(),
            queued: self.queue.len(),
            pending: self.notifier.pending(),
        }
    }

    /// Toggles the LED. Every `HEARTBEAT_REPORT_EVERY` beats it also
    /// returns a snapshot of the counters.
    pub fn beat(&mut self) -> Option<Snapshot> {
        if self.led.set_state(PinState::from(self.beats % 2 == 0)).is_err() {
            crate::warn!("heartbeat LED write failed");
        }
        self.beats = self.beats.wrapping_add(1);

        if self.beats % HEARTBEAT_REPORT_EVERY == 0 {
            Some(self.snapshot())
        } else {
            None
        }
    }

    pub async fn run(mut self) -> ! {
        let mut ticker = Ticker::every(HEARTBEAT_PERIOD);

        loop {
            if let Some(s) = self.beat() {
                crate::info!(
                    "activations={} queued={} pending={}",
                    s.activations,
                    s.queued,
                    s.pending
                );
            }
            ticker.next().await;
        }
    }
}
