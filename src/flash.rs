//! Periodic pulse bursts on an output pin
//!
//! Each cycle takes the shared lock, emits `pulse_count` pulses, releases
//! the lock and then waits for the next slot of a fixed-rate schedule. The
//! queue consumer replaces its half-period for one cycle whenever the queue
//! has a value.

use crate::{lock::SharedResourceLock, queue::ConfigQueue, types::FlashState};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Ticker, Timer};
use embedded_hal::digital::{OutputPin, PinState};

pub struct TaskConfig<'a, P, M: RawMutex> {
    pub output: P,
    pub default_half_period: Duration,
    /// Time between the starts of consecutive cycles. Zero re-enters
    /// immediately after releasing the lock.
    pub execution_period: Duration,
    pub pulse_count: u32,
    /// Only the consumer reads half-period overrides from `queue`.
    pub is_queue_consumer: bool,
    pub lock: &'a SharedResourceLock<M>,
    pub queue: &'a ConfigQueue<M>,
}

pub struct PeriodicFlashTask<'a, P, M: RawMutex> {
    config: TaskConfig<'a, P, M>,
    state: FlashState,
}

impl<'a, P: OutputPin, M: RawMutex> PeriodicFlashTask<'a, P, M> {
    pub fn new(config: TaskConfig<'a, P, M>) -> Self {
        Self {
            config,
            state: FlashState::Idle,
        }
    }

    pub fn state(&self) -> FlashState {
        self.state
    }

    // The override from the queue applies to this cycle only; it is never
    // stored.

    fn half_period(&self) -> Duration {
        if self.config.is_queue_consumer {
            crate::trace!("{} overrides queued", self.config.queue.len());

            if let Some(ms) = self.config.queue.try_pop() {
                crate::debug!("half-period override: {} ms", ms);
                return Duration::from_millis(u64::from(ms));
            }
        }
        self.config.default_half_period
    }

    fn drive(&mut self, level: PinState) {
        if self.config.output.set_state(level).is_err() {
            crate::warn!("flash output write failed");
        }
    }

    /// Runs one lock, flash, release pass and returns the half-period it
    /// used.
    pub async fn cycle(&mut self) -> Duration {
        let lock = self.config.lock;
        let guard = lock.acquire().await;

        self.state = FlashState::Locked;
        let half = self.half_period();

        self.state = FlashState::Flashing;
        for _ in 0..self.config.pulse_count {
            self.drive(PinState::High);
            Timer::after(half).await;
            self.drive(PinState::Low);
            Timer::after(half).await;
        }

        // Hands the lock to the oldest waiter, so coming straight back
        // round queues this task behind it.
        SharedResourceLock::release(guard);
        self.state = FlashState::CoolingDown;
        half
    }

    pub async fn run(mut self) -> ! {
        let mut ticker = Ticker::every(self.config.execution_period);

        loop {
            self.cycle().await;
            ticker.next().await;
            self.state = FlashState::Idle;
        }
    }
}
