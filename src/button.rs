use crate::{config::POLL_INTERVAL, queue::ConfigQueue};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use embedded_hal::digital::InputPin;

// Defines a task that polls a button input. The button pulls the pin low
// while pressed. Holding it down pushes one value per poll interval until
// the queue is full; after that the updates are dropped.

pub struct ButtonConfig<'a, I, M: RawMutex> {
    pub input: I,
    pub push_value: u32,
    pub queue: &'a ConfigQueue<M>,
}

pub struct ButtonPollTask<'a, I, M: RawMutex> {
    config: ButtonConfig<'a, I, M>,
}

impl<'a, I: InputPin, M: RawMutex> ButtonPollTask<'a, I, M> {
    pub fn new(config: ButtonConfig<'a, I, M>) -> Self {
        Self { config }
    }

    /// Samples the button once. Returns `None` when it isn't pressed,
    /// otherwise whether the queue accepted the value. A failed read
    /// counts as not pressed.
    pub fn poll_once(&mut self) -> Option<bool> {
        if !self.config.input.is_low().unwrap_or(false) {
            return None;
        }

        let pushed = self.config.queue.try_push(self.config.push_value);

        if !pushed {
            crate::trace!("button: queue full, update dropped");
        }
        Some(pushed)
    }

    pub async fn run(mut self) -> ! {
        loop {
            self.poll_once();
            Timer::after(POLL_INTERVAL).await;
        }
    }
}
