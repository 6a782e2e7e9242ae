//! Bounded FIFO of half-period overrides
//!
//! Producers are the polled button task and the edge interrupt; the low
//! flash task is the only consumer. Pushing never blocks: a full queue
//! rejects the value and leaves its contents alone.

use crate::{config::QUEUE_DEPTH, isr::IsrContext};
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};
use embassy_time::{with_timeout, Duration};

pub struct ConfigQueue<M: RawMutex, const N: usize = QUEUE_DEPTH> {
    chan: Channel<M, u32, N>,
}

impl<M: RawMutex, const N: usize> ConfigQueue<M, N> {
    pub const fn new() -> Self {
        Self {
            chan: Channel::new(),
        }
    }

    /// Appends `value` if there is room. Returns `false`, without
    /// touching the queue, when it is full.
    pub fn try_push(&self, value: u32) -> bool {
        self.chan.try_send(value).is_ok()
    }

    /// Removes the oldest value, if any, without waiting.
    pub fn try_pop(&self) -> Option<u32> {
        self.chan.try_receive().ok()
    }

    // A zero timeout is the same as `try_pop`. Anything longer waits at
    // most that long for a value to arrive.

    pub async fn pop_timeout(&self, timeout: Duration) -> Option<u32> {
        if timeout.as_ticks() == 0 {
            return self.try_pop();
        }
        with_timeout(timeout, self.chan.receive()).await.ok()
    }

    pub fn len(&self) -> usize {
        self.chan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chan.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.chan.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Handle exposing only the operations allowed in interrupt context.
    pub fn isr_producer(&self) -> IsrProducer<'_, M, N> {
        IsrProducer { queue: self }
    }
}

impl<M: RawMutex, const N: usize> Default for ConfigQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IsrProducer<'a, M: RawMutex, const N: usize = QUEUE_DEPTH> {
    queue: &'a ConfigQueue<M, N>,
}

impl<'a, M: RawMutex, const N: usize> IsrProducer<'a, M, N> {
    pub fn try_push(&self, _cx: &mut IsrContext, value: u32) -> bool {
        self.queue.try_push(value)
    }
}

impl<'a, M: RawMutex, const N: usize> Clone for IsrProducer<'a, M, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: RawMutex, const N: usize> Copy for IsrProducer<'a, M, N> {}
