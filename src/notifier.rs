//! Counting wake-up from interrupt context to one task
//!
//! The interrupt adds to the count; the consumer waits for a non-zero
//! count and takes all of it in one step. Every signal is drained exactly
//! once.

use crate::isr::IsrContext;
use core::{cell::RefCell, future::poll_fn, mem, task::Poll};
use embassy_sync::{
    blocking_mutex::{raw::RawMutex, Mutex},
    waitqueue::WakerRegistration,
};

struct State {
    count: u32,
    waker: WakerRegistration,
}

pub struct EventNotifier<M: RawMutex> {
    state: Mutex<M, RefCell<State>>,
}

impl<M: RawMutex> EventNotifier<M> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                count: 0,
                waker: WakerRegistration::new(),
            })),
        }
    }

    /// Adds one to the count and wakes the consumer if it is waiting.
    /// Returns `true` when a waiting task was woken.
    pub fn signal(&self) -> bool {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();

            match s.count.checked_add(1) {
                Some(count) => s.count = count,
                None => crate::warn!("notification count saturated"),
            }

            let woken = s.waker.occupied();
            s.waker.wake();
            woken
        })
    }

    /// Suspends until at least one signal is pending, then returns the
    /// whole pending count and resets it to zero.
    pub async fn wait_and_drain(&self) -> u32 {
        poll_fn(|cx| {
            self.state.lock(|s| {
                let mut s = s.borrow_mut();

                if s.count > 0 {
                    // Not waiting any more; a later signal wakes nobody.
                    s.waker = WakerRegistration::new();
                    Poll::Ready(mem::take(&mut s.count))
                } else {
                    s.waker.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    /// Signals received but not yet drained.
    pub fn pending(&self) -> u32 {
        self.state.lock(|s| s.borrow().count)
    }

    /// Handle exposing only the operations allowed in interrupt context.
    pub fn isr_handle(&self) -> IsrNotifier<'_, M> {
        IsrNotifier { notifier: self }
    }
}

impl<M: RawMutex> Default for EventNotifier<M> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IsrNotifier<'a, M: RawMutex> {
    notifier: &'a EventNotifier<M>,
}

impl<'a, M: RawMutex> IsrNotifier<'a, M> {
    pub fn signal(&self, _cx: &mut IsrContext) -> bool {
        self.notifier.signal()
    }
}

impl<'a, M: RawMutex> Clone for IsrNotifier<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: RawMutex> Copy for IsrNotifier<'a, M> {}
