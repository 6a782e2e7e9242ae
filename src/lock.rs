//! Lock serializing access to the output bus
//!
//! Both flash tasks take this lock for the whole of a burst. Waiting is
//! unbounded; there is no timeout variant. The lock is not reentrant:
//! acquiring it twice from the same task deadlocks that task.
//!
//! Ownership is handed over in wait order. Every `acquire` draws a ticket
//! and releasing the lock moves it to the next ticket, so a task that
//! releases and immediately acquires again queues behind the tasks that
//! were already waiting. The handoff does not depend on which task the
//! executor happens to poll first.

use core::{cell::RefCell, future::poll_fn, mem, task::Poll};

use embassy_sync::{
    blocking_mutex::{raw::RawMutex, Mutex},
    waitqueue::MultiWakerRegistration,
};

/// Wakers kept per lock. More waiters than this still work, at the cost of
/// spurious wake-ups.
pub const MAX_WAITERS: usize = 4;

struct State {
    next_ticket: u32,
    serving: u32,
    // Bit i set: ticket `serving + i` was dropped before it got the lock.
    abandoned: u32,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

impl State {
    fn advance(&mut self) {
        loop {
            self.serving = self.serving.wrapping_add(1);
            self.abandoned >>= 1;
            if self.abandoned & 1 == 0 {
                break;
            }
        }
        self.waiters.wake();
    }
}

pub struct SharedResourceLock<M: RawMutex> {
    state: Mutex<M, RefCell<State>>,
}

/// Proof of exclusive access to the bus. Dropping it releases the lock.
pub struct BusGuard<'a, M: RawMutex> {
    lock: &'a SharedResourceLock<M>,
}

impl<M: RawMutex> Drop for BusGuard<'_, M> {
    fn drop(&mut self) {
        self.lock.state.lock(|s| s.borrow_mut().advance())
    }
}

// A place in line. Dropping it without becoming a guard gives up the place.
struct Ticket<'a, M: RawMutex> {
    lock: &'a SharedResourceLock<M>,
    number: u32,
}

impl<M: RawMutex> Drop for Ticket<'_, M> {
    fn drop(&mut self) {
        self.lock.abandon(self.number)
    }
}

impl<M: RawMutex> SharedResourceLock<M> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                next_ticket: 0,
                serving: 0,
                abandoned: 0,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    // Suspends the caller until every earlier waiter has had its turn.

    pub async fn acquire(&self) -> BusGuard<'_, M> {
        let ticket = Ticket {
            lock: self,
            number: self.take_ticket(),
        };

        poll_fn(|cx| {
            self.state.lock(|s| {
                let mut s = s.borrow_mut();

                if s.serving == ticket.number {
                    Poll::Ready(())
                } else {
                    s.waiters.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await;

        mem::forget(ticket);
        BusGuard { lock: self }
    }

    pub fn release(guard: BusGuard<'_, M>) {
        drop(guard)
    }

    /// True while a task holds the lock or has been handed it.
    pub fn is_locked(&self) -> bool {
        self.state.lock(|s| {
            let s = s.borrow();

            s.serving != s.next_ticket
        })
    }

    fn take_ticket(&self) -> u32 {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let ticket = s.next_ticket;

            s.next_ticket = ticket.wrapping_add(1);
            ticket
        })
    }

    fn abandon(&self, ticket: u32) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let offset = ticket.wrapping_sub(s.serving);

            if offset == 0 {
                s.advance();
            } else if offset < u32::BITS {
                s.abandoned |= 1 << offset;
            } else {
                crate::error!("bus lock: waiter {} dropped out of range", ticket);
            }
        })
    }
}

impl<M: RawMutex> Default for SharedResourceLock<M> {
    fn default() -> Self {
        Self::new()
    }
}
