//! Interrupt context and the edge interrupt handler
//!
//! Code running in an interrupt must not block. The handler only holds
//! `IsrProducer` and `IsrNotifier`, whose operations take an
//! `IsrContext`, so it has no path to a waiting primitive.

use crate::{notifier::IsrNotifier, queue::IsrProducer};
use core::marker::PhantomData;
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Token for the body of one interrupt invocation. It stays on the
/// interrupt's stack: it is neither `Send` nor `Sync`.
pub struct IsrContext {
    switch_requested: bool,
    _not_send: PhantomData<*const ()>,
}

impl IsrContext {
    /// Created at the top of an interrupt handler, dropped at its end.
    ///
    /// ```compile_fail
    /// let cx = pulse_generator::IsrContext::enter();
    /// ```
    ///
    /// # Safety
    ///
    /// The caller must be running as the body of an interrupt, at a
    /// priority above every task that blocks on the primitives the context
    /// unlocks. Task code must never create one.
    pub unsafe fn enter() -> Self {
        Self {
            switch_requested: false,
            _not_send: PhantomData,
        }
    }

    /// Asks for a context switch on return from the interrupt when
    /// `woken` is set.
    pub fn yield_from_isr(&mut self, woken: bool) {
        self.switch_requested |= woken;
    }

    pub fn switch_requested(&self) -> bool {
        self.switch_requested
    }
}

/// Bit for `pin` in a GPIO bank's interrupt status word.
pub const fn pin_mask(pin: u8) -> u32 {
    1 << pin
}

// Reacts to a falling edge on the monitored pin: queue a half-period
// override, then notify the event processing task.

pub struct InterruptHandler<'a, M: RawMutex> {
    pin_mask: u32,
    push_value: u32,
    queue: IsrProducer<'a, M>,
    notifier: IsrNotifier<'a, M>,
}

impl<'a, M: RawMutex> InterruptHandler<'a, M> {
    pub fn new(
        pin: u8,
        push_value: u32,
        queue: IsrProducer<'a, M>,
        notifier: IsrNotifier<'a, M>,
    ) -> Self {
        Self {
            pin_mask: pin_mask(pin),
            push_value,
            queue,
            notifier,
        }
    }

    /// `pending` is the bank's masked interrupt status, already read and
    /// cleared by the caller. Edges on other pins are ignored.
    pub fn on_interrupt(&self, cx: &mut IsrContext, pending: u32) {
        if pending & self.pin_mask == 0 {
            return;
        }

        // A full queue drops the update; the notification still goes out.
        if !self.queue.try_push(cx, self.push_value) {
            crate::debug!("edge irq: queue full, update dropped");
        }

        let woken = self.notifier.signal(cx);
        cx.yield_from_isr(woken);
    }
}
