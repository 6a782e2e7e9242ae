//! Pulse generator firmware core
//!
//! Two flash tasks share one lock around their pulse bursts. A polled
//! button and a falling-edge interrupt feed half-period overrides through
//! a bounded queue, and the interrupt also wakes an event processing task
//! through a counting notifier.
//!
//! Everything here is generic over the raw mutex and the `embedded-hal`
//! pin traits. The board binary picks the RP2040 types; the tests use the
//! host.

#![cfg_attr(not(test), no_std)]

pub mod log;

pub mod config;
pub mod error;
pub mod types;

pub mod isr;
pub mod lock;
pub mod notifier;
pub mod queue;

pub mod button;
pub mod flash;
pub mod heartbeat;
pub mod processing;

pub use button::{ButtonConfig, ButtonPollTask};
pub use error::StartupError;
pub use flash::{PeriodicFlashTask, TaskConfig};
pub use heartbeat::Heartbeat;
pub use isr::{pin_mask, InterruptHandler, IsrContext};
pub use lock::{BusGuard, SharedResourceLock};
pub use notifier::{EventNotifier, IsrNotifier};
pub use processing::{ActivationCounter, EventProcessingTask};
pub use queue::{ConfigQueue, IsrProducer};
pub use types::{FlashState, TaskId};
