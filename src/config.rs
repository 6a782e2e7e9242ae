//! Compile-time configuration for the pulse generator firmware
//!
//! Durations are in milliseconds at the point where they cross the queue,
//! and `embassy_time::Duration` everywhere else.

use embassy_time::Duration;

/// Number of half-period overrides the config queue can hold
pub const QUEUE_DEPTH: usize = 20;

/// Cadence of the polled button task
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

// High-priority flash task: long burst, fixed 10 s rate, never reads the
// queue.

pub const HIGH_HALF_PERIOD: Duration = Duration::from_millis(500);
pub const HIGH_EXECUTION_PERIOD: Duration = Duration::from_secs(10);
pub const HIGH_PULSE_COUNT: u32 = 5;

// Low-priority flash task: single pulse, runs whenever it gets the lock,
// consumes half-period overrides from the queue.

pub const LOW_HALF_PERIOD: Duration = Duration::from_millis(300);
pub const LOW_EXECUTION_PERIOD: Duration = Duration::from_millis(0);
pub const LOW_PULSE_COUNT: u32 = 1;

/// Half-period (ms) pushed while the polled button is held
pub const BUTTON_PUSH_VALUE: u32 = 110;

/// Half-period (ms) pushed by the edge interrupt
pub const ISR_PUSH_VALUE: u32 = 60;

/// Heartbeat LED toggle period
pub const HEARTBEAT_PERIOD: Duration = Duration::from_millis(500);

/// Heartbeat ticks between diagnostic reports
pub const HEARTBEAT_REPORT_EVERY: u32 = 20;

// RP2040 wiring: flash outputs on GPIO 2 (high) and 3 (low), polled
// button on GPIO 14, heartbeat LED on GPIO 25. Both buttons are active-low
// against the internal pull-up. Only the interrupt pin's number is needed
// at runtime, to match the bank's pending mask.

pub const PIN_BUTTON_IRQ: u8 = 15;
