//! End-to-end run of the whole application on the host
//!
//! Both flash tasks, the polled button, the edge interrupt and the event
//! processing task share one lock, queue and notifier, with shortened
//! bursts so the run takes well under a second.

use core::{
    cell::{Cell, RefCell},
    convert::Infallible,
};
use embassy_futures::{
    block_on,
    join::{join, join4},
    select::select,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use pulse_generator::{
    config::{BUTTON_PUSH_VALUE, ISR_PUSH_VALUE},
    ActivationCounter, ButtonConfig, ButtonPollTask, ConfigQueue, EventNotifier,
    EventProcessingTask, InterruptHandler, IsrContext, PeriodicFlashTask, SharedResourceLock,
    TaskConfig, pin_mask,
};

type Raw = CriticalSectionRawMutex;

const HIGH: u8 = 1;
const LOW: u8 = 2;
const IRQ_PIN: u8 = 15;

#[derive(Clone, Copy)]
struct Edge {
    pin: u8,
    high: bool,
    at: Instant,
}

struct Led<'a> {
    id: u8,
    log: &'a RefCell<Vec<Edge>>,
}

impl Led<'_> {
    fn record(&self, high: bool) {
        self.log.borrow_mut().push(Edge {
            pin: self.id,
            high,
            at: Instant::now(),
        });
    }
}

impl ErrorType for Led<'_> {
    type Error = Infallible;
}

impl OutputPin for Led<'_> {
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.record(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.record(false);
        Ok(())
    }
}

struct Button<'a>(&'a Cell<bool>);

impl ErrorType for Button<'_> {
    type Error = Infallible;
}

impl InputPin for Button<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }
}

// Widths, in ms, of the pulses on one pin.

fn pulse_widths(log: &[Edge], pin: u8) -> Vec<u64> {
    let edges: Vec<&Edge> = log.iter().filter(|e| e.pin == pin).collect();

    edges
        .windows(2)
        .filter(|w| w[0].high && !w[1].high)
        .map(|w| w[1].at.duration_since(w[0].at).as_millis())
        .collect()
}

// Times, in ms after `origin`, at which bursts on one pin began.

fn burst_starts(log: &[Edge], pin: u8, burst_edges: usize, origin: Instant) -> Vec<u64> {
    log.iter()
        .filter(|e| e.pin == pin)
        .step_by(burst_edges)
        .map(|e| e.at.duration_since(origin).as_millis())
        .collect()
}

#[test]
fn test_full_system() {
    let lock = SharedResourceLock::<Raw>::new();
    let queue = ConfigQueue::<Raw>::new();
    let notifier = EventNotifier::<Raw>::new();
    let counter = ActivationCounter::new();

    let log = RefCell::new(Vec::new());
    let pressed = Cell::new(true);

    let high = PeriodicFlashTask::new(TaskConfig {
        output: Led { id: HIGH, log: &log },
        default_half_period: Duration::from_millis(5),
        execution_period: Duration::from_millis(200),
        pulse_count: 5,
        is_queue_consumer: false,
        lock: &lock,
        queue: &queue,
    });
    let low = PeriodicFlashTask::new(TaskConfig {
        output: Led { id: LOW, log: &log },
        default_half_period: Duration::from_millis(3),
        execution_period: Duration::from_millis(0),
        pulse_count: 1,
        is_queue_consumer: true,
        lock: &lock,
        queue: &queue,
    });
    let button = ButtonPollTask::new(ButtonConfig {
        input: Button(&pressed),
        push_value: BUTTON_PUSH_VALUE,
        queue: &queue,
    });
    let processing = EventProcessingTask::new(&notifier, &counter, |_| {});
    let handler = InterruptHandler::new(
        IRQ_PIN,
        ISR_PUSH_VALUE,
        queue.isr_producer(),
        notifier.isr_handle(),
    );

    let after_irq = Cell::new(0);

    let driver = async {
        // Held through exactly one poll.
        Timer::after(Duration::from_millis(20)).await;
        pressed.set(false);

        Timer::after(Duration::from_millis(80)).await;
        let mut cx = unsafe { IsrContext::enter() };
        handler.on_interrupt(&mut cx, pin_mask(IRQ_PIN));
        assert!(cx.switch_requested());

        Timer::after(Duration::from_millis(10)).await;
        after_irq.set(counter.get());

        Timer::after(Duration::from_millis(500)).await;
    };

    block_on(select(
        join4(high.run(), low.run(), button.run(), processing.run()),
        driver,
    ));

    assert_eq!(after_irq.get(), 1);
    assert_eq!(counter.get(), 1);
    assert!(queue.is_empty());

    let log = log.borrow();

    // Overrides are used once each, in arrival order, then the default
    // comes back.
    let low_widths = pulse_widths(&log, LOW);
    assert!(low_widths.len() >= 3, "low widths {:?}", low_widths);
    assert!((105..=125).contains(&low_widths[0]), "{:?}", low_widths);
    assert!((55..=75).contains(&low_widths[1]), "{:?}", low_widths);
    assert!(low_widths[2..].iter().all(|w| *w < 20), "{:?}", low_widths);

    // The high task never reads the queue.
    let high_widths = pulse_widths(&log, HIGH);
    assert!(high_widths.len() >= 10);
    assert!(high_widths.iter().all(|w| *w < 20), "{:?}", high_widths);

    // A high burst is ten edges; nothing from the low pin lands inside one.
    let mut run = 0;
    for (i, e) in log.iter().enumerate() {
        if e.pin == HIGH {
            run += 1;
        } else {
            assert_eq!(run % 10, 0, "low edge inside a high burst at {}", i);
            run = 0;
        }
    }
}

#[test]
fn test_high_cadence_while_low_floods() {
    const PERIOD: u64 = 60;
    // One low burst, plus scheduling slack.
    const SLACK: u64 = 6 + 6;

    let lock = SharedResourceLock::<Raw>::new();
    let queue = ConfigQueue::<Raw>::new();
    let log = RefCell::new(Vec::new());

    let high = PeriodicFlashTask::new(TaskConfig {
        output: Led { id: HIGH, log: &log },
        default_half_period: Duration::from_millis(3),
        execution_period: Duration::from_millis(PERIOD),
        pulse_count: 2,
        is_queue_consumer: false,
        lock: &lock,
        queue: &queue,
    });
    let low = PeriodicFlashTask::new(TaskConfig {
        output: Led { id: LOW, log: &log },
        default_half_period: Duration::from_millis(3),
        execution_period: Duration::from_millis(0),
        pulse_count: 1,
        is_queue_consumer: true,
        lock: &lock,
        queue: &queue,
    });

    // `low` is polled first, so it holds the lock whenever `high` comes due.
    let origin = Instant::now();
    block_on(select(
        join(low.run(), high.run()),
        Timer::after(Duration::from_millis(500)),
    ));

    let log = log.borrow();
    let starts = burst_starts(&log, HIGH, 4, origin);
    assert!(starts.len() >= 7, "high bursts at {:?}", starts);

    // Fixed rate: burst k starts at its k-th tick, late by at most the low
    // burst it had to wait out. Lateness never accumulates.
    for (k, at) in starts.iter().enumerate() {
        let due = k as u64 * PERIOD;
        assert!(
            (due.saturating_sub(2)..=due + SLACK).contains(at),
            "burst {} started at {} ms, due at {} ms: {:?}",
            k,
            at,
            due,
            starts
        );
    }

    // The low task kept running between high bursts.
    assert!(pulse_widths(&log, LOW).len() >= 40);
}
