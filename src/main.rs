#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{error, info};
use embassy_executor::{Executor, InterruptExecutor, SendSpawner, SpawnError, Spawner};
use embassy_rp::{
    gpio::{Input, Level, Output, Pull},
    interrupt,
    interrupt::{InterruptExt, Priority},
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use pulse_generator::{
    config::*, ActivationCounter, ButtonConfig, ButtonPollTask, ConfigQueue, EventNotifier,
    EventProcessingTask, Heartbeat, InterruptHandler, IsrContext, PeriodicFlashTask, pin_mask,
    SharedResourceLock, StartupError, TaskConfig, TaskId,
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

type Raw = CriticalSectionRawMutex;

static LOCK: StaticCell<SharedResourceLock<Raw>> = StaticCell::new();
static QUEUE: StaticCell<ConfigQueue<Raw>> = StaticCell::new();
static NOTIFIER: StaticCell<EventNotifier<Raw>> = StaticCell::new();
static COUNTER: StaticCell<ActivationCounter> = StaticCell::new();

// Three priority levels. Edge dispatch preempts event processing, which
// preempts the thread-mode tasks (flash, button, heartbeat).

static EXECUTOR_EDGE: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_EVENT: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_THREAD: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_EDGE.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_EVENT.on_interrupt()
}

#[embassy_executor::task(pool_size = 2)]
async fn flash(task: PeriodicFlashTask<'static, Output<'static>, Raw>) -> ! {
    task.run().await
}

#[embassy_executor::task]
async fn button(task: ButtonPollTask<'static, Input<'static>, Raw>) -> ! {
    task.run().await
}

#[embassy_executor::task]
async fn event_processing(task: EventProcessingTask<'static, Raw, fn(u32)>) -> ! {
    task.run().await
}

#[embassy_executor::task]
async fn heartbeat(task: Heartbeat<'static, Output<'static>, Raw>) -> ! {
    task.run().await
}

// embassy-rp owns the GPIO bank interrupt and wakes this task on the edge.
// The task runs on the SWI_IRQ_0 executor, so the handler body executes in
// handler mode above every other task. A requested switch pends the event
// executor directly.
//
// By the time the wait resolves embassy-rp has already read and cleared the
// bank status and demultiplexed it to this pin, so the pending word holds
// exactly this pin's bit.

const EDGE_PENDING: u32 = pin_mask(PIN_BUTTON_IRQ);

#[embassy_executor::task]
async fn edge_irq(mut pin: Input<'static>, handler: InterruptHandler<'static, Raw>) -> ! {
    loop {
        pin.wait_for_falling_edge().await;

        let switch = {
            // SAFETY: runs on the SWI_IRQ_0 executor, in handler mode at the
            // highest task priority.
            let mut cx = unsafe { IsrContext::enter() };
            handler.on_interrupt(&mut cx, EDGE_PENDING);
            cx.switch_requested()
        };

        if switch {
            interrupt::SWI_IRQ_1.pend();
        }
    }
}

// Per-event work. Kept empty: anything CPU-bound here lengthens the
// worst-case response to the next edge.

fn no_work(_activation: u32) {}

fn spawned(result: Result<(), SpawnError>, id: TaskId) -> Result<(), StartupError> {
    result.map_err(|_| StartupError::Spawn(id))
}

// Nothing can make progress once startup fails. Park the core.

fn halt(err: StartupError) -> ! {
    error!("startup failed: {}", err);
    loop {
        cortex_m::asm::wfi();
    }
}

struct App {
    high: PeriodicFlashTask<'static, Output<'static>, Raw>,
    low: PeriodicFlashTask<'static, Output<'static>, Raw>,
    button: ButtonPollTask<'static, Input<'static>, Raw>,
    heartbeat: Heartbeat<'static, Output<'static>, Raw>,
    edge_pin: Input<'static>,
    handler: InterruptHandler<'static, Raw>,
}

impl App {
    // The edge handler goes in last, once everything it touches is
    // running.

    fn start(self, thread: Spawner, edge: SendSpawner) -> Result<(), StartupError> {
        spawned(thread.spawn(flash(self.high)), TaskId::FlashHigh)?;
        spawned(thread.spawn(flash(self.low)), TaskId::FlashLow)?;
        spawned(thread.spawn(button(self.button)), TaskId::ButtonPoll)?;
        spawned(thread.spawn(heartbeat(self.heartbeat)), TaskId::Heartbeat)?;
        spawned(
            edge.spawn(edge_irq(self.edge_pin, self.handler)),
            TaskId::EdgeInterrupt,
        )
    }
}

#[entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());

    let lock: &'static SharedResourceLock<Raw> = LOCK.init(SharedResourceLock::new());
    let queue: &'static ConfigQueue<Raw> = QUEUE.init(ConfigQueue::new());
    let notifier: &'static EventNotifier<Raw> = NOTIFIER.init(EventNotifier::new());
    let counter: &'static ActivationCounter = COUNTER.init(ActivationCounter::new());

    let app = App {
        high: PeriodicFlashTask::new(TaskConfig {
            output: Output::new(p.PIN_2, Level::Low),
            default_half_period: HIGH_HALF_PERIOD,
            execution_period: HIGH_EXECUTION_PERIOD,
            pulse_count: HIGH_PULSE_COUNT,
            is_queue_consumer: false,
            lock,
            queue,
        }),
        low: PeriodicFlashTask::new(TaskConfig {
            output: Output::new(p.PIN_3, Level::Low),
            default_half_period: LOW_HALF_PERIOD,
            execution_period: LOW_EXECUTION_PERIOD,
            pulse_count: LOW_PULSE_COUNT,
            is_queue_consumer: true,
            lock,
            queue,
        }),
        button: ButtonPollTask::new(ButtonConfig {
            input: Input::new(p.PIN_14, Pull::Up),
            push_value: BUTTON_PUSH_VALUE,
            queue,
        }),
        heartbeat: Heartbeat::new(Output::new(p.PIN_25, Level::Low), counter, queue, notifier),
        edge_pin: Input::new(p.PIN_15, Pull::Up),
        handler: InterruptHandler::new(
            PIN_BUTTON_IRQ,
            ISR_PUSH_VALUE,
            queue.isr_producer(),
            notifier.isr_handle(),
        ),
    };

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let event = EXECUTOR_EVENT.start(interrupt::SWI_IRQ_1);
    let processing = EventProcessingTask::new(notifier, counter, no_work as fn(u32));

    if let Err(err) = spawned(event.spawn(event_processing(processing)), TaskId::EventProcessing) {
        halt(err);
    }

    interrupt::SWI_IRQ_0.set_priority(Priority::P1);
    let edge = EXECUTOR_EDGE.start(interrupt::SWI_IRQ_0);

    info!("starting tasks");

    let executor = EXECUTOR_THREAD.init(Executor::new());
    executor.run(move |spawner| {
        if let Err(err) = app.start(spawner, edge) {
            halt(err);
        }
    })
}
