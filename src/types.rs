// Identifies each task the firmware starts. Used for log messages and to
// name the task that failed to start.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    FlashHigh,
    FlashLow,
    ButtonPoll,
    EventProcessing,
    EdgeInterrupt,
    Heartbeat,
}

// Where a flash task is in its cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashState {
    Idle,
    Locked,
    Flashing,
    CoolingDown,
}
