//! Startup errors
//!
//! Nothing fails at runtime: queue-full is a silent drop and queue-empty
//! means "use the default". The only error is failing to build the system,
//! and the firmware halts on it.

use crate::types::TaskId;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// The executor had no room left for the task
    Spawn(TaskId),
}

impl StartupError {
    pub fn task(&self) -> TaskId {
        match self {
            StartupError::Spawn(id) => *id,
        }
    }
}

impl core::fmt::Display for StartupError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StartupError::Spawn(id) => write!(f, "failed to spawn {:?}", id),
        }
    }
}
