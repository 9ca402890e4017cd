pub mod simulated;
pub mod watcher;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use simulated::SimulatedPedometer;

#[derive(Debug, Error)]
pub enum PedometerError {
    #[error("invalid query window: start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("step sensor query failed: {0}")]
    Sensor(String),
}

/// A single step-count observation, either a historical total for a time
/// window or a cumulative live reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepReading {
    pub steps: u64,
}

/// Seam to the platform step sensor.
pub trait PedometerDevice: Send + Sync {
    /// Capability probe. Never errors; platforms without a step sensor
    /// report `false`.
    fn is_available(&self) -> bool;

    /// Total steps recorded in `[start, end]`. `None` means the sensor has
    /// no data for the window, which callers read as zero steps.
    fn step_count_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<StepReading>, PedometerError>;

    /// Steps registered since the previous poll. The live watch loop folds
    /// these deltas into cumulative readings.
    fn poll_step_delta(&self) -> u64;
}

/// The device backing this build. Desktop machines have no step hardware,
/// so we run the simulated sensor.
pub fn default_device() -> Arc<dyn PedometerDevice> {
    Arc::new(SimulatedPedometer::new())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use super::{PedometerDevice, PedometerError, StepReading};

    /// Deterministic device for tests: fixed availability, a scripted
    /// historical answer, and a queue of poll deltas (exhausted = 0).
    pub(crate) struct ScriptedDevice {
        available: bool,
        past: Result<Option<u64>, String>,
        deltas: Mutex<VecDeque<u64>>,
    }

    impl ScriptedDevice {
        pub(crate) fn available(past: Option<u64>, deltas: Vec<u64>) -> Self {
            Self {
                available: true,
                past: Ok(past),
                deltas: Mutex::new(deltas.into()),
            }
        }

        pub(crate) fn unavailable() -> Self {
            Self {
                available: false,
                past: Ok(None),
                deltas: Mutex::new(VecDeque::new()),
            }
        }

        pub(crate) fn with_failing_history(message: &str) -> Self {
            Self {
                available: true,
                past: Err(message.to_string()),
                deltas: Mutex::new(VecDeque::new()),
            }
        }
    }

    impl PedometerDevice for ScriptedDevice {
        fn is_available(&self) -> bool {
            self.available
        }

        fn step_count_between(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Option<StepReading>, PedometerError> {
            match &self.past {
                Ok(steps) => Ok(steps.map(|steps| StepReading { steps })),
                Err(message) => Err(PedometerError::Sensor(message.clone())),
            }
        }

        fn poll_step_delta(&self) -> u64 {
            self.deltas.lock().unwrap().pop_front().unwrap_or(0)
        }
    }
}
