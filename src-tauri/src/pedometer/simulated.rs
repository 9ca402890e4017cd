use chrono::{DateTime, Utc};
use rand::Rng;

use super::{PedometerDevice, PedometerError, StepReading};

const MAX_STEPS_PER_POLL: u64 = 3;

/// Desktop stand-in for a hardware step sensor: trickles in a few steps per
/// poll and reports a fixed synthetic total for historical queries.
pub struct SimulatedPedometer {
    yesterday_steps: u64,
}

impl SimulatedPedometer {
    pub fn new() -> Self {
        let yesterday_steps = rand::thread_rng().gen_range(2_000..=9_000);
        Self { yesterday_steps }
    }
}

impl Default for SimulatedPedometer {
    fn default() -> Self {
        Self::new()
    }
}

impl PedometerDevice for SimulatedPedometer {
    fn is_available(&self) -> bool {
        true
    }

    fn step_count_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<StepReading>, PedometerError> {
        if start > end {
            return Err(PedometerError::InvalidWindow { start, end });
        }

        Ok(Some(StepReading {
            steps: self.yesterday_steps,
        }))
    }

    fn poll_step_delta(&self) -> u64 {
        rand::thread_rng().gen_range(0..=MAX_STEPS_PER_POLL)
    }
}
