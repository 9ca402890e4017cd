use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_DAILY_GOAL;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PedometerAvailability {
    Checking,
    Available,
    Unavailable,
}

impl Default for PedometerAvailability {
    fn default() -> Self {
        PedometerAvailability::Checking
    }
}

impl PedometerAvailability {
    /// Display label matching what the screen renders next to
    /// "Pedometer Available:".
    pub fn as_str(&self) -> &'static str {
        match self {
            PedometerAvailability::Checking => "checking",
            PedometerAvailability::Available => "true",
            PedometerAvailability::Unavailable => "false",
        }
    }
}

/// Screen state for the step counter. Mutators take the generation captured
/// when the mount began and ignore updates from a stale generation, so a
/// chain that outlives its mount cannot touch the state it was started for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub availability: PedometerAvailability,
    pub past_step_count: u64,
    pub current_step_count: u64,
    pub daily_goal: u32,
    pub mounted: bool,
    #[serde(skip)]
    pub generation: u64,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            availability: PedometerAvailability::Checking,
            past_step_count: 0,
            current_step_count: 0,
            daily_goal: DEFAULT_DAILY_GOAL,
            mounted: false,
            generation: 0,
        }
    }
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh mount: counts reset, availability back to checking,
    /// and a new generation that invalidates every earlier one. The daily
    /// goal is left alone; hydration replaces it separately.
    pub fn begin_mount(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.mounted = true;
        self.availability = PedometerAvailability::Checking;
        self.past_step_count = 0;
        self.current_step_count = 0;
        self.generation
    }

    /// Ends the mount. Bumping the generation here is what discards the
    /// results of any probe or reading still in flight.
    pub fn end_mount(&mut self) {
        self.mounted = false;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.mounted && self.generation == generation
    }

    /// One-way transition out of `Checking`. Returns whether the state
    /// changed; stale generations and repeat resolutions are ignored.
    pub fn resolve_availability(&mut self, generation: u64, available: bool) -> bool {
        if !self.is_current(generation) || self.availability != PedometerAvailability::Checking {
            return false;
        }
        self.availability = if available {
            PedometerAvailability::Available
        } else {
            PedometerAvailability::Unavailable
        };
        true
    }

    pub fn set_past_steps(&mut self, generation: u64, steps: u64) -> bool {
        if !self.is_current(generation) || self.availability != PedometerAvailability::Available {
            return false;
        }
        self.past_step_count = steps;
        true
    }

    /// Folds a cumulative live reading into the state. Counts never move
    /// backwards while mounted; only a remount resets them.
    pub fn record_steps(&mut self, generation: u64, cumulative: u64) -> bool {
        if !self.is_current(generation) || self.availability != PedometerAvailability::Available {
            return false;
        }
        if cumulative <= self.current_step_count {
            return false;
        }
        self.current_step_count = cumulative;
        true
    }

    pub fn set_goal(&mut self, goal: u32) {
        self.daily_goal = goal;
    }

    /// Derived, never stored: `min(current / goal, 1)`.
    pub fn progress(&self) -> f64 {
        if self.daily_goal == 0 {
            return 0.0;
        }
        (self.current_step_count as f64 / f64::from(self.daily_goal)).min(1.0)
    }
}
