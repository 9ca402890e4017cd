pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{StepTrackerController, TrackerSnapshot};
pub use state::{PedometerAvailability, TrackerState};
