use std::time::Duration;

use tauri::State;

use crate::{
    notify::{ReminderContent, DEFAULT_REMINDER_DELAY_SECS},
    tracker::{StepTrackerController, TrackerSnapshot},
    AppState,
};

fn controller_from_state(state: &State<'_, AppState>) -> StepTrackerController {
    state.tracker.clone()
}

#[tauri::command]
pub async fn get_tracker_state(state: State<'_, AppState>) -> Result<TrackerSnapshot, String> {
    Ok(controller_from_state(&state).snapshot())
}

#[tauri::command]
pub async fn mount_step_counter(state: State<'_, AppState>) -> Result<TrackerSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.mount().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn unmount_step_counter(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.unmount().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_daily_goal(state: State<'_, AppState>, goal: u32) -> Result<TrackerSnapshot, String> {
    let controller = controller_from_state(&state);
    controller.set_daily_goal(goal).map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn schedule_walk_reminder(
    state: State<'_, AppState>,
    delay_seconds: Option<u64>,
) -> Result<(), String> {
    let delay = Duration::from_secs(delay_seconds.unwrap_or(DEFAULT_REMINDER_DELAY_SECS));
    state
        .reminders
        .schedule_one_shot(ReminderContent::walk_reminder(), delay);
    Ok(())
}
