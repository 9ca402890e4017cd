mod notify;
mod pedometer;
mod screens;
mod store;
mod tracker;

use std::sync::Arc;

use notify::ReminderScheduler;
use pedometer::default_device;
use screens::{get_home_content, get_leaderboard, get_tab_config, list_workout_plans};
use store::GoalStore;
use tauri::Manager;
use tracker::commands::{
    get_tracker_state, mount_step_counter, schedule_walk_reminder, set_daily_goal,
    unmount_step_counter,
};
use tracker::StepTrackerController;

pub(crate) struct AppState {
    pub(crate) tracker: StepTrackerController,
    pub(crate) reminders: ReminderScheduler,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Stridelog starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let goals = Arc::new(GoalStore::new(app_data_dir.join("goals.json"))?);
                let tracker = StepTrackerController::new(
                    app.handle().clone(),
                    default_device(),
                    goals,
                );
                let reminders = ReminderScheduler::new(app.handle().clone());

                app.manage(AppState { tracker, reminders });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_tracker_state,
            mount_step_counter,
            unmount_step_counter,
            set_daily_goal,
            schedule_walk_reminder,
            get_tab_config,
            get_home_content,
            list_workout_plans,
            get_leaderboard,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
