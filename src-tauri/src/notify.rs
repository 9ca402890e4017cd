use std::time::Duration;

use log::{error, info};
use tauri::AppHandle;
use tauri_plugin_notification::NotificationExt;

pub const DEFAULT_REMINDER_DELAY_SECS: u64 = 5;

const WALK_REMINDER_TITLE: &str = "Time to Move!";
const WALK_REMINDER_BODY: &str = "Don't forget to achieve your daily step goal!";

#[derive(Debug, Clone)]
pub struct ReminderContent {
    pub title: String,
    pub body: String,
}

impl ReminderContent {
    pub fn walk_reminder() -> Self {
        Self {
            title: WALK_REMINDER_TITLE.to_string(),
            body: WALK_REMINDER_BODY.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ReminderScheduler {
    app_handle: AppHandle,
}

impl ReminderScheduler {
    pub fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }

    /// Fire-and-forget: posts one OS notification after `delay`. No id
    /// tracking, no cancellation, no retry; a failed request is logged and
    /// dropped since the reminder is non-critical.
    pub fn schedule_one_shot(&self, content: ReminderContent, delay: Duration) {
        let app_handle = self.app_handle.clone();
        info!("reminder scheduled in {}s: {}", delay.as_secs(), content.title);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let result = app_handle
                .notification()
                .builder()
                .title(content.title)
                .body(content.body)
                .show();

            if let Err(err) = result {
                error!("failed to show reminder notification: {err}");
            }
        });
    }
}
