use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use log::{info, warn};
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::{
    pedometer::{
        watcher::{watch_step_count, StepSubscription},
        PedometerDevice,
    },
    store::{GoalStore, DEFAULT_DAILY_GOAL},
};

use super::TrackerState;

#[derive(Debug, Serialize, Clone)]
pub struct TrackerSnapshot {
    pub state: TrackerState,
    pub progress: f64,
}

#[derive(Serialize, Clone)]
struct TrackerAlertEvent {
    title: String,
    body: String,
}

type StateListener = Arc<dyn Fn(TrackerSnapshot) + Send + Sync>;

type SubscriptionSlot = Arc<AsyncMutex<Option<StepSubscription>>>;

#[derive(Clone)]
pub struct StepTrackerController {
    state: Arc<Mutex<TrackerState>>,
    device: Arc<dyn PedometerDevice>,
    goals: Arc<GoalStore>,
    subscription: SubscriptionSlot,
    app_handle: AppHandle,
}

impl StepTrackerController {
    pub fn new(
        app_handle: AppHandle,
        device: Arc<dyn PedometerDevice>,
        goals: Arc<GoalStore>,
    ) -> Self {
        let mut state = TrackerState::new();
        state.set_goal(goals.daily_goal());

        Self {
            state: Arc::new(Mutex::new(state)),
            device,
            goals,
            subscription: Arc::new(AsyncMutex::new(None)),
            app_handle,
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        snapshot_of(&self.state)
    }

    /// Screen mount: kicks off the sensor chain and goal hydration, the two
    /// logically concurrent startup paths. Returns immediately with the
    /// availability still `checking`; the chain reports through events.
    pub async fn mount(&self) -> Result<TrackerSnapshot> {
        let generation = self.state.lock().unwrap().begin_mount();
        let mount_id = Uuid::new_v4();
        info!("step counter mounted (mount {mount_id}, generation {generation})");

        // A remount without an intervening unmount abandons the old watch.
        if let Some(previous) = self.subscription.lock().await.take() {
            previous
                .release()
                .await
                .context("failed to release the previous step subscription")?;
        }

        self.emit_state();

        // Detached on purpose: unmounting does not abort an in-flight probe,
        // it just discards its results via the generation check.
        tokio::spawn(sensor_chain(
            self.state.clone(),
            self.device.clone(),
            self.subscription.clone(),
            generation,
            self.listener(),
            mount_id,
        ));

        self.hydrate_goal(generation);

        Ok(self.snapshot())
    }

    /// Screen unmount: stops observable updates immediately and releases the
    /// live subscription if the sensor chain got far enough to open one.
    pub async fn unmount(&self) -> Result<()> {
        self.state.lock().unwrap().end_mount();

        if let Some(subscription) = self.subscription.lock().await.take() {
            subscription
                .release()
                .await
                .context("failed to release the step subscription")?;
            info!("step counter unmounted, subscription released");
        } else {
            info!("step counter unmounted, no subscription to release");
        }

        self.emit_state();
        Ok(())
    }

    /// Persists the goal, then updates screen state. On a storage failure
    /// the in-memory goal is untouched and the error propagates to the
    /// invoking command; state and storage never diverge.
    pub fn set_daily_goal(&self, goal: u32) -> Result<TrackerSnapshot> {
        if goal == 0 {
            bail!("daily goal must be greater than zero");
        }

        self.goals
            .save_daily_goal(goal)
            .context("failed to save the daily goal")?;

        self.state.lock().unwrap().set_goal(goal);
        self.emit_state();
        self.emit_alert("Goal Updated", &format!("Your daily goal is now {goal} steps!"));

        Ok(self.snapshot())
    }

    fn hydrate_goal(&self, generation: u64) {
        match self.goals.load_daily_goal() {
            Ok(loaded) => {
                let goal = loaded.unwrap_or(DEFAULT_DAILY_GOAL);
                let mut state = self.state.lock().unwrap();
                if state.is_current(generation) {
                    state.set_goal(goal);
                    drop(state);
                    self.emit_state();
                }
            }
            Err(err) => {
                // Not fatal: the default stays in effect and the user is told.
                warn!("failed to load the daily goal: {err}");
                self.emit_alert("Error", "Failed to load the daily goal.");
            }
        }
    }

    fn listener(&self) -> StateListener {
        let app_handle = self.app_handle.clone();
        Arc::new(move |snapshot| {
            let _ = app_handle.emit("tracker-state-changed", snapshot);
        })
    }

    fn emit_state(&self) {
        let _ = self
            .app_handle
            .emit("tracker-state-changed", self.snapshot());
    }

    fn emit_alert(&self, title: &str, body: &str) {
        let _ = self.app_handle.emit(
            "tracker-alert",
            TrackerAlertEvent {
                title: title.to_string(),
                body: body.to_string(),
            },
        );
    }
}

fn snapshot_of(state: &Arc<Mutex<TrackerState>>) -> TrackerSnapshot {
    let state = state.lock().unwrap();
    TrackerSnapshot {
        progress: state.progress(),
        state: state.clone(),
    }
}

fn notify(state: &Arc<Mutex<TrackerState>>, listener: &StateListener) {
    listener(snapshot_of(state));
}

/// The sensor half of a mount: probe availability, fetch the past-24h total,
/// then open the live subscription. Every state update is gated on the mount
/// generation, so a chain overtaken by an unmount finishes quietly without
/// observable effects.
async fn sensor_chain(
    state: Arc<Mutex<TrackerState>>,
    device: Arc<dyn PedometerDevice>,
    subscription: SubscriptionSlot,
    generation: u64,
    listener: StateListener,
    mount_id: Uuid,
) {
    let available = device.is_available();
    let resolved = state
        .lock()
        .unwrap()
        .resolve_availability(generation, available);
    if !resolved {
        info!("availability probe for mount {mount_id} resolved after unmount, discarding");
        return;
    }
    notify(&state, &listener);

    if !available {
        info!("pedometer unavailable, mount {mount_id} shows placeholder step data");
        return;
    }

    let end = Utc::now();
    let start = end - Duration::days(1);
    match device.step_count_between(start, end) {
        Ok(Some(sample)) => {
            if state.lock().unwrap().set_past_steps(generation, sample.steps) {
                notify(&state, &listener);
            }
        }
        Ok(None) => {} // no data for the window reads as zero steps
        Err(err) => warn!("historical step query failed for mount {mount_id}: {err}"),
    }

    let callback_state = state.clone();
    let callback_listener = listener.clone();
    let watch = watch_step_count(device, move |reading| {
        if callback_state
            .lock()
            .unwrap()
            .record_steps(generation, reading.steps)
        {
            notify(&callback_state, &callback_listener);
        }
    });

    // Install the watch, unless the mount ended while the chain was running;
    // then this chain owns the release.
    let mut slot = subscription.lock().await;
    if !state.lock().unwrap().is_current(generation) {
        drop(slot);
        if let Err(err) = watch.release().await {
            warn!("failed to release an orphaned step subscription: {err}");
        }
        return;
    }
    if let Some(previous) = slot.take() {
        warn!("replacing a leftover step subscription for mount {mount_id}");
        if let Err(err) = previous.release().await {
            warn!("failed to release the leftover step subscription: {err}");
        }
    }
    *slot = Some(watch);
    info!("live step subscription opened for mount {mount_id}");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::pedometer::testing::ScriptedDevice;

    use super::*;

    fn counting_listener() -> (Arc<AtomicUsize>, StateListener) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let listener: StateListener = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (calls, listener)
    }

    fn fresh_mount(state: &Arc<Mutex<TrackerState>>) -> u64 {
        state.lock().unwrap().begin_mount()
    }

    #[tokio::test]
    async fn available_device_yields_past_count_and_a_subscription() {
        let state = Arc::new(Mutex::new(TrackerState::new()));
        let subscription: SubscriptionSlot = Arc::new(AsyncMutex::new(None));
        let device = Arc::new(ScriptedDevice::available(Some(4_200), vec![]));
        let (calls, listener) = counting_listener();
        let generation = fresh_mount(&state);

        sensor_chain(
            state.clone(),
            device,
            subscription.clone(),
            generation,
            listener,
            Uuid::new_v4(),
        )
        .await;

        {
            let state = state.lock().unwrap();
            assert_eq!(state.availability.as_str(), "true");
            assert_eq!(state.past_step_count, 4_200);
            assert_eq!(state.current_step_count, 0);
        }
        assert!(calls.load(Ordering::SeqCst) >= 2);

        let watch = subscription.lock().await.take().expect("subscription installed");
        watch.release().await.unwrap();
    }

    #[tokio::test]
    async fn unavailable_device_skips_history_and_subscription() {
        let state = Arc::new(Mutex::new(TrackerState::new()));
        let subscription: SubscriptionSlot = Arc::new(AsyncMutex::new(None));
        let device = Arc::new(ScriptedDevice::unavailable());
        let (_, listener) = counting_listener();
        let generation = fresh_mount(&state);

        sensor_chain(
            state.clone(),
            device,
            subscription.clone(),
            generation,
            listener,
            Uuid::new_v4(),
        )
        .await;

        {
            let state = state.lock().unwrap();
            assert_eq!(state.availability.as_str(), "false");
            assert_eq!(state.past_step_count, 0);
            assert_eq!(state.current_step_count, 0);
        }
        assert!(subscription.lock().await.is_none());
    }

    #[tokio::test]
    async fn failed_history_query_degrades_to_zero_past_steps() {
        let state = Arc::new(Mutex::new(TrackerState::new()));
        let subscription: SubscriptionSlot = Arc::new(AsyncMutex::new(None));
        let device = Arc::new(ScriptedDevice::with_failing_history("sensor offline"));
        let (_, listener) = counting_listener();
        let generation = fresh_mount(&state);

        sensor_chain(
            state.clone(),
            device,
            subscription.clone(),
            generation,
            listener,
            Uuid::new_v4(),
        )
        .await;

        {
            let state = state.lock().unwrap();
            assert_eq!(state.availability.as_str(), "true");
            assert_eq!(state.past_step_count, 0);
        }

        // The live watch still opens; history and watch fail independently.
        let watch = subscription.lock().await.take().expect("subscription installed");
        watch.release().await.unwrap();
    }

    #[tokio::test]
    async fn unmount_before_the_probe_resolves_discards_the_chain() {
        let state = Arc::new(Mutex::new(TrackerState::new()));
        let subscription: SubscriptionSlot = Arc::new(AsyncMutex::new(None));
        let device = Arc::new(ScriptedDevice::available(Some(4_200), vec![]));
        let (calls, listener) = counting_listener();

        let generation = fresh_mount(&state);
        state.lock().unwrap().end_mount();

        sensor_chain(
            state.clone(),
            device,
            subscription.clone(),
            generation,
            listener,
            Uuid::new_v4(),
        )
        .await;

        {
            let state = state.lock().unwrap();
            assert_eq!(state.availability.as_str(), "checking");
            assert_eq!(state.past_step_count, 0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(subscription.lock().await.is_none());
    }

    #[tokio::test]
    async fn remount_during_the_chain_keeps_the_stale_watch_out() {
        let state = Arc::new(Mutex::new(TrackerState::new()));
        let subscription: SubscriptionSlot = Arc::new(AsyncMutex::new(None));
        let device = Arc::new(ScriptedDevice::available(None, vec![]));
        let (_, listener) = counting_listener();

        let stale = fresh_mount(&state);
        // The screen remounts before the first chain finishes.
        let _fresh = fresh_mount(&state);

        sensor_chain(
            state.clone(),
            device,
            subscription.clone(),
            stale,
            listener,
            Uuid::new_v4(),
        )
        .await;

        assert!(subscription.lock().await.is_none());
    }
}
