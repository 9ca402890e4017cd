use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{PedometerDevice, StepReading};

const WATCH_INTERVAL_MS: u64 = 1_000;

/// Handle to a live step subscription. Consuming it via `release` is the
/// only way to stop delivery, so a subscription can never be released twice.
pub struct StepSubscription {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl StepSubscription {
    /// Stops the watch loop and waits for it to finish. No callback is
    /// invoked after this returns.
    pub async fn release(self) -> Result<()> {
        self.cancel_token.cancel();
        self.handle
            .await
            .context("step watch task failed to join")
    }
}

/// Opens a live subscription on `device`. The callback receives the
/// cumulative step count since the subscription started, once per tick in
/// which the count advanced.
pub fn watch_step_count<F>(device: Arc<dyn PedometerDevice>, callback: F) -> StepSubscription
where
    F: Fn(StepReading) + Send + Sync + 'static,
{
    watch_every(Duration::from_millis(WATCH_INTERVAL_MS), device, callback)
}

fn watch_every<F>(period: Duration, device: Arc<dyn PedometerDevice>, callback: F) -> StepSubscription
where
    F: Fn(StepReading) + Send + Sync + 'static,
{
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cumulative: u64 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let delta = device.poll_step_delta();
                    if delta == 0 {
                        continue;
                    }
                    cumulative = cumulative.saturating_add(delta);
                    callback(StepReading { steps: cumulative });
                }
                _ = token.cancelled() => {
                    info!("step watch shutting down");
                    break;
                }
            }
        }
    });

    StepSubscription {
        handle,
        cancel_token,
    }
}
