//! Auto-refresh scheduler for the review board.
//!
//! While a nurse has the board mounted, a background task emits a staleness
//! event every two minutes so the webview re-fetches through the normal
//! command path. Window-focus refreshes share the same notification path.
//! The handle shuts the task down and aborts it when the board unmounts, so
//! nothing keeps ticking for a view that is gone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tauri::{AppHandle, Emitter, Manager};

use crate::state::AppState;

/// How often the board is told to re-fetch: every 2 minutes.
pub const REFRESH_INTERVAL_SECS: u64 = 120;

/// Sleep granularity, so shutdown is honored promptly mid-interval.
pub const SLEEP_GRANULARITY_SECS: u64 = 1;

/// Event the webview listens on to re-fetch the active list.
pub const STALE_EVENT: &str = "medication-requests-stale";

/// Handle to the running scheduler. Dropping it stops and aborts the task.
pub struct RefreshHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl RefreshHandle {
    /// Signal the scheduler to stop after its current sleep granule.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Spawn the scheduler task for the mounted review board.
pub fn start_refresh_scheduler(app: AppHandle) -> RefreshHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let handle = tokio::spawn(async move {
        tracing::info!(
            interval_secs = REFRESH_INTERVAL_SECS,
            "Review auto-refresh started"
        );
        run_scheduler(
            flag,
            Duration::from_secs(REFRESH_INTERVAL_SECS),
            Duration::from_secs(SLEEP_GRANULARITY_SECS),
            move || notify_stale(&app),
        )
        .await;
        tracing::info!("Review auto-refresh stopped");
    });
    RefreshHandle {
        shutdown,
        handle: Some(handle),
    }
}

/// Tell the webview the list is stale, unless a fetch is already running.
/// Used by both the interval tick and the window-focus command.
pub fn notify_stale(app: &AppHandle) {
    let state = app.state::<Arc<AppState>>();
    if state.refresh_busy() {
        tracing::debug!("Refresh tick skipped: a fetch is already in flight");
        return;
    }
    if let Err(e) = app.emit(STALE_EVENT, ()) {
        tracing::warn!(error = %e, "Failed to emit refresh event");
    }
}

/// The scheduler loop itself, factored out of the spawn so tests can drive
/// it with short durations. Sleeps in granules, re-checking the shutdown
/// flag between them, and ticks once per full interval.
async fn run_scheduler(
    shutdown: Arc<AtomicBool>,
    interval: Duration,
    granularity: Duration,
    on_tick: impl Fn(),
) {
    loop {
        let mut slept = Duration::ZERO;
        while slept < interval {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            tokio::time::sleep(granularity).await;
            slept += granularity;
        }
        if shutdown.load(Ordering::Relaxed) {
            return;
        }
        on_tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn interval_is_two_minutes() {
        assert_eq!(REFRESH_INTERVAL_SECS, 120);
        // The granularity divides the interval, so ticks land on time.
        assert_eq!(REFRESH_INTERVAL_SECS % SLEEP_GRANULARITY_SECS, 0);
    }

    #[test]
    fn shutdown_sets_the_flag() {
        let handle = RefreshHandle {
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
        };
        assert!(!handle.is_shutdown());
        handle.shutdown();
        assert!(handle.is_shutdown());
    }

    #[tokio::test]
    async fn scheduler_ticks_until_shut_down() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU32::new(0));

        let flag = shutdown.clone();
        let counter = ticks.clone();
        let task = tokio::spawn(run_scheduler(
            flag,
            Duration::from_millis(20),
            Duration::from_millis(5),
            move || {
                counter.fetch_add(1, Ordering::Relaxed);
            },
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(ticks.load(Ordering::Relaxed) >= 2, "scheduler should have ticked");

        shutdown.store(true, Ordering::Relaxed);
        task.await.unwrap();
        let after_shutdown = ticks.load(Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(
            ticks.load(Ordering::Relaxed),
            after_shutdown,
            "no ticks may land after shutdown"
        );
    }

    #[tokio::test]
    async fn dropping_the_handle_aborts_the_task() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let abort_probe = task.abort_handle();

        let handle = RefreshHandle {
            shutdown: shutdown.clone(),
            handle: Some(task),
        };
        drop(handle);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(shutdown.load(Ordering::Relaxed));
        assert!(abort_probe.is_finished(), "task must not outlive the handle");
    }
}
