use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{models::TimerProps, settings::TimerSettings};

use super::{Clock, SystemClock, TimerSnapshot, TimerState, TimerStatus};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Display refresh period. Fixed-step cursors gain exactly this much per tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic refresh task. Dropping it cancels the task.
struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Ticker {
    fn is_live(&self) -> bool {
        !self.cancel_token.is_cancelled() && !self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        self.handle.abort();
    }
}

struct TimerInner {
    state: TimerState,
    ticker: Option<Ticker>,
    display_tx: watch::Sender<TimerSnapshot>,
}

impl TimerInner {
    fn publish(&self, placeholder: &str) -> TimerSnapshot {
        let snapshot = self.state.snapshot(placeholder);
        self.display_tx.send_replace(snapshot.clone());
        snapshot
    }
}

/// One on-screen session timer.
///
/// The ticker is the only thing that moves the cursor between binds, and it
/// is cancelled under the state lock on every transition out of `Ticking`, so
/// no tick can land after a freeze or unmount. The ticker task only keeps a
/// weak handle: dropping the last controller clone stops it too.
#[derive(Clone)]
pub struct TimerController {
    inner: Arc<Mutex<TimerInner>>,
    display_rx: watch::Receiver<TimerSnapshot>,
    clock: Arc<dyn Clock>,
    placeholder: Arc<str>,
}

impl TimerController {
    pub fn new(settings: &TimerSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: &TimerSettings, clock: Arc<dyn Clock>) -> Self {
        let state = TimerState::new(settings.cursor_mode);
        let placeholder: Arc<str> = Arc::from(settings.placeholder.as_str());
        let (display_tx, display_rx) = watch::channel(state.snapshot(&placeholder));

        Self {
            inner: Arc::new(Mutex::new(TimerInner {
                state,
                ticker: None,
                display_tx,
            })),
            display_rx,
            clock,
            placeholder,
        }
    }

    /// Applies new props and starts or stops the ticker to match.
    pub async fn bind(&self, props: TimerProps) -> TimerSnapshot {
        let mut guard = self.inner.lock().await;

        let previous_start = guard.state.window().map(|window| window.start);
        let status = guard.state.bind(&props, self.clock.now());
        let rebound = guard.state.window().map(|window| window.start) != previous_start;

        if status == TimerStatus::Ticking {
            let live = guard.ticker.as_ref().map_or(false, Ticker::is_live);
            if rebound || !live {
                // Replacing drops the old ticker, which cancels it.
                guard.ticker = Some(self.spawn_ticker());
                log_debug!("ticker started, period {:?}", TICK_INTERVAL);
            }
        } else if guard.ticker.take().is_some() {
            log_debug!("ticker stopped on transition to {:?}", status);
        }

        guard.publish(&self.placeholder)
    }

    /// Stops ticking and forgets the bound session.
    pub async fn unmount(&self) {
        let mut guard = self.inner.lock().await;
        if guard.ticker.take().is_some() {
            log_debug!("ticker stopped on unmount");
        }
        guard.state.clear();
        guard.publish(&self.placeholder);
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.display_rx.borrow().clone()
    }

    pub fn display(&self) -> String {
        self.display_rx.borrow().display.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.display_rx.clone()
    }

    pub async fn has_live_ticker(&self) -> bool {
        self.inner
            .lock()
            .await
            .ticker
            .as_ref()
            .map_or(false, Ticker::is_live)
    }

    fn spawn_ticker(&self) -> Ticker {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            Arc::downgrade(&self.inner),
            self.clock.clone(),
            TICK_INTERVAL,
            self.placeholder.clone(),
            cancel_token.clone(),
        ));

        Ticker {
            handle,
            cancel_token,
        }
    }
}

async fn tick_loop(
    inner: Weak<Mutex<TimerInner>>,
    clock: Arc<dyn Clock>,
    period: Duration,
    placeholder: Arc<str>,
    cancel_token: CancellationToken,
) {
    // First tick lands one full period after bind.
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                let mut guard = inner.lock().await;
                if cancel_token.is_cancelled() || guard.state.status != TimerStatus::Ticking {
                    break;
                }
                if guard.state.tick(clock.now()) {
                    guard.publish(&placeholder);
                }
            }
            _ = cancel_token.cancelled() => {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::timer::{clock::manual::ManualClock, CursorMode};

    const START: &str = "2024-01-01T10:00:00Z";

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn controller() -> TimerController {
        TimerController::new(&TimerSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn counts_up_once_per_second() {
        let timer = controller();
        let bound = timer.bind(TimerProps::running_since(START)).await;
        assert_eq!(bound.display, "00:00:00");
        assert_eq!(bound.status, TimerStatus::Ticking);

        time::sleep(Duration::from_millis(125_500)).await;
        assert_eq!(timer.display(), "00:02:05");
        assert!(timer.has_live_ticker().await);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_each_second() {
        let timer = controller();
        let mut rx = timer.subscribe();
        timer.bind(TimerProps::running_since(START)).await;
        rx.borrow_and_update();

        let mut seen = Vec::new();
        for _ in 0..3 {
            rx.changed().await.unwrap();
            seen.push(rx.borrow_and_update().elapsed_secs.unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_running_freezes_and_cancels() {
        let timer = controller();
        timer.bind(TimerProps::running_since(START)).await;
        time::sleep(Duration::from_millis(4_500)).await;

        let held = timer
            .bind(TimerProps {
                running: false,
                ..TimerProps::running_since(START)
            })
            .await;
        assert_eq!(held.status, TimerStatus::Held);
        assert_eq!(held.display, "00:00:04");
        assert!(!timer.has_live_ticker().await);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(timer.display(), "00:00:04");
    }

    #[tokio::test(start_paused = true)]
    async fn end_time_freezes_even_when_running() {
        let timer = controller();
        let closed = timer
            .bind(TimerProps {
                end_time: Some("2024-01-01T11:00:00Z".into()),
                pause_minutes: Some(10.0),
                ..TimerProps::running_since(START)
            })
            .await;
        assert_eq!(closed.status, TimerStatus::Closed);
        assert!(!timer.has_live_ticker().await);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.display(), "00:50:00");
    }

    #[tokio::test(start_paused = true)]
    async fn end_time_arriving_mid_tick_freezes_the_display() {
        let timer = controller();
        timer.bind(TimerProps::running_since(START)).await;
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(timer.display(), "00:00:03");
        assert!(timer.has_live_ticker().await);

        let closed = timer
            .bind(TimerProps {
                end_time: Some("2024-01-01T10:45:30Z".into()),
                pause_minutes: Some(15.0),
                ..TimerProps::running_since(START)
            })
            .await;
        assert_eq!(closed.status, TimerStatus::Closed);
        assert!(!timer.has_live_ticker().await);
        assert_eq!(closed.display, "00:30:30");

        time::sleep(Duration::from_secs(20)).await;
        assert_eq!(timer.display(), "00:30:30");
        assert_eq!(timer.snapshot().elapsed_secs, Some(1830));
    }

    #[tokio::test(start_paused = true)]
    async fn stray_refresh_setting_keeps_one_second_per_second() {
        let settings: TimerSettings =
            serde_json::from_str(r#"{ "tickIntervalMs": 250 }"#).unwrap();
        let timer = TimerController::new(&settings);
        timer.bind(TimerProps::running_since(START)).await;

        time::sleep(Duration::from_millis(10_100)).await;
        assert_eq!(timer.display(), "00:00:10");
    }

    #[tokio::test(start_paused = true)]
    async fn rebinding_a_new_session_resets_to_zero() {
        let timer = controller();
        timer.bind(TimerProps::running_since(START)).await;
        time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(timer.display(), "00:00:09");

        let rebound = timer
            .bind(TimerProps::running_since("2024-01-01T13:00:00Z"))
            .await;
        assert_eq!(rebound.display, "00:00:00");
        assert_eq!(rebound.session_start, Some(at("2024-01-01T13:00:00Z")));

        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(timer.display(), "00:00:02");
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_cancels_and_blanks() {
        let timer = controller();
        timer.bind(TimerProps::running_since(START)).await;
        time::sleep(Duration::from_millis(3_500)).await;

        timer.unmount().await;
        assert!(!timer.has_live_ticker().await);
        assert_eq!(timer.snapshot().status, TimerStatus::Blank);
        assert_eq!(timer.display(), TimerSettings::default().placeholder);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.snapshot().elapsed_secs, None);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_start_shows_placeholder_without_ticking() {
        let timer = controller();
        let snapshot = timer.bind(TimerProps::running_since("")).await;
        assert_eq!(snapshot.status, TimerStatus::Blank);
        assert_eq!(snapshot.display, "--:--:--");
        assert!(!timer.has_live_ticker().await);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_controller_ends_the_ticker() {
        let timer = controller();
        let mut rx = timer.subscribe();
        timer.bind(TimerProps::running_since(START)).await;
        rx.borrow_and_update();
        drop(timer);

        time::sleep(Duration::from_secs(3)).await;
        // Sender went away with the controller state.
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn wall_clock_mode_reads_the_clock() {
        let clock = Arc::new(ManualClock::at(at("2024-01-01T10:30:00Z")));
        let settings = TimerSettings {
            cursor_mode: CursorMode::WallClock,
            ..TimerSettings::default()
        };
        let timer = TimerController::with_clock(&settings, clock.clone());

        let bound = timer.bind(TimerProps::running_since(START)).await;
        assert_eq!(bound.display, "00:30:00");

        // Ticks that find the clock far ahead jump straight to it.
        clock.advance_secs(90);
        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(timer.display(), "00:31:30");
    }
}
