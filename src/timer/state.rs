use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{SessionWindow, TimerProps};

use super::format::{billable_seconds, format_hms};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    /// Nothing valid bound; render the placeholder.
    Blank,
    Ticking,
    /// `running` is false; display holds its last value.
    Held,
    /// `endTime` is known; display is pinned to it for good.
    Closed,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Blank
    }
}

impl TimerStatus {
    pub fn is_frozen(self) -> bool {
        matches!(self, TimerStatus::Held | TimerStatus::Closed)
    }
}

/// How the display cursor moves on each tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CursorMode {
    /// Cursor starts at `startTime` and gains exactly one second per tick.
    /// Drifts from real time if ticks are delayed or dropped.
    FixedStep,
    /// Cursor is re-read from the clock on bind and on every tick.
    WallClock,
}

impl Default for CursorMode {
    fn default() -> Self {
        CursorMode::FixedStep
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub session_start: Option<DateTime<Utc>>,
    pub elapsed_secs: Option<i64>,
    pub display: String,
}

#[derive(Debug, Clone, Default)]
pub struct TimerState {
    pub status: TimerStatus,
    pub mode: CursorMode,
    window: Option<SessionWindow>,
    cursor: Option<DateTime<Utc>>,
}

impl TimerState {
    pub fn new(mode: CursorMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn window(&self) -> Option<&SessionWindow> {
        self.window.as_ref()
    }

    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.cursor
    }

    /// Applies a fresh set of props and returns the resulting status.
    ///
    /// A different `startTime` is a different session: the cursor is reset.
    /// A session that was closed stays closed even if later props drop `endTime`.
    pub fn bind(&mut self, props: &TimerProps, now: DateTime<Utc>) -> TimerStatus {
        let window = match SessionWindow::from_props(props) {
            Ok(window) => window,
            Err(err) => {
                log_warn!("timer input rejected, showing placeholder: {err}");
                self.clear();
                return self.status;
            }
        };

        let same_session = self.window.as_ref().map(|bound| bound.start) == Some(window.start);

        if same_session && self.status == TimerStatus::Closed && !window.is_closed() {
            log_warn!(
                "session started at {} was already closed; ignoring props without endTime",
                window.start
            );
            return self.status;
        }

        if !same_session {
            log_debug!("binding session started at {}", window.start);
            self.cursor = Some(match self.mode {
                CursorMode::FixedStep => window.start,
                CursorMode::WallClock => now.max(window.start),
            });
        }

        self.status = if let Some(end) = window.end {
            self.cursor = Some(end);
            if end < window.start {
                log_debug!(
                    "endTime {end} precedes startTime {}; elapsed clamps to zero",
                    window.start
                );
            }
            TimerStatus::Closed
        } else if window.running {
            if self.mode == CursorMode::WallClock {
                self.cursor = Some(now.max(window.start));
            }
            TimerStatus::Ticking
        } else {
            if self.mode == CursorMode::WallClock {
                if let Some(paused_at) = window.paused_at {
                    self.cursor = Some(paused_at.max(window.start));
                }
            }
            TimerStatus::Held
        };

        self.window = Some(window);
        self.status
    }

    /// Advances the cursor if ticking. Returns whether anything moved.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != TimerStatus::Ticking {
            return false;
        }
        let Some(cursor) = self.cursor else {
            return false;
        };

        let next = match self.mode {
            CursorMode::FixedStep => cursor + Duration::seconds(1),
            // Never step backwards if the system clock does.
            CursorMode::WallClock => now.max(cursor),
        };
        self.cursor = Some(next);
        next != cursor
    }

    /// Drops the bound session, e.g. on unmount.
    pub fn clear(&mut self) {
        self.status = TimerStatus::Blank;
        self.window = None;
        self.cursor = None;
    }

    pub fn elapsed_seconds(&self) -> Option<i64> {
        let window = self.window.as_ref()?;
        let cursor = self.cursor?;
        let raw = (cursor - window.start).num_seconds();
        Some(billable_seconds(raw, window.pause_secs))
    }

    pub fn display(&self, placeholder: &str) -> String {
        self.elapsed_seconds()
            .map(format_hms)
            .unwrap_or_else(|| placeholder.to_string())
    }

    pub fn snapshot(&self, placeholder: &str) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            session_start: self.window.as_ref().map(|window| window.start),
            elapsed_secs: self.elapsed_seconds(),
            display: self.display(placeholder),
        }
    }
}
