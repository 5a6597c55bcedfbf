//! Read-only projection of a billable session as the remote table API reports it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_timestamp, TimerInputError};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Raw timer inputs, field-for-field what a parent view passes down.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerProps {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub pause_time: Option<String>,
    #[serde(default)]
    pub pause_minutes: Option<f64>,
    #[serde(default, alias = "isOccupied")]
    pub running: bool,
}

impl TimerProps {
    pub fn running_since(start_time: impl Into<String>) -> Self {
        Self {
            start_time: Some(start_time.into()),
            running: true,
            ..Self::default()
        }
    }
}

/// One table's timer inputs, as listed on the table-status board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableBinding {
    pub table_id: String,
    #[serde(flatten)]
    pub props: TimerProps,
}

/// Validated session timestamps. `pause_secs` is never negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub pause_secs: i64,
    pub running: bool,
}

impl SessionWindow {
    /// Only `startTime` is mandatory. Bad optional fields are dropped with a
    /// warning so a typo in `endTime` can't blank a live table.
    pub fn from_props(props: &TimerProps) -> Result<Self, TimerInputError> {
        let raw_start = props
            .start_time
            .as_deref()
            .ok_or(TimerInputError::MissingStartTime)?;
        let start = parse_timestamp(raw_start, "startTime")?;

        let end = optional_timestamp(props.end_time.as_deref(), "endTime");
        let paused_at = optional_timestamp(props.pause_time.as_deref(), "pauseTime");

        Ok(Self {
            start,
            end,
            paused_at,
            pause_secs: pause_minutes_to_secs(props.pause_minutes),
            running: props.running,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// A closed session never ticks, whatever `running` says.
    pub fn should_tick(&self) -> bool {
        self.running && !self.is_closed()
    }
}

fn optional_timestamp(raw: Option<&str>, field: &'static str) -> Option<DateTime<Utc>> {
    match raw.map(|value| parse_timestamp(value, field)) {
        Some(Ok(parsed)) => Some(parsed),
        Some(Err(err)) => {
            log_warn!("ignoring {field}: {err}");
            None
        }
        None => None,
    }
}

fn pause_minutes_to_secs(minutes: Option<f64>) -> i64 {
    match minutes {
        None => 0,
        Some(value) if value.is_finite() && value >= 0.0 => (value * 60.0).round() as i64,
        Some(value) => {
            log_warn!("pauseMinutes {value} is not a usable duration; treating as 0");
            0
        }
    }
}
