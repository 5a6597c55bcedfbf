use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::timer::CursorMode;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const SETTINGS_ENV: &str = "LOUNGE_TIMER_SETTINGS";
pub const DEFAULT_SETTINGS_FILE: &str = "lounge-timer.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    pub cursor_mode: CursorMode,
    /// Shown instead of `HH:MM:SS` when no valid session is bound.
    pub placeholder: String,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            cursor_mode: CursorMode::FixedStep,
            placeholder: "--:--:--".into(),
        }
    }
}

/// Settings file path from the environment, or the default next to the cwd.
pub fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<TimerSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!(
                    "settings in {} are malformed ({err}); using defaults",
                    path.display()
                );
                TimerSettings::default()
            })
        } else {
            TimerSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> TimerSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: TimerSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: TimerSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &TimerSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, TimerSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TimerSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
