//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_STATE_DIR: &str = ".dashboard";
pub const DEFAULT_STORAGE_KEY: &str = "dashboard_state";
pub const DEFAULT_REALTIME_POLL_MS: u64 = 5_000;
pub const DEFAULT_REALTIME_PULSE_MS: u64 = 500;
pub const DEFAULT_LOAD_DELAY_MIN_MS: u64 = 500;
pub const DEFAULT_LOAD_DELAY_MAX_MS: u64 = 1_000;
pub const DEFAULT_RUN_SECS: u64 = 30;

/// Timer settings for realtime widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeTimings {
    /// How often a realtime widget pushes simulated progress.
    pub poll_interval: Duration,
    /// How long the "updating" indicator stays lit after a change.
    pub pulse: Duration,
}

impl Default for RealtimeTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_REALTIME_POLL_MS),
            pulse: Duration::from_millis(DEFAULT_REALTIME_PULSE_MS),
        }
    }
}

/// Bounds of the simulated initial fetch, in milliseconds. `max_ms` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LoadDelay {
    /// Build bounds, forcing a non-empty range.
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        let min_ms = min_ms.min(u64::MAX - 1);
        Self { min_ms, max_ms: max_ms.max(min_ms + 1) }
    }
}

impl Default for LoadDelay {
    fn default() -> Self {
        Self::new(DEFAULT_LOAD_DELAY_MIN_MS, DEFAULT_LOAD_DELAY_MAX_MS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub state_dir: PathBuf,
    pub storage_key: String,
    pub realtime: RealtimeTimings,
    pub load_delay: LoadDelay,
    pub run_for: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            realtime: RealtimeTimings::default(),
            load_delay: LoadDelay::default(),
            run_for: Duration::from_secs(DEFAULT_RUN_SECS),
        }
    }
}

impl DashboardConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `DASHBOARD_STATE_DIR`: default `.dashboard`
    /// - `DASHBOARD_STORAGE_KEY`: default `dashboard_state`
    /// - `REALTIME_POLL_MS`: default 5000
    /// - `REALTIME_PULSE_MS`: default 500
    /// - `LOAD_DELAY_MIN_MS` / `LOAD_DELAY_MAX_MS`: default 500 / 1000
    /// - `DASHBOARD_RUN_SECS`: default 30
    #[must_use]
    pub fn from_env() -> Self {
        let state_dir = std::env::var("DASHBOARD_STATE_DIR").map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let storage_key = std::env::var("DASHBOARD_STORAGE_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned());

        Self {
            state_dir,
            storage_key,
            realtime: RealtimeTimings {
                poll_interval: Duration::from_millis(env_parse("REALTIME_POLL_MS", DEFAULT_REALTIME_POLL_MS).max(1)),
                pulse: Duration::from_millis(env_parse("REALTIME_PULSE_MS", DEFAULT_REALTIME_PULSE_MS)),
            },
            load_delay: LoadDelay::new(
                env_parse("LOAD_DELAY_MIN_MS", DEFAULT_LOAD_DELAY_MIN_MS),
                env_parse("LOAD_DELAY_MAX_MS", DEFAULT_LOAD_DELAY_MAX_MS),
            ),
            run_for: Duration::from_secs(env_parse("DASHBOARD_RUN_SECS", DEFAULT_RUN_SECS)),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
