//! # Reload Config
//!
//! [`ReloadConfig`] is the immutable description of how a [`DoubleBuffer`][crate::double_buffer::DoubleBuffer]
//! reloads: who drives reloads, which [`SwitchMonitor`][crate::monitor::SwitchMonitor] decides
//! whether a reload is worth doing, how often the background loop polls, and how long the
//! superseded payload is retained after a swap.
//!
//! It can be built in code:
//!
//! ```rust
//! # use std::time::Duration;
//! # use bistable::config::{MonitorKind, ReloadConfig};
//! let config = ReloadConfig::internally_driven(
//!     MonitorKind::FileModTime,
//!     Duration::from_secs(30),
//!     Duration::from_secs(5),
//! )
//! .with_monitor_param("/etc/my-app/routes.txt");
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! Or deserialized with any serde format. Durations are seconds on the wire, with an optional
//! fractional part, and every field falls back to its default:
//!
//! ```rust
//! # use std::time::Duration;
//! # use bistable::config::{MonitorKind, ReloadConfig, ReloadMode};
//! let config: ReloadConfig = serde_json::from_str(r#"{
//!     "mode": "externally_driven",
//!     "grace_period": 2,
//!     "monitor_param": "./dict.txt"
//! }"#).unwrap();
//!
//! assert_eq!(ReloadMode::ExternallyDriven, config.mode);
//! assert_eq!(MonitorKind::FileModTime, config.monitor_kind);
//! assert_eq!(Duration::from_secs(2), config.grace_period);
//! ```

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};

use crate::error::{Error, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Who drives reloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadMode {
    /// The container runs its own background loop that attempts a reload every `poll_interval`.
    #[default]
    InternallyDriven,
    /// Reloads only happen when the application calls
    /// [`DoubleBuffer::reload`][crate::double_buffer::DoubleBuffer::reload].
    ExternallyDriven,
}

/// Selects the built-in [`SwitchMonitor`][crate::monitor::SwitchMonitor] to construct.
///
/// Any unrecognized name deserializes to [`MonitorKind::Unknown`], which is rejected when the
/// container is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorKind {
    /// Reload when the modification time of the file named by `monitor_param` moves forward.
    #[default]
    FileModTime,
    /// Reload on every attempt.
    Always,
    #[serde(other)]
    Unknown,
}

impl MonitorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorKind::FileModTime => "file_mod_time",
            MonitorKind::Always => "always",
            MonitorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ReloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadMode::InternallyDriven => f.write_str("internally_driven"),
            ReloadMode::ExternallyDriven => f.write_str("externally_driven"),
        }
    }
}

/// How a [`DoubleBuffer`][crate::double_buffer::DoubleBuffer] reloads its payload.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    pub mode: ReloadMode,
    pub monitor_kind: MonitorKind,
    /// Delay between two attempts of the background loop. Ignored when externally driven.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub poll_interval: Duration,
    /// How long the superseded payload is retained by the container after a swap.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub grace_period: Duration,
    /// Monitor specific parameter, a file path for [`MonitorKind::FileModTime`].
    pub monitor_param: Option<String>,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            mode: ReloadMode::InternallyDriven,
            monitor_kind: MonitorKind::FileModTime,
            poll_interval: DEFAULT_POLL_INTERVAL,
            grace_period: DEFAULT_GRACE_PERIOD,
            monitor_param: None,
        }
    }
}

impl ReloadConfig {
    pub fn internally_driven(
        monitor_kind: MonitorKind,
        poll_interval: Duration,
        grace_period: Duration,
    ) -> Self {
        Self {
            mode: ReloadMode::InternallyDriven,
            monitor_kind,
            poll_interval,
            grace_period,
            monitor_param: None,
        }
    }

    pub fn externally_driven(monitor_kind: MonitorKind, grace_period: Duration) -> Self {
        Self {
            mode: ReloadMode::ExternallyDriven,
            monitor_kind,
            grace_period,
            ..Self::default()
        }
    }

    pub fn with_monitor_param(mut self, param: impl Into<String>) -> Self {
        self.monitor_param = Some(param.into());
        self
    }

    /// Checks the settings that don't depend on the monitor. Monitor parameters are checked by the
    /// monitor itself when it is initialized.
    pub fn validate(&self) -> Result<()> {
        if self.mode == ReloadMode::InternallyDriven && self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "poll_interval must be greater than zero when internally driven".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for ReloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[mode={}, monitor_kind={}, poll_interval={:?}, grace_period={:?}, monitor_param={}]",
            self.mode,
            self.monitor_kind,
            self.poll_interval,
            self.grace_period,
            self.monitor_param.as_deref().unwrap_or("")
        )
    }
}
