//! Error types returned while creating or reloading a [`DoubleBuffer`][crate::double_buffer::DoubleBuffer].

use crate::config::MonitorKind;

/// Alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error returned by [`SwitchMonitor::init`][crate::monitor::SwitchMonitor::init] when the
/// monitor's parameter does not satisfy its precondition.
#[derive(thiserror::Error, Debug)]
pub enum MonitorError {
    #[error("Invalid configuration for monitor `{kind}`: {reason}")]
    InvalidMonitorConfig { kind: MonitorKind, reason: String },
}

/// Error returned when a double buffer could not be created or a reload could not be applied.
///
/// Errors from [`DoubleBuffer::new`][crate::double_buffer::DoubleBuffer::new] are fatal, no
/// container exists afterwards. [`Error::BuildFailed`] from a reload is recoverable: the
/// previously published payload keeps serving reads and the change will be retried.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid reload config: {0}")]
    InvalidConfig(String),
    #[error("No switch monitor can be created for monitor kind `{0}`")]
    MonitorCreationFailed(MonitorKind),
    #[error("Switch monitor for double buffer `{name}` failed to initialize")]
    MonitorInitFailed {
        name: String,
        #[source]
        source: MonitorError,
    },
    #[error("Building a new payload for double buffer `{name}` failed")]
    BuildFailed {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Failed to spawn the reload thread for double buffer `{name}`")]
    SpawnFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
