//! # Switch Monitors
//!
//! A [`SwitchMonitor`] decides whether a reload attempt should actually rebuild and replace the
//! buffered payload. Keeping that decision separate from the reload itself lets the container skip
//! expensive rebuilds when nothing changed, and lets new trigger policies be added without touching
//! the container.
//!
//! The protocol between the container and its monitor is:
//!
//! 1. [`init`][SwitchMonitor::init] once, when the container is created.
//! 2. [`should_switch`][SwitchMonitor::should_switch] on every reload attempt.
//! 3. [`done_switch`][SwitchMonitor::done_switch] only after a payload built from the detected
//!    change has been published. A failed build never calls it, so the same change is reported again
//!    on the next attempt.
//!
//! Built-in monitors are selected through [`MonitorKind`] and created by [`create_monitor`]. Custom
//! policies (a network signal, a manual flag...) implement the trait and are handed to
//! [`DoubleBuffer::with_monitor`][crate::double_buffer::DoubleBuffer::with_monitor].
//!
//! ```rust
//! # use std::sync::{atomic::{AtomicBool, Ordering}, Arc};
//! # use bistable::{config::ReloadConfig, error::MonitorError, monitor::SwitchMonitor};
//! /// Reloads whenever an operator raised the flag.
//! struct ManualFlag {
//!     raised: Arc<AtomicBool>,
//! }
//!
//! impl SwitchMonitor for ManualFlag {
//!     fn init(&mut self, _config: &ReloadConfig) -> Result<(), MonitorError> {
//!         Ok(())
//!     }
//!
//!     fn should_switch(&mut self) -> bool {
//!         self.raised.load(Ordering::Acquire)
//!     }
//!
//!     fn done_switch(&mut self) {
//!         self.raised.store(false, Ordering::Release);
//!     }
//! }
//! ```

use crate::{
    config::{MonitorKind, ReloadConfig},
    error::{Error, MonitorError, Result},
};

pub use file::FileModTimeMonitor;

pub mod file;

/// Policy deciding whether a reload should replace the buffered payload.
///
/// Monitors are only ever called from the reload path, one call at a time, so they may keep plain
/// mutable state.
pub trait SwitchMonitor: Send {
    /// Validate the monitor specific part of `config`.
    fn init(&mut self, config: &ReloadConfig) -> Result<(), MonitorError>;

    /// Whether there is a change that hasn't been accepted yet. Must keep answering `true` for the
    /// same change until [`done_switch`][SwitchMonitor::done_switch] is called.
    fn should_switch(&mut self) -> bool;

    /// Accept the change most recently reported by [`should_switch`][SwitchMonitor::should_switch].
    /// Calling it with nothing pending must be harmless.
    fn done_switch(&mut self);
}

/// Monitor that reports a change on every probe. Turns an internally driven container into an
/// unconditional periodic reload.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysMonitor;

impl SwitchMonitor for AlwaysMonitor {
    fn init(&mut self, _config: &ReloadConfig) -> Result<(), MonitorError> {
        Ok(())
    }

    fn should_switch(&mut self) -> bool {
        true
    }

    fn done_switch(&mut self) {}
}

/// Creates the built-in monitor selected by `config.monitor_kind`. The monitor is returned
/// uninitialized.
pub fn create_monitor(config: &ReloadConfig) -> Result<Box<dyn SwitchMonitor>> {
    match config.monitor_kind {
        MonitorKind::FileModTime => Ok(Box::new(FileModTimeMonitor::default())),
        MonitorKind::Always => Ok(Box::new(AlwaysMonitor)),
        MonitorKind::Unknown => Err(Error::MonitorCreationFailed(config.monitor_kind)),
    }
}
