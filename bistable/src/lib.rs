//! Bistable is a small hot-reload crate: it holds a live, immutable snapshot of something expensive
//! to build (parsed configuration, a dictionary, a routing table...) and replaces it atomically
//! while readers keep running against whichever snapshot they already observed. Long running
//! services use it to reload data without stopping traffic and without readers ever taking a lock.
//!
//! - Readers get an [`Arc`][std::sync::Arc] to the live payload with a lock-free load
//! - A failed rebuild never replaces a good payload
//! - Whether a reload is worth doing is decided by a pluggable [`SwitchMonitor`][monitor::SwitchMonitor]
//! - Reloads run on a background thread or are driven by the application
//!
//! # Concepts, Usage, and Examples
//!
//! See the module documentation for each concept:
//!
//! - The container: [`double_buffer`]
//! - Reload settings: [`config`]
//! - Reload triggers: [`monitor`]
//! - Depending on the payload without depending on the container: [`snapshot`]
//!
//! # Caveats
//!
//! The container keeps the superseded payload for a fixed grace period after a swap, it does not
//! track outstanding readers. That only decides when the container lets go of its own reference,
//! readers holding a handle keep the payload alive for as long as they need it. A reader that held
//! a handle across several reloads is therefore still consistent, just stale.
//!
//! There is no versioning or rollback beyond "current" and "previous".

pub mod config;
pub mod double_buffer;
pub mod error;
pub mod monitor;
pub mod snapshot;

pub use bistable_traits::payload::Payload;
pub use config::{MonitorKind, ReloadConfig, ReloadMode};
pub use double_buffer::{DoubleBuffer, ReloadOutcome};
pub use error::{Error, MonitorError, Result};
pub use snapshot::{FixedSource, SharedSnapshotSource, SnapshotSource};
