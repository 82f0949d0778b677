//! # Double Buffer
//!
//! [`DoubleBuffer`] holds a live, immutable snapshot of an expensive-to-build [`Payload`] and
//! replaces it atomically while readers keep running against whichever snapshot they already
//! observed.
//!
//! ## Reading
//!
//! [`DoubleBuffer::buffer`] returns an [`Arc`] to the currently published payload. It never blocks,
//! never triggers a reload, and can be called from any number of threads, including while a reload
//! is in progress. The returned handle keeps its payload alive for as long as it is held, regardless
//! of what the container does with its slots afterwards. Get a fresh handle at each transactional
//! boundary (loop iteration, incoming request...) to pick up reloads.
//!
//! ## Reloading
//!
//! The container owns two slots and an atomic index naming the live one. A reload:
//!
//! 1. Asks the [`SwitchMonitor`] whether there is anything to do, stopping here if not.
//! 2. Builds a new payload from the construction arguments. A failed build leaves everything as it
//!    was, and the monitor will report the same change on the next attempt.
//! 3. Stores it in the inactive slot and publishes that slot's index. Every `buffer()` call from this
//!    point on returns the new payload.
//! 4. Accepts the change on the monitor.
//! 5. Waits out the grace period, then drops the container's reference to the previous payload.
//!
//! The grace period is a heuristic: it does not track readers. Readers are still safe past it,
//! because their handle is reference counted, and a reader that loses the race with step 5 simply
//! re-reads the index.
//!
//! With [`ReloadMode::InternallyDriven`] a background thread attempts a reload every
//! `poll_interval`. With [`ReloadMode::ExternallyDriven`] the application calls
//! [`DoubleBuffer::reload`] itself. Either way reloads are serialized, a second caller waits for the
//! first to finish including its grace period.
//!
//! ```rust
//! # use std::{convert::Infallible, sync::atomic::{AtomicU32, Ordering}, time::Duration};
//! # use bistable::{config::{MonitorKind, ReloadConfig}, double_buffer::{DoubleBuffer, ReloadOutcome}, Payload};
//! static BUILDS: AtomicU32 = AtomicU32::new(0);
//!
//! struct Generation(u32);
//!
//! impl Payload for Generation {
//!     type Args = ();
//!     type Error = Infallible;
//!
//!     fn construct(_args: &()) -> Self {
//!         Generation(0)
//!     }
//!
//!     fn init(&mut self) -> Result<(), Infallible> {
//!         self.0 = BUILDS.fetch_add(1, Ordering::SeqCst) + 1;
//!         Ok(())
//!     }
//! }
//!
//! let config = ReloadConfig::externally_driven(MonitorKind::Always, Duration::ZERO);
//! let buffer = DoubleBuffer::<Generation>::new("generations", config, ()).unwrap();
//!
//! let before = buffer.buffer();
//! assert_eq!(1, before.0);
//!
//! assert!(matches!(buffer.reload(), Ok(ReloadOutcome::Swapped { .. })));
//! assert_eq!(2, buffer.buffer().0);
//! // Handles taken before the swap keep observing the old payload
//! assert_eq!(1, before.0);
//! ```

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::{
    config::{ReloadConfig, ReloadMode},
    error::{Error, Result},
    monitor::{create_monitor, SwitchMonitor},
    Payload, SnapshotSource,
};

use stop::StopSignal;

mod stop;

/// Result of a successful [`DoubleBuffer::reload`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The monitor reported no change, nothing was built.
    Unchanged,
    /// A new payload was built and published in slot `active_index`.
    Swapped { active_index: usize },
}

/// Lock-free-for-readers container for a hot-swappable [`Payload`]. See the
/// [module documentation][crate::double_buffer] for details.
pub struct DoubleBuffer<T: Payload> {
    shared: Arc<Shared<T>>,
    reloader: Option<JoinHandle<()>>,
}

impl<T: Payload> DoubleBuffer<T> {
    /// Creates the container and performs the first load.
    ///
    /// The [`SwitchMonitor`] is the built-in one selected by `config.monitor_kind`. `args` are kept
    /// for the life of the container and handed to every build. If `config.mode` is
    /// [`ReloadMode::InternallyDriven`], a background reload thread is started once the first load
    /// succeeded.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config` fails [`ReloadConfig::validate`].
    /// - [`Error::MonitorCreationFailed`] if the monitor kind has no built-in implementation.
    /// - [`Error::MonitorInitFailed`] if the monitor rejects its parameter, e.g. a missing file.
    /// - [`Error::BuildFailed`] if the first payload could not be built.
    /// - [`Error::SpawnFailed`] if the background thread could not be started.
    pub fn new(name: impl Into<String>, config: ReloadConfig, args: T::Args) -> Result<Self> {
        let name = name.into();
        let monitor = create_monitor(&config).inspect_err(|_| {
            tracing::warn!(name = %name, config = %config, "Failed to create switch monitor");
        })?;

        Self::with_monitor(name, config, monitor, args)
    }

    /// Same as [`DoubleBuffer::new`], but with a caller supplied monitor. `config.monitor_kind` is
    /// ignored, the monitor's [`init`][SwitchMonitor::init] still runs against `config`.
    pub fn with_monitor(
        name: impl Into<String>,
        config: ReloadConfig,
        mut monitor: Box<dyn SwitchMonitor>,
        args: T::Args,
    ) -> Result<Self> {
        let name = name.into();
        config.validate()?;

        monitor.init(&config).map_err(|source| {
            tracing::warn!(name = %name, error = %source, "Failed to initialize switch monitor");
            Error::MonitorInitFailed {
                name: name.clone(),
                source,
            }
        })?;

        let shared = Arc::new(Shared {
            name,
            config,
            args,
            slots: [ArcSwapOption::empty(), ArcSwapOption::empty()],
            // Nothing is published yet, the first load lands in slot 0
            active: AtomicUsize::new(1),
            monitor: Mutex::new(monitor),
            stop: StopSignal::default(),
        });

        shared.reload(Trigger::Initial)?;

        let reloader = match shared.config.mode {
            ReloadMode::InternallyDriven => Some(spawn_reloader(shared.clone())?),
            ReloadMode::ExternallyDriven => None,
        };

        tracing::info!(
            name = %shared.name,
            active_index = shared.active_index(),
            config = %shared.config,
            "Double buffer initialized"
        );

        Ok(Self { shared, reloader })
    }

    /// Returns a handle to the currently published payload.
    #[inline]
    pub fn buffer(&self) -> Arc<T> {
        self.shared.current()
    }

    /// Attempts a reload.
    ///
    /// Returns [`ReloadOutcome::Unchanged`] when the monitor reports nothing new. On
    /// [`Error::BuildFailed`] the published payload is untouched and the change stays pending, so the
    /// next attempt retries it. Blocks for the grace period after a swap, and while another reload is
    /// in flight.
    pub fn reload(&self) -> Result<ReloadOutcome> {
        self.shared.reload(Trigger::Probe)
    }

    /// Index of the slot currently served to readers. Diagnostic only.
    pub fn active_index(&self) -> usize {
        self.shared.active_index()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> &ReloadConfig {
        &self.shared.config
    }
}

impl<T: Payload> SnapshotSource<T> for DoubleBuffer<T> {
    fn latest_snapshot(&self) -> Arc<T> {
        self.buffer()
    }
}

impl<T: Payload> Drop for DoubleBuffer<T> {
    fn drop(&mut self) {
        self.shared.stop.trigger();

        if let Some(reloader) = self.reloader.take() {
            if reloader.join().is_err() {
                tracing::error!(name = %self.shared.name, "Reload thread panicked");
            }
        }

        tracing::info!(
            name = %self.shared.name,
            active_index = self.shared.active_index(),
            "Double buffer destroyed"
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    /// First load, builds regardless of what the monitor answers.
    Initial,
    Probe,
}

/// State shared between the container, its readers and the background reloader.
struct Shared<T: Payload> {
    name: String,
    config: ReloadConfig,
    args: T::Args,
    slots: [ArcSwapOption<T>; 2],
    active: AtomicUsize,
    /// Also serializes reloads, it is held for the whole reload.
    monitor: Mutex<Box<dyn SwitchMonitor>>,
    stop: StopSignal,
}

impl<T: Payload> Shared<T> {
    fn active_index(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    fn current(&self) -> Arc<T> {
        loop {
            let index = self.active.load(Ordering::Acquire);
            if let Some(payload) = self.slots[index].load_full() {
                return payload;
            }

            // The slot was cleared after we read a stale index, the index has moved on since.
            std::hint::spin_loop();
        }
    }

    fn build(&self) -> Result<T, T::Error> {
        let mut payload = T::construct(&self.args);
        payload.init()?;
        Ok(payload)
    }

    fn reload(&self, trigger: Trigger) -> Result<ReloadOutcome> {
        let mut monitor = self.monitor.lock();

        // Always probe, so the first load records the monitor's baseline
        let changed = monitor.should_switch();
        if !changed && trigger == Trigger::Probe {
            tracing::debug!(name = %self.name, "No change detected, keeping current payload");
            return Ok(ReloadOutcome::Unchanged);
        }

        let previous = self.active.load(Ordering::Acquire);
        let alternate = 1 - previous;

        let payload = self.build().map_err(|source| {
            tracing::error!(
                name = %self.name,
                active_index = previous,
                error = %source,
                "Failed to build payload"
            );
            Error::BuildFailed {
                name: self.name.clone(),
                source: Box::new(source),
            }
        })?;

        self.slots[alternate].store(Some(Arc::new(payload)));
        self.active.store(alternate, Ordering::Release);
        monitor.done_switch();

        tracing::info!(name = %self.name, active_index = alternate, "Switched to new payload");

        if self.slots[previous].load().is_some() {
            if !self.config.grace_period.is_zero() {
                self.stop.wait(self.config.grace_period);
            }

            if let Some(old) = self.slots[previous].swap(None) {
                tracing::debug!(
                    name = %self.name,
                    outstanding_handles = Arc::strong_count(&old) - 1,
                    "Releasing superseded payload"
                );
            }

            tracing::info!(
                name = %self.name,
                active_index = alternate,
                cleared_index = previous,
                "Cleared superseded payload"
            );
        }

        Ok(ReloadOutcome::Swapped {
            active_index: alternate,
        })
    }

    fn run_reload_loop(&self) {
        tracing::debug!(name = %self.name, poll_interval = ?self.config.poll_interval, "Reload loop started");

        while !self.stop.wait(self.config.poll_interval) {
            // Failures are logged by `reload`, failures and panics are retried on the next tick
            let attempt = panic::catch_unwind(AssertUnwindSafe(|| self.reload(Trigger::Probe)));
            if let Err(panic) = attempt {
                tracing::error!(
                    name = %self.name,
                    panic = panic_message(panic.as_ref()),
                    "Reload panicked, retrying on the next tick"
                );
            }
        }

        tracing::debug!(name = %self.name, "Reload loop stopped");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn spawn_reloader<T: Payload>(shared: Arc<Shared<T>>) -> Result<JoinHandle<()>> {
    let name = shared.name.clone();
    // Thread names can't hold NUL bytes, the container name can
    let thread_name = format!("{}-reload", name.replace('\0', ""));

    thread::Builder::new()
        .name(thread_name)
        .spawn(move || shared.run_reload_loop())
        .map_err(|source| {
            tracing::error!(name = %name, error = %source, "Failed to spawn reload thread");
            Error::SpawnFailed { name, source }
        })
}
