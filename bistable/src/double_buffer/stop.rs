use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Cooperative, one-way stop flag whose waits can be cut short by [`StopSignal::trigger`].
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    pub(crate) fn trigger(&self) {
        *self.stopped.lock() = true;
        self.condvar.notify_all();
    }

    /// Sleeps for `timeout` or until triggered, whichever comes first. Returns whether the signal
    /// was triggered.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if !*stopped && !timeout.is_zero() {
            self.condvar
                .wait_while_for(&mut stopped, |stopped| !*stopped, timeout);
        }
        *stopped
    }
}
