//! Monitor that tracks the modification time of a file.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::{
    config::{MonitorKind, ReloadConfig},
    error::MonitorError,
    monitor::SwitchMonitor,
};

/// Reports a change whenever the target file's modification time is strictly newer than the last
/// accepted one.
///
/// Nothing has been accepted initially, so the first probe after [`init`][SwitchMonitor::init]
/// always reports a change. A file that can't be stat'ed while polling is treated as unchanged, only
/// a missing file at `init` time is an error.
#[derive(Debug, Default)]
pub struct FileModTimeMonitor {
    path: PathBuf,
    last_accepted: Option<SystemTime>,
    pending: Option<SystemTime>,
}

impl FileModTimeMonitor {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time committed by the last [`done_switch`][SwitchMonitor::done_switch].
    pub fn last_accepted(&self) -> Option<SystemTime> {
        self.last_accepted
    }

    fn modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.path)?.modified()
    }
}

impl SwitchMonitor for FileModTimeMonitor {
    fn init(&mut self, config: &ReloadConfig) -> Result<(), MonitorError> {
        let invalid = |reason: String| MonitorError::InvalidMonitorConfig {
            kind: MonitorKind::FileModTime,
            reason,
        };

        let path = match config.monitor_param.as_deref() {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => return Err(invalid("monitor_param must name the file to watch".to_string())),
        };

        fs::metadata(&path)
            .map_err(|e| invalid(format!("failed to stat `{}`: {e}", path.display())))?;

        self.path = path;
        Ok(())
    }

    fn should_switch(&mut self) -> bool {
        let modified = match self.modified() {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to stat watched file, assuming unchanged");
                return false;
            }
        };

        match self.last_accepted {
            Some(last_accepted) if modified <= last_accepted => false,
            _ => {
                self.pending = Some(modified);
                true
            }
        }
    }

    fn done_switch(&mut self) {
        if self.pending.is_some() {
            self.last_accepted = self.pending;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        time::{Duration, UNIX_EPOCH},
    };

    use super::*;

    fn config_for(path: &Path) -> ReloadConfig {
        ReloadConfig::externally_driven(MonitorKind::FileModTime, Duration::ZERO)
            .with_monitor_param(path.to_string_lossy())
    }

    fn set_mtime(path: &Path, secs: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn missing_param_is_invalid() {
        let config = ReloadConfig::externally_driven(MonitorKind::FileModTime, Duration::ZERO);

        assert!(matches!(
            FileModTimeMonitor::default().init(&config),
            Err(MonitorError::InvalidMonitorConfig { .. })
        ));
        assert!(matches!(
            FileModTimeMonitor::default().init(&config.with_monitor_param("")),
            Err(MonitorError::InvalidMonitorConfig { .. })
        ));
    }

    #[test]
    fn missing_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("does-not-exist"));

        assert!(matches!(
            FileModTimeMonitor::default().init(&config),
            Err(MonitorError::InvalidMonitorConfig {
                kind: MonitorKind::FileModTime,
                ..
            })
        ));
    }

    #[test]
    fn tracks_modification_time() {
        let file = tempfile::NamedTempFile::new().unwrap();
        set_mtime(file.path(), 1_000);

        let mut monitor = FileModTimeMonitor::default();
        monitor.init(&config_for(file.path())).unwrap();

        // Nothing accepted yet
        assert!(monitor.should_switch());
        assert!(monitor.should_switch());
        monitor.done_switch();
        assert_eq!(
            Some(UNIX_EPOCH + Duration::from_secs(1_000)),
            monitor.last_accepted()
        );
        assert!(!monitor.should_switch());

        set_mtime(file.path(), 2_000);
        assert!(monitor.should_switch());
        monitor.done_switch();
        assert!(!monitor.should_switch());

        // Going backwards in time isn't a change
        set_mtime(file.path(), 1_500);
        assert!(!monitor.should_switch());
    }

    #[test]
    fn file_dated_at_the_epoch_still_switches_first() {
        let file = tempfile::NamedTempFile::new().unwrap();
        set_mtime(file.path(), 0);

        let mut monitor = FileModTimeMonitor::default();
        monitor.init(&config_for(file.path())).unwrap();
        assert_eq!(None, monitor.last_accepted());

        assert!(monitor.should_switch());
        monitor.done_switch();
        assert_eq!(Some(UNIX_EPOCH), monitor.last_accepted());
        assert!(!monitor.should_switch());
    }

    #[test]
    fn uncommitted_change_is_reported_again() {
        let file = tempfile::NamedTempFile::new().unwrap();
        set_mtime(file.path(), 1_000);

        let mut monitor = FileModTimeMonitor::default();
        monitor.init(&config_for(file.path())).unwrap();
        monitor.should_switch();
        monitor.done_switch();

        set_mtime(file.path(), 2_000);
        assert!(monitor.should_switch());
        // The reload failed, no done_switch
        assert!(monitor.should_switch());
    }

    #[test]
    fn done_switch_without_pending_change_is_harmless() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut monitor = FileModTimeMonitor::default();
        monitor.init(&config_for(file.path())).unwrap();

        monitor.done_switch();
        assert_eq!(None, monitor.last_accepted());
        assert!(monitor.should_switch());
    }

    #[test]
    fn vanished_file_is_treated_as_unchanged() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let mut monitor = FileModTimeMonitor::default();
        monitor.init(&config_for(&path)).unwrap();
        monitor.should_switch();
        monitor.done_switch();

        drop(file);
        assert!(!monitor.should_switch());
    }
}
