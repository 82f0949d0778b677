//! Serves the content of a file through a double buffer while the file is edited.
//!
//! ```text
//! echo hello > /tmp/greeting.txt
//! RUST_LOG=debug cargo run -p bistable --example file_content -- /tmp/greeting.txt
//! # in another terminal
//! echo bonjour > /tmp/greeting.txt
//! ```
//!
//! Pass `--external` to drive reloads from an application thread instead of the container's own
//! background loop.

use std::{
    env, fs, io,
    path::PathBuf,
    process::ExitCode,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use bistable::{
    config::{MonitorKind, ReloadConfig},
    double_buffer::DoubleBuffer,
    Payload,
};
use tracing_subscriber::EnvFilter;

static VERSION: AtomicU32 = AtomicU32::new(0);

struct FileContent {
    path: PathBuf,
    version: u32,
    detail: String,
}

impl Payload for FileContent {
    type Args = PathBuf;
    type Error = io::Error;

    fn construct(path: &PathBuf) -> Self {
        FileContent {
            path: path.clone(),
            version: 0,
            detail: String::new(),
        }
    }

    fn init(&mut self) -> Result<(), io::Error> {
        self.detail = fs::read_to_string(&self.path)?;
        self.version = VERSION.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(())
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: file_content <path> [--external]");
        return ExitCode::FAILURE;
    };
    let external = args.any(|arg| arg == "--external");

    let config = if external {
        ReloadConfig::externally_driven(MonitorKind::FileModTime, Duration::from_secs(1))
    } else {
        ReloadConfig::internally_driven(
            MonitorKind::FileModTime,
            Duration::from_secs(2),
            Duration::from_secs(1),
        )
    }
    .with_monitor_param(path.to_string_lossy());

    let buffer = match DoubleBuffer::<FileContent>::new("file_content", config, path) {
        Ok(buffer) => Arc::new(buffer),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize file double buffer");
            return ExitCode::FAILURE;
        }
    };

    if external {
        let buffer = buffer.clone();
        thread::spawn(move || loop {
            thread::sleep(Duration::from_secs(2));
            if let Err(e) = buffer.reload() {
                tracing::warn!(error = %e, "Explicit reload failed");
            }
        });
    }

    for round in 0..60 {
        let content = buffer.buffer();

        if round % 20 == 0 {
            // Hold a snapshot well past the grace period
            let held = content.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_secs(5));
                tracing::info!(version = held.version, detail = %held.detail.trim(), "Held snapshot still readable");
            });
        }

        tracing::info!(version = content.version, detail = %content.detail.trim(), "Read snapshot");
        thread::sleep(Duration::from_millis(500));
    }

    ExitCode::SUCCESS
}
