#![allow(dead_code)]

use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
};

use bistable::{config::ReloadConfig, error::MonitorError, monitor::SwitchMonitor, Payload};

/// Knobs shared between a test and the payloads built from it.
#[derive(Default)]
pub struct Script {
    builds: AtomicU32,
    fail: AtomicBool,
    panic_once: AtomicBool,
}

impl Script {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_builds(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Makes the next build panic inside `init`.
    pub fn panic_next_build(&self) {
        self.panic_once.store(true, Ordering::SeqCst);
    }

    pub fn builds(&self) -> u32 {
        self.builds.load(Ordering::SeqCst)
    }
}

/// Payload numbered by build order. `doubled` is filled in by `init`, so a reader that sees
/// `doubled != generation * 2` observed a payload that wasn't fully built.
pub struct Numbered {
    script: Arc<Script>,
    pub generation: u32,
    pub doubled: u64,
}

impl Payload for Numbered {
    type Args = Arc<Script>;
    type Error = io::Error;

    fn construct(args: &Arc<Script>) -> Self {
        Numbered {
            script: args.clone(),
            generation: 0,
            doubled: 0,
        }
    }

    fn init(&mut self) -> Result<(), io::Error> {
        if self.script.panic_once.swap(false, Ordering::SeqCst) {
            panic!("scripted build panic");
        }
        if self.script.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("scripted build failure"));
        }

        self.generation = self.script.builds.fetch_add(1, Ordering::SeqCst) + 1;
        self.doubled = u64::from(self.generation) * 2;
        Ok(())
    }
}

impl Numbered {
    pub fn is_complete(&self) -> bool {
        self.generation > 0 && self.doubled == u64::from(self.generation) * 2
    }
}

/// Monitor driven by the test. Reports a change while `changed` is raised and counts accepted
/// changes.
#[derive(Clone, Default)]
pub struct FlagMonitor {
    pub changed: Arc<AtomicBool>,
    pub accepted: Arc<AtomicU32>,
    pub probes: Arc<AtomicU32>,
}

impl FlagMonitor {
    pub fn raise(&self) {
        self.changed.store(true, Ordering::SeqCst);
    }

    pub fn accepted(&self) -> u32 {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }
}

impl SwitchMonitor for FlagMonitor {
    fn init(&mut self, _config: &ReloadConfig) -> Result<(), MonitorError> {
        Ok(())
    }

    fn should_switch(&mut self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.changed.load(Ordering::SeqCst)
    }

    fn done_switch(&mut self) {
        self.changed.store(false, Ordering::SeqCst);
        self.accepted.fetch_add(1, Ordering::SeqCst);
    }
}
