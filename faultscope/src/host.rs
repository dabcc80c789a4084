//! Host-application collaborators the crash routine reports through.
//!
//! The subsystem does not own an application model. The host registers a
//! [`HostContext`] once, before `initialize()`; the fatal-signal routine
//! reads it back without locking. An unregistered host means there is
//! nothing safe to report and the routine aborts immediately.

use crate::domain::errors::HostError;
use crate::domain::{FatalSignal, VersionInfo};
use std::collections::HashMap;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Receives the single pre-termination crash notification.
///
/// Delivered synchronously on the faulting thread, before any report
/// output. A panic out of the implementation is caught and swallowed.
pub trait MainLoop: Send + Sync {
    fn notify_crash(&self, signal: FatalSignal);
}

/// The application this subsystem reports on behalf of.
pub trait HostApplication: Send + Sync {
    /// Path handed to the line-number tool. `None` degrades every frame to
    /// symbol-only.
    fn executable_path(&self) -> Option<PathBuf>;

    /// The registered main loop, if the host has one.
    fn main_loop(&self) -> Option<Arc<dyn MainLoop>>;

    /// Write one pre-formatted diagnostic line to the error stream.
    fn print_error(&self, line: &str);
}

/// Keyed configuration lookup.
pub trait ConfigSource: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
}

/// Well-known key for the user-facing crash message.
pub const CRASH_MESSAGE_KEY: &str = "debug/crash_handler/message";

/// Everything the fatal-signal routine needs from the outside world.
pub struct HostContext {
    pub app: Arc<dyn HostApplication>,
    pub config: Option<Arc<dyn ConfigSource>>,
    pub version: VersionInfo,
}

static HOST: OnceLock<HostContext> = OnceLock::new();

/// Register the host context. One registration per process.
///
/// # Errors
/// Returns an error when a context was already registered.
pub fn register(ctx: HostContext) -> Result<(), HostError> {
    HOST.set(ctx).map_err(|_| HostError::AlreadyRegistered)
}

/// The registered context, if any. Safe to call from signal context.
#[must_use]
pub fn current() -> Option<&'static HostContext> {
    HOST.get()
}

/// Host backed by the current process: executable from
/// [`std::env::current_exe`], diagnostics to stderr.
#[derive(Default)]
pub struct ProcessHost {
    main_loop: Option<Arc<dyn MainLoop>>,
}

impl ProcessHost {
    #[must_use]
    pub fn new() -> Self {
        Self { main_loop: None }
    }

    #[must_use]
    pub fn with_main_loop(mut self, main_loop: Arc<dyn MainLoop>) -> Self {
        self.main_loop = Some(main_loop);
        self
    }
}

impl HostApplication for ProcessHost {
    fn executable_path(&self) -> Option<PathBuf> {
        std::env::current_exe().ok()
    }

    fn main_loop(&self) -> Option<Arc<dyn MainLoop>> {
        self.main_loop.clone()
    }

    fn print_error(&self, line: &str) {
        // stderr is unbuffered, so lines already written survive a second
        // fault later in the handler; write errors are swallowed
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }
}

/// In-memory key/value configuration, for embedding hosts and tests.
#[derive(Default)]
pub struct StaticConfig {
    entries: HashMap<String, String>,
}

impl StaticConfig {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.entries.insert(key.into(), value.into());
    }
}

impl ConfigSource for StaticConfig {
    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}
