//! # faultscope - Crash-Test Harness
//!
//! Installs the fatal-signal handler in a disposable process and triggers a
//! chosen fault, so the whole capture → symbolize → report path can be
//! exercised for real:
//!
//! ```bash
//! faultscope --fault segv --message "please attach this backtrace"
//! ```
//!
//! The process is expected to die abnormally; `--dry-run` installs, runs
//! the pre-install checks, disables and exits cleanly instead.

#![allow(unsafe_code)] // deliberately faulting requires unsafe

use anyhow::Result;
use clap::Parser;
use faultscope::cli::{Args, FaultKind};
use faultscope::host::{self, HostContext, ProcessHost, StaticConfig};
use faultscope::{CrashHandler, FatalSignal, MainLoop, VersionInfo, CRASH_MESSAGE_KEY};
use std::sync::Arc;

/// Demonstration main loop: acknowledges the crash notification on stderr
/// before the report is emitted.
struct AckLoop;

impl MainLoop for AckLoop {
    fn notify_crash(&self, signal: FatalSignal) {
        eprintln!("main loop received crash notification ({signal})");
    }
}

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    });
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = StaticConfig::new();
    if let Some(message) = &args.message {
        config.set(CRASH_MESSAGE_KEY, message.clone());
    }

    host::register(HostContext {
        app: Arc::new(ProcessHost::new().with_main_loop(Arc::new(AckLoop))),
        config: Some(Arc::new(config)),
        version: VersionInfo::from_build(),
    })?;

    let mut handler = CrashHandler::new();
    handler.initialize();

    if args.dry_run {
        println!("handler installed; disabling and exiting");
        handler.disable();
        return Ok(());
    }

    trigger(args.fault)
}

/// Deliberately fault. Does not return: the installed routine reports and
/// aborts the process.
fn trigger(fault: FaultKind) -> Result<()> {
    match fault {
        FaultKind::Segv => unsafe {
            std::ptr::write_volatile(std::ptr::null_mut::<u32>(), 0xDEAD);
        },
        FaultKind::Fpe => unsafe {
            libc::raise(libc::SIGFPE);
        },
        FaultKind::Ill => unsafe {
            libc::raise(libc::SIGILL);
        },
    }
    anyhow::bail!("fault did not terminate the process")
}
