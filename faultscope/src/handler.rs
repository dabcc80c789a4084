//! Fatal-signal interception and the crash routine itself.
//!
//! [`CrashHandler`] owns the process-wide registration state; `initialize()`
//! and `disable()` are the only paths that touch the OS signal table, and
//! dropping the handler always disables it.
//!
//! The registered routine runs on the faulting thread, in signal context.
//! Everything it does is bounded and best-effort: one fixed-capacity stack
//! capture, per-frame resolution that degrades field-by-field, report
//! emission through the host's sink, then an unconditional abort so the OS
//! keeps the original fault semantics (core dump, signal-reflecting exit
//! status). It never returns to the faulting code.

#![allow(unsafe_code)] // signal(2) registration is libc FFI

use crate::capture;
use crate::domain::{FatalSignal, FrameAddress, ResolvedFrame, VersionInfo};
use crate::report::CrashReport;
use crate::symbolization::{demangle_symbol, LineResolver};

#[cfg(feature = "capture")]
use crate::capture::RawStack;
#[cfg(feature = "capture")]
use crate::host::{self, CRASH_MESSAGE_KEY};
#[cfg(feature = "capture")]
use crate::preflight;
#[cfg(feature = "capture")]
use crate::report;
#[cfg(feature = "capture")]
use crate::symbolization::{resolver::DEFAULT_TOOL, MemoryRange};
#[cfg(feature = "capture")]
use log::debug;
#[cfg(feature = "capture")]
use std::panic::{catch_unwind, AssertUnwindSafe};
#[cfg(feature = "capture")]
use std::process::abort;
#[cfg(feature = "capture")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "capture")]
use std::sync::OnceLock;

/// Set once the routine starts. A second fault while reporting goes
/// straight to abort instead of recursing through the handler.
#[cfg(feature = "capture")]
static CRASH_IN_PROGRESS: AtomicBool = AtomicBool::new(false);

/// Rebase range for PIE executables, computed at `initialize()` time so the
/// signal routine never parses ELF headers or `/proc` files.
#[cfg(feature = "capture")]
static PIE_RANGE: OnceLock<MemoryRange> = OnceLock::new();

/// Installs and removes the fatal-signal routine.
///
/// Covers SIGSEGV, SIGFPE and SIGILL; no other signals are touched.
pub struct CrashHandler {
    enabled: bool,
}

impl CrashHandler {
    #[must_use]
    pub const fn new() -> Self {
        Self { enabled: false }
    }

    /// Install the routine for the three fatal signals.
    ///
    /// A second call without an intervening [`disable`](Self::disable) is a
    /// no-op, as is the whole method when the `capture` feature is off.
    /// Registration failure is not reported; the OS default fault behavior
    /// is the accepted degraded state.
    pub fn initialize(&mut self) {
        #[cfg(feature = "capture")]
        {
            if self.enabled {
                return;
            }
            if let Some(path) = host::current().and_then(|ctx| ctx.app.executable_path()) {
                if let Some(range) = preflight::run_preflight(&path, DEFAULT_TOOL) {
                    let _ = PIE_RANGE.set(range);
                }
            }
            for signal in FatalSignal::ALL {
                unsafe {
                    libc::signal(signal.raw(), handle_fatal as libc::sighandler_t);
                }
            }
            self.enabled = true;
            debug!("fatal-signal handler installed for SIGSEGV, SIGFPE, SIGILL");
        }
    }

    /// Restore the default disposition for the three signals.
    ///
    /// Safe to call repeatedly; disabling an already-disabled handler is a
    /// no-op.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        #[cfg(feature = "capture")]
        {
            for signal in FatalSignal::ALL {
                unsafe {
                    libc::signal(signal.raw(), libc::SIG_DFL);
                }
            }
            debug!("fatal-signal handler removed");
        }
        self.enabled = false;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Drop for CrashHandler {
    fn drop(&mut self) {
        self.disable();
    }
}

impl Default for CrashHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// The routine registered for the three fatal signals.
#[cfg(feature = "capture")]
extern "C" fn handle_fatal(signo: libc::c_int) {
    if CRASH_IN_PROGRESS.swap(true, Ordering::SeqCst) {
        abort();
    }
    let Some(signal) = FatalSignal::from_raw(signo) else {
        abort();
    };
    // Nothing safe to report without a host
    let Some(ctx) = host::current() else {
        abort();
    };

    let mut stack = RawStack::new();
    stack.capture();

    let executable = ctx.app.executable_path();
    let message =
        ctx.config.as_ref().and_then(|config| config.get_string(CRASH_MESSAGE_KEY));

    // One chance for the host to react before any output. A panic out of
    // the notification must not take down the report.
    if let Some(main_loop) = ctx.app.main_loop() {
        let _ = catch_unwind(AssertUnwindSafe(|| main_loop.notify_crash(signal)));
    }

    let resolver = executable.map(|path| {
        let resolver = LineResolver::new(path);
        match PIE_RANGE.get() {
            Some(range) => resolver.with_pie_range(*range),
            None => resolver,
        }
    });

    let addresses: Vec<FrameAddress> = stack.addresses().collect();
    let report =
        build_report(signal, ctx.version.clone(), message, &addresses, resolver.as_ref());
    report::emit(&report, |line| ctx.app.print_error(line));

    // Pass the fault to the OS
    abort();
}

/// Resolve every captured address after the handler's own frame (index 0)
/// into the final report, preserving capture order.
///
/// Resolution is best-effort per frame: a failed demangle or location
/// lookup degrades that field only and never stops the loop.
#[must_use]
pub fn build_report(
    signal: FatalSignal,
    version: VersionInfo,
    user_message: Option<String>,
    addresses: &[FrameAddress],
    resolver: Option<&LineResolver>,
) -> CrashReport {
    let mut frames = Vec::with_capacity(addresses.len().saturating_sub(1));
    for &address in addresses.iter().skip(1) {
        frames.push(resolve_frame(address, resolver));
    }
    CrashReport { signal, version, user_message, frames }
}

fn resolve_frame(address: FrameAddress, resolver: Option<&LineResolver>) -> ResolvedFrame {
    let raw_symbol = capture::symbol_name(address);
    let demangled_symbol = raw_symbol.as_deref().map(demangle_symbol);
    let location = resolver.and_then(|resolver| resolver.resolve(address));
    ResolvedFrame { address, raw_symbol, demangled_symbol, location }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version() -> VersionInfo {
        VersionInfo { full_name: "faultscope test".to_string(), hash: None }
    }

    #[test]
    fn test_disable_when_disabled_is_noop() {
        let mut handler = CrashHandler::new();
        assert!(!handler.is_enabled());
        handler.disable();
        handler.disable();
        assert!(!handler.is_enabled());
    }

    #[cfg(feature = "capture")]
    #[test]
    fn test_initialize_disable_roundtrip() {
        let mut handler = CrashHandler::new();
        handler.initialize();
        assert!(handler.is_enabled());
        handler.initialize(); // guarded against double registration
        assert!(handler.is_enabled());
        handler.disable();
        assert!(!handler.is_enabled());
        handler.initialize();
        assert!(handler.is_enabled());
        handler.disable();
    }

    #[cfg(feature = "capture")]
    #[test]
    fn test_drop_disables() {
        let mut handler = CrashHandler::new();
        handler.initialize();
        drop(handler); // must restore default dispositions, not panic
    }

    #[test]
    fn test_build_report_skips_handler_frame_and_keeps_order() {
        let addresses = [FrameAddress(0xAAA), FrameAddress(0xBBB), FrameAddress(0xCCC)];
        let report = build_report(FatalSignal::Segv, version(), None, &addresses, None);

        assert_eq!(report.frames.len(), 2);
        assert_eq!(report.frames[0].address, FrameAddress(0xBBB));
        assert_eq!(report.frames[1].address, FrameAddress(0xCCC));
    }

    #[test]
    fn test_build_report_on_empty_capture() {
        let report = build_report(FatalSignal::Ill, version(), None, &[], None);
        assert!(report.frames.is_empty());
    }

    #[test]
    fn test_build_report_without_resolver_leaves_locations_empty() {
        let addresses = [FrameAddress(0x1), FrameAddress(0x2)];
        let report = build_report(FatalSignal::Fpe, version(), None, &addresses, None);
        assert_eq!(report.frames[0].location, None);
    }
}
