//! # faultscope - Fatal-Signal Diagnostics
//!
//! faultscope intercepts unrecoverable faults (SIGSEGV, SIGFPE, SIGILL),
//! captures the call stack of the faulting thread, resolves each frame to a
//! symbol and source location, prints a diagnostic report through the host
//! application's error sink, and then aborts so the OS keeps the original
//! fault semantics (core dump, signal-reflecting exit status).
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Host Application                      │
//! │   host registry: executable path · main loop · config     │
//! └───────────────┬────────────────────────────────────────────┘
//!                 │ fatal signal (OS)
//!                 ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                 Fatal-Signal Routine (handler)             │
//! │                                                            │
//! │  ┌──────────┐   ┌───────────────┐   ┌──────────────┐      │
//! │  │ Capture  │──▶│ Symbolization │──▶│    Report    │      │
//! │  │ (stack)  │   │ demangle +    │   │  (bounded    │      │
//! │  └──────────┘   │ addr2line     │   │   formatter) │      │
//! │                 └───────────────┘   └──────┬───────┘      │
//! │                                            │ error sink    │
//! └────────────────────────────────────────────┼───────────────┘
//!                                              ▼
//!                                        stderr · abort()
//! ```
//!
//! ## Module Structure
//!
//! - [`handler`]: signal registration lifecycle and the crash routine
//!   - `CrashHandler::initialize()` / `disable()` are the only paths that
//!     touch the OS signal table; `Drop` disables
//! - [`capture`]: bounded raw stack capture (`backtrace(3)`) and dynamic
//!   symbol lookup (`dladdr(3)`); fixed 256-frame buffer, no heap
//! - [`symbolization`]: demangling (`rustc-demangle`) and address-to-line
//!   resolution via an external `addr2line` subprocess, with PIE rebasing
//! - [`report`]: crash report assembly and emission through the host's
//!   line sink, every line built in a fixed-capacity buffer
//! - [`host`]: collaborator contracts (application, main loop, config,
//!   version) and the process-wide registry the routine reads
//! - [`preflight`]: install-time checks run in normal context (binary,
//!   debug info, tool presence, PIE range)
//! - [`domain`]: core types (`FatalSignal`, `ResolvedFrame`, errors)
//! - [`cli`]: arguments for the crash-test harness binary
//!
//! ## Typical Usage
//!
//! ```rust,no_run
//! use faultscope::host::{self, HostContext, ProcessHost};
//! use faultscope::{CrashHandler, VersionInfo};
//! use std::sync::Arc;
//!
//! host::register(HostContext {
//!     app: Arc::new(ProcessHost::new()),
//!     config: None,
//!     version: VersionInfo::from_build(),
//! })
//! .expect("first registration");
//!
//! let mut handler = CrashHandler::new();
//! handler.initialize();
//! // ... run the application; on SIGSEGV/SIGFPE/SIGILL a report is
//! // printed and the process aborts ...
//! handler.disable();
//! ```
//!
//! ## Signal-Context Constraints
//!
//! The routine runs with the heap and most runtime services in unknown
//! state, so everything on its path is defensive: fixed-capacity buffers,
//! explicit length checks, best-effort per-frame degradation, and a
//! first-crash-only guard. The one deliberately blocking step is the
//! per-frame `addr2line` subprocess — the process is already terminating,
//! so completeness wins over speed.
//!
//! Capture requires a glibc Linux target; without the default `capture`
//! feature the lifecycle calls are complete no-ops.

pub mod capture;
pub mod cli;
pub mod domain;
pub mod handler;
pub mod host;
pub mod preflight;
pub mod report;
pub mod symbolization;

pub use domain::{FatalSignal, FrameAddress, ResolvedFrame, VersionInfo, MAX_FRAMES};
pub use handler::CrashHandler;
pub use host::{ConfigSource, HostApplication, HostContext, MainLoop, CRASH_MESSAGE_KEY};
pub use report::CrashReport;
