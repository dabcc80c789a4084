//! Core domain types for fatal-signal diagnostics.

use std::borrow::Cow;
use std::fmt;

/// Upper bound on captured return addresses per crash event.
///
/// Stacks deeper than this are silently truncated; truncation is not an
/// error.
pub const MAX_FRAMES: usize = 256;

/// The unrecoverable faults this subsystem intercepts.
///
/// No other signals are touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalSignal {
    /// Invalid memory access (SIGSEGV)
    Segv,
    /// Arithmetic fault such as integer division by zero (SIGFPE)
    Fpe,
    /// Illegal or privileged instruction (SIGILL)
    Ill,
}

impl FatalSignal {
    /// Every signal the handler registers for, in registration order.
    pub const ALL: [FatalSignal; 3] = [FatalSignal::Segv, FatalSignal::Fpe, FatalSignal::Ill];

    /// Map a raw signal number back to the closed set.
    #[must_use]
    pub fn from_raw(signo: i32) -> Option<Self> {
        match signo {
            libc::SIGSEGV => Some(FatalSignal::Segv),
            libc::SIGFPE => Some(FatalSignal::Fpe),
            libc::SIGILL => Some(FatalSignal::Ill),
            _ => None,
        }
    }

    /// The OS signal number.
    #[must_use]
    pub fn raw(self) -> i32 {
        match self {
            FatalSignal::Segv => libc::SIGSEGV,
            FatalSignal::Fpe => libc::SIGFPE,
            FatalSignal::Ill => libc::SIGILL,
        }
    }

    /// Conventional signal name, e.g. `SIGSEGV`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FatalSignal::Segv => "SIGSEGV",
            FatalSignal::Fpe => "SIGFPE",
            FatalSignal::Ill => "SIGILL",
        }
    }
}

impl fmt::Display for FatalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A return address captured from the faulted call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameAddress(pub usize);

impl fmt::Display for FrameAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One crash-report entry derived from a captured address.
///
/// Demangling and location resolution are independent, best-effort fields;
/// absence of either does not fail the overall report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFrame {
    pub address: FrameAddress,
    /// Dynamic-linker symbol covering the address, possibly mangled.
    pub raw_symbol: Option<String>,
    /// Human-readable form of `raw_symbol`; equals it when demangling was
    /// inapplicable.
    pub demangled_symbol: Option<String>,
    /// `file:line` text from the line-number tool.
    pub location: Option<String>,
}

impl ResolvedFrame {
    /// Best name available for display: demangled, then raw, then the bare
    /// address.
    #[must_use]
    pub fn display_name(&self) -> Cow<'_, str> {
        if let Some(name) = &self.demangled_symbol {
            return Cow::Borrowed(name);
        }
        if let Some(name) = &self.raw_symbol {
            return Cow::Borrowed(name);
        }
        Cow::Owned(self.address.to_string())
    }
}

/// Build identity stamped into every crash report.
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub full_name: String,
    pub hash: Option<String>,
}

impl VersionInfo {
    /// Version of this crate as compiled, with the build hash when the
    /// build environment provided one.
    #[must_use]
    pub fn from_build() -> Self {
        Self {
            full_name: concat!("faultscope v", env!("CARGO_PKG_VERSION")).to_string(),
            hash: option_env!("FAULTSCOPE_BUILD_HASH").map(str::to_string),
        }
    }
}
