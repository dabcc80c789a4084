//! Address-to-source-location resolution via an external tool.
//!
//! Shells out to `addr2line` once per frame, synchronously. By the time
//! this runs the process is committed to terminating, so blocking on the
//! subprocess is preferred over speed. Every failure mode — tool missing,
//! non-zero exit, empty output — degrades to `None` for that single frame.

use crate::domain::FrameAddress;
use crate::symbolization::memory_maps::MemoryRange;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// Default line-number tool, looked up on `PATH`.
pub const DEFAULT_TOOL: &str = "addr2line";

/// Resolves instruction addresses to `file:line` strings by invoking an
/// external line-number tool as a subprocess.
pub struct LineResolver {
    tool: OsString,
    executable: PathBuf,
    /// Mapped range of a position-independent executable. Addresses inside
    /// it are rebased to link-time form before the lookup; addresses
    /// outside (shared objects) and all addresses of fixed-address
    /// binaries pass through unchanged.
    pie_range: Option<MemoryRange>,
}

impl LineResolver {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(executable: P) -> Self {
        Self::with_tool(DEFAULT_TOOL, executable)
    }

    /// Use a specific tool binary instead of `addr2line` from `PATH`.
    #[must_use]
    pub fn with_tool<T: Into<OsString>, P: Into<PathBuf>>(tool: T, executable: P) -> Self {
        Self { tool: tool.into(), executable: executable.into(), pie_range: None }
    }

    /// Rebase addresses inside `range` by its start before resolution.
    #[must_use]
    pub fn with_pie_range(mut self, range: MemoryRange) -> Self {
        self.pie_range = Some(range);
        self
    }

    /// Resolve one address to a source-location string.
    ///
    /// A single attempt per frame, no retries. A tool that cannot be
    /// launched, exits non-zero, or prints nothing yields `None`.
    #[must_use]
    pub fn resolve(&self, address: FrameAddress) -> Option<String> {
        let addr = self.rebase(address.0 as u64);

        let output = Command::new(&self.tool)
            .arg(format!("{addr:#x}"))
            .arg("-e")
            .arg(&self.executable)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        // The tool terminates its one-line answer with a newline
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn rebase(&self, addr: u64) -> u64 {
        match self.pie_range {
            Some(range) if range.contains(addr) => addr - range.start,
            _ => addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_degrades_to_none() {
        let resolver = LineResolver::with_tool("/nonexistent/no-such-tool", "/bin/true");
        assert_eq!(resolver.resolve(FrameAddress(0x1000)), None);
    }

    #[test]
    fn test_rebase_inside_range() {
        let resolver = LineResolver::new("/bin/true")
            .with_pie_range(MemoryRange { start: 0x5000_0000, end: 0x5010_0000 });
        assert_eq!(resolver.rebase(0x5000_0780), 0x780);
    }

    #[test]
    fn test_rebase_outside_range_passes_through() {
        let resolver = LineResolver::new("/bin/true")
            .with_pie_range(MemoryRange { start: 0x5000_0000, end: 0x5010_0000 });
        assert_eq!(resolver.rebase(0x7f00_0000_1234), 0x7f00_0000_1234);
    }

    #[test]
    fn test_no_range_passes_through() {
        let resolver = LineResolver::new("/bin/true");
        assert_eq!(resolver.rebase(0x40_1234), 0x40_1234);
    }
}
