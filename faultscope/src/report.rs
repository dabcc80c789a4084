//! Crash report assembly and emission.
//!
//! The formatter runs in signal context, so every line is built in a
//! fixed-capacity [`LineBuf`] and handed to the sink as it completes.
//! Formatting never fails: content that does not fit is truncated, not
//! dropped.

use crate::domain::{FatalSignal, ResolvedFrame, VersionInfo};
use std::fmt::{self, Write as _};

/// Hard cap on any single emitted line.
pub const MAX_LINE: usize = 1024;

const SEPARATOR: &str = "================================================================";

/// One crash event's worth of diagnostic data.
///
/// Built once by the fatal-signal routine, consumed immediately by
/// [`emit`], never persisted.
pub struct CrashReport {
    pub signal: FatalSignal,
    pub version: VersionInfo,
    pub user_message: Option<String>,
    pub frames: Vec<ResolvedFrame>,
}

/// Fixed-capacity line buffer.
///
/// Implements [`fmt::Write`] by truncating at a char boundary instead of
/// growing, so `write!` into it cannot fail or allocate.
pub struct LineBuf {
    buf: [u8; MAX_LINE],
    len: usize,
}

impl LineBuf {
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: [0; MAX_LINE], len: 0 }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Writes only ever stop on char boundaries, so this stays UTF-8
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl Default for LineBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Write for LineBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let space = MAX_LINE - self.len;
        let take = if s.len() <= space {
            s.len()
        } else {
            let mut cut = space;
            while cut > 0 && !s.is_char_boundary(cut) {
                cut -= 1;
            }
            cut
        };
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        // Truncation is acceptable, failure is not
        Ok(())
    }
}

/// Emit the report, one line at a time, through `sink`.
///
/// Order: separator, signal header, version line (with the build hash when
/// present), introductory line carrying the optional user message, one
/// `[index] symbol (location)` line per frame with 1-based indices matching
/// capture order, the end-of-backtrace marker, closing separator.
pub fn emit<F: FnMut(&str)>(report: &CrashReport, mut sink: F) {
    let mut line = LineBuf::new();

    sink(SEPARATOR);

    line.clear();
    let _ = write!(
        line,
        "Program crashed with signal {} ({})",
        report.signal.raw(),
        report.signal.name()
    );
    sink(line.as_str());

    line.clear();
    let _ = match &report.version.hash {
        Some(hash) => write!(line, "Version: {} ({hash})", report.version.full_name),
        None => write!(line, "Version: {}", report.version.full_name),
    };
    sink(line.as_str());

    line.clear();
    let _ = write!(
        line,
        "Dumping the backtrace. {}",
        report.user_message.as_deref().unwrap_or_default()
    );
    sink(line.as_str());

    for (index, frame) in report.frames.iter().enumerate() {
        line.clear();
        let _ = write!(
            line,
            "[{}] {} ({})",
            index + 1,
            frame.display_name(),
            frame.location.as_deref().unwrap_or_default()
        );
        sink(line.as_str());
    }

    sink("-- END OF BACKTRACE --");
    sink(SEPARATOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FrameAddress;

    fn frame(addr: usize, symbol: Option<&str>, location: Option<&str>) -> ResolvedFrame {
        ResolvedFrame {
            address: FrameAddress(addr),
            raw_symbol: symbol.map(str::to_string),
            demangled_symbol: symbol.map(str::to_string),
            location: location.map(str::to_string),
        }
    }

    fn collect(report: &CrashReport) -> Vec<String> {
        let mut lines = Vec::new();
        emit(report, |line| lines.push(line.to_string()));
        lines
    }

    #[test]
    fn test_emit_line_sequence() {
        let report = CrashReport {
            signal: FatalSignal::Segv,
            version: VersionInfo {
                full_name: "faultscope v0.1.0".to_string(),
                hash: Some("deadbeef".to_string()),
            },
            user_message: Some("please report this".to_string()),
            frames: vec![
                frame(0xBBB, Some("foo::bar"), Some("file.cc:42")),
                frame(0xCCC, None, None),
            ],
        };
        let lines = collect(&report);

        assert_eq!(lines.len(), 2 + 3 + 2 + 1); // separators, header block, frames, marker
        assert_eq!(lines[0], SEPARATOR);
        assert_eq!(lines[1], "Program crashed with signal 11 (SIGSEGV)");
        assert_eq!(lines[2], "Version: faultscope v0.1.0 (deadbeef)");
        assert_eq!(lines[3], "Dumping the backtrace. please report this");
        assert_eq!(lines[4], "[1] foo::bar (file.cc:42)");
        assert_eq!(lines[5], "[2] 0xccc ()");
        assert_eq!(lines[6], "-- END OF BACKTRACE --");
        assert_eq!(lines[7], SEPARATOR);
    }

    #[test]
    fn test_emit_without_hash_or_message() {
        let report = CrashReport {
            signal: FatalSignal::Fpe,
            version: VersionInfo { full_name: "faultscope v0.1.0".to_string(), hash: None },
            user_message: None,
            frames: vec![frame(0x1, Some("f"), None)],
        };
        let lines = collect(&report);

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "Program crashed with signal 8 (SIGFPE)");
        assert_eq!(lines[2], "Version: faultscope v0.1.0");
        assert_eq!(lines[3], "Dumping the backtrace. ");
        assert_eq!(lines[4], "[1] f ()");
    }

    #[test]
    fn test_linebuf_truncates_at_capacity() {
        let mut line = LineBuf::new();
        let long = "x".repeat(MAX_LINE * 2);
        let _ = write!(line, "{long}");
        assert_eq!(line.as_str().len(), MAX_LINE);
    }

    #[test]
    fn test_linebuf_truncates_on_char_boundary() {
        let mut line = LineBuf::new();
        // 1023 ASCII bytes, then a 3-byte char that cannot fully fit
        let _ = write!(line, "{}", "a".repeat(MAX_LINE - 1));
        let _ = write!(line, "€€");
        assert_eq!(line.as_str().len(), MAX_LINE - 1);
        assert!(line.as_str().is_char_boundary(line.as_str().len()));
    }

    #[test]
    fn test_linebuf_clear_reuses_buffer() {
        let mut line = LineBuf::new();
        let _ = write!(line, "first");
        line.clear();
        let _ = write!(line, "second");
        assert_eq!(line.as_str(), "second");
    }
}
