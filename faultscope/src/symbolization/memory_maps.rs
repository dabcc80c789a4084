//! Memory map parsing for PIE load-bias discovery.
//!
//! Reads `/proc/self/maps` to find where the kernel placed the executable
//! in this process's address space. The range start is the rebase applied
//! to runtime addresses before line-number resolution.

use crate::domain::errors::PreflightError;
use std::fs;
use std::path::Path;

/// Memory range a binary occupies in the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRange {
    pub start: u64,
    pub end: u64,
}

impl MemoryRange {
    /// Check if an address falls within this memory range.
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }
}

/// Find the memory range the given binary occupies in this process.
///
/// Scans every mapping whose pathname matches `binary_path` and returns the
/// minimum start to maximum end across them, covering all of the
/// executable's load segments.
///
/// # Errors
/// Returns an error if `/proc/self/maps` cannot be read or no mapping
/// matches the binary.
pub fn own_executable_range(binary_path: &Path) -> Result<MemoryRange, PreflightError> {
    let maps = fs::read_to_string("/proc/self/maps")?;
    range_in_maps(&maps, binary_path)
}

fn range_in_maps(maps: &str, binary_path: &Path) -> Result<MemoryRange, PreflightError> {
    let wanted = binary_path.to_string_lossy();
    let mut start_addr: Option<u64> = None;
    let mut end_addr: Option<u64> = None;

    // Each line: "start-end perms offset dev inode pathname"
    for line in maps.lines() {
        let mut parts = line.split_whitespace();
        let Some(range) = parts.next() else { continue };
        let Some(pathname) = parts.nth(4) else { continue };
        if pathname != wanted {
            continue;
        }
        let Some((start, end)) = parse_range(range) else { continue };
        start_addr = Some(start_addr.map_or(start, |s| s.min(start)));
        end_addr = Some(end_addr.map_or(end, |e| e.max(end)));
    }

    match (start_addr, end_addr) {
        (Some(start), Some(end)) => Ok(MemoryRange { start, end }),
        _ => Err(PreflightError::NoMemoryRange { binary: wanted.into_owned() }),
    }
}

fn parse_range(range: &str) -> Option<(u64, u64)> {
    let (start, end) = range.split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPS: &str = "\
55d07b40c000-55d07b412000 r--p 00000000 103:02 9700402 /usr/bin/app
55d07b412000-55d07b5b4000 r-xp 00006000 103:02 9700402 /usr/bin/app
55d07b5b4000-55d07b601000 r--p 001a8000 103:02 9700402 /usr/bin/app
7f1c38a00000-7f1c38a22000 r-xp 00000000 103:02 42 /usr/lib/libc.so.6
7ffd12345000-7ffd12367000 rw-p 00000000 00:00 0 [stack]
";

    #[test]
    fn test_memory_range_contains() {
        let range = MemoryRange { start: 0x1000, end: 0x2000 };

        assert!(range.contains(0x1000));
        assert!(range.contains(0x1FFF));
        assert!(!range.contains(0x0FFF));
        assert!(!range.contains(0x2000));
    }

    #[test]
    fn test_range_spans_all_mappings() {
        let range = range_in_maps(MAPS, Path::new("/usr/bin/app")).unwrap();
        assert_eq!(range.start, 0x55d0_7b40_c000);
        assert_eq!(range.end, 0x55d0_7b60_1000);
    }

    #[test]
    fn test_unmatched_binary_is_error() {
        let err = range_in_maps(MAPS, Path::new("/usr/bin/other")).unwrap_err();
        assert!(matches!(err, PreflightError::NoMemoryRange { .. }));
    }

    #[test]
    fn test_own_maps_contain_current_exe() {
        let exe = std::env::current_exe().expect("current exe");
        // May legitimately fail in exotic test environments; when it
        // succeeds the range must be non-empty
        if let Ok(range) = own_executable_range(&exe) {
            assert!(range.start < range.end);
        }
    }
}
