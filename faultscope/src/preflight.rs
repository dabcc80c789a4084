//! Pre-install checks for the crash handler.
//!
//! All of this runs in normal (non-signal) context, from `initialize()`:
//! anything that needs file I/O, ELF parsing, or heap allocation happens
//! here, never in the fatal-signal routine. A failed check downgrades the
//! eventual report (addresses instead of symbols, empty locations) and is
//! logged; it never blocks installation.

use crate::domain::errors::PreflightError;
use crate::symbolization::{own_executable_range, MemoryRange};
use log::warn;
use object::{Object, ObjectKind, ObjectSection};
use std::path::Path;
use std::process::{Command, Stdio};

/// Run every pre-install check, downgrading failures to warnings.
///
/// Returns the rebase range when the executable is position independent,
/// `None` otherwise.
#[must_use]
pub fn run_preflight(executable: &Path, tool: &str) -> Option<MemoryRange> {
    if let Err(err) = check_binary(executable) {
        warn!("crash reports degraded, executable unusable: {err}");
        return None;
    }
    if let Err(err) = check_debug_symbols(executable) {
        warn!("could not inspect debug info: {err}");
    }
    if let Err(err) = check_resolver_tool(tool) {
        warn!("source locations will be empty: {err}");
    }
    match pie_range(executable) {
        Ok(range) => range,
        Err(err) => {
            warn!("PIE rebase unavailable, passing raw addresses: {err}");
            None
        }
    }
}

/// Check that the executable exists and is a regular file.
///
/// # Errors
/// Returns an error when the path is missing or not a file.
pub fn check_binary(path: &Path) -> Result<(), PreflightError> {
    if !path.exists() {
        return Err(PreflightError::BinaryNotFound(path.display().to_string()));
    }
    if !path.is_file() {
        return Err(PreflightError::NotAFile(path.display().to_string()));
    }
    Ok(())
}

/// Warn when the binary carries neither DWARF nor a symbol table.
///
/// # Errors
/// Returns an error when the binary cannot be read or parsed; a stripped
/// binary is not an error, only a degradation.
pub fn check_debug_symbols(path: &Path) -> Result<(), PreflightError> {
    let data = std::fs::read(path)?;
    let obj = parse_object(path, &data)?;

    let has_debug_info = obj.section_by_name(".debug_info").is_some_and(|s| s.size() > 0);
    let has_symtab = obj.section_by_name(".symtab").is_some_and(|s| s.size() > 0);

    if !has_debug_info && !has_symtab {
        warn!("binary is stripped, crash frames will show addresses only");
    } else if !has_debug_info {
        warn!("no DWARF debug info, crash frames will lack source locations");
    }
    Ok(())
}

/// Check that the line-number tool can be spawned at all.
///
/// # Errors
/// Returns an error when the tool is absent from `PATH`.
pub fn check_resolver_tool(tool: &str) -> Result<(), PreflightError> {
    Command::new(tool)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|_| ())
        .map_err(|_| PreflightError::ResolverMissing(tool.to_string()))
}

/// The rebase range for a position-independent executable.
///
/// Fixed-address binaries resolve against their runtime addresses directly
/// and yield `None`.
///
/// # Errors
/// Returns an error when the binary cannot be read or parsed, or when a PIE
/// binary has no mapping in `/proc/self/maps`.
pub fn pie_range(path: &Path) -> Result<Option<MemoryRange>, PreflightError> {
    let data = std::fs::read(path)?;
    let obj = parse_object(path, &data)?;
    if obj.kind() != ObjectKind::Dynamic {
        return Ok(None);
    }
    own_executable_range(path).map(Some)
}

fn parse_object<'a>(path: &Path, data: &'a [u8]) -> Result<object::File<'a>, PreflightError> {
    object::File::parse(data).map_err(|err| PreflightError::ObjectParseFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}
