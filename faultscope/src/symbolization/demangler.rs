//! Symbol demangling for backtrace frames.

use rustc_demangle::demangle;

/// Mangled names start with an underscore: `_ZN…` (legacy) or `_R…` (v0).
fn looks_mangled(raw: &str) -> bool {
    raw.starts_with('_')
}

/// Demangle `raw` when it follows the mangled-name convention.
///
/// Returns the human-readable form on success and the input unchanged when
/// demangling is inapplicable or fails. The alternate rendering drops the
/// trailing hash disambiguator.
#[must_use]
pub fn demangle_symbol(raw: &str) -> String {
    if !looks_mangled(raw) {
        return raw.to_string();
    }
    format!("{:#}", demangle(raw))
}
