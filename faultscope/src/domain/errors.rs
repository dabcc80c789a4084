//! Structured error types for faultscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Only the pre-install path surfaces errors; the crash routine itself
//! degrades silently or terminates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Binary not found: {0}")]
    BinaryNotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Failed to parse {path} as an object file: {reason}")]
    ObjectParseFailed { path: String, reason: String },

    #[error("Line-number tool '{0}' not found on PATH")]
    ResolverMissing(String),

    #[error("No mapping for {binary} in /proc/self/maps")]
    NoMemoryRange { binary: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("A host context is already registered for this process")]
    AlreadyRegistered,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_error_display() {
        let err = PreflightError::BinaryNotFound("/tmp/missing".to_string());
        assert_eq!(err.to_string(), "Binary not found: /tmp/missing");
    }

    #[test]
    fn test_resolver_missing_display() {
        let err = PreflightError::ResolverMissing("addr2line".to_string());
        assert!(err.to_string().contains("addr2line"));
    }

    #[test]
    fn test_host_error_display() {
        let err = HostError::AlreadyRegistered;
        assert!(err.to_string().contains("already registered"));
    }
}
