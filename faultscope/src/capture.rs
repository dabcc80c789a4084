//! Raw stack capture inside signal context.
//!
//! Everything here may run on the faulting thread after a fatal signal, so
//! it sticks to a fixed-capacity buffer and libc calls that do not touch
//! the heap. Symbol lookup goes against the dynamic linker's tables for
//! already-loaded objects; no file I/O.

#![allow(unsafe_code)] // backtrace(3) and dladdr(3) are libc FFI

use crate::domain::{FrameAddress, MAX_FRAMES};
use std::ffi::CStr;
use std::os::raw::c_void;

/// Fixed-capacity buffer of captured return addresses.
///
/// Lives on the handler's stack. Stacks deeper than [`MAX_FRAMES`] are
/// silently truncated.
pub struct RawStack {
    buffer: [*mut c_void; MAX_FRAMES],
    depth: usize,
}

impl RawStack {
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: [std::ptr::null_mut(); MAX_FRAMES], depth: 0 }
    }

    /// Unwind the current call stack into the buffer.
    ///
    /// A single bounded, non-growing capture; returns the number of frames
    /// recorded. Index 0 is the caller's own frame — inlining keeps this
    /// wrapper itself out of the captured stack.
    #[inline(always)]
    pub fn capture(&mut self) -> usize {
        // Cast is safe: MAX_FRAMES is far below i32::MAX
        let depth = unsafe { libc::backtrace(self.buffer.as_mut_ptr(), MAX_FRAMES as i32) };
        self.depth = usize::try_from(depth).unwrap_or(0);
        self.depth
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Captured return addresses, innermost first.
    #[must_use]
    pub fn addresses(&self) -> impl Iterator<Item = FrameAddress> + '_ {
        self.buffer[..self.depth].iter().map(|ptr| FrameAddress(*ptr as usize))
    }
}

impl Default for RawStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up the dynamic-linker symbol covering `address`.
///
/// Returns the raw (possibly mangled) name, or `None` when no loaded
/// object's symbol table covers the address.
#[must_use]
pub fn symbol_name(address: FrameAddress) -> Option<String> {
    let mut info = unsafe { std::mem::zeroed::<libc::Dl_info>() };
    let found = unsafe { libc::dladdr(address.0 as *const c_void, &mut info) };
    if found == 0 || info.dli_sname.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(info.dli_sname) };
    Some(name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_frames() {
        let mut stack = RawStack::new();
        let depth = stack.capture();
        assert!(depth > 0, "own call stack should have at least one frame");
        assert!(depth <= MAX_FRAMES);
        assert_eq!(stack.addresses().count(), depth);
    }

    #[test]
    fn test_empty_stack_yields_no_addresses() {
        let stack = RawStack::new();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.addresses().count(), 0);
    }

    #[test]
    fn test_symbol_name_rejects_bogus_address() {
        // Low pages are never mapped; lookup degrades to None, not a fault
        assert_eq!(symbol_name(FrameAddress(0xAAA)), None);
    }

    #[test]
    fn test_symbol_name_on_linked_function() {
        // Whether this resolves depends on how the test binary links libc
        // (PLT stub vs direct); it must degrade to None, never fault
        let _ = symbol_name(FrameAddress(libc::getpid as usize));
    }
}
