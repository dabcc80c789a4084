//! # Symbol Resolution and Address Translation
//!
//! Converts the raw return addresses captured at crash time into
//! human-readable function names and `file:line` locations.
//!
//! Two independent, best-effort steps per frame:
//!
//! 1. **Demangling** (`demangler`): the dynamic linker hands back compiler-
//!    encoded names like `_ZN4core3fmt5write17h…E`; these are rewritten to
//!    their source-level form (`core::fmt::write`). A name that does not
//!    follow the mangling convention passes through unchanged.
//!
//! 2. **Line-number resolution** (`resolver`): an external `addr2line`
//!    subprocess maps each address back to a source location using the
//!    executable's DWARF debug info. The subsystem is about to terminate
//!    the process, so the blocking subprocess call is acceptable; a missing
//!    or failing tool degrades the frame to an empty location.
//!
//! ## PIE and ASLR
//!
//! Modern executables are position independent: the kernel loads them at a
//! randomized base address, while debug info speaks in link-time addresses.
//! `memory_maps` finds the range the executable occupies in the current
//! process so runtime addresses can be rebased before the lookup:
//!
//! ```text
//! link-time address = runtime address - mapped base
//! ```
//!
//! Fixed-address binaries need no rebase and pass addresses through as-is.

pub mod demangler;
pub mod memory_maps;
pub mod resolver;

pub use demangler::demangle_symbol;
pub use memory_maps::{own_executable_range, MemoryRange};
pub use resolver::LineResolver;
