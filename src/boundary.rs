//! The boundary crossing routine.
//!
//! Copies text into a C-heap buffer, lends it to the C print routine, and
//! releases it when the call returns.

use crossprint_runtime::crossprint_print_line;

use crate::errors::Result;
use crate::ffi::{CAllocator, ForeignAllocator, ForeignString};

/// The line the `crossprint` binary sends across the boundary.
pub const GREETING: &str = "Hello from CGO Cross-Compile!";

/// Print `text` and a newline through the C print routine.
///
/// Only the part of `text` before an embedded zero byte is printed.
pub fn print_line(text: &str) -> Result<()> {
    print_line_in(text, CAllocator)
}

/// Like `print_line`, with the buffer allocated from `allocator`.
pub fn print_line_in<A: ForeignAllocator>(text: &str, allocator: A) -> Result<()> {
    let buffer = ForeignString::new_in(text, allocator)?;
    buffer.lend(|ptr| unsafe { crossprint_print_line(ptr) });
    buffer.release();
    Ok(())
}
