//! Owned, null-terminated buffers lent to C code.
//!
//! `ForeignString` is the only way crossprint hands text to C. It allocates
//! from a `ForeignAllocator`, can only be lent by shared borrow, and returns
//! its block to the same allocator when dropped. Moving a `ForeignString`
//! moves the handle, never the heap block, so the address C sees is stable.

use std::ffi::CStr;
use std::fmt;
use std::ptr::{self, NonNull};

use libc::c_char;
use tracing::debug;

use super::alloc::{CAllocator, ForeignAllocator};
use crate::errors::{BoundaryError, Result};

/// A null-terminated copy of some text, owned by the Rust side.
///
/// The bytes of the text are copied verbatim. A zero byte inside the text
/// ends the string as C sees it: `"abc\0def"` reads as `"abc"` on the
/// foreign side. This is a property of C strings and is kept as is.
pub struct ForeignString<A: ForeignAllocator = CAllocator> {
    ptr: NonNull<c_char>,
    /// Bytes copied from the text, excluding the terminator
    len: usize,
    allocator: A,
}

impl ForeignString<CAllocator> {
    /// Copy `text` into a new buffer on the C heap.
    pub fn new(text: &str) -> Result<Self> {
        Self::new_in(text, CAllocator)
    }
}

impl<A: ForeignAllocator> ForeignString<A> {
    /// Copy `text` into a new buffer from `allocator`.
    pub fn new_in(text: &str, allocator: A) -> Result<Self> {
        let bytes = text.as_bytes();
        let size = bytes.len() + 1;
        let block = allocator
            .allocate(size)
            .ok_or(BoundaryError::OutOfMemory { size })?;

        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), block.as_ptr(), bytes.len());
            *block.as_ptr().add(bytes.len()) = 0; // null terminator
        }

        Ok(Self {
            ptr: block.cast(),
            len: bytes.len(),
            allocator,
        })
    }

    /// Address of the buffer, valid while `self` is alive.
    pub fn as_ptr(&self) -> *const c_char {
        self.ptr.as_ptr()
    }

    /// The string as C code reads it, up to the first zero byte.
    pub fn as_c_str(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.as_ptr()) }
    }

    /// Number of bytes copied from the source text.
    pub fn copied_len(&self) -> usize {
        self.len
    }

    /// True when an embedded zero byte hides part of the copied text from C.
    pub fn is_truncated(&self) -> bool {
        self.as_c_str().to_bytes().len() < self.len
    }

    /// Lend the buffer's address to `f` for the duration of one call.
    ///
    /// The borrow on `self` keeps the buffer alive and unmoved until `f`
    /// returns.
    pub fn lend<R>(&self, f: impl FnOnce(*const c_char) -> R) -> R {
        debug!(len = self.len, ptr = ?self.ptr, "lending foreign buffer");
        f(self.as_ptr())
    }

    /// Release the buffer now. Equivalent to dropping it.
    pub fn release(self) {
        drop(self);
    }
}

impl<A: ForeignAllocator> Drop for ForeignString<A> {
    fn drop(&mut self) {
        unsafe { self.allocator.release(self.ptr.cast()) }
    }
}

impl<A: ForeignAllocator> fmt::Debug for ForeignString<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignString")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("visible", &self.as_c_str())
            .finish()
    }
}
