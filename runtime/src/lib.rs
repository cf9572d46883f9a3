//! crossprint runtime
//!
//! The C side of the crossprint boundary: a print routine compiled from
//! `csrc/print.c` and the C-ABI allocation functions whose blocks it may be
//! handed. Everything here uses the C ABI and the C allocator.

#![allow(clippy::missing_safety_doc)]
#![allow(clippy::not_unsafe_ptr_arg_deref)] // FFI exports intentionally take raw pointers

pub mod io;
pub mod memory;

pub use io::*;
pub use memory::*;
