//! crossprint
//!
//! Hands a string to a natively compiled C routine that prints it, then
//! frees the buffer. The buffer is a `ForeignString`: allocated on the C
//! heap, lent to C by shared borrow for one call, and released exactly once
//! when it goes out of scope.
//!
//! # Modules
//!
//! - [`ffi`]: owned foreign buffers, allocators and the allocation ledger
//! - [`boundary`]: the allocate, print, release routine
//! - [`errors`]: error types
//! - [`logging`]: `tracing` subscriber setup

pub mod boundary;
pub mod errors;
pub mod ffi;
pub mod logging;

pub use boundary::{print_line, print_line_in, GREETING};
pub use errors::{BoundaryError, Result};
pub use ffi::{
    AllocationLedger, CAllocator, ForeignAllocator, ForeignString, LedgerStats, TrackingAllocator,
};
