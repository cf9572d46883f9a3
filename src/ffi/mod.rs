//! FFI layer for crossprint.
//!
//! - `ForeignString`: an owned, null-terminated buffer lent to C code and
//!   released exactly once when dropped
//! - `ForeignAllocator`: the allocator seam, with `CAllocator` for the C
//!   heap and `TrackingAllocator` for counting allocations and releases
//! - `AllocationLedger`: per-address record of allocations and releases

pub mod alloc;
pub mod foreign_string;

pub use alloc::{AllocationLedger, CAllocator, ForeignAllocator, LedgerStats, TrackingAllocator};
pub use foreign_string::ForeignString;
