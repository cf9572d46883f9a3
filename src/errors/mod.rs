//! Error types for the crossprint boundary.
//!
//! Allocation failure is the only fault the boundary itself can raise. The
//! other variants come from the allocation ledger when it sees a release
//! that must never reach the C allocator.

use thiserror::Error;

/// Errors raised while marshaling a buffer across the FFI boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// The allocator returned null for a request of `size` bytes.
    #[error("out of memory allocating {size} bytes for a foreign buffer")]
    OutOfMemory { size: usize },

    /// An allocation was released a second time.
    #[error("double release: allocation {id} was already released")]
    DoubleRelease { id: u64 },

    /// A release named an address that was never handed out.
    #[error("release of unknown allocation at {addr:#x}")]
    UnknownAllocation { addr: usize },
}

/// Result type for boundary operations.
pub type Result<T> = std::result::Result<T, BoundaryError>;
