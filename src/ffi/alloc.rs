//! Allocators for buffers that cross the FFI boundary.
//!
//! Buffers lent to C must come from the C heap and go back to it, so the
//! default allocator forwards to the runtime's `malloc`/`free` wrappers.
//! `TrackingAllocator` wraps any allocator with an `AllocationLedger` so a
//! run can prove that every allocation was released exactly once.

use std::collections::HashMap;
use std::ptr::NonNull;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossprint_runtime::{crossprint_alloc, crossprint_dealloc};
use tracing::{error, trace};

use crate::errors::{BoundaryError, Result};

/// Source and sink of raw buffers handed to foreign code.
pub trait ForeignAllocator {
    /// Allocate `size` bytes. Returns `None` when the allocator is out of
    /// memory or `size` is zero.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this same allocator and must not
    /// be used afterwards.
    unsafe fn release(&self, ptr: NonNull<u8>);
}

impl<A: ForeignAllocator + ?Sized> ForeignAllocator for &A {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        (**self).release(ptr)
    }
}

/// The C heap, through the runtime's `crossprint_alloc`/`crossprint_dealloc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CAllocator;

impl ForeignAllocator for CAllocator {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        NonNull::new(crossprint_alloc(size))
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        crossprint_dealloc(ptr.as_ptr());
    }
}

/// Counters reported by an `AllocationLedger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerStats {
    /// Allocations handed out
    pub allocations: u64,
    /// Releases accepted
    pub releases: u64,
    /// Releases rejected as double or unknown
    pub rejected: u64,
    /// Allocations not yet released
    pub live: u64,
}

impl LedgerStats {
    /// True when every allocation was released once and nothing was rejected.
    pub fn is_balanced(&self) -> bool {
        self.allocations == self.releases && self.live == 0 && self.rejected == 0
    }
}

/// Records allocations and releases by address.
///
/// Each allocation gets a unique id. The C allocator may hand the same
/// address out again after it was freed; the new allocation then replaces
/// the old entry with a fresh id.
#[derive(Debug)]
pub struct AllocationLedger {
    /// Next allocation ID
    next_id: u64,
    /// Map from address to the allocation currently or last living there
    allocations: HashMap<usize, AllocationInfo>,
    stats: LedgerStats,
}

#[derive(Debug)]
struct AllocationInfo {
    id: u64,
    size: usize,
    is_live: bool,
}

impl AllocationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            allocations: HashMap::new(),
            stats: LedgerStats::default(),
        }
    }

    /// Record an allocation of `size` bytes at `addr` and return its id.
    pub fn record_allocation(&mut self, addr: usize, size: usize) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.allocations.insert(
            addr,
            AllocationInfo {
                id,
                size,
                is_live: true,
            },
        );
        self.stats.allocations += 1;
        self.stats.live += 1;
        id
    }

    /// Record the release of the allocation at `addr` and return its id.
    pub fn record_release(&mut self, addr: usize) -> Result<u64> {
        let Some(info) = self.allocations.get_mut(&addr) else {
            self.stats.rejected += 1;
            return Err(BoundaryError::UnknownAllocation { addr });
        };

        if !info.is_live {
            self.stats.rejected += 1;
            return Err(BoundaryError::DoubleRelease { id: info.id });
        }

        info.is_live = false;
        self.stats.releases += 1;
        self.stats.live -= 1;
        Ok(info.id)
    }

    /// Size of the live allocation at `addr`, if any.
    pub fn live_size(&self, addr: usize) -> Option<usize> {
        self.allocations
            .get(&addr)
            .filter(|info| info.is_live)
            .map(|info| info.size)
    }

    pub fn stats(&self) -> LedgerStats {
        self.stats
    }
}

impl Default for AllocationLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps an allocator and records every call in an `AllocationLedger`.
///
/// A release the ledger rejects is logged and never reaches the inner
/// allocator.
#[derive(Debug, Default)]
pub struct TrackingAllocator<A = CAllocator> {
    inner: A,
    ledger: Mutex<AllocationLedger>,
}

impl<A: ForeignAllocator> TrackingAllocator<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            ledger: Mutex::new(AllocationLedger::new()),
        }
    }

    /// Snapshot of the ledger counters.
    pub fn stats(&self) -> LedgerStats {
        self.ledger().stats()
    }

    fn ledger(&self) -> MutexGuard<'_, AllocationLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: ForeignAllocator> ForeignAllocator for TrackingAllocator<A> {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        let ptr = self.inner.allocate(size)?;
        let addr = ptr.as_ptr() as usize;
        let id = self.ledger().record_allocation(addr, size);
        trace!(id, size, ptr = ?ptr, "allocated foreign buffer");
        Some(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        let addr = ptr.as_ptr() as usize;
        let recorded = self.ledger().record_release(addr);
        match recorded {
            Ok(id) => {
                trace!(id, ptr = ?ptr, "released foreign buffer");
                self.inner.release(ptr);
            }
            Err(e) => error!(error = %e, "rejected foreign buffer release"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_counts() {
        let mut ledger = AllocationLedger::new();
        let a = ledger.record_allocation(0x1000, 8);
        let b = ledger.record_allocation(0x2000, 16);
        assert_ne!(a, b);
        assert_eq!(ledger.stats().live, 2);

        assert_eq!(ledger.record_release(0x1000), Ok(a));
        let stats = ledger.stats();
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.live, 1);
        assert!(!stats.is_balanced());

        assert_eq!(ledger.record_release(0x2000), Ok(b));
        assert!(ledger.stats().is_balanced());
    }

    #[test]
    fn test_double_release_detection() {
        let mut ledger = AllocationLedger::new();
        let id = ledger.record_allocation(0x1000, 4);

        ledger.record_release(0x1000).unwrap();
        assert_eq!(
            ledger.record_release(0x1000),
            Err(BoundaryError::DoubleRelease { id })
        );
        assert_eq!(ledger.stats().rejected, 1);
        assert!(!ledger.stats().is_balanced());
    }

    #[test]
    fn test_unknown_release_detection() {
        let mut ledger = AllocationLedger::new();
        assert_eq!(
            ledger.record_release(0xdead),
            Err(BoundaryError::UnknownAllocation { addr: 0xdead })
        );
    }

    #[test]
    fn test_reused_address_gets_new_id() {
        let mut ledger = AllocationLedger::new();
        let first = ledger.record_allocation(0x1000, 4);
        ledger.record_release(0x1000).unwrap();
        let second = ledger.record_allocation(0x1000, 12);

        assert_ne!(first, second);
        assert_eq!(ledger.live_size(0x1000), Some(12));
        assert_eq!(ledger.record_release(0x1000), Ok(second));
        assert_eq!(ledger.live_size(0x1000), None);
    }

    #[test]
    fn test_c_allocator_zero_size() {
        assert!(CAllocator.allocate(0).is_none());
    }

    #[test]
    fn test_tracking_allocator_balanced() {
        let tracking = TrackingAllocator::new(CAllocator);
        let ptr = tracking.allocate(32).unwrap();
        assert_eq!(tracking.stats().live, 1);

        unsafe { tracking.release(ptr) };
        let stats = tracking.stats();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.releases, 1);
        assert!(stats.is_balanced());
    }

    #[test]
    fn test_tracking_allocator_blocks_double_release() {
        let tracking = TrackingAllocator::new(CAllocator);
        let ptr = tracking.allocate(8).unwrap();

        unsafe {
            tracking.release(ptr);
            // rejected by the ledger, never reaches free()
            tracking.release(ptr);
        }
        let stats = tracking.stats();
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_reference_is_an_allocator() {
        let tracking = TrackingAllocator::new(CAllocator);
        let by_ref = &tracking;
        let ptr = by_ref.allocate(1).unwrap();
        unsafe { by_ref.release(ptr) };
        assert!(tracking.stats().is_balanced());
    }
}
