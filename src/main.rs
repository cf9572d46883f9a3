//! crossprint CLI
//!
//! Sends one greeting through the C print routine and exits. Takes no
//! arguments; set `RUST_LOG=debug` to see the allocation summary on stderr.

use std::process;

use crossprint::{logging, print_line_in, CAllocator, TrackingAllocator, GREETING};
use tracing::{debug, error};

fn main() {
    logging::init();

    let allocator = TrackingAllocator::new(CAllocator);
    if let Err(e) = print_line_in(GREETING, &allocator) {
        error!(error = %e, "failed to cross the FFI boundary");
        process::abort();
    }

    let stats = allocator.stats();
    debug!(
        allocations = stats.allocations,
        releases = stats.releases,
        live = stats.live,
        "foreign buffer ledger"
    );
    if !stats.is_balanced() {
        error!(?stats, "foreign buffer ledger is unbalanced");
        process::abort();
    }
}
