//! Key-value store adapters
//!
//! Both adapters hand out handles that share data and a change channel. Each
//! handle has its own origin id, so a handle can tell its own writes apart
//! from writes made by another context.

pub mod file;
pub mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

use std::sync::atomic::{AtomicU64, Ordering};

const EVENT_CAPACITY: usize = 64;

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

fn next_origin() -> u64 {
    NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed)
}
