//! Human-readable entity codes (`BRD001`, `PRD042`, ...).
//!
//! Every code comes from a per-kind counter row in the database that is
//! advanced with a single atomic statement. Nothing about the sequence is
//! kept in process memory, so any number of server instances can allocate
//! against the same store.

pub mod allocator;
pub mod error;
pub mod format;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use allocator::{RetryPolicy, SequenceAllocator};
pub use error::{AllocateError, StoreError};
pub use format::{CodeFormat, KindRegistry};
pub use store::{CounterStore, PgCounterStore};
