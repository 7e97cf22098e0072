//! Stop-the-world mark-sweep garbage collector for a fixed-capacity object pool.
//!
//! Managed objects form an arbitrary, possibly cyclic reference graph. The
//! collector has no compiler support for tracing; it discovers outgoing edges
//! through per-type static descriptors (see [`trace`]).
//!
//! - Dense object pool with stable, generation-tagged handles
//! - Atomic mark/root bitmaps shared lock-free by mark workers
//! - Single-threaded and parallel mark and sweep phases
//! - Per-cycle reports and cumulative statistics

use thiserror::Error;

mod bitmap;
pub mod config;
pub mod manager;
mod marker;
pub mod pool;
pub mod stats;
mod sweeper;
pub mod trace;

pub use config::GcConfig;
pub use manager::GcManager;
pub use pool::{GcRef, ObjectPool};
pub use stats::{CollectMode, CollectionReport, CollectorStats, GcPhase};
pub use trace::{FieldDescriptor, FieldKind, GcObject, TypeDescriptor, enumerate_references};

/// GC error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// The fixed-capacity pool has no free slot left
    #[error("object pool exhausted (capacity {capacity})")]
    PoolExhausted {
        /// Configured pool capacity
        capacity: usize,
    },

    /// Rejected configuration
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with it
        reason: String,
    },
}

/// Result type for GC operations
pub type GcResult<T> = Result<T, GcError>;
