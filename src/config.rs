//! Collector configuration.

use crate::{GcError, GcResult};

/// Default object-pool capacity (entries).
pub const DEFAULT_POOL_CAPACITY: usize = 128 * 1024;

/// Collector configuration
///
/// Capacity is fixed for the lifetime of the manager; the pool never grows.
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Fixed object-pool capacity
    pub pool_capacity: usize,

    /// Worker tasks used by the parallel mark and sweep phases
    pub worker_threads: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            // Half the available parallelism leaves headroom for the rest of
            // the process while a cycle runs.
            worker_threads: (num_cpus::get() / 2).max(1),
        }
    }
}

impl GcConfig {
    pub(crate) fn validate(&self) -> GcResult<()> {
        if self.pool_capacity == 0 {
            return Err(GcError::InvalidConfig {
                reason: "pool_capacity must be nonzero".to_string(),
            });
        }
        // Slot ids and dense positions are stored as u32.
        if self.pool_capacity > u32::MAX as usize {
            return Err(GcError::InvalidConfig {
                reason: format!("pool_capacity must be at most {}", u32::MAX),
            });
        }
        if self.worker_threads == 0 {
            return Err(GcError::InvalidConfig {
                reason: "worker_threads must be nonzero".to_string(),
            });
        }
        Ok(())
    }
}
