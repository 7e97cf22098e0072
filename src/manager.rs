//! Collection-cycle orchestration.
//!
//! One [`GcManager`] owns the pool, the mark/root state and the worker pool,
//! and drives `clear -> mark -> sweep -> report` for each collection call.
//! Both collect entry points take `&mut self`: a cycle is synchronous and
//! non-reentrant, and no object can be registered while one runs.

use std::time::Instant;

use log::debug;

use crate::bitmap::AtomicBitmap;
use crate::config::GcConfig;
use crate::marker::Marker;
use crate::pool::{GcRef, ObjectPool};
use crate::stats::{CollectMode, CollectionReport, CollectorStats, GcPhase};
use crate::sweeper::Sweeper;
use crate::trace::GcObject;
use crate::{GcError, GcResult};

/// Stop-the-world mark-sweep collector over a fixed-capacity object pool
pub struct GcManager {
    pool: ObjectPool,
    marks: AtomicBitmap,
    roots: AtomicBitmap,
    workers: rayon::ThreadPool,
    config: GcConfig,
    phase: GcPhase,
    last_report: CollectionReport,
    stats: CollectorStats,
}

impl GcManager {
    /// Creates a manager with the default configuration.
    pub fn new() -> GcResult<Self> {
        Self::with_config(GcConfig::default())
    }

    /// Creates a manager with an explicit configuration.
    pub fn with_config(config: GcConfig) -> GcResult<Self> {
        config.validate()?;
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|index| format!("gc-worker-{index}"))
            .build()
            .map_err(|err| GcError::InvalidConfig {
                reason: err.to_string(),
            })?;
        let marks = AtomicBitmap::new(config.pool_capacity);
        let roots = AtomicBitmap::new(config.pool_capacity);
        debug_assert!(marks.bit_capacity() >= config.pool_capacity);
        Ok(Self {
            pool: ObjectPool::with_capacity(config.pool_capacity),
            marks,
            roots,
            workers,
            config,
            phase: GcPhase::Idle,
            last_report: CollectionReport::default(),
            stats: CollectorStats::default(),
        })
    }

    /// Registers a newly allocated object.
    ///
    /// Fails with [`GcError::PoolExhausted`] when the pool is full.
    pub fn insert(&mut self, object: Box<dyn GcObject>) -> GcResult<GcRef> {
        self.pool.insert(object)
    }

    /// Generation-checked read access.
    pub fn get(&self, gc_ref: GcRef) -> Option<&dyn GcObject> {
        self.pool.get(gc_ref)
    }

    /// Generation-checked write access.
    pub fn get_mut(&mut self, gc_ref: GcRef) -> Option<&mut dyn GcObject> {
        self.pool.get_mut(gc_ref)
    }

    /// Read access downcast to the concrete type.
    pub fn get_as<T: GcObject>(&self, gc_ref: GcRef) -> Option<&T> {
        self.pool.get(gc_ref)?.as_any().downcast_ref::<T>()
    }

    /// Write access downcast to the concrete type.
    pub fn get_mut_as<T: GcObject>(&mut self, gc_ref: GcRef) -> Option<&mut T> {
        self.pool.get_mut(gc_ref)?.as_any_mut().downcast_mut::<T>()
    }

    /// Sets or clears the persistent root flag. A stale handle is a no-op.
    pub fn set_root(&mut self, gc_ref: GcRef, is_root: bool) {
        let Some(slot) = self.pool.resolve(gc_ref) else {
            return;
        };
        if is_root {
            self.roots.set(slot as usize);
        } else {
            self.roots.clear(slot as usize);
        }
    }

    /// Whether the object is currently flagged as a root.
    pub fn is_root(&self, gc_ref: GcRef) -> bool {
        self.pool
            .resolve(gc_ref)
            .is_some_and(|slot| self.roots.get(slot as usize))
    }

    /// Whether the object was proven reachable by the most recent cycle.
    pub fn is_marked(&self, gc_ref: GcRef) -> bool {
        self.pool
            .resolve(gc_ref)
            .is_some_and(|slot| self.marks.get(slot as usize))
    }

    /// Live object count.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Fixed pool capacity.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Current position in the collection state machine.
    pub fn phase(&self) -> GcPhase {
        self.phase
    }

    /// Statistics from the most recent cycle.
    pub fn last_report(&self) -> &CollectionReport {
        &self.last_report
    }

    /// Cumulative statistics across all cycles.
    pub fn stats(&self) -> &CollectorStats {
        &self.stats
    }

    /// Active configuration.
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    /// Runs one single-threaded collection cycle.
    pub fn collect(&mut self) {
        self.run_cycle(CollectMode::SingleThread);
    }

    /// Runs one collection cycle with parallel mark and sweep phases.
    pub fn collect_parallel(&mut self) {
        self.run_cycle(CollectMode::MultiThread);
    }

    fn run_cycle(&mut self, mode: CollectMode) {
        let cycle_start = Instant::now();
        let total_objects = self.pool.len();

        self.phase = GcPhase::Clearing;
        let mark_start = Instant::now();
        let marker = Marker::new(&self.pool, &self.marks, &self.roots);
        let root_slots = marker.prepare_roots();
        let root_count = root_slots.len();

        self.phase = GcPhase::Marking;
        let max_mark_depth = match mode {
            CollectMode::SingleThread => marker.mark(&root_slots),
            CollectMode::MultiThread => {
                marker.mark_parallel(&self.workers, self.config.worker_threads, &root_slots)
            }
        };
        let mark_us = mark_start.elapsed().as_micros() as u64;

        // Mark is fully joined here; sweep reads the bits mark produced.
        self.phase = GcPhase::Sweeping;
        let sweep_start = Instant::now();
        let mut sweeper = Sweeper::new(&mut self.pool, &self.marks, &self.roots);
        let deleted_objects = match mode {
            CollectMode::SingleThread => sweeper.sweep(),
            CollectMode::MultiThread => {
                sweeper.sweep_parallel(&self.workers, self.config.worker_threads)
            }
        };
        let sweep_us = sweep_start.elapsed().as_micros() as u64;

        self.phase = GcPhase::Reporting;
        let remaining_objects = self.pool.len();
        let report = CollectionReport {
            mode,
            total_us: cycle_start.elapsed().as_micros() as u64,
            mark_us,
            sweep_us,
            total_objects,
            deleted_objects,
            remaining_objects,
            root_count,
            max_mark_depth,
        };
        debug!(
            "gc cycle: mode={:?} total={}us mark={}us sweep={}us objects={} roots={} deleted={} remaining={}",
            report.mode,
            report.total_us,
            report.mark_us,
            report.sweep_us,
            report.total_objects,
            report.root_count,
            report.deleted_objects,
            report.remaining_objects
        );
        self.stats.record_cycle(&report);
        self.last_report = report;
        self.phase = GcPhase::Idle;
    }
}
