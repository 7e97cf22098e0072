//! Reachability marking: explicit-stack traversal from the root set.
//!
//! Both variants walk the graph iteratively with a work stack rather than
//! call-stack recursion, so traversal depth is bounded by graph size, not by
//! the host stack. The parallel variant partitions the root list across
//! worker tasks and resolves races on shared subgraphs with an atomic claim
//! per object: whichever task flips the mark bit first expands the object,
//! so every object is expanded exactly once system-wide.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::bitmap::AtomicBitmap;
use crate::pool::ObjectPool;
use crate::trace::enumerate_references;

pub(crate) struct Marker<'a> {
    pool: &'a ObjectPool,
    marks: &'a AtomicBitmap,
    roots: &'a AtomicBitmap,
}

impl<'a> Marker<'a> {
    pub(crate) fn new(
        pool: &'a ObjectPool,
        marks: &'a AtomicBitmap,
        roots: &'a AtomicBitmap,
    ) -> Self {
        Self { pool, marks, roots }
    }

    /// Clears every mark bit and gathers the root slots in the same pass.
    pub(crate) fn prepare_roots(&self) -> Vec<u32> {
        let mut root_slots = Vec::with_capacity(128);
        for position in 0..self.pool.len() {
            let slot = self.pool.slot_at(position);
            self.marks.clear(slot as usize);
            if self.roots.get(slot as usize) {
                root_slots.push(slot);
            }
        }
        root_slots
    }

    /// Single-threaded mark. Returns the deepest stack observed.
    pub(crate) fn mark(&self, root_slots: &[u32]) -> usize {
        let mut stack: Vec<u32> = Vec::new();
        let mut max_depth = 0;

        for &root in root_slots {
            stack.push(root);
            max_depth = max_depth.max(stack.len());

            while let Some(slot) = stack.pop() {
                if self.marks.get(slot as usize) {
                    continue;
                }
                self.marks.set(slot as usize);
                self.push_neighbors(slot, &mut stack, &mut max_depth);
            }
        }

        max_depth
    }

    /// Parallel mark over the worker pool. The scope join is the mark
    /// barrier: sweep must not start before this returns.
    pub(crate) fn mark_parallel(
        &self,
        workers: &rayon::ThreadPool,
        worker_count: usize,
        root_slots: &[u32],
    ) -> usize {
        if root_slots.is_empty() {
            return 0;
        }

        let chunk_size = root_slots.len().div_ceil(worker_count.max(1));
        let max_depth = AtomicUsize::new(0);

        workers.scope(|scope| {
            for chunk in root_slots.chunks(chunk_size) {
                let max_depth = &max_depth;
                scope.spawn(move |_| {
                    let local_max = self.mark_chunk(chunk);
                    max_depth.fetch_max(local_max, Ordering::AcqRel);
                });
            }
        });

        max_depth.load(Ordering::Acquire)
    }

    /// One task's traversal: claim-at-push over the shared mark bitmap.
    fn mark_chunk(&self, root_slots: &[u32]) -> usize {
        let mut stack: Vec<u32> = Vec::new();
        let mut max_depth = 0;

        for &root in root_slots {
            // Another task may already have reached this root through the
            // graph; only the claim winner expands it.
            if self.marks.claim(root as usize) {
                stack.push(root);
                max_depth = max_depth.max(stack.len());
            }

            while let Some(slot) = stack.pop() {
                let Some(object) = self.pool.object_by_slot(slot) else {
                    continue;
                };
                for neighbor in enumerate_references(object) {
                    let Some(neighbor_slot) = self.pool.resolve(neighbor) else {
                        // Dangling edge: the target was already collected.
                        continue;
                    };
                    if self.marks.claim(neighbor_slot as usize) {
                        stack.push(neighbor_slot);
                        max_depth = max_depth.max(stack.len());
                    }
                }
            }
        }

        max_depth
    }

    fn push_neighbors(&self, slot: u32, stack: &mut Vec<u32>, max_depth: &mut usize) {
        let Some(object) = self.pool.object_by_slot(slot) else {
            return;
        };
        for neighbor in enumerate_references(object) {
            let Some(neighbor_slot) = self.pool.resolve(neighbor) else {
                continue;
            };
            if self.marks.get(neighbor_slot as usize) {
                continue;
            }
            stack.push(neighbor_slot);
            *max_depth = (*max_depth).max(stack.len());
        }
    }
}
