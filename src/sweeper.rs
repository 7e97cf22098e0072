//! Reclamation: reverse scan and swap-remove, or partitioned parallel
//! scan-and-compact with a sequential merge.
//!
//! Both variants scan in reverse. Swap-remove relocates the pool's last
//! entry into the removed position; scanning backward guarantees that entry
//! was already visited, so no live object is skipped and no freed entry is
//! revisited.

use parking_lot::Mutex;

use crate::bitmap::AtomicBitmap;
use crate::pool::{ObjectPool, PoolEntry};

/// Per-chunk result reported by a parallel sweep task.
struct ChunkReport {
    /// Offset of the chunk in the pool at scan time.
    offset: usize,
    /// Surviving entries, packed at the front of the chunk.
    survivors: usize,
    /// Slots whose objects the task destroyed.
    doomed: Vec<u32>,
}

pub(crate) struct Sweeper<'a> {
    pool: &'a mut ObjectPool,
    marks: &'a AtomicBitmap,
    roots: &'a AtomicBitmap,
}

impl<'a> Sweeper<'a> {
    pub(crate) fn new(
        pool: &'a mut ObjectPool,
        marks: &'a AtomicBitmap,
        roots: &'a AtomicBitmap,
    ) -> Self {
        Self { pool, marks, roots }
    }

    /// Single-threaded sweep. Returns the number of destroyed objects.
    pub(crate) fn sweep(&mut self) -> usize {
        let mut deleted = 0;
        for index in (0..self.pool.len()).rev() {
            let slot = self.pool.slot_at(index) as usize;
            if self.roots.get(slot) || self.marks.get(slot) {
                continue;
            }
            self.pool.remove_at_swap_last(index);
            deleted += 1;
        }
        deleted
    }

    /// Parallel sweep: one task per contiguous chunk, then a sequential
    /// merge that packs survivor runs and truncates the pool.
    pub(crate) fn sweep_parallel(
        &mut self,
        workers: &rayon::ThreadPool,
        worker_count: usize,
    ) -> usize {
        let len = self.pool.len();
        if len == 0 {
            return 0;
        }

        let chunk_size = len.div_ceil(worker_count.max(1));
        let marks = self.marks;
        let roots = self.roots;
        let reports: Mutex<Vec<ChunkReport>> = Mutex::new(Vec::new());

        let entries = self.pool.entries_mut();
        workers.scope(|scope| {
            for (chunk_index, chunk) in entries.chunks_mut(chunk_size).enumerate() {
                let reports = &reports;
                scope.spawn(move |_| {
                    let report = sweep_chunk(chunk, chunk_index * chunk_size, marks, roots);
                    reports.lock().push(report);
                });
            }
        });

        let mut reports = reports.into_inner();
        // Tasks finish in any order; the merge must walk chunks in pool order.
        reports.sort_by_key(|report| report.offset);

        let mut write = 0;
        let mut deleted = 0;
        for report in &reports {
            self.pool.move_chunk(write, report.offset, report.survivors);
            write += report.survivors;
            deleted += report.doomed.len();
        }
        self.pool.shrink_to(write);
        for report in &reports {
            for &slot in &report.doomed {
                self.pool.release_slot(slot);
            }
        }
        self.pool.rebuild_positions();

        deleted
    }
}

/// Scans one chunk in reverse, destroying garbage in place and swapping the
/// emptied entries toward the chunk tail so survivors pack at the front.
///
/// Only this task touches the chunk; the bitmaps are the sole shared state.
fn sweep_chunk(
    chunk: &mut [PoolEntry],
    offset: usize,
    marks: &AtomicBitmap,
    roots: &AtomicBitmap,
) -> ChunkReport {
    let mut survivors = chunk.len();
    let mut doomed = Vec::new();

    for index in (0..chunk.len()).rev() {
        let slot = chunk[index].slot as usize;
        if roots.get(slot) || marks.get(slot) {
            continue;
        }
        // Destroy in place, then retire the emptied entry past the
        // surviving region.
        drop(chunk[index].object.take());
        doomed.push(chunk[index].slot);
        chunk.swap(index, survivors - 1);
        survivors -= 1;
    }

    ChunkReport {
        offset,
        survivors,
        doomed,
    }
}
