//! Progressive streamline scheduling.
//!
//! Tracing a dense seed grid in one go can blow a frame budget. Above
//! [`PROGRESSIVE_THRESHOLD`] seeds the work is split into batches of
//! [`BATCH_SIZE`], and the host's render tick calls
//! [`ProgressiveScheduler::advance_one_unit`] once per frame to trace one
//! batch. Nothing advances while the user is dragging or rotating.

use crate::streamline::{Streamline, Tracer};
use crate::superposition::VectorField;
use glam::DVec2;
use log::{debug, trace};

/// Seed counts above this are traced progressively.
pub const PROGRESSIVE_THRESHOLD: usize = 100;
/// Seeds traced per tick in progressive mode.
pub const BATCH_SIZE: usize = 10;
/// Seed grid density used while the user is interacting.
pub const INTERACTIVE_DENSITY: usize = 8;

/// Whether `seed_count` seeds should be traced over several ticks.
pub fn needs_progressive(seed_count: usize) -> bool {
    seed_count > PROGRESSIVE_THRESHOLD
}

/// Splits `seeds` into consecutive batches of `batch_size` (the last may be
/// shorter). Order is preserved and every seed appears exactly once.
///
/// A `batch_size` of 0 is treated as 1.
pub fn partition(seeds: &[DVec2], batch_size: usize) -> Vec<Vec<DVec2>> {
    seeds.chunks(batch_size.max(1)).map(<[DVec2]>::to_vec).collect()
}

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// No progressive render in flight.
    Idle,
    /// A render is in flight but the user is interacting.
    Paused { progress: f64 },
    /// One batch was traced. `progress` is a percentage in [0, 100].
    Traced {
        streamlines: Vec<Streamline>,
        progress: f64,
        finished: bool,
    },
}

/// Work queue of seed batches for a progressive render.
#[derive(Debug, Clone)]
pub struct ProgressiveScheduler {
    batch_size: usize,
    batches: Vec<Vec<DVec2>>,
    cursor: usize,
}

impl Default for ProgressiveScheduler {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}

impl ProgressiveScheduler {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batches: Vec::new(),
            cursor: 0,
        }
    }

    /// Queues `seeds` from batch 0, discarding whatever was in flight.
    pub fn start(&mut self, seeds: &[DVec2]) {
        if self.is_active() {
            debug!(
                "restarting progressive render at batch {}/{}",
                self.cursor,
                self.batches.len()
            );
        }
        self.batches = partition(seeds, self.batch_size);
        self.cursor = 0;
        debug!(
            "progressive render: {} seeds in {} batches",
            seeds.len(),
            self.batches.len()
        );
    }

    /// Drops any queued batches.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!("cancelled progressive render at batch {}", self.cursor);
        }
        self.batches.clear();
        self.cursor = 0;
    }

    pub fn is_active(&self) -> bool {
        self.cursor < self.batches.len()
    }

    pub fn total_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn completed_batches(&self) -> usize {
        self.cursor
    }

    /// Percentage of batches traced. 100 when nothing is queued.
    pub fn progress(&self) -> f64 {
        if self.batches.is_empty() {
            100.0
        } else {
            self.cursor as f64 / self.batches.len() as f64 * 100.0
        }
    }

    /// Traces exactly one batch unless `interacting` is set.
    ///
    /// After the last batch the scheduler leaves progressive mode and later
    /// ticks return [`Tick::Idle`].
    pub fn advance_one_unit<F: VectorField + ?Sized>(
        &mut self,
        field: &F,
        tracer: &Tracer,
        interacting: bool,
    ) -> Tick {
        if !self.is_active() {
            return Tick::Idle;
        }
        if interacting {
            return Tick::Paused {
                progress: self.progress(),
            };
        }
        let Some(batch) = self.next() else {
            return Tick::Idle;
        };
        let streamlines = tracer.trace_all(field, &batch);
        let progress = self.progress();
        trace!(
            "batch {}/{} traced: {} streamlines ({progress:.0}%)",
            self.cursor,
            self.batches.len(),
            streamlines.len()
        );
        let finished = !self.is_active();
        if finished {
            debug!("progressive render finished");
            self.batches.clear();
            self.cursor = 0;
        }
        Tick::Traced {
            streamlines,
            progress,
            finished,
        }
    }
}

/// Hands out the remaining batches in order, ignoring interaction state.
impl Iterator for ProgressiveScheduler {
    type Item = Vec<DVec2>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.batches.get_mut(self.cursor).map(std::mem::take)?;
        self.cursor += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.batches.len() - self.cursor;
        (remaining, Some(remaining))
    }
}
