//! Time-ordered deferred work
//!
//! Expiries and one-shot round timers are queued here and drained by the
//! tick driver. Tasks carry ids and generations only; whoever runs a task
//! re-checks that its target still exists and is still current.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::store::VehicleId;

/// A unit of deferred work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Reset the speed multiplier if `generation` is still current
    ExpireSpeed { vehicle: VehicleId, generation: u32 },
    /// Reset the damage multiplier if `generation` is still current
    ExpireDamage { vehicle: VehicleId, generation: u32 },
    /// Restore drag and stop the spin if `generation` is still current
    ExpireOil { vehicle: VehicleId, generation: u32 },
    /// Remove an uncollected power-up
    DespawnPickup { pickup: u32 },
    /// Remove an evaporating hazard
    DespawnHazard { hazard: u32 },
    /// Start the hazard spawner
    EnableHazards,
    /// Publish the round result
    ReportResult,
}

#[derive(Debug, Clone)]
struct Entry {
    due: f64,
    seq: u64,
    task: Deferred,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first,
    // with insertion order breaking ties
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of deferred tasks keyed by due time (ms)
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f64, task: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { due, seq, task });
    }

    /// Pop the earliest task due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<Deferred> {
        if self.queue.peek().is_some_and(|e| e.due <= now) {
            self.queue.pop().map(|e| e.task)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
