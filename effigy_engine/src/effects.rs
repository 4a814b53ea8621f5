// Deferred presentation and escort effects.
//
// Lightning bursts and escort spawns do not all happen at the moment of
// summoning: all but the first strike, and every escort, fire after a
// randomly rolled delay. The engine models these as data — not closures —
// in a priority queue ordered by `(fire_tick, sequence)`. The host drives
// the queue by calling `ArchetypeRegistry::run_due_effects` once per
// simulation step; there is no concurrency and no cancellation.
//
// The monotonic sequence number gives effects scheduled for the same tick a
// deterministic total order (first scheduled fires first).
//
// See also: `archetype.rs` which schedules these effects, `registry.rs`
// which drains them.

use crate::types::SpawnPoint;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A one-shot effect queued for a future simulation tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueuedEffect {
    /// The tick at which this effect should fire.
    pub fire_tick: u64,
    /// Deterministic tiebreak within a tick; lower fires first.
    pub sequence: u64,
    pub effect: DeferredEffect,
}

/// What happens when a queued effect fires.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DeferredEffect {
    /// A damage-free visual strike at a point near a summon.
    Strike { at: SpawnPoint },
    /// Spawn one escort of the given archetype near the primary summon.
    /// Escorts are anonymous: naming falls back to the archetype's default.
    SpawnEscort { archetype: String, at: SpawnPoint },
}

// Min-heap: lowest (fire_tick, sequence) fires first. BinaryHeap is a
// max-heap, so the ordering is reversed.
impl PartialEq for QueuedEffect {
    fn eq(&self, other: &Self) -> bool {
        self.fire_tick == other.fire_tick && self.sequence == other.sequence
    }
}

impl Eq for QueuedEffect {}

impl PartialOrd for QueuedEffect {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEffect {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_tick
            .cmp(&self.fire_tick)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue of deferred effects.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EffectQueue {
    heap: BinaryHeap<QueuedEffect>,
    next_sequence: u64,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an effect to fire at the given tick.
    pub fn schedule(&mut self, fire_tick: u64, effect: DeferredEffect) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedEffect {
            fire_tick,
            sequence,
            effect,
        });
    }

    /// Pop the next effect if it is due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<QueuedEffect> {
        if self.heap.peek().is_some_and(|e| e.fire_tick <= now) {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
