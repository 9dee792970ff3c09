// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
Tick-indexed priority event queue (spec §4.C).

Orders events by `(execution_tick ascending, sequence_id ascending)`.
`push` assigns the next sequence id from a shared atomic counter so
concurrent producers outside the tick loop never collide — mirroring the
"event queue's push is independently thread-safe via an internal lock or
atomic sequence counter" guarantee in spec §5. The heap itself lives
behind a `parking_lot::Mutex`, the lock type the teacher workspace uses
throughout `feagi-npu-burst-engine` for exactly this kind of shared,
short-critical-section state.
*/

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use hidra_types::{ExecutionContext, GeneId, NeuronId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// What an event does when it becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Evaluate the target neuron's brain.
    Activate,
    /// Add `amount` to the target neuron's `SomaPotential`.
    PotentialPulse { amount: f32 },
    /// Interpret `gene_id`'s AST against the target neuron under `context`.
    ExecuteGene { gene_id: GeneId, context: ExecutionContext },
}

impl EventKind {
    pub fn is_pulse(&self) -> bool {
        matches!(self, EventKind::PotentialPulse { .. })
    }
}

/// A single scheduled occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub sequence_id: u64,
    pub execution_tick: u64,
    pub target_id: NeuronId,
    pub kind: EventKind,
}

/// An event prior to being assigned a sequence id by the queue.
#[derive(Debug, Clone, Copy)]
pub struct PendingEvent {
    pub execution_tick: u64,
    pub target_id: NeuronId,
    pub kind: EventKind,
}

impl Event {
    fn order_key(&self) -> (u64, u64) {
        (self.execution_tick, self.sequence_id)
    }
}

impl PartialEq for EventOrdByTick {
    fn eq(&self, other: &Self) -> bool {
        self.0.order_key() == other.0.order_key()
    }
}
impl Eq for EventOrdByTick {}

/// `BinaryHeap` is a max-heap; wrapping events in this newtype and
/// reversing the comparison turns it into the min-heap by
/// `(execution_tick, sequence_id)` the spec requires.
#[derive(Debug, Clone, Copy)]
struct EventOrdByTick(Event);

impl PartialOrd for EventOrdByTick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventOrdByTick {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.order_key().cmp(&self.0.order_key())
    }
}

/// A tick-indexed min-heap of events with a monotonic, thread-safe
/// sequence-id assignment.
pub struct EventQueue {
    heap: Mutex<BinaryHeap<EventOrdByTick>>,
    next_sequence_id: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            next_sequence_id: AtomicU64::new(0),
        }
    }

    /// Restore a queue from persisted events and a persisted sequence
    /// counter (so ids resume strictly after anything already assigned).
    pub fn from_parts(events: Vec<Event>, next_sequence_id: u64) -> Self {
        let max_seen = events.iter().map(|e| e.sequence_id).max().map(|s| s + 1).unwrap_or(0);
        let heap = events.into_iter().map(EventOrdByTick).collect();
        Self {
            heap: Mutex::new(heap),
            next_sequence_id: AtomicU64::new(next_sequence_id.max(max_seen)),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }

    /// Push an event, assigning it the next sequence id. Safe to call from
    /// multiple threads concurrently.
    pub fn push(&self, pending: PendingEvent) -> u64 {
        let sequence_id = self.next_sequence_id.fetch_add(1, AtomicOrdering::SeqCst);
        let event = Event {
            sequence_id,
            execution_tick: pending.execution_tick,
            target_id: pending.target_id,
            kind: pending.kind,
        };
        self.heap.lock().push(EventOrdByTick(event));
        sequence_id
    }

    /// Drain every event due at or before `current_tick`, partitioned by
    /// kind into `pulses_out` (PotentialPulse) and `others_out` (everything
    /// else), each preserving ascending `(execution_tick, sequence_id)`
    /// order. Late events (`execution_tick < current_tick`, which can occur
    /// when a producer outside the tick loop pushes after the fact) are
    /// processed as if due now rather than dropped.
    pub fn process_due(&self, current_tick: u64, pulses_out: &mut Vec<Event>, others_out: &mut Vec<Event>) {
        let mut heap = self.heap.lock();
        let mut due = Vec::new();
        while let Some(top) = heap.peek() {
            if top.0.execution_tick > current_tick {
                break;
            }
            due.push(heap.pop().unwrap().0);
        }
        drop(heap);

        // `due` comes out of the heap already in ascending (tick, seq)
        // order; partitioning preserves that per-kind.
        for event in due {
            if event.kind.is_pulse() {
                pulses_out.push(event);
            } else {
                others_out.push(event);
            }
        }
    }

    /// Read-only: events currently scheduled for exactly `tick`, in
    /// `(execution_tick, sequence_id)` order. Does not mutate the queue —
    /// the informational query named in spec §6 ("Event visibility").
    pub fn events_at(&self, tick: u64) -> Vec<Event> {
        let heap = self.heap.lock();
        let mut matching: Vec<Event> = heap.iter().map(|e| e.0).filter(|e| e.execution_tick == tick).collect();
        matching.sort_by_key(|e| e.order_key());
        matching
    }

    /// Snapshot of every currently queued event, in delivery order.
    pub fn snapshot(&self) -> Vec<Event> {
        let heap = self.heap.lock();
        let mut all: Vec<Event> = heap.iter().map(|e| e.0).collect();
        all.sort_by_key(|e| e.order_key());
        all
    }

    pub fn next_sequence_id(&self) -> u64 {
        self.next_sequence_id.load(AtomicOrdering::SeqCst)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(tick: u64, target: u64) -> PendingEvent {
        PendingEvent { execution_tick: tick, target_id: NeuronId(target), kind: EventKind::PotentialPulse { amount: 1.0 } }
    }

    fn activate(tick: u64, target: u64) -> PendingEvent {
        PendingEvent { execution_tick: tick, target_id: NeuronId(target), kind: EventKind::Activate }
    }

    #[test]
    fn process_due_partitions_by_kind_preserving_order() {
        let q = EventQueue::new();
        q.push(activate(0, 1));
        q.push(pulse(0, 2));
        q.push(activate(0, 3));
        q.push(pulse(0, 4));

        let mut pulses = Vec::new();
        let mut others = Vec::new();
        q.process_due(0, &mut pulses, &mut others);

        assert_eq!(pulses.iter().map(|e| e.target_id.0).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(others.iter().map(|e| e.target_id.0).collect::<Vec<_>>(), vec![1, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn late_events_are_processed_not_dropped() {
        let q = EventQueue::new();
        q.push(activate(0, 1));

        let mut pulses = Vec::new();
        let mut others = Vec::new();
        // current_tick is ahead of the event's execution_tick.
        q.process_due(5, &mut pulses, &mut others);
        assert_eq!(others.len(), 1);
    }

    #[test]
    fn future_events_are_not_drained() {
        let q = EventQueue::new();
        q.push(activate(10, 1));

        let mut pulses = Vec::new();
        let mut others = Vec::new();
        q.process_due(5, &mut pulses, &mut others);
        assert!(others.is_empty());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn sequence_ids_are_strictly_monotonic() {
        let q = EventQueue::new();
        let mut ids = Vec::new();
        for i in 0..50 {
            ids.push(q.push(activate(0, i)));
        }
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn ties_within_same_tick_break_on_sequence_id() {
        let q = EventQueue::new();
        for i in 0..10 {
            q.push(activate(3, i));
        }
        let snapshot = q.snapshot();
        for pair in snapshot.windows(2) {
            assert!(pair[0].sequence_id < pair[1].sequence_id);
        }
    }

    #[test]
    fn from_parts_resumes_sequence_counter_past_max() {
        let event = Event { sequence_id: 41, execution_tick: 0, target_id: NeuronId(1), kind: EventKind::Activate };
        let q = EventQueue::from_parts(vec![event], 0);
        assert_eq!(q.next_sequence_id(), 42);
    }
}
