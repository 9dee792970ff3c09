// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Property test for spec §8 "Event ordering": for any set of events with
//! the same `execution_tick`, they are delivered in strictly ascending
//! `sequence_id` order, and pulses are delivered before non-pulses within a
//! tick.

use hidra_events::{Event, EventKind, EventQueue, PendingEvent};
use hidra_types::NeuronId;
use proptest::prelude::*;

fn arb_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Activate),
        any::<f32>().prop_map(|amount| EventKind::PotentialPulse { amount }),
    ]
}

proptest! {
    #[test]
    fn delivered_order_matches_push_order_within_a_tick(
        kinds in prop::collection::vec(arb_kind(), 1..64),
        tick in 0u64..5,
    ) {
        let queue = EventQueue::new();
        for (i, kind) in kinds.iter().enumerate() {
            queue.push(PendingEvent { execution_tick: tick, target_id: NeuronId(i as u64), kind: *kind });
        }

        let mut pulses: Vec<Event> = Vec::new();
        let mut others: Vec<Event> = Vec::new();
        queue.process_due(tick, &mut pulses, &mut others);

        for pair in pulses.windows(2) {
            prop_assert!(pair[0].sequence_id < pair[1].sequence_id);
        }
        for pair in others.windows(2) {
            prop_assert!(pair[0].sequence_id < pair[1].sequence_id);
        }
        prop_assert_eq!(pulses.len() + others.len(), kinds.len());
    }

    #[test]
    fn concurrent_style_pushes_never_collide_sequence_ids(
        n in 1usize..500,
    ) {
        let queue = EventQueue::new();
        let mut seen = std::collections::HashSet::new();
        for i in 0..n {
            let id = queue.push(PendingEvent {
                execution_tick: 0,
                target_id: NeuronId(i as u64),
                kind: EventKind::Activate,
            });
            prop_assert!(seen.insert(id), "sequence id {} reused", id);
        }
    }
}
