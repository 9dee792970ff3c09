// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios exercising the public API surface a host program
//! actually drives: a hand-built XOR brain, delayed and persistent synapse
//! transmission through the real tick loop, and acyclicity of the
//! feed-forward network's wiring.
//!
//! The fuel-exhaustion and cross-instance determinism scenarios live as
//! unit tests inside `hidra-world` instead, since they need
//! crate-internal access to `execute_gene`/`compiled_genome` that this
//! black-box surface doesn't expose.

use hidra::{Config, Position, SignalType, SynapseSource, SynapseTarget, World};
use hidra_brain::{Connection, IoRole, InputSource, NeuralNetwork, Node, NodeType, OutputAction};
use hidra_types::{ActivationFunction, OutputId};

/// The classic two-hidden-unit sigmoid construction for XOR: one hidden
/// unit approximates OR, the other AND, and the output combines them as
/// `OR AND NOT(AND)`. Steep weights push the sigmoids close enough to 0/1
/// that boolean inputs land within 1e-3 of the expected boolean output.
fn xor_network() -> NeuralNetwork {
    let mut nn = NeuralNetwork::new();
    let x1 = 0;
    let x2 = 1;
    let or_unit = 2;
    let and_unit = 3;
    let out = 4;

    nn.add_node(Node::new(x1, NodeType::Input, 0.0, ActivationFunction::Linear).with_io(IoRole::Input(InputSource::ActivationPotential)));
    nn.add_node(Node::new(x2, NodeType::Input, 0.0, ActivationFunction::Linear).with_io(IoRole::Input(InputSource::ActivationPotential)));
    nn.add_node(Node::new(or_unit, NodeType::Hidden, -10.0, ActivationFunction::Sigmoid));
    nn.add_node(Node::new(and_unit, NodeType::Hidden, -30.0, ActivationFunction::Sigmoid));
    nn.add_node(
        Node::new(out, NodeType::Output, -10.0, ActivationFunction::Sigmoid)
            .with_io(IoRole::Output(OutputAction::SetOutputValue(OutputId(0)))),
    );

    nn.add_connection(Connection { from_id: x1, to_id: or_unit, weight: 20.0 });
    nn.add_connection(Connection { from_id: x2, to_id: or_unit, weight: 20.0 });
    nn.add_connection(Connection { from_id: x1, to_id: and_unit, weight: 20.0 });
    nn.add_connection(Connection { from_id: x2, to_id: and_unit, weight: 20.0 });
    nn.add_connection(Connection { from_id: or_unit, to_id: out, weight: 20.0 });
    nn.add_connection(Connection { from_id: and_unit, to_id: out, weight: -20.0 });

    nn
}

#[test]
fn xor_brain_reproduces_the_truth_table() {
    let mut nn = xor_network();
    let cases = [((0.0, 0.0), 0.0), ((1.0, 0.0), 1.0), ((0.0, 1.0), 1.0), ((1.0, 1.0), 0.0)];
    for ((x1, x2), expected) in cases {
        nn.evaluate(&[x1, x2]).expect("two inputs match the two input nodes");
        let out = nn.output_slots()[0].value;
        assert!((out - expected).abs() < 1e-3, "xor({x1}, {x2}) = {out}, expected ~{expected}");
    }
}

#[test]
fn evaluate_rejects_a_mismatched_input_count() {
    let mut nn = xor_network();
    assert!(nn.evaluate(&[1.0]).is_err());
    assert!(nn.evaluate(&[1.0, 0.0, 1.0]).is_err());
}

#[test]
fn add_connection_rejects_a_cycle_and_leaves_the_graph_unchanged() {
    let mut nn = NeuralNetwork::new();
    for id in 0..3u32 {
        nn.add_node(Node::new(id, NodeType::Hidden, 0.0, ActivationFunction::Tanh));
    }
    assert!(nn.add_connection(Connection { from_id: 0, to_id: 1, weight: 1.0 }));
    assert!(nn.add_connection(Connection { from_id: 1, to_id: 2, weight: 1.0 }));

    // 2 -> 0 would close the cycle 0 -> 1 -> 2 -> 0.
    let accepted = nn.add_connection(Connection { from_id: 2, to_id: 0, weight: 1.0 });
    assert!(!accepted, "closing the cycle must be rejected");

    // A self-loop is rejected the same way.
    assert!(!nn.add_connection(Connection { from_id: 1, to_id: 1, weight: 1.0 }));
}

/// A source neuron's firing potential propagates through a `Delayed`
/// synapse exactly `parameter` ticks after the `Activate` event following
/// the tick it crossed threshold — not the tick it crossed threshold
/// itself. `default_decay_rate` is pinned to `1.0` so the delivered amount
/// isn't also eroded by the target's own passive soma decay in the same
/// tick, which would make the expected `0.7 * 1.1` product unobservable.
#[test]
fn delayed_synapse_delivers_the_firing_potential_after_its_parameter_ticks() {
    let config = Config { default_decay_rate: 1.0, ..Config::default() };
    let mut world = World::new("", config).unwrap();
    let source = world.create_neuron(Position::ORIGIN);
    let target = world.create_neuron(Position::new(1.0, 0.0, 0.0));
    world.neuron_mut(source).unwrap().set_soma_potential(1.1);

    let synapse_id = world.add_synapse(SynapseSource::Neuron(source), SynapseTarget::Neuron(target), 0.7, SignalType::Delayed);
    world.synapse_mut(synapse_id).unwrap().parameter = 2.0;

    for expected_calls in 1..=3 {
        world.step();
        assert_eq!(world.neuron(target).unwrap().soma_potential(), 0.0, "pulse must not arrive before call {expected_calls}");
    }
    world.step();
    let delivered = world.neuron(target).unwrap().soma_potential();
    assert!((delivered - 0.77).abs() < 1e-5, "expected 0.7 * 1.1 = 0.77, got {delivered}");
}

/// A `Persistent` synapse latches `activation_value * weight` into
/// `persistent_value` the tick its source neuron's `Activate` event is
/// processed, and from the following tick on re-delivers that same latched
/// value into the target's dendritic potential every tick (subject to
/// fatigue, which is disabled by default).
#[test]
fn persistent_synapse_latches_on_fire_and_then_transmits_every_tick() {
    let mut world = World::new("", Config::default()).unwrap();
    let source = world.create_neuron(Position::ORIGIN);
    let target = world.create_neuron(Position::new(1.0, 0.0, 0.0));
    world.neuron_mut(source).unwrap().set_soma_potential(1.2);

    let synapse_id = world.add_synapse(SynapseSource::Neuron(source), SynapseTarget::Neuron(target), 0.8, SignalType::Persistent);

    world.step();
    world.step();
    let persistent_value = world.synapse(synapse_id).unwrap().persistent_value;
    assert!((persistent_value - 0.96).abs() < 1e-5, "expected 1.2 * 0.8 = 0.96, got {persistent_value}");

    world.step();
    let dendritic = world.neuron(target).unwrap().dendritic_potential();
    assert!((dendritic - 0.96).abs() < 1e-5, "expected 0.96 re-delivered, got {dendritic}");

    // Stable on subsequent ticks since fatigue is disabled by default.
    world.step();
    let dendritic_again = world.neuron(target).unwrap().dendritic_potential();
    assert!((dendritic_again - 0.96).abs() < 1e-5);
}

#[test]
fn save_and_load_round_trips_a_running_world() {
    let mut world = World::new("", Config::default()).unwrap();
    let a = world.create_neuron(Position::ORIGIN);
    world.neuron_mut(a).unwrap().set_soma_potential(0.5);
    world.run_for(10);

    let json_str = hidra::save_to_string(&world).unwrap();
    let restored = hidra::load_from_string(&json_str).unwrap();

    assert_eq!(restored.current_tick, world.current_tick);
    assert_eq!(restored.neuron(a).unwrap().soma_potential(), world.neuron(a).unwrap().soma_potential());
}
