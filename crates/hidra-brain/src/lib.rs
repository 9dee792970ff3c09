// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
The per-neuron "brain" abstraction (spec §4.D): a polymorphic evaluator a
neuron's genome builds once at birth and re-invokes on every `Activate`
event. Two concrete shapes are supported — [`neural_network::NeuralNetwork`],
a feed-forward acyclic net, and [`logic_gate::LogicGate`], a combinational
gate or clocked flip-flop — unified behind the [`Brain`] enum so the rest of
the crate (and `hidra-world`) can hold one field regardless of which shape a
given neuron's genome produced.

Grounded on the teacher's `feagi-npu-neural` model-dispatch shape (a trait
per model, `apply`/`compute_synaptic_contribution` as the hot-path methods)
for the overall "small, swappable evaluators behind one call" structure, and
on `examples/other_examples/9c8185a4_inflectrix-neat__src-topology.rs.rs`'s
`is_connection_cyclic` reachability check for `NeuralNetwork::add_connection`.
*/

pub mod logic_gate;
pub mod neural_network;

pub use logic_gate::{FlipFlop, GateType, LogicGate};
pub use neural_network::{Connection, IoRole, Node, NodeType, NeuralNetwork};

use hidra_types::{GeneId, OutputId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BrainError {
    #[error("brain expected {expected} inputs, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },
}

/// Where an input node's value comes from on each evaluation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum InputSource {
    /// The neuron's own `SomaPotential` local variable.
    ActivationPotential,
    /// One of the neuron's 256 local variables, by index (wrapped mod 256).
    LocalVariable(usize),
    /// One of the 256 global hormone variables, by index (wrapped mod 256).
    GlobalHormone(usize),
    /// A constant `1.0`, useful for bias-only wiring.
    ConstantOne,
    /// The neuron's health.
    Health,
    /// The neuron's age in ticks.
    Age,
}

/// What an output node's computed value drives.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum OutputAction {
    SetOutputValue(OutputId),
    ExecuteGene(GeneId),
    /// Reserved for future spatial-movement output; currently a no-op sink.
    Move,
}

/// An output slot: the action it drives plus the value computed for it by
/// the most recent `evaluate()`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputSlot {
    pub action: OutputAction,
    pub value: f32,
}

/// The two concrete brain shapes a genome can build, unified behind one
/// evaluate/reset surface.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Brain {
    NeuralNetwork(NeuralNetwork),
    LogicGate(LogicGate),
}

impl Brain {
    pub fn input_map(&self) -> Vec<InputSource> {
        match self {
            Brain::NeuralNetwork(nn) => nn.input_sources(),
            Brain::LogicGate(lg) => lg.input_map.clone(),
        }
    }

    pub fn output_map(&self) -> Vec<OutputSlot> {
        match self {
            Brain::NeuralNetwork(nn) => nn.output_slots(),
            Brain::LogicGate(lg) => vec![lg.output],
        }
    }

    pub fn evaluate(&mut self, inputs: &[f32]) -> Result<(), BrainError> {
        match self {
            Brain::NeuralNetwork(nn) => nn.evaluate(inputs),
            Brain::LogicGate(lg) => lg.evaluate(inputs),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Brain::NeuralNetwork(nn) => nn.reset(),
            Brain::LogicGate(lg) => lg.reset(),
        }
    }

    /// Perturb the brain's numeric parameters in place (spec §4.D genetic
    /// mutation hook: connection weights and node biases for a network,
    /// threshold for a gate).
    pub fn mutate(&mut self, rate: f32, rng: &mut hidra_rng::Rng) {
        match self {
            Brain::NeuralNetwork(nn) => nn.mutate(rate, rng),
            Brain::LogicGate(lg) => lg.mutate(rate, rng),
        }
    }
}
