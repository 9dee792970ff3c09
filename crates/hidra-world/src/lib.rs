// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
World state, tick loop, and interpreter bridge for the Hidra simulation
core (spec §4). This crate sits at the top of the dependency graph: it is
the one place `hidra-bytecode`'s ASTs, `hidra-brain`'s evaluators,
`hidra-synapse`'s edges, `hidra-events`'s queue, and `hidra-spatial`'s
neighbor index are all assembled into one mutable simulation.
*/

pub mod bridge;
pub mod error;
pub mod interpreter;
pub mod neuron;
pub mod world;

pub use bridge::Bridge;
pub use error::WorldError;
pub use neuron::Neuron;
pub use world::{InputNode, MetricsSample, OutputNode, World, WorldSnapshot};
