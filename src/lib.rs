// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! # Hidra
//!
//! Hidra is a deterministic, tick-driven simulation of artificial neurons
//! governed by an evolvable bytecode genome. Each neuron carries its own
//! small program — a gene — that can wire synapses, spawn or kill neurons,
//! and build the "brain" (a tiny feed-forward network or logic gate) that
//! turns its inputs into outputs whenever it activates. The whole world
//! advances one tick at a time, with no wall-clock dependence: given the
//! same genome, config, and PRNG seed, a run reproduces exactly.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! hidra = "0.1.0"
//! ```
//!
//! ```rust,no_run
//! use hidra::{Config, World};
//!
//! let mut world = World::new("", Config::default())?;
//! world.run_for(1_000);
//! # Ok::<(), hidra::WorldError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! hidra-types, hidra-config, hidra-rng   (foundation: ids, config, PRNG)
//!                 |
//! hidra-spatial, hidra-events            (infrastructure: neighbor index, event queue)
//!                 |
//! hidra-brain, hidra-synapse, hidra-bytecode   (per-neuron evaluators, edges, genome compiler)
//!                 |
//! hidra-world                             (World, the tick loop, the bytecode-to-API bridge)
//!                 |
//! hidra-persistence                       (World <-> JSON snapshot)
//! ```
//!
//! Each layer is also published as its own crate for selective use; this
//! umbrella crate just re-exports the pieces most callers need together.

pub use hidra_world::{Bridge, InputNode, MetricsSample, Neuron, OutputNode, World, WorldError, WorldSnapshot};

pub use hidra_brain::{Brain, BrainError, InputSource, OutputAction, OutputSlot};
pub use hidra_config::{Config, ConfigValidationError};
pub use hidra_rng::Rng;

pub use hidra_types::{
    ExecutionContext, GeneId, InputId, NeuronId, OutputId, Position, SignalType, SynapseId, SynapseSource, SynapseTarget,
};

pub use hidra_events::{Event, EventKind};
pub use hidra_spatial::SpatialHash;
pub use hidra_synapse::{Condition, ConditionTarget, Synapse, TemporalOperator};

pub use hidra_bytecode::compile_genome;

pub use hidra_persistence::{load_from_file, load_from_string, save_to_file, save_to_string, PersistenceError};

/// Commonly used types and functions, for a single glob import.
pub mod prelude {
    pub use crate::{
        compile_genome, load_from_file, load_from_string, save_to_file, save_to_string, Brain, Config, Event, EventKind,
        GeneId, InputId, NeuronId, OutputId, PersistenceError, Position, Rng, SignalType, Synapse, SynapseId,
        SynapseSource, SynapseTarget, World, WorldError,
    };
}
