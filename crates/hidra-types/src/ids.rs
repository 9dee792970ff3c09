// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Monotonically-assigned entity identifiers.
//!
//! All ids are 64-bit unsigned integers allocated by the `World`. A removed
//! entity's id is never reused; later-created entities of the same kind
//! always carry a strictly greater id.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

newtype_id!(NeuronId, "Identifier for a Neuron, stable across save/load.");
newtype_id!(SynapseId, "Identifier for a Synapse, stable across save/load.");
newtype_id!(InputId, "Identifier for an InputNode.");
newtype_id!(OutputId, "Identifier for an OutputNode.");

/// Identifier of a gene by its positional index in the genome.
///
/// Unlike the other ids above this is not allocated by the World; it is the
/// gene's position in the parsed genome and is bounded by the genome's gene
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GeneId(pub u32);

impl GeneId {
    pub const GENESIS: GeneId = GeneId(0);
    pub const GESTATION: GeneId = GeneId(1);
    pub const MITOSIS: GeneId = GeneId(2);
    pub const APOPTOSIS: GeneId = GeneId(3);
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The source or target of a synapse: either a Neuron or an external
/// terminal (InputNode on the source side, OutputNode on the target side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynapseSource {
    Neuron(NeuronId),
    Input(InputId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynapseTarget {
    Neuron(NeuronId),
    Output(OutputId),
}

/// The three target kinds a bridge `AddSynapse` call may create an edge
/// toward, per spec §4.H / §9 (the 3-variant form this spec adopts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Neuron,
    Output,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("integer {0} does not encode a valid {1}")]
pub struct InvalidEnumValue(pub i64, pub &'static str);
