// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
Shared identifiers and value types for the Hidra simulation core.

Every other `hidra-*` crate depends on this one for entity identifiers,
the execution-context taxonomy, and the small value types (`Position`,
`Operator`, `SignalType`, `ActivationFunction`) that appear across the
bytecode, synapse, and world layers. Keeping them here avoids duplicate
definitions and the cyclic-dependency problems that come from scattering
them across the crates that happen to use them first.
*/

pub mod ids;
pub mod position;
pub mod context;
pub mod operator;
pub mod signal;
pub mod activation;
pub mod lvars;

pub use ids::*;
pub use position::Position;
pub use context::ExecutionContext;
pub use operator::Operator;
pub use signal::SignalType;
pub use activation::ActivationFunction;
pub use lvars::*;
