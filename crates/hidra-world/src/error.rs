// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("config validation failed: {0}")]
    Config(#[from] hidra_config::ConfigValidationError),
    #[error("gene fuel exhausted during interpretation of gene {gene_id} for neuron {neuron_id}")]
    FuelExhausted { gene_id: u32, neuron_id: u64 },
}
