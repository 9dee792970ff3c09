// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! The `Config` snapshot type and its defaults.
//!
//! Every field here corresponds to one of the "Configuration (recognized
//! options)" named in spec §6.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metabolic_tax_per_tick: f32,
    pub initial_neuron_health: f32,
    pub initial_potential: f32,
    pub default_decay_rate: f32,
    pub default_firing_threshold: f32,
    pub default_refractory_period: f32,
    pub default_threshold_adaptation_factor: f32,
    pub default_threshold_recovery_rate: f32,
    pub firing_rate_ma_weight: f32,

    pub competition_radius: f32,
    pub crowding_factor: f32,

    pub system_gene_count: u32,
    pub default_gene_fuel: u32,

    pub deterministic: bool,
    pub seed0: u64,
    pub seed1: u64,
    pub auto_reseed_per_run: bool,

    pub metrics_enabled: bool,
    pub metrics_collection_interval: u64,
    pub metrics_ring_capacity: usize,
    pub metrics_lvar_indices: Vec<usize>,
    pub metrics_neuron_sample_rate: f32,
    pub metrics_include_synapses: bool,
    pub metrics_include_io: bool,

    /// Writable lvar index boundary; see spec §3. Indices `>= this value`
    /// are read-only to user gene code.
    pub user_lvar_writable_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metabolic_tax_per_tick: 0.001,
            initial_neuron_health: 1.0,
            initial_potential: 0.0,
            default_decay_rate: 0.9,
            default_firing_threshold: 1.0,
            default_refractory_period: 2.0,
            default_threshold_adaptation_factor: 0.05,
            default_threshold_recovery_rate: 0.01,
            firing_rate_ma_weight: 0.1,

            competition_radius: 5.0,
            crowding_factor: 1.0,

            system_gene_count: 4,
            default_gene_fuel: 10_000,

            deterministic: true,
            seed0: 0x9E3779B97F4A7C15,
            seed1: 0xBF58476D1CE4E5B9,
            auto_reseed_per_run: false,

            metrics_enabled: false,
            metrics_collection_interval: 100,
            metrics_ring_capacity: 256,
            metrics_lvar_indices: Vec::new(),
            metrics_neuron_sample_rate: 1.0,
            metrics_include_synapses: false,
            metrics_include_io: false,

            user_lvar_writable_limit: 64,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), crate::ConfigValidationError> {
        crate::validation::validate_config(self)
    }
}
