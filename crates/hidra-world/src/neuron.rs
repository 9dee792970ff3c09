// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! A single neuron's durable state (spec §3): position, the 256 local
//! variable slots, its owned synapses, and its brain.

use hidra_brain::Brain;
use hidra_config::Config;
use hidra_types::{lvars::*, NeuronId, Position, SynapseId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neuron {
    pub id: NeuronId,
    pub position: Position,
    pub is_active: bool,
    /// 256 local variable slots. Kept as a `Vec` rather than `[f32; 256]`
    /// so it serializes with plain `serde` (no const-generic array support
    /// needed) while still being index-addressable like the fixed-size
    /// slot array spec §3 describes.
    pub local_variables: Vec<f32>,
    pub owned_synapses: Vec<SynapseId>,
    pub brain: Option<Brain>,
}

impl Neuron {
    pub fn new(id: NeuronId, position: Position, config: &Config) -> Self {
        let mut local_variables = vec![0.0; LVAR_COUNT];
        local_variables[LVAR_SOMA_POTENTIAL] = config.initial_potential;
        local_variables[LVAR_HEALTH] = config.initial_neuron_health;
        local_variables[LVAR_REFRACTORY_PERIOD] = config.default_refractory_period;
        local_variables[LVAR_THRESHOLD_ADAPTATION_FACTOR] = config.default_threshold_adaptation_factor;
        local_variables[LVAR_THRESHOLD_RECOVERY_RATE] = config.default_threshold_recovery_rate;
        Self { id, position, is_active: true, local_variables, owned_synapses: Vec::new(), brain: None }
    }

    pub fn lvar(&self, index: usize) -> f32 {
        self.local_variables.get(index).copied().unwrap_or(0.0)
    }

    pub fn set_lvar(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.local_variables.get_mut(index) {
            *slot = value;
        }
    }

    pub fn soma_potential(&self) -> f32 {
        self.lvar(LVAR_SOMA_POTENTIAL)
    }

    pub fn set_soma_potential(&mut self, value: f32) {
        self.set_lvar(LVAR_SOMA_POTENTIAL, value);
    }

    pub fn dendritic_potential(&self) -> f32 {
        self.lvar(LVAR_DENDRITIC_POTENTIAL)
    }

    pub fn set_dendritic_potential(&mut self, value: f32) {
        self.set_lvar(LVAR_DENDRITIC_POTENTIAL, value);
    }

    pub fn health(&self) -> f32 {
        self.lvar(LVAR_HEALTH)
    }

    pub fn age(&self) -> f32 {
        self.lvar(LVAR_AGE)
    }

    pub fn refractory_time_left(&self) -> f32 {
        self.lvar(LVAR_REFRACTORY_TIME_LEFT)
    }

    pub fn refractory_period(&self) -> f32 {
        self.lvar(LVAR_REFRACTORY_PERIOD)
    }

    pub fn adaptive_threshold(&self) -> f32 {
        self.lvar(LVAR_ADAPTIVE_THRESHOLD)
    }

    pub fn firing_rate(&self) -> f32 {
        self.lvar(LVAR_FIRING_RATE)
    }
}
