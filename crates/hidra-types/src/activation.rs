// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Neural network node activation functions (spec §4.D).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Tanh,
    Linear,
    Sigmoid,
    ReLU,
}

impl ActivationFunction {
    pub fn apply(self, x: f32) -> f32 {
        match self {
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Linear => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::ReLU => x.max(0.0),
        }
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(ActivationFunction::Tanh),
            1 => Some(ActivationFunction::Linear),
            2 => Some(ActivationFunction::Sigmoid),
            3 => Some(ActivationFunction::ReLU),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clamps_negatives() {
        assert_eq!(ActivationFunction::ReLU.apply(-3.0), 0.0);
        assert_eq!(ActivationFunction::ReLU.apply(3.0), 3.0);
    }

    #[test]
    fn sigmoid_midpoint() {
        assert!((ActivationFunction::Sigmoid.apply(0.0) - 0.5).abs() < 1e-6);
    }
}
