// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Combinational logic gate / clocked flip-flop brain (spec §4.D), the
//! lightweight alternative to a full `NeuralNetwork` for genomes that only
//! need a boolean function of their inputs.

use hidra_rng::Rng;
use serde::{Deserialize, Serialize};

use crate::{BrainError, InputSource, OutputSlot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GateType {
    Buffer,
    Not,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlipFlop {
    D,
    T,
    Jk,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicGate {
    pub gate_type: GateType,
    /// `None` for a purely combinational gate; `Some` makes inputs[0] the
    /// clock and evaluation state-holding (edge-triggered).
    pub flip_flop: Option<FlipFlop>,
    pub threshold: f32,
    pub input_map: Vec<InputSource>,
    pub output: OutputSlot,
    #[serde(default)]
    state: f32,
    #[serde(default)]
    previous_clock: f32,
}

impl LogicGate {
    pub fn new_combinational(gate_type: GateType, threshold: f32, input_map: Vec<InputSource>, output: OutputSlot) -> Self {
        Self { gate_type, flip_flop: None, threshold, input_map, output, state: 0.0, previous_clock: 0.0 }
    }

    pub fn new_flip_flop(flip_flop: FlipFlop, threshold: f32, input_map: Vec<InputSource>, output: OutputSlot) -> Self {
        Self { gate_type: GateType::Buffer, flip_flop: Some(flip_flop), threshold, input_map, output, state: 0.0, previous_clock: 0.0 }
    }

    fn binarize(&self, inputs: &[f32]) -> Vec<bool> {
        inputs.iter().map(|&v| v >= self.threshold).collect()
    }

    /// Reduces `bits` to a single boolean per `gate_type`. A single input is
    /// a special case: NOT/NAND/NOR invert it, everything else passes it
    /// through unchanged — the multi-input reductions below only make sense
    /// with two or more operands.
    fn combine(gate_type: GateType, bits: &[bool]) -> bool {
        if bits.is_empty() {
            return false;
        }
        if bits.len() == 1 {
            return match gate_type {
                GateType::Not | GateType::Nand | GateType::Nor => !bits[0],
                _ => bits[0],
            };
        }
        match gate_type {
            GateType::Buffer | GateType::Not => bits[0],
            GateType::And => bits.iter().all(|&b| b),
            GateType::Or => bits.iter().any(|&b| b),
            GateType::Nand => !bits.iter().all(|&b| b),
            GateType::Nor => !bits.iter().any(|&b| b),
            GateType::Xor => bits.iter().filter(|&&b| b).count() % 2 == 1,
            GateType::Xnor => bits.iter().filter(|&&b| b).count() % 2 == 0,
        }
    }

    pub fn evaluate(&mut self, inputs: &[f32]) -> Result<(), BrainError> {
        if inputs.len() != self.input_map.len() {
            return Err(BrainError::InputCountMismatch { expected: self.input_map.len(), actual: inputs.len() });
        }
        let bits = self.binarize(inputs);

        match self.flip_flop {
            None => {
                self.state = if Self::combine(self.gate_type, &bits) { 1.0 } else { 0.0 };
            }
            Some(ff) => {
                let clock = inputs.first().copied().unwrap_or(0.0);
                let rising_edge = clock >= self.threshold && self.previous_clock < self.threshold;
                self.previous_clock = clock;
                if rising_edge {
                    let d = bits.get(1).copied().unwrap_or(false);
                    match ff {
                        FlipFlop::D => self.state = if d { 1.0 } else { 0.0 },
                        FlipFlop::T => {
                            if d {
                                self.state = if self.state != 0.0 { 0.0 } else { 1.0 };
                            }
                        }
                        FlipFlop::Jk => {
                            let j = d;
                            let k = bits.get(2).copied().unwrap_or(false);
                            self.state = match (j, k) {
                                (false, false) => self.state,
                                (false, true) => 0.0,
                                (true, false) => 1.0,
                                (true, true) => if self.state != 0.0 { 0.0 } else { 1.0 },
                            };
                        }
                    }
                }
            }
        }

        self.output.value = self.state;
        Ok(())
    }

    /// Clears flip-flop memory and the previous-clock latch. Combinational
    /// gates have nothing to reset beyond `output.value`, which `evaluate`
    /// overwrites unconditionally anyway.
    pub fn reset(&mut self) {
        self.state = 0.0;
        self.previous_clock = 0.0;
        self.output.value = 0.0;
    }

    /// Perturbs the binarization threshold by `(u * 2 - 1) * rate`.
    pub fn mutate(&mut self, rate: f32, rng: &mut Rng) {
        self.threshold += (rng.next_f32_unit() * 2.0 - 1.0) * rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidra_types::OutputId;
    use crate::OutputAction;

    fn slot() -> OutputSlot {
        OutputSlot { action: OutputAction::SetOutputValue(OutputId(0)), value: 0.0 }
    }

    #[test]
    fn and_gate_requires_all_inputs_high() {
        let mut gate = LogicGate::new_combinational(
            GateType::And,
            0.5,
            vec![InputSource::ActivationPotential, InputSource::ActivationPotential],
            slot(),
        );
        gate.evaluate(&[1.0, 1.0]).unwrap();
        assert_eq!(gate.output.value, 1.0);
        gate.evaluate(&[1.0, 0.0]).unwrap();
        assert_eq!(gate.output.value, 0.0);
    }

    #[test]
    fn xor_gate_is_odd_parity() {
        let mut gate = LogicGate::new_combinational(
            GateType::Xor,
            0.5,
            vec![InputSource::ActivationPotential, InputSource::ActivationPotential, InputSource::ActivationPotential],
            slot(),
        );
        gate.evaluate(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(gate.output.value, 1.0);
        gate.evaluate(&[1.0, 1.0, 0.0]).unwrap();
        assert_eq!(gate.output.value, 0.0);
    }

    #[test]
    fn single_input_not_inverts() {
        let mut gate = LogicGate::new_combinational(GateType::Not, 0.5, vec![InputSource::ActivationPotential], slot());
        gate.evaluate(&[1.0]).unwrap();
        assert_eq!(gate.output.value, 0.0);
        gate.evaluate(&[0.0]).unwrap();
        assert_eq!(gate.output.value, 1.0);
    }

    #[test]
    fn d_flip_flop_latches_only_on_rising_edge() {
        let mut gate = LogicGate::new_flip_flop(
            FlipFlop::D,
            0.5,
            vec![InputSource::ActivationPotential, InputSource::ActivationPotential],
            slot(),
        );
        // Clock low, data high: no change.
        gate.evaluate(&[0.0, 1.0]).unwrap();
        assert_eq!(gate.output.value, 0.0);
        // Rising edge with data high: latches.
        gate.evaluate(&[1.0, 1.0]).unwrap();
        assert_eq!(gate.output.value, 1.0);
        // Clock still high (no edge), data drops: holds.
        gate.evaluate(&[1.0, 0.0]).unwrap();
        assert_eq!(gate.output.value, 1.0);
    }

    #[test]
    fn t_flip_flop_toggles_on_rising_edge_when_enabled() {
        let mut gate = LogicGate::new_flip_flop(
            FlipFlop::T,
            0.5,
            vec![InputSource::ActivationPotential, InputSource::ActivationPotential],
            slot(),
        );
        gate.evaluate(&[1.0, 1.0]).unwrap();
        assert_eq!(gate.output.value, 1.0);
        gate.evaluate(&[0.0, 1.0]).unwrap();
        gate.evaluate(&[1.0, 1.0]).unwrap();
        assert_eq!(gate.output.value, 0.0);
    }

    #[test]
    fn evaluate_rejects_wrong_input_count() {
        let mut gate = LogicGate::new_combinational(GateType::Or, 0.5, vec![InputSource::ActivationPotential], slot());
        assert!(gate.evaluate(&[1.0, 2.0]).is_err());
    }
}
