// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

/*!
Synapses and their gating conditions (spec §4.E).

A `Synapse` owns only its own transmission state (weight, fatigue,
persistence, the previous-source-value latch); it has no reference to
`World` or any neuron, so this crate sits below `hidra-world` in the
dependency graph. Callers resolve whatever neuron/hormone data a
`Condition` needs into a borrowed [`ConditionContext`] each tick and hand it
in — the same "caller resolves, callee computes" split the teacher's
`feagi-synapse` crate uses to keep synapse logic free of connectome access.
*/

pub mod condition;

pub use condition::{Condition, ConditionContext, ConditionTarget, TemporalOperator};

use hidra_types::{Operator, SignalType, SynapseId, SynapseSource, SynapseTarget};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synapse {
    pub id: SynapseId,
    pub source: SynapseSource,
    pub target: SynapseTarget,
    pub weight: f32,
    pub signal_type: SignalType,
    /// Delay-ticks parameter for Delayed/Transient signals; unused by
    /// Immediate/Persistent.
    pub parameter: f32,
    pub condition: Option<Condition>,
    pub fatigue_level: f32,
    /// Growth-per-transmission and per-tick exponential decay share this
    /// single rate; `0.0` disables fatigue in both directions, matching
    /// "rate 0 disables fatigue" from spec §4.E.
    pub fatigue_rate: f32,
    pub previous_source_value: f32,
    pub persistent_value: f32,
}

impl Synapse {
    pub fn new(id: SynapseId, source: SynapseSource, target: SynapseTarget, weight: f32, signal_type: SignalType) -> Self {
        Self {
            id,
            source,
            target,
            weight,
            signal_type,
            parameter: 0.0,
            condition: None,
            fatigue_level: 0.0,
            fatigue_rate: 0.0,
            previous_source_value: 0.0,
            persistent_value: 0.0,
        }
    }

    /// Evaluates the synapse's condition, if any. An unconditional synapse
    /// always transmits.
    pub fn condition_holds(&mut self, ctx: &ConditionContext) -> bool {
        match &mut self.condition {
            Some(condition) => condition.evaluate(ctx),
            None => true,
        }
    }

    pub fn effective_weight(&self) -> f32 {
        self.weight * (1.0 - self.fatigue_level)
    }

    /// `source_value * weight * (1 - fatigue_level)` — the Immediate
    /// contribution to the target's dendritic potential.
    pub fn immediate_contribution(&self, source_value: f32) -> f32 {
        source_value * self.effective_weight()
    }

    /// `persistent_value * (1 - fatigue_level)`, applied every tick like
    /// Immediate once a Persistent synapse has latched a value.
    pub fn persistent_contribution(&self) -> f32 {
        self.persistent_value * (1.0 - self.fatigue_level)
    }

    /// Delay in ticks for a Delayed signal: `max(1, round(parameter))`.
    pub fn delayed_ticks(&self) -> u64 {
        (self.parameter.round() as i64).max(1) as u64
    }

    /// Delay in ticks for a Transient signal: `round(parameter)`, which may
    /// legally be `0` (same-tick, after the immediate phase).
    pub fn transient_ticks(&self) -> u64 {
        self.parameter.round().max(0.0) as u64
    }

    /// Latches `persistent_value` when the source neuron fires.
    pub fn on_source_fired(&mut self, activation_value: f32) {
        self.persistent_value = activation_value * self.weight;
    }

    pub fn clear_persistent(&mut self) {
        self.persistent_value = 0.0;
    }

    /// Records a transmission: grows `fatigue_level` by `fatigue_rate`,
    /// clamped to `1.0`.
    pub fn record_transmission(&mut self) {
        if self.fatigue_rate > 0.0 {
            self.fatigue_level = (self.fatigue_level + self.fatigue_rate).min(1.0);
        }
    }

    /// Per-tick exponential fatigue decay.
    pub fn decay_fatigue(&mut self) {
        if self.fatigue_rate > 0.0 {
            self.fatigue_level *= 1.0 - self.fatigue_rate;
        }
    }

    /// Updates the `previous_source_value` latch; spec §4.E requires this
    /// happen after condition evaluation each tick.
    pub fn update_previous_source_value(&mut self, value: f32) {
        self.previous_source_value = value;
    }

    pub fn set_signal_type(&mut self, signal_type: SignalType) {
        self.signal_type = signal_type;
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn set_condition(&mut self, condition: Option<Condition>) {
        self.condition = condition;
    }
}

/// Compares `lhs` to `rhs` with `op`, honoring the `1e-6` absolute epsilon
/// for `==`/`!=` that `Operator::apply` already implements.
pub fn compare(op: Operator, lhs: f32, rhs: f32) -> bool {
    op.apply(lhs, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidra_types::{NeuronId, OutputId};

    fn synapse() -> Synapse {
        Synapse::new(
            SynapseId(1),
            SynapseSource::Neuron(NeuronId(1)),
            SynapseTarget::Neuron(NeuronId(2)),
            2.0,
            SignalType::Immediate,
        )
    }

    #[test]
    fn immediate_contribution_applies_fatigue() {
        let mut s = synapse();
        s.fatigue_level = 0.5;
        assert!((s.immediate_contribution(4.0) - 4.0).abs() > 1e-6);
        assert!((s.immediate_contribution(4.0) - (4.0 * 2.0 * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn fatigue_grows_and_decays() {
        let mut s = synapse();
        s.fatigue_rate = 0.1;
        s.record_transmission();
        assert!((s.fatigue_level - 0.1).abs() < 1e-6);
        s.decay_fatigue();
        assert!(s.fatigue_level < 0.1);
    }

    #[test]
    fn zero_fatigue_rate_disables_fatigue() {
        let mut s = synapse();
        s.record_transmission();
        s.decay_fatigue();
        assert_eq!(s.fatigue_level, 0.0);
    }

    #[test]
    fn delayed_ticks_is_at_least_one() {
        let mut s = synapse();
        s.parameter = 0.3;
        assert_eq!(s.delayed_ticks(), 1);
        s.parameter = 0.0;
        assert_eq!(s.delayed_ticks(), 1);
        s.parameter = 2.6;
        assert_eq!(s.delayed_ticks(), 3);
    }

    #[test]
    fn transient_ticks_allows_zero() {
        let mut s = synapse();
        s.parameter = 0.0;
        assert_eq!(s.transient_ticks(), 0);
    }

    #[test]
    fn persistent_value_latches_on_fire_and_survives_until_cleared() {
        let mut s = synapse();
        s.on_source_fired(3.0);
        assert!((s.persistent_value - 6.0).abs() < 1e-6);
        assert!((s.persistent_contribution() - 6.0).abs() < 1e-6);
        s.clear_persistent();
        assert_eq!(s.persistent_value, 0.0);
    }

    #[test]
    fn unconditional_synapse_always_transmits() {
        let mut s = synapse();
        let ctx = ConditionContext {
            source_value: 0.0,
            previous_source_value: 0.0,
            source_lvars: None,
            target_lvars: None,
            gvars: &[0.0; 256],
        };
        assert!(s.condition_holds(&ctx));
    }

    #[test]
    fn target_kind_roundtrips_through_synapse_target() {
        let s = Synapse::new(
            SynapseId(2),
            SynapseSource::Input(hidra_types::InputId(0)),
            SynapseTarget::Output(OutputId(0)),
            1.0,
            SignalType::Delayed,
        );
        assert!(matches!(s.source, SynapseSource::Input(_)));
        assert!(matches!(s.target, SynapseTarget::Output(_)));
    }
}
