// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Synapse gating conditions (spec §4.E). A `Condition` tree is evaluated
//! fresh each tick against a caller-supplied [`ConditionContext`]; the only
//! state a condition carries itself is the `Sustained` variant's run-length
//! counter, which lives on the `Temporal` node so nested composites each
//! track their own.

use hidra_types::Operator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConditionTarget {
    Source,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TemporalOperator {
    RisingEdge,
    FallingEdge,
    Changed,
    Sustained,
}

/// Data a condition needs to evaluate itself, resolved by the caller (the
/// world tick loop) from whichever neurons/hormones are in scope. `None`
/// for `source_lvars`/`target_lvars` models a missing or non-neuron
/// (Input/Output) endpoint, which spec §4.E requires to evaluate as false.
pub struct ConditionContext<'a> {
    pub source_value: f32,
    /// The synapse's `previous_source_value` latch from before this tick's
    /// update, needed by `Temporal` conditions.
    pub previous_source_value: f32,
    pub source_lvars: Option<&'a [f32]>,
    pub target_lvars: Option<&'a [f32]>,
    pub gvars: &'a [f32],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Condition {
    LVar { target: ConditionTarget, lvar_index: usize, operator: Operator, value: f32 },
    GVar { gvar_index: usize, operator: Operator, value: f32 },
    Relational { operator: Operator },
    Temporal { operator: TemporalOperator, threshold: f32, duration: u32, #[serde(default)] sustained_counter: u32 },
    Composite { is_and: bool, sub: Vec<Condition> },
}

impl Condition {
    pub fn evaluate(&mut self, ctx: &ConditionContext) -> bool {
        match self {
            Condition::LVar { target, lvar_index, operator, value } => {
                let lvars = match target {
                    ConditionTarget::Source => ctx.source_lvars,
                    ConditionTarget::Target => ctx.target_lvars,
                };
                match lvars.and_then(|l| l.get(*lvar_index)) {
                    Some(&lvar_value) => operator.apply(lvar_value, *value),
                    None => false,
                }
            }
            Condition::GVar { gvar_index, operator, value } => match ctx.gvars.get(*gvar_index) {
                Some(&gvar_value) => operator.apply(gvar_value, *value),
                None => false,
            },
            Condition::Relational { operator } => match ctx.target_lvars {
                Some(lvars) => {
                    let dendritic = lvars.get(hidra_types::LVAR_DENDRITIC_POTENTIAL).copied().unwrap_or(0.0);
                    let soma = lvars.get(hidra_types::LVAR_SOMA_POTENTIAL).copied().unwrap_or(0.0);
                    operator.apply(ctx.source_value, dendritic + soma)
                }
                None => false,
            },
            Condition::Temporal { operator, threshold, duration, sustained_counter } => {
                evaluate_temporal(*operator, *threshold, *duration, sustained_counter, ctx.source_value, ctx.previous_source_value)
            }
            Condition::Composite { is_and, sub } => {
                if sub.is_empty() {
                    return true;
                }
                if *is_and {
                    sub.iter_mut().all(|c| c.evaluate(ctx))
                } else {
                    sub.iter_mut().any(|c| c.evaluate(ctx))
                }
            }
        }
    }
}

fn evaluate_temporal(operator: TemporalOperator, threshold: f32, duration: u32, counter: &mut u32, current: f32, previous: f32) -> bool {
    match operator {
        TemporalOperator::RisingEdge => previous < threshold && current >= threshold,
        TemporalOperator::FallingEdge => previous >= threshold && current < threshold,
        TemporalOperator::Changed => (current - previous).abs() > threshold,
        TemporalOperator::Sustained => {
            if current >= threshold {
                *counter += 1;
            } else {
                *counter = 0;
            }
            *counter >= duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(source_value: f32) -> ConditionContext<'static> {
        ConditionContext { source_value, previous_source_value: 0.0, source_lvars: None, target_lvars: None, gvars: &[] }
    }

    #[test]
    fn temporal_rising_edge_detects_crossing() {
        let mut c = Condition::Temporal { operator: TemporalOperator::RisingEdge, threshold: 0.5, duration: 0, sustained_counter: 0 };
        let mut below = ctx(0.2);
        below.previous_source_value = 0.1;
        assert!(!c.evaluate(&below));
        let mut rising = ctx(0.8);
        rising.previous_source_value = 0.1;
        assert!(c.evaluate(&rising));
    }

    #[test]
    fn temporal_sustained_counts_consecutive_ticks() {
        let mut c = Condition::Temporal { operator: TemporalOperator::Sustained, threshold: 0.5, duration: 3, sustained_counter: 0 };
        assert!(!c.evaluate(&ctx(1.0)));
        assert!(!c.evaluate(&ctx(1.0)));
        assert!(c.evaluate(&ctx(1.0)));
        assert!(!c.evaluate(&ctx(0.0)));
    }

    #[test]
    fn empty_composite_is_true() {
        let mut c = Condition::Composite { is_and: true, sub: vec![] };
        assert!(c.evaluate(&ctx(0.0)));
    }

    #[test]
    fn composite_and_requires_all() {
        let mut c = Condition::Composite {
            is_and: true,
            sub: vec![
                Condition::GVar { gvar_index: 0, operator: Operator::Ge, value: 0.0 },
                Condition::GVar { gvar_index: 0, operator: Operator::Lt, value: 0.0 },
            ],
        };
        assert!(!c.evaluate(&ctx(0.0)));
    }

    #[test]
    fn missing_target_lvars_is_false() {
        let mut c = Condition::LVar { target: ConditionTarget::Target, lvar_index: 0, operator: Operator::Eq, value: 1.0 };
        assert!(!c.evaluate(&ctx(0.0)));
    }

    #[test]
    fn gvar_out_of_bounds_is_false() {
        let mut c = Condition::GVar { gvar_index: 5, operator: Operator::Eq, value: 0.0 };
        assert!(!c.evaluate(&ctx(0.0)));
    }
}
