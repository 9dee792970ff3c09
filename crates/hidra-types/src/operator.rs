// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Comparison operators shared by synapse conditions and the bytecode's
//! comparison opcodes.

use serde::{Deserialize, Serialize};

/// Absolute epsilon used for floating-point `==`/`!=` comparisons
/// throughout condition evaluation (spec §4.E).
pub const FLOAT_EQ_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Operator {
    pub fn apply(self, lhs: f32, rhs: f32) -> bool {
        match self {
            Operator::Lt => lhs < rhs,
            Operator::Le => lhs <= rhs,
            Operator::Eq => (lhs - rhs).abs() <= FLOAT_EQ_EPSILON,
            Operator::Ne => (lhs - rhs).abs() > FLOAT_EQ_EPSILON,
            Operator::Ge => lhs >= rhs,
            Operator::Gt => lhs > rhs,
        }
    }

    /// Decode from the small integer tag used by bridge arguments and
    /// persisted documents, with the bridge's "unknown enum values are
    /// rejected" convention (returns `None`, never wraps).
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(Operator::Lt),
            1 => Some(Operator::Le),
            2 => Some(Operator::Eq),
            3 => Some(Operator::Ne),
            4 => Some(Operator::Ge),
            5 => Some(Operator::Gt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_uses_epsilon() {
        assert!(Operator::Eq.apply(1.0, 1.0 + 1e-7));
        assert!(!Operator::Eq.apply(1.0, 1.1));
    }

    #[test]
    fn unknown_tag_rejected() {
        assert_eq!(Operator::from_tag(99), None);
    }
}
