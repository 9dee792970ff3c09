// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Synapse signal types (spec §4.E).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    /// Continuous, same-tick transmission driven by the live source value.
    Immediate,
    /// One pulse scheduled `max(1, round(parameter))` ticks after the
    /// source neuron fires.
    Delayed,
    /// Latches `activation_value * weight` on firing, then transmits it
    /// like `Immediate` every subsequent tick until reset.
    Persistent,
    /// A one-shot delayed pulse; `parameter` may be 0.
    Transient,
}

impl SignalType {
    /// Decode from the small integer tag bridge callers pass. Signal type is
    /// an enum value, not a typed index, so an out-of-range tag is rejected
    /// (returns `None`) rather than wrapped via modulus fallback.
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(SignalType::Immediate),
            1 => Some(SignalType::Delayed),
            2 => Some(SignalType::Persistent),
            3 => Some(SignalType::Transient),
            _ => None,
        }
    }

    pub fn to_tag(self) -> i64 {
        match self {
            SignalType::Immediate => 0,
            SignalType::Delayed => 1,
            SignalType::Persistent => 2,
            SignalType::Transient => 3,
        }
    }
}
