// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Gene execution contexts (§4.H).

use serde::{Deserialize, Serialize};

/// The permission level under which a gene executes.
///
/// - `System`: Genesis (gene 0), may create neurons, retarget the system
///   target, perform mitosis.
/// - `Protected`: Gestation/Mitosis/Apoptosis hook genes (1..3); no mitosis,
///   no apoptosis, no creation.
/// - `General`: user genes; may perform mitosis and apoptosis but not
///   direct creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionContext {
    System,
    Protected,
    General,
}

impl ExecutionContext {
    pub fn can_create_neuron(self) -> bool {
        matches!(self, ExecutionContext::System)
    }

    pub fn can_set_system_target(self) -> bool {
        matches!(self, ExecutionContext::System)
    }

    /// Mitosis is forbidden in `Protected` context (spec §9 resolves the
    /// source's conflicting variants this way: hook genes must use explicit
    /// creation APIs instead).
    pub fn can_mitosis(self) -> bool {
        matches!(self, ExecutionContext::System | ExecutionContext::General)
    }

    pub fn can_apoptosis(self) -> bool {
        matches!(self, ExecutionContext::General)
    }
}
