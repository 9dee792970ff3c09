// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! The MasterInstructionOrder (spec §4.F/§4.H): a single ordered list that
//! assigns opcode byte values positionally. Decoder and AST builder both
//! consult this table instead of hand-maintaining a byte-value mapping, so
//! the two stay byte-for-byte consistent by construction — the "generated
//! or hand-written table whose entries carry `(name, arity, returns_value,
//! fn_ptr)`" spec §9 calls for, minus the function pointer (dispatch lives
//! in `hidra-world`, which owns the bridge).

/// How an opcode's operand is encoded in the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// `PUSH_BYTE`: one unsigned byte literal.
    Byte,
    /// `PUSH_FLOAT`: IEEE-754 little-endian 32-bit.
    Float,
    /// Jump family: signed 16-bit little-endian displacement.
    Jump,
    /// API call: arguments come off the operand stack, not the byte stream.
    Api { arity: u8, returns_value: bool },
}

impl OperandKind {
    /// Bytes consumed after the opcode byte itself.
    pub fn operand_len(self) -> usize {
        match self {
            OperandKind::None | OperandKind::Api { .. } => 0,
            OperandKind::Byte => 1,
            OperandKind::Float => 4,
            OperandKind::Jump => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InstrSpec {
    pub name: &'static str,
    pub operand: OperandKind,
}

macro_rules! core {
    ($name:literal) => {
        InstrSpec { name: $name, operand: OperandKind::None }
    };
}

macro_rules! api {
    ($name:literal, $arity:literal, $returns:literal) => {
        InstrSpec { name: $name, operand: OperandKind::Api { arity: $arity, returns_value: $returns } }
    };
}

/// Positional opcode table. Index into this slice *is* the opcode byte
/// value; never reorder existing entries, only append.
pub const MASTER_INSTRUCTION_ORDER: &[InstrSpec] = &[
    core!("NOP"),
    InstrSpec { name: "PUSH_BYTE", operand: OperandKind::Byte },
    InstrSpec { name: "PUSH_FLOAT", operand: OperandKind::Float },
    core!("DUP"),
    core!("POP"),
    core!("ADD"),
    core!("SUB"),
    core!("MUL"),
    core!("DIV"),
    core!("LT"),
    core!("LE"),
    core!("GT"),
    core!("GE"),
    core!("EQ"),
    core!("NE"),
    InstrSpec { name: "JMP", operand: OperandKind::Jump },
    InstrSpec { name: "JZ", operand: OperandKind::Jump },
    InstrSpec { name: "JNZ", operand: OperandKind::Jump },
    InstrSpec { name: "JNE", operand: OperandKind::Jump },
    api!("StoreLVar", 2, false),
    api!("LoadLVar", 1, true),
    api!("StoreGVar", 2, false),
    api!("LoadGVar", 1, true),
    api!("GetSelfId", 0, true),
    api!("GetPosition", 1, true),
    api!("CreateNeuron", 3, true),
    api!("Mitosis", 3, true),
    api!("Apoptosis", 0, false),
    api!("CallGene", 1, false),
    api!("SetSystemTarget", 1, false),
    api!("AddSynapse", 5, true),
    api!("ModifySynapse", 4, false),
    api!("SetSynapseSimpleProperty", 3, false),
    api!("SetSynapseCondition", 5, false),
    api!("ClearSynapseCondition", 1, false),
    api!("GetNeighborCount", 1, true),
    api!("GetNearestNeighborId", 0, true),
    api!("GetNearestNeighborPosition", 1, true),
    api!("SetBrainType", 1, false),
    api!("ConfigureLogicGate", 2, false),
    api!("ClearBrain", 0, false),
    api!("AddBrainNode", 2, true),
    api!("AddBrainConnection", 3, true),
    api!("RemoveBrainNode", 1, false),
    api!("RemoveBrainConnection", 2, false),
    api!("ConfigureOutputNode", 3, false),
    api!("SetBrainInputSource", 3, false),
    api!("SetNodeActivationFunction", 2, false),
    api!("SetBrainConnectionWeight", 3, false),
    api!("SetBrainNodeProperty", 3, false),
    api!("SetRefractoryPeriod", 1, false),
    api!("SetThresholdAdaptation", 1, false),
    api!("GetFiringRate", 0, true),
    api!("CreateBrain_SimpleFeedForward", 3, false),
    api!("CreateBrain_Competitive", 2, false),
];

pub fn lookup(opcode: u8) -> Option<&'static InstrSpec> {
    MASTER_INSTRUCTION_ORDER.get(opcode as usize)
}

pub fn opcode_for_name(name: &str) -> Option<u8> {
    MASTER_INSTRUCTION_ORDER.iter().position(|s| s.name == name).map(|i| i as u8)
}

pub fn is_jump(opcode: u8) -> bool {
    matches!(lookup(opcode).map(|s| s.operand), Some(OperandKind::Jump))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves_back_to_its_own_opcode() {
        for (i, spec) in MASTER_INSTRUCTION_ORDER.iter().enumerate() {
            assert_eq!(opcode_for_name(spec.name), Some(i as u8));
        }
    }

    #[test]
    fn jump_family_is_exactly_four_opcodes() {
        let count = MASTER_INSTRUCTION_ORDER.iter().filter(|s| matches!(s.operand, OperandKind::Jump)).count();
        assert_eq!(count, 4);
    }
}
