// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Linear bytecode decoder (spec §4.F).

use std::collections::HashMap;

use crate::opcodes::{self, OperandKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    None,
    Byte(u8),
    Float(f32),
    Jump(i16),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    pub byte_offset: usize,
    pub opcode: u8,
    pub operand: Operand,
    pub size: usize,
}

/// A jump's resolved target: either a concrete instruction index or the
/// "virtual end" sentinel for a displacement landing exactly at end of
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpTarget {
    Instruction(usize),
    VirtualEnd,
}

#[derive(Debug, Clone, Default)]
pub struct DecodedProgram {
    pub instructions: Vec<Instruction>,
    /// Instruction index (of a jump instruction) -> resolved target.
    /// Jumps with no entry here targeted an invalid offset and were
    /// dropped (logged), so callers must treat their absence as a no-op.
    pub jump_targets: HashMap<usize, JumpTarget>,
    /// Inverse of `jump_targets`: target -> sources that jump to it.
    pub incoming: HashMap<JumpTarget, Vec<usize>>,
}

/// Decodes `bytes` using the current (16-bit jump) encoding.
pub fn decode(bytes: &[u8]) -> DecodedProgram {
    decode_with_jump_width(bytes, JumpWidth::Bits16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JumpWidth {
    Bits8,
    Bits16,
}

impl JumpWidth {
    fn operand_len(self) -> usize {
        match self {
            JumpWidth::Bits8 => 1,
            JumpWidth::Bits16 => 2,
        }
    }
}

/// Shared decode core, parameterized over jump operand width so
/// `migrate_8bit_jumps` can reuse it to read the legacy 8-bit encoding.
pub(crate) fn decode_with_jump_width(bytes: &[u8], jump_width: JumpWidth) -> DecodedProgram {
    let mut instructions = Vec::new();
    let mut offset_to_index = HashMap::new();
    let mut pc = 0usize;

    while pc < bytes.len() {
        let opcode = bytes[pc];
        let spec = match opcodes::lookup(opcode) {
            Some(s) => s,
            None => {
                tracing::warn!(byte_offset = pc, opcode, "unknown opcode, stopping decode");
                break;
            }
        };

        let operand_len = match spec.operand {
            OperandKind::Jump => jump_width.operand_len(),
            other => other.operand_len(),
        };
        let total_len = 1 + operand_len;
        if pc + total_len > bytes.len() {
            tracing::warn!(byte_offset = pc, opcode, "truncated trailing instruction, stopping decode");
            break;
        }

        let operand = match spec.operand {
            OperandKind::None | OperandKind::Api { .. } => Operand::None,
            OperandKind::Byte => Operand::Byte(bytes[pc + 1]),
            OperandKind::Float => {
                let raw: [u8; 4] = bytes[pc + 1..pc + 5].try_into().unwrap();
                Operand::Float(f32::from_le_bytes(raw))
            }
            OperandKind::Jump => {
                let disp = match jump_width {
                    JumpWidth::Bits16 => {
                        let raw: [u8; 2] = bytes[pc + 1..pc + 3].try_into().unwrap();
                        i16::from_le_bytes(raw)
                    }
                    JumpWidth::Bits8 => bytes[pc + 1] as i8 as i16,
                };
                Operand::Jump(disp)
            }
        };

        offset_to_index.insert(pc, instructions.len());
        instructions.push(Instruction { byte_offset: pc, opcode, operand, size: total_len });
        pc += total_len;
    }

    let decoded_end = instructions.last().map(|i| i.byte_offset + i.size).unwrap_or(0);

    let mut jump_targets = HashMap::new();
    let mut incoming: HashMap<JumpTarget, Vec<usize>> = HashMap::new();
    for (idx, instr) in instructions.iter().enumerate() {
        if let Operand::Jump(disp) = instr.operand {
            let after = (instr.byte_offset + instr.size) as i64;
            let target_offset = after + disp as i64;
            let target = if target_offset == decoded_end as i64 {
                Some(JumpTarget::VirtualEnd)
            } else if target_offset >= 0 {
                offset_to_index.get(&(target_offset as usize)).copied().map(JumpTarget::Instruction)
            } else {
                None
            };
            match target {
                Some(t) => {
                    jump_targets.insert(idx, t);
                    incoming.entry(t).or_default().push(idx);
                }
                None => {
                    tracing::warn!(instruction_index = idx, "jump targets invalid offset, dropping (no-op)");
                }
            }
        }
    }

    DecodedProgram { instructions, jump_targets, incoming }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_push_byte_and_arithmetic() {
        // PUSH_BYTE 5, PUSH_BYTE 3, ADD
        let push_byte = opcodes::opcode_for_name("PUSH_BYTE").unwrap();
        let add = opcodes::opcode_for_name("ADD").unwrap();
        let bytes = vec![push_byte, 5, push_byte, 3, add];
        let program = decode(&bytes);
        assert_eq!(program.instructions.len(), 3);
        assert_eq!(program.instructions[2].opcode, add);
    }

    #[test]
    fn truncated_trailing_instruction_stops_cleanly() {
        let push_float = opcodes::opcode_for_name("PUSH_FLOAT").unwrap();
        let bytes = vec![push_float, 1, 2]; // needs 4 operand bytes, only 2 given
        let program = decode(&bytes);
        assert!(program.instructions.is_empty());
    }

    #[test]
    fn jump_to_end_of_stream_resolves_to_virtual_end() {
        let jmp = opcodes::opcode_for_name("JMP").unwrap();
        // JMP with displacement 0 jumps to right after itself, i.e. end of stream.
        let bytes = vec![jmp, 0, 0];
        let program = decode(&bytes);
        assert_eq!(program.jump_targets.get(&0), Some(&JumpTarget::VirtualEnd));
    }

    #[test]
    fn jump_to_invalid_offset_is_dropped() {
        let jmp = opcodes::opcode_for_name("JMP").unwrap();
        let nop = opcodes::opcode_for_name("NOP").unwrap();
        // Displacement of 1 lands mid-instruction (not an instruction boundary).
        let bytes = vec![jmp, 1, 0, nop];
        let program = decode(&bytes);
        assert!(program.jump_targets.get(&0).is_none());
    }

    #[test]
    fn unknown_opcode_stops_decode() {
        let bytes = vec![255u8];
        let program = decode(&bytes);
        assert!(program.instructions.is_empty());
    }
}
