// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Migration helper for genomes encoded with the legacy signed 8-bit jump
//! displacement (spec §9 open question: this spec standardizes on signed
//! 16-bit little-endian). Rewrites a raw gene byte stream in place of the
//! old encoding, re-deriving every jump's displacement against the new,
//! wider instruction sizes rather than just zero-extending the byte.

use std::collections::HashMap;

use crate::decoder::{decode_with_jump_width, JumpTarget, JumpWidth, Operand};
use crate::opcodes;

/// Re-encodes `old_bytes` (decoded assuming 8-bit jump operands) into the
/// current 16-bit little-endian jump encoding. Non-jump instructions are
/// copied through unchanged; jump instructions grow from 2 bytes to 3.
/// Displacements are recomputed from absolute targets rather than merely
/// widened, since every later instruction's byte offset shifts.
pub fn migrate_8bit_jumps(old_bytes: &[u8]) -> Vec<u8> {
    let old_program = decode_with_jump_width(old_bytes, JumpWidth::Bits8);
    if old_program.instructions.is_empty() {
        return Vec::new();
    }

    // New offsets: every instruction keeps its size except jumps, which
    // grow by one operand byte.
    let mut new_offsets = HashMap::with_capacity(old_program.instructions.len());
    let mut cursor = 0usize;
    for (idx, instr) in old_program.instructions.iter().enumerate() {
        new_offsets.insert(idx, cursor);
        let new_size = if opcodes::is_jump(instr.opcode) { instr.size + 1 } else { instr.size };
        cursor += new_size;
    }
    let new_stream_len = cursor;

    let mut out = Vec::with_capacity(new_stream_len);
    for (idx, instr) in old_program.instructions.iter().enumerate() {
        out.push(instr.opcode);
        if opcodes::is_jump(instr.opcode) {
            let new_target = match old_program.jump_targets.get(&idx) {
                Some(JumpTarget::Instruction(target_idx)) => *new_offsets.get(target_idx).expect("target indexed") as i64,
                Some(JumpTarget::VirtualEnd) => new_stream_len as i64,
                None => {
                    // Invalid jump in the old encoding stays a dropped
                    // no-op: re-emit a displacement of 0 (jumps to just
                    // after itself), which decodes cleanly either way.
                    (new_offsets[&idx] + instr.size + 1) as i64
                }
            };
            let new_after = (new_offsets[&idx] + instr.size + 1) as i64;
            let disp = (new_target - new_after).clamp(i16::MIN as i64, i16::MAX as i64) as i16;
            out.extend_from_slice(&disp.to_le_bytes());
        } else if let Operand::Byte(b) = instr.operand {
            out.push(b);
        } else if let Operand::Float(f) = instr.operand {
            out.extend_from_slice(&f.to_le_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;

    #[test]
    fn migrates_a_forward_jump_preserving_its_target() {
        let jmp = opcodes::opcode_for_name("JMP").unwrap();
        let nop = opcodes::opcode_for_name("NOP").unwrap();
        // Old 8-bit encoding: JMP disp=1 (2-byte instr), NOP, NOP -> targets the second NOP.
        let old = vec![jmp, 1, nop, nop];
        let migrated = migrate_8bit_jumps(&old);

        let new_program = decode(&migrated);
        assert_eq!(new_program.instructions[0].opcode, jmp);
        assert_eq!(new_program.instructions[0].size, 3);
        // Should still resolve to the same logical NOP (instruction index 2).
        assert_eq!(new_program.jump_targets.get(&0), Some(&crate::decoder::JumpTarget::Instruction(2)));
    }

    #[test]
    fn empty_input_migrates_to_empty_output() {
        assert!(migrate_8bit_jumps(&[]).is_empty());
    }
}
