//! Instruction disassembly for debug listings.

use std::fmt;

use crate::decoder::{Decoder, Instruction};
use crate::encoding::{classify_i_opcode, classify_r_opcode, IOpcode, ROpcode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Instruction address.
    pub addr: u16,
    /// Raw instruction word.
    pub raw: u16,
    /// The instruction mnemonic (e.g., "add", "mov", "syscall").
    pub mnemonic: String,
    /// The formatted operands (e.g., "r1, r2, r3" or "r1, -3").
    pub operands: String,
    /// Whether the opcode is unassigned.
    pub is_illegal: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}: {:04X}  {}", self.addr, self.raw, self.mnemonic)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands)?;
        }
        Ok(())
    }
}

/// Disassembles one instruction word. Total over every word.
#[must_use]
pub fn disassemble(addr: u16, raw: u16) -> DisassemblyRow {
    let instruction = Decoder::decode(raw);
    match render(instruction) {
        Some((mnemonic, operands)) => DisassemblyRow {
            addr,
            raw,
            mnemonic: mnemonic.to_string(),
            operands,
            is_illegal: false,
        },
        None => DisassemblyRow {
            addr,
            raw,
            mnemonic: ".word".to_string(),
            operands: format!("0x{raw:04X} ; ILLEGAL"),
            is_illegal: true,
        },
    }
}

/// Disassembles a whole program starting at address 0.
#[must_use]
pub fn disassemble_program(words: &[u16]) -> Vec<DisassemblyRow> {
    (0_u16..)
        .zip(words)
        .map(|(addr, raw)| disassemble(addr, *raw))
        .collect()
}

fn render(instruction: Instruction) -> Option<(&'static str, String)> {
    match instruction {
        Instruction::R(r) => {
            let op = classify_r_opcode(r.opcode)?;
            let operands = match op {
                ROpcode::Load => format!("r{}, [r{}]", r.rd, r.rs1),
                ROpcode::Store => format!("[r{}], r{}", r.rs1, r.rs2),
                ROpcode::Syscall => String::new(),
                _ => format!("r{}, r{}, r{}", r.rd, r.rs1, r.rs2),
            };
            Some((op.mnemonic(), operands))
        }
        Instruction::I(i) => {
            let op = classify_i_opcode(i.opcode)?;
            let operands = match op {
                IOpcode::Jump => format!("{}", i.immediate_unsigned()),
                IOpcode::JumpCond => format!("r{}, {}", i.rd, i.immediate_unsigned()),
                IOpcode::MovImm => format!("r{}, {}", i.rd, i.immediate_signed()),
            };
            Some((op.mnemonic(), operands))
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = disassemble(0, self.encode());
        if row.operands.is_empty() {
            f.write_str(&row.mnemonic)
        } else {
            write!(f, "{} {}", row.mnemonic, row.operands)
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::{disassemble, disassemble_program};
    use crate::decoder::Decoder;

    #[rstest]
    #[case((1 << 6) | (2 << 3) | 3, "add", "r1, r2, r3")]
    #[case((3 << 9) | (4 << 6) | (5 << 3) | 6, "div", "r4, r5, r6")]
    #[case((5 << 9) | (1 << 6), "cmp_neq", "r1, r0, r0")]
    #[case((15 << 9) | (1 << 6) | (2 << 3), "load", "r1, [r2]")]
    #[case((16 << 9) | (1 << 3) | 2, "store", "[r1], r2")]
    #[case(63 << 9, "syscall", "")]
    #[case(0x8005, "jump", "5")]
    #[case(0xA000 | (2 << 10) | 5, "jump_cond", "r2, 5")]
    #[case(0xE000 | (1 << 10) | 0x3FD, "mov", "r1, -3")]
    fn disassembles_assigned_opcodes(
        #[case] raw: u16,
        #[case] mnemonic: &str,
        #[case] operands: &str,
    ) {
        let row = disassemble(0, raw);
        assert_eq!(row.mnemonic, mnemonic);
        assert_eq!(row.operands, operands);
        assert!(!row.is_illegal);
    }

    #[test]
    fn unassigned_opcodes_render_as_words() {
        let row = disassemble(3, 6 << 9);
        assert!(row.is_illegal);
        assert_eq!(row.mnemonic, ".word");
        assert_eq!(row.operands, "0x0C00 ; ILLEGAL");

        let row = disassemble(4, 0xC000);
        assert!(row.is_illegal);
        assert_eq!(row.operands, "0xC000 ; ILLEGAL");
    }

    #[test]
    fn program_rows_carry_sequential_addresses() {
        let rows = disassemble_program(&[0xE441, 0xE003, 63 << 9]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].to_string(), "0000: E441  mov r1, 65");
        assert_eq!(rows[1].to_string(), "0001: E003  mov r0, 3");
        assert_eq!(rows[2].to_string(), "0002: 7E00  syscall");
    }

    #[test]
    fn instruction_display_matches_row_text() {
        assert_eq!(Decoder::decode(0xE441).to_string(), "mov r1, 65");
        assert_eq!(Decoder::decode(63 << 9).to_string(), "syscall");
    }

    proptest! {
        #[test]
        fn disassembly_is_total(raw in any::<u16>()) {
            let row = disassemble(0, raw);
            prop_assert_eq!(row.raw, raw);
            prop_assert!(!row.mnemonic.is_empty());
        }
    }
}
