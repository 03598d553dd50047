/// Instruction format selected by bit 15 of the instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InstructionFormat {
    /// Three-register format (bit 15 clear).
    R,
    /// Register plus 10-bit immediate format (bit 15 set).
    I,
}

/// Bit that selects [`InstructionFormat::I`] when set.
pub const FORMAT_BIT: u16 = 0x8000;

/// Returns the format of an instruction word.
#[must_use]
pub const fn format_of(word: u16) -> InstructionFormat {
    if word & FORMAT_BIT == 0 {
        InstructionFormat::R
    } else {
        InstructionFormat::I
    }
}

/// Assigned format R opcodes (bits 14..9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ROpcode {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    CmpEq = 4,
    CmpNe = 5,
    Load = 15,
    Store = 16,
    Syscall = 63,
}

/// Assigned format I opcodes (bits 14..13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum IOpcode {
    Jump = 0,
    JumpCond = 1,
    MovImm = 3,
}

/// Single source-of-truth format R table: `(opcode, operation)`.
///
/// Any opcode not present here is unknown by definition.
pub const R_OPCODE_TABLE: &[(u8, ROpcode)] = &[
    (0, ROpcode::Add),
    (1, ROpcode::Sub),
    (2, ROpcode::Mul),
    (3, ROpcode::Div),
    (4, ROpcode::CmpEq),
    (5, ROpcode::CmpNe),
    (15, ROpcode::Load),
    (16, ROpcode::Store),
    (63, ROpcode::Syscall),
];

/// Single source-of-truth format I table: `(opcode, operation)`.
///
/// Opcode 2 is unassigned.
pub const I_OPCODE_TABLE: &[(u8, IOpcode)] = &[
    (0, IOpcode::Jump),
    (1, IOpcode::JumpCond),
    (3, IOpcode::MovImm),
];

/// Returns the assigned format R operation for a 6-bit opcode.
#[must_use]
pub fn classify_r_opcode(opcode: u8) -> Option<ROpcode> {
    R_OPCODE_TABLE
        .iter()
        .find_map(|(entry, op)| (*entry == opcode).then_some(*op))
}

/// Returns the assigned format I operation for a 2-bit opcode.
#[must_use]
pub fn classify_i_opcode(opcode: u8) -> Option<IOpcode> {
    I_OPCODE_TABLE
        .iter()
        .find_map(|(entry, op)| (*entry == opcode).then_some(*op))
}

impl ROpcode {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::CmpEq => "cmp_eq",
            Self::CmpNe => "cmp_neq",
            Self::Load => "load",
            Self::Store => "store",
            Self::Syscall => "syscall",
        }
    }
}

impl IOpcode {
    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Jump => "jump",
            Self::JumpCond => "jump_cond",
            Self::MovImm => "mov",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::{
        classify_i_opcode, classify_r_opcode, format_of, IOpcode, InstructionFormat, ROpcode,
        I_OPCODE_TABLE, R_OPCODE_TABLE,
    };

    #[test]
    fn tables_contain_unique_opcodes() {
        let r: HashSet<_> = R_OPCODE_TABLE.iter().map(|(op, _)| *op).collect();
        let i: HashSet<_> = I_OPCODE_TABLE.iter().map(|(op, _)| *op).collect();
        assert_eq!(r.len(), R_OPCODE_TABLE.len());
        assert_eq!(i.len(), I_OPCODE_TABLE.len());
    }

    #[test]
    fn table_values_match_enum_discriminants() {
        for (opcode, op) in R_OPCODE_TABLE {
            assert_eq!(*op as u8, *opcode);
        }
        for (opcode, op) in I_OPCODE_TABLE {
            assert_eq!(*op as u8, *opcode);
        }
    }

    #[test]
    fn mnemonics_are_unique_across_formats() {
        let names: HashSet<_> = R_OPCODE_TABLE
            .iter()
            .map(|(_, op)| op.mnemonic())
            .chain(I_OPCODE_TABLE.iter().map(|(_, op)| op.mnemonic()))
            .collect();
        assert_eq!(names.len(), R_OPCODE_TABLE.len() + I_OPCODE_TABLE.len());
    }

    #[rstest]
    #[case(0, Some(ROpcode::Add))]
    #[case(3, Some(ROpcode::Div))]
    #[case(5, Some(ROpcode::CmpNe))]
    #[case(6, None)]
    #[case(14, None)]
    #[case(15, Some(ROpcode::Load))]
    #[case(16, Some(ROpcode::Store))]
    #[case(17, None)]
    #[case(62, None)]
    #[case(63, Some(ROpcode::Syscall))]
    fn r_opcode_lookup(#[case] opcode: u8, #[case] expected: Option<ROpcode>) {
        assert_eq!(classify_r_opcode(opcode), expected);
    }

    #[rstest]
    #[case(0, Some(IOpcode::Jump))]
    #[case(1, Some(IOpcode::JumpCond))]
    #[case(2, None)]
    #[case(3, Some(IOpcode::MovImm))]
    fn i_opcode_lookup(#[case] opcode: u8, #[case] expected: Option<IOpcode>) {
        assert_eq!(classify_i_opcode(opcode), expected);
    }

    #[test]
    fn format_is_selected_by_top_bit() {
        assert_eq!(format_of(0x0000), InstructionFormat::R);
        assert_eq!(format_of(0x7FFF), InstructionFormat::R);
        assert_eq!(format_of(0x8000), InstructionFormat::I);
        assert_eq!(format_of(0xFFFF), InstructionFormat::I);
    }
}
