//! Instruction decoder for the two monocycle word formats.
//!
//! Decoding is total: every 16-bit word yields an [`Instruction`]. Opcode
//! assignment and register bounds are checked by later pipeline stages.

use crate::encoding::{format_of, InstructionFormat, FORMAT_BIT};

/// Width mask of a register field.
const REG_MASK: u16 = 0x7;
/// Width mask of the format R opcode field.
const R_OPCODE_MASK: u16 = 0x3F;
/// Width mask of the format I opcode field.
const I_OPCODE_MASK: u16 = 0x3;
/// Width mask of the format I immediate field.
pub const IMMEDIATE_MASK: u16 = 0x3FF;
/// Sign bit of the 10-bit immediate.
const IMMEDIATE_SIGN: u16 = 0x200;
/// Bits set when sign-extending a negative immediate to 16 bits.
const IMMEDIATE_EXTENSION: u16 = 0xFC00;

/// Fields of a three-register instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RFields {
    /// Six-bit opcode (bits 14..9).
    pub opcode: u8,
    /// Destination register (bits 8..6).
    pub rd: u8,
    /// First source register (bits 5..3).
    pub rs1: u8,
    /// Second source register (bits 2..0).
    pub rs2: u8,
}

/// Fields of a register-plus-immediate instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IFields {
    /// Two-bit opcode (bits 14..13).
    pub opcode: u8,
    /// Destination or condition register (bits 12..10).
    pub rd: u8,
    /// Raw 10-bit immediate (bits 9..0).
    pub immediate: u16,
}

impl IFields {
    /// Immediate as an unsigned value in `0..=1023`.
    #[must_use]
    pub const fn immediate_unsigned(self) -> u16 {
        self.immediate & IMMEDIATE_MASK
    }

    /// Immediate sign-extended from bit 9 to 16 bits.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn immediate_signed(self) -> i16 {
        let raw = self.immediate & IMMEDIATE_MASK;
        if raw & IMMEDIATE_SIGN == 0 {
            raw as i16
        } else {
            (raw | IMMEDIATE_EXTENSION) as i16
        }
    }
}

/// Role of a register operand within an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RegisterOperand {
    Rd,
    Rs1,
    Rs2,
}

/// Decoded instruction; the variant carries only the fields its format has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Instruction {
    /// Format R instruction.
    R(RFields),
    /// Format I instruction.
    I(IFields),
}

impl Instruction {
    /// Word format of this instruction.
    #[must_use]
    pub const fn format(self) -> InstructionFormat {
        match self {
            Self::R(_) => InstructionFormat::R,
            Self::I(_) => InstructionFormat::I,
        }
    }

    /// Raw opcode field.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::R(fields) => fields.opcode,
            Self::I(fields) => fields.opcode,
        }
    }

    /// Destination (or condition) register field.
    #[must_use]
    pub const fn rd(self) -> u8 {
        match self {
            Self::R(fields) => fields.rd,
            Self::I(fields) => fields.rd,
        }
    }

    /// Register operands present in this format, in field order.
    pub fn register_operands(self) -> impl Iterator<Item = (RegisterOperand, u8)> {
        let fields = match self {
            Self::R(r) => [
                Some((RegisterOperand::Rd, r.rd)),
                Some((RegisterOperand::Rs1, r.rs1)),
                Some((RegisterOperand::Rs2, r.rs2)),
            ],
            Self::I(i) => [Some((RegisterOperand::Rd, i.rd)), None, None],
        };
        fields.into_iter().flatten()
    }

    /// Re-packs the fields into a raw instruction word.
    #[must_use]
    pub const fn encode(self) -> u16 {
        match self {
            Self::R(r) => {
                ((r.opcode as u16 & R_OPCODE_MASK) << 9)
                    | ((r.rd as u16 & REG_MASK) << 6)
                    | ((r.rs1 as u16 & REG_MASK) << 3)
                    | (r.rs2 as u16 & REG_MASK)
            }
            Self::I(i) => {
                FORMAT_BIT
                    | ((i.opcode as u16 & I_OPCODE_MASK) << 13)
                    | ((i.rd as u16 & REG_MASK) << 10)
                    | (i.immediate & IMMEDIATE_MASK)
            }
        }
    }
}

/// Stateless instruction decoder.
pub struct Decoder;

impl Decoder {
    /// Splits a raw word into its format fields. Never fails.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decode(word: u16) -> Instruction {
        match format_of(word) {
            InstructionFormat::R => Instruction::R(RFields {
                opcode: ((word >> 9) & R_OPCODE_MASK) as u8,
                rd: ((word >> 6) & REG_MASK) as u8,
                rs1: ((word >> 3) & REG_MASK) as u8,
                rs2: (word & REG_MASK) as u8,
            }),
            InstructionFormat::I => Instruction::I(IFields {
                opcode: ((word >> 13) & I_OPCODE_MASK) as u8,
                rd: ((word >> 10) & REG_MASK) as u8,
                immediate: word & IMMEDIATE_MASK,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Decoder, IFields, Instruction, RFields, RegisterOperand};
    use crate::encoding::InstructionFormat;

    #[test]
    fn decode_format_r_fields() {
        // add r1, r2, r3
        let word = (1 << 6) | (2 << 3) | 3;
        assert_eq!(
            Decoder::decode(word),
            Instruction::R(RFields {
                opcode: 0,
                rd: 1,
                rs1: 2,
                rs2: 3
            })
        );

        let syscall = Decoder::decode(63 << 9);
        assert_eq!(syscall.format(), InstructionFormat::R);
        assert_eq!(syscall.opcode(), 63);
    }

    #[test]
    fn decode_bare_format_bit_is_jump_zero() {
        assert_eq!(
            Decoder::decode(0x8000),
            Instruction::I(IFields {
                opcode: 0,
                rd: 0,
                immediate: 0
            })
        );
    }

    #[test]
    fn decode_format_i_fields() {
        // mov r1, 65
        let word = 0x8000 | (3 << 13) | (1 << 10) | 65;
        let Instruction::I(fields) = Decoder::decode(word) else {
            panic!("expected format I");
        };
        assert_eq!(fields.opcode, 3);
        assert_eq!(fields.rd, 1);
        assert_eq!(fields.immediate_unsigned(), 65);
        assert_eq!(fields.immediate_signed(), 65);
    }

    #[test]
    fn immediate_sign_extension_follows_bit_nine() {
        let fields = |immediate| IFields {
            opcode: 3,
            rd: 0,
            immediate,
        };
        assert_eq!(fields(0x3FF).immediate_signed(), -1);
        assert_eq!(fields(0x3FF).immediate_unsigned(), 1023);
        assert_eq!(fields(0x1FF).immediate_signed(), 511);
        assert_eq!(fields(0x200).immediate_signed(), -512);
        assert_eq!(fields(0).immediate_signed(), 0);
    }

    #[test]
    fn register_operands_follow_format() {
        let r = Decoder::decode((4 << 6) | (5 << 3) | 6);
        assert_eq!(
            r.register_operands().collect::<Vec<_>>(),
            vec![
                (RegisterOperand::Rd, 4),
                (RegisterOperand::Rs1, 5),
                (RegisterOperand::Rs2, 6)
            ]
        );

        let i = Decoder::decode(0x8000 | (7 << 10));
        assert_eq!(
            i.register_operands().collect::<Vec<_>>(),
            vec![(RegisterOperand::Rd, 7)]
        );
    }

    #[test]
    fn decode_is_total_over_every_word() {
        for word in 0_u16..=u16::MAX {
            let instruction = Decoder::decode(word);
            assert_eq!(instruction.encode(), word);
            assert_eq!(instruction.format() == InstructionFormat::I, word >= 0x8000);
            assert!(instruction.rd() < 8);
        }
    }

    proptest! {
        #[test]
        fn decode_is_deterministic(word in any::<u16>()) {
            prop_assert_eq!(Decoder::decode(word), Decoder::decode(word));
        }

        #[test]
        fn signed_and_unsigned_immediates_agree_modulo_1024(immediate in 0_u16..1024) {
            let fields = IFields { opcode: 0, rd: 0, immediate };
            let signed = i32::from(fields.immediate_signed());
            prop_assert_eq!(signed.rem_euclid(1024), i32::from(fields.immediate_unsigned()));
            prop_assert!((-512..512).contains(&signed));
        }
    }
}
