use thiserror::Error;

use crate::state::registers::REGISTER_COUNT;

/// Fault classes used for diagnostics aggregation and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Register operand outside the register file.
    Register,
    /// Instruction fetch or data access outside its region.
    Memory,
    /// Arithmetic that has no defined result.
    Arithmetic,
    /// Opcode field that names no operation.
    Decode,
    /// Binary program could not be turned into an instruction stream.
    Load,
    /// Host service request that could not be completed.
    Syscall,
}

/// Stable fault taxonomy shared by every pipeline stage and the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum FaultCode {
    /// Register index outside `0..REGISTER_COUNT`.
    #[error("invalid register index")]
    InvalidRegisterIndex = 0x01,
    /// Program counter outside the loaded instruction stream.
    #[error("invalid instruction address")]
    InvalidInstructionAddress = 0x02,
    /// Data address outside the data region.
    #[error("invalid data address")]
    InvalidDataAddress = 0x03,
    /// `div` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero = 0x04,
    /// Format R opcode with no assigned operation.
    #[error("unknown format R opcode")]
    UnknownOpcodeR = 0x05,
    /// Format I opcode with no assigned operation.
    #[error("unknown format I opcode")]
    UnknownOpcodeI = 0x06,
    /// Binary file unreadable, misnamed or malformed.
    #[error("binary load format error")]
    LoadFormat = 0x07,
    /// Syscall service failed while running.
    #[error("syscall fault")]
    SyscallFault = 0x08,
}

impl FaultCode {
    /// Converts a fault code to its stable byte value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable byte value back into a fault code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::InvalidRegisterIndex),
            0x02 => Some(Self::InvalidInstructionAddress),
            0x03 => Some(Self::InvalidDataAddress),
            0x04 => Some(Self::DivisionByZero),
            0x05 => Some(Self::UnknownOpcodeR),
            0x06 => Some(Self::UnknownOpcodeI),
            0x07 => Some(Self::LoadFormat),
            0x08 => Some(Self::SyscallFault),
            _ => None,
        }
    }

    /// Returns the diagnostics class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::InvalidRegisterIndex => FaultClass::Register,
            Self::InvalidInstructionAddress | Self::InvalidDataAddress => FaultClass::Memory,
            Self::DivisionByZero => FaultClass::Arithmetic,
            Self::UnknownOpcodeR | Self::UnknownOpcodeI => FaultClass::Decode,
            Self::LoadFormat => FaultClass::Load,
            Self::SyscallFault => FaultClass::Syscall,
        }
    }
}

/// Runtime fault raised by a pipeline stage, carrying the offending operand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// Register index outside the register file.
    #[error(
        "invalid register index: {index} (must be between 0 and {max})",
        max = REGISTER_COUNT - 1
    )]
    InvalidRegisterIndex {
        /// Offending index.
        index: usize,
    },
    /// Fetch from outside the loaded instruction stream.
    #[error("invalid instruction address: {addr} ({loaded} instructions loaded)")]
    InvalidInstructionAddress {
        /// Program counter used for the fetch.
        addr: u16,
        /// Number of loaded instructions.
        loaded: usize,
    },
    /// Data access outside the data region.
    #[error("invalid data address: {addr}")]
    InvalidDataAddress {
        /// Address relative to the data-region base.
        addr: i32,
    },
    /// Divisor register held zero.
    #[error("division by zero: R{rs2} = 0")]
    DivisionByZero {
        /// Divisor register index.
        rs2: u8,
    },
    /// Format R opcode with no assigned operation.
    #[error("unknown format R opcode: {opcode}")]
    UnknownOpcodeR {
        /// Raw 6-bit opcode.
        opcode: u8,
    },
    /// Format I opcode with no assigned operation.
    #[error("unknown format I opcode: {opcode}")]
    UnknownOpcodeI {
        /// Raw 2-bit opcode.
        opcode: u8,
    },
    /// A syscall service hit a fault while running.
    #[error("syscall service {service} failed: {source}")]
    Syscall {
        /// Service selector read from `R0`.
        service: i16,
        /// Underlying fault.
        #[source]
        source: Box<Fault>,
    },
    /// A syscall service received an argument it cannot honour.
    #[error("syscall service {service} rejected argument {argument}")]
    SyscallArgument {
        /// Service selector read from `R0`.
        service: i16,
        /// Offending argument read from `R1`.
        argument: i16,
    },
}

impl Fault {
    /// Returns the stable code for this fault.
    #[must_use]
    pub const fn code(&self) -> FaultCode {
        match self {
            Self::InvalidRegisterIndex { .. } => FaultCode::InvalidRegisterIndex,
            Self::InvalidInstructionAddress { .. } => FaultCode::InvalidInstructionAddress,
            Self::InvalidDataAddress { .. } => FaultCode::InvalidDataAddress,
            Self::DivisionByZero { .. } => FaultCode::DivisionByZero,
            Self::UnknownOpcodeR { .. } => FaultCode::UnknownOpcodeR,
            Self::UnknownOpcodeI { .. } => FaultCode::UnknownOpcodeI,
            Self::Syscall { .. } | Self::SyscallArgument { .. } => FaultCode::SyscallFault,
        }
    }
}

/// A fault together with the cycle and program counter that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("error in cycle {cycle}: {fault}")]
pub struct CycleFault {
    /// One-based cycle number.
    pub cycle: u32,
    /// Program counter of the faulting instruction.
    pub pc: u16,
    /// The fault itself.
    #[source]
    pub fault: Fault,
}
