//! Per-cycle instruction execution.
//!
//! A cycle runs these stages strictly in order:
//! 1. Fetch the word at `pc`
//! 2. Decode (total)
//! 3. Validate register operands
//! 4. Execute into an immutable [`ExecutionResult`]
//! 5. Memory access, producing the final register write
//! 6. Write-back
//! 7. PC update, reading any condition register after write-back
//!
//! Execute never mutates registers or memory. Every effect it wants is
//! described by the returned result and applied by the later stages.

mod stages;
mod syscall;

pub use stages::{fetch, memory_access, next_pc, validate, write_back};

use std::time::Duration;

use crate::decoder::{IFields, Instruction, RFields};
use crate::encoding::{classify_i_opcode, classify_r_opcode, IOpcode, ROpcode};
use crate::{Fault, Memory, RegisterFile, SyscallHost};

/// Value destined for a register at write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterWrite {
    /// Destination register index.
    pub index: usize,
    /// Value to store.
    pub value: i16,
}

/// Data memory operation requested by execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemoryAccess {
    /// Load the word at `addr` into register `dest`.
    Read {
        /// Data-relative address.
        addr: i32,
        /// Destination register index.
        dest: usize,
    },
    /// Store `value` at `addr`.
    Write {
        /// Data-relative address.
        addr: i32,
        /// Value to store.
        value: i16,
    },
}

/// How the program counter moves at the end of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PcUpdate {
    /// Advance to `pc + 1`.
    #[default]
    Sequential,
    /// Jump unconditionally.
    Jump {
        /// Absolute target instruction index.
        target: u16,
    },
    /// Jump when register `condition` holds exactly `1`.
    Conditional {
        /// Condition register index.
        condition: usize,
        /// Absolute target instruction index.
        target: u16,
    },
}

/// Side effect a syscall asks the host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HostEffect {
    /// Write program output text.
    Emit(String),
    /// Block for the given duration.
    Suspend(Duration),
}

/// Immutable description of everything one instruction wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ExecutionResult {
    /// Register write computed by execute; loads fill theirs at memory access.
    pub register_write: Option<RegisterWrite>,
    /// Data memory operation.
    pub memory_access: Option<MemoryAccess>,
    /// Program counter directive.
    pub pc_update: PcUpdate,
    /// Host side effect requested by a syscall.
    pub host_effect: Option<HostEffect>,
    /// Stop the run after this cycle completes.
    pub terminate: bool,
    /// Fault recorded by execute; fatal once the cycle completes.
    pub fault: Option<Fault>,
}

impl ExecutionResult {
    /// Result that only advances the program counter.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Result that writes `value` into register `index`.
    #[must_use]
    pub fn write(index: usize, value: i16) -> Self {
        Self {
            register_write: Some(RegisterWrite { index, value }),
            ..Self::default()
        }
    }

    /// Result carrying a fault and no other effect.
    #[must_use]
    pub fn faulted(fault: Fault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::default()
        }
    }
}

/// Executes a decoded instruction against read-only state.
///
/// Faults are recorded in the returned result rather than propagated, so the
/// caller decides which later stages still run.
#[must_use]
pub fn execute_instruction(
    instruction: &Instruction,
    registers: &RegisterFile,
    memory: &Memory,
    host: &dyn SyscallHost,
) -> ExecutionResult {
    let outcome = match *instruction {
        Instruction::R(fields) => execute_r(fields, registers, memory, host),
        Instruction::I(fields) => execute_i(fields),
    };
    outcome.unwrap_or_else(ExecutionResult::faulted)
}

fn execute_r(
    fields: RFields,
    registers: &RegisterFile,
    memory: &Memory,
    host: &dyn SyscallHost,
) -> Result<ExecutionResult, Fault> {
    let op = classify_r_opcode(fields.opcode).ok_or(Fault::UnknownOpcodeR {
        opcode: fields.opcode,
    })?;
    let rd = usize::from(fields.rd);
    let a = registers.get(usize::from(fields.rs1))?;
    let b = registers.get(usize::from(fields.rs2))?;

    let result = match op {
        ROpcode::Add => ExecutionResult::write(rd, a.wrapping_add(b)),
        ROpcode::Sub => ExecutionResult::write(rd, a.wrapping_sub(b)),
        ROpcode::Mul => ExecutionResult::write(rd, a.wrapping_mul(b)),
        ROpcode::Div => {
            if b == 0 {
                return Err(Fault::DivisionByZero { rs2: fields.rs2 });
            }
            ExecutionResult::write(rd, a.wrapping_div(b))
        }
        ROpcode::CmpEq => ExecutionResult::write(rd, i16::from(a == b)),
        ROpcode::CmpNe => ExecutionResult::write(rd, i16::from(a != b)),
        ROpcode::Load => ExecutionResult {
            memory_access: Some(MemoryAccess::Read {
                addr: i32::from(a),
                dest: rd,
            }),
            ..ExecutionResult::default()
        },
        ROpcode::Store => ExecutionResult {
            memory_access: Some(MemoryAccess::Write {
                addr: i32::from(a),
                value: b,
            }),
            ..ExecutionResult::default()
        },
        ROpcode::Syscall => syscall::dispatch(registers, memory, host)?,
    };
    Ok(result)
}

fn execute_i(fields: IFields) -> Result<ExecutionResult, Fault> {
    let op = classify_i_opcode(fields.opcode).ok_or(Fault::UnknownOpcodeI {
        opcode: fields.opcode,
    })?;
    let target = fields.immediate_unsigned();

    let result = match op {
        IOpcode::Jump => ExecutionResult {
            pc_update: PcUpdate::Jump { target },
            ..ExecutionResult::default()
        },
        IOpcode::JumpCond => ExecutionResult {
            pc_update: PcUpdate::Conditional {
                condition: usize::from(fields.rd),
                target,
            },
            ..ExecutionResult::default()
        },
        IOpcode::MovImm => {
            ExecutionResult::write(usize::from(fields.rd), fields.immediate_signed())
        }
    };
    Ok(result)
}
