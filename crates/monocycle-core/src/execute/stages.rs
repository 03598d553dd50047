use crate::decoder::Instruction;
use crate::{Fault, Memory, RegisterFile};

use super::{ExecutionResult, MemoryAccess, PcUpdate, RegisterWrite};

/// Fetches the instruction word at `pc`.
///
/// # Errors
///
/// Returns [`Fault::InvalidInstructionAddress`] past the loaded program.
pub fn fetch(memory: &Memory, pc: u16) -> Result<u16, Fault> {
    memory.read_instruction(pc)
}

/// Checks every register operand of `instruction` against the register file.
///
/// # Errors
///
/// Returns [`Fault::InvalidRegisterIndex`] for the first operand that is out
/// of range.
pub fn validate(instruction: &Instruction, registers: &RegisterFile) -> Result<(), Fault> {
    instruction
        .register_operands()
        .map(|(_, index)| usize::from(index))
        .find(|index| *index >= registers.size())
        .map_or(Ok(()), |index| Err(Fault::InvalidRegisterIndex { index }))
}

/// Performs the requested data access and returns the final register write.
///
/// A load produces the register write carrying the loaded value; any other
/// instruction passes its computed write through unchanged.
///
/// # Errors
///
/// Returns [`Fault::InvalidDataAddress`] when the address leaves the data
/// region.
pub fn memory_access(
    result: &ExecutionResult,
    memory: &mut Memory,
) -> Result<Option<RegisterWrite>, Fault> {
    match result.memory_access {
        Some(MemoryAccess::Read { addr, dest }) => Ok(Some(RegisterWrite {
            index: dest,
            value: memory.read_data(addr)?,
        })),
        Some(MemoryAccess::Write { addr, value }) => {
            memory.write_data(addr, value)?;
            Ok(result.register_write)
        }
        None => Ok(result.register_write),
    }
}

/// Applies the final register write.
///
/// # Errors
///
/// Returns [`Fault::InvalidRegisterIndex`] for an out-of-range destination.
pub fn write_back(write: Option<RegisterWrite>, registers: &mut RegisterFile) -> Result<(), Fault> {
    match write {
        Some(RegisterWrite { index, value }) => registers.set(index, value),
        None => Ok(()),
    }
}

/// Computes the next program counter. Condition registers are read here,
/// after write-back.
///
/// # Errors
///
/// Returns [`Fault::InvalidRegisterIndex`] for an out-of-range condition
/// register.
pub fn next_pc(pc: u16, update: PcUpdate, registers: &RegisterFile) -> Result<u16, Fault> {
    let sequential = pc.wrapping_add(1);
    match update {
        PcUpdate::Sequential => Ok(sequential),
        PcUpdate::Jump { target } => Ok(target),
        PcUpdate::Conditional { condition, target } => {
            if registers.get(condition)? == 1 {
                Ok(target)
            } else {
                Ok(sequential)
            }
        }
    }
}
