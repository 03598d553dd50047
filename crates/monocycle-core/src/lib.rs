//! Core emulator crate for the monocycle 16-bit processor.

/// Word-addressed memory and fixed region map.
pub mod memory;
pub use memory::{
    data_address, validate_instruction_address, Memory, DATA_BASE, DATA_END, DATA_START,
    INSTRUCTION_CAPACITY, INSTRUCTION_END, INSTRUCTION_START, MEMORY_WORDS,
};

/// Public host-facing configuration and outcome types.
pub mod api;
pub use api::{
    EngineConfig, RunOutcome, StepOutcome, DEFAULT_MAX_CYCLES, DEFAULT_PROGRESS_INTERVAL,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{
    RegisterDump, RegisterFile, RunState, ARGUMENT_REGISTER, REGISTER_COUNT, SERVICE_REGISTER,
};

/// Opcode tables and format selection.
pub mod encoding;
pub use encoding::{
    classify_i_opcode, classify_r_opcode, format_of, IOpcode, InstructionFormat, ROpcode,
    I_OPCODE_TABLE, R_OPCODE_TABLE,
};

/// Total instruction decoder.
pub mod decoder;
pub use decoder::{Decoder, IFields, Instruction, RFields, RegisterOperand};

/// Debug disassembly.
pub mod disasm;
pub use disasm::{disassemble, disassemble_program, DisassemblyRow};

/// Fault taxonomy shared by the pipeline and the loader.
pub mod fault;
pub use fault::{CycleFault, Fault, FaultClass, FaultCode};

/// Binary program loader.
pub mod loader;
pub use loader::{decode_words, encode_words, load_program, LoadError, PROGRAM_EXTENSION};

/// Host services for syscalls.
pub mod host;
pub use host::{RecordingHost, SyscallHost};

/// Per-cycle execution stages.
pub mod execute;
pub use execute::{
    execute_instruction, ExecutionResult, HostEffect, MemoryAccess, PcUpdate, RegisterWrite,
};

/// Execution engine and run loop.
pub mod engine;
pub use engine::Engine;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
