//! Architectural CPU state model primitives.

/// Register file storage and diagnostic dump.
pub mod registers;
/// Engine-level execution state machine.
pub mod run_state;

pub use registers::{
    RegisterDump, RegisterFile, ARGUMENT_REGISTER, REGISTER_COUNT, SERVICE_REGISTER,
};
pub use run_state::RunState;
