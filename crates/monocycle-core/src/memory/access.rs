//! Address validation for instruction fetch and data access.

use crate::{Fault, DATA_BASE, MEMORY_WORDS};

/// Validates that `addr` names one of the `loaded` program words.
///
/// # Errors
///
/// Returns [`Fault::InvalidInstructionAddress`] when `addr >= loaded`.
pub const fn validate_instruction_address(addr: u16, loaded: usize) -> Result<(), Fault> {
    if (addr as usize) < loaded {
        Ok(())
    } else {
        Err(Fault::InvalidInstructionAddress { addr, loaded })
    }
}

/// Translates a data-relative address into an absolute word index.
///
/// The relative address is added to [`DATA_BASE`]; the result must fall in
/// `[DATA_BASE, MEMORY_WORDS)`.
///
/// # Errors
///
/// Returns [`Fault::InvalidDataAddress`] carrying the relative address when
/// the translated index leaves the data region.
#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
pub const fn data_address(addr: i32) -> Result<usize, Fault> {
    let absolute = DATA_BASE as i64 + addr as i64;
    if absolute >= DATA_BASE as i64 && absolute < MEMORY_WORDS as i64 {
        Ok(absolute as usize)
    } else {
        Err(Fault::InvalidDataAddress { addr })
    }
}
