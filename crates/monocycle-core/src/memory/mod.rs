//! Word-addressed memory with a fixed instruction region and data region.

/// Fetch and data address validation.
pub mod access;
/// Fixed memory-region map.
pub mod map;

pub use access::{data_address, validate_instruction_address};
pub use map::{DATA_END, DATA_START, INSTRUCTION_END, INSTRUCTION_START};

use crate::{Fault, LoadError};

/// Total number of 16-bit words in the address space.
pub const MEMORY_WORDS: usize = u16::MAX as usize + 1;
/// Absolute index of the first data word; relative data address `0` maps here.
pub const DATA_BASE: usize = DATA_START as usize;
/// Maximum number of program words the instruction region can hold.
pub const INSTRUCTION_CAPACITY: usize = DATA_BASE;

/// Flat 64 Ki-word store split into instruction and data regions.
///
/// Instruction fetches are bounded by the number of loaded words, not by the
/// region size. Data accesses use addresses relative to [`DATA_BASE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    words: Box<[u16]>,
    instruction_count: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Allocates zeroed memory with no program loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS].into_boxed_slice(),
            instruction_count: 0,
        }
    }

    /// Allocates memory and loads `program` into the instruction region.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TooLarge`] when `program` does not fit.
    pub fn with_program(program: &[u16]) -> Result<Self, LoadError> {
        let mut memory = Self::new();
        memory.load_program(program)?;
        Ok(memory)
    }

    /// Replaces the instruction stream and zeroes the data region.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TooLarge`] when `program` exceeds
    /// [`INSTRUCTION_CAPACITY`] words. Memory is left untouched on error.
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), LoadError> {
        if program.len() > INSTRUCTION_CAPACITY {
            return Err(LoadError::TooLarge {
                words: program.len(),
                capacity: INSTRUCTION_CAPACITY,
            });
        }
        self.words.fill(0);
        self.words[..program.len()].copy_from_slice(program);
        self.instruction_count = program.len();
        Ok(())
    }

    /// Number of loaded program words.
    #[must_use]
    pub const fn instruction_count(&self) -> usize {
        self.instruction_count
    }

    /// Loaded program words in address order.
    #[must_use]
    pub fn program(&self) -> &[u16] {
        &self.words[..self.instruction_count]
    }

    /// Fetches the instruction word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInstructionAddress`] when `addr` is not below
    /// the loaded instruction count.
    pub fn read_instruction(&self, addr: u16) -> Result<u16, Fault> {
        validate_instruction_address(addr, self.instruction_count)?;
        Ok(self.words[usize::from(addr)])
    }

    /// Reads the data word at relative address `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidDataAddress`] when the translated address
    /// leaves the data region.
    #[allow(clippy::cast_possible_wrap)]
    pub fn read_data(&self, addr: i32) -> Result<i16, Fault> {
        let index = data_address(addr)?;
        Ok(self.words[index] as i16)
    }

    /// Writes the data word at relative address `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidDataAddress`] when the translated address
    /// leaves the data region.
    #[allow(clippy::cast_sign_loss)]
    pub fn write_data(&mut self, addr: i32, value: i16) -> Result<(), Fault> {
        let index = data_address(addr)?;
        self.words[index] = value as u16;
        Ok(())
    }
}
