use std::fmt;

use crate::Fault;

/// Number of architecturally visible registers (`R0..R7`).
pub const REGISTER_COUNT: usize = 8;
/// Register holding the syscall service selector by software convention.
pub const SERVICE_REGISTER: usize = 0;
/// Register holding the syscall argument and result by software convention.
pub const ARGUMENT_REGISTER: usize = 1;

/// Eight independently addressable 16-bit signed registers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    regs: [i16; REGISTER_COUNT],
}

impl RegisterFile {
    /// Creates a zeroed register file.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regs: [0; REGISTER_COUNT],
        }
    }

    /// Reads a register.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidRegisterIndex`] when `index` is not in `0..8`.
    pub fn get(&self, index: usize) -> Result<i16, Fault> {
        self.regs
            .get(index)
            .copied()
            .ok_or(Fault::InvalidRegisterIndex { index })
    }

    /// Writes a register.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidRegisterIndex`] when `index` is not in `0..8`.
    pub fn set(&mut self, index: usize, value: i16) -> Result<(), Fault> {
        let slot = self
            .regs
            .get_mut(index)
            .ok_or(Fault::InvalidRegisterIndex { index })?;
        *slot = value;
        Ok(())
    }

    /// Zeroes every register.
    pub fn reset(&mut self) {
        self.regs = [0; REGISTER_COUNT];
    }

    /// Number of registers; always [`REGISTER_COUNT`].
    #[must_use]
    pub const fn size(&self) -> usize {
        REGISTER_COUNT
    }

    /// Copies out all register values in index order.
    #[must_use]
    pub const fn values(&self) -> [i16; REGISTER_COUNT] {
        self.regs
    }

    /// Takes a diagnostic snapshot. Observational only.
    #[must_use]
    pub const fn dump(&self) -> RegisterDump {
        RegisterDump { values: self.regs }
    }
}

/// Printable snapshot of the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterDump {
    /// Register values in index order.
    pub values: [i16; REGISTER_COUNT],
}

impl fmt::Display for RegisterDump {
    #[allow(clippy::cast_sign_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Registers ===")?;
        for (index, value) in self.values.iter().enumerate() {
            writeln!(f, "R{index}: {value:>6} (0x{:04X})", *value as u16)?;
        }
        Ok(())
    }
}
