//! Binary program loader.
//!
//! A program file holds 16-bit instruction words, two bytes each in
//! little-endian order, and must carry a `.bin` extension.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::memory::INSTRUCTION_CAPACITY;
use crate::FaultCode;

/// Required program file extension, compared case-insensitively.
pub const PROGRAM_EXTENSION: &str = "bin";

/// Failure to turn a file into an instruction stream.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read.
    #[error("cannot read program {}: {source}", .path.display())]
    Io {
        /// Requested path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// File name does not end in `.bin`.
    #[error("program {} must have a .bin extension", .path.display())]
    Extension {
        /// Requested path.
        path: PathBuf,
    },
    /// Byte count is not a whole number of words.
    #[error("program size {len} bytes is odd; expected 16-bit words")]
    OddSize {
        /// File length in bytes.
        len: usize,
    },
    /// Program would overlap the data region.
    #[error("program of {words} words exceeds the {capacity}-word instruction region")]
    TooLarge {
        /// Program length in words.
        words: usize,
        /// Instruction region size in words.
        capacity: usize,
    },
}

impl LoadError {
    /// Returns the stable code shared by every load failure.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn code(&self) -> FaultCode {
        FaultCode::LoadFormat
    }
}

/// Reads a program file into instruction words.
///
/// # Errors
///
/// Returns [`LoadError::Extension`] for a non-`.bin` path,
/// [`LoadError::Io`] when reading fails, and the errors of [`decode_words`].
pub fn load_program(path: impl AsRef<Path>) -> Result<Vec<u16>, LoadError> {
    let path = path.as_ref();
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROGRAM_EXTENSION));
    if !has_extension {
        return Err(LoadError::Extension {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let words = decode_words(&bytes)?;
    debug!(path = %path.display(), words = words.len(), "program loaded");
    Ok(words)
}

/// Converts little-endian bytes into instruction words.
///
/// # Errors
///
/// Returns [`LoadError::OddSize`] for an odd byte count and
/// [`LoadError::TooLarge`] when the words do not fit the instruction region.
pub fn decode_words(bytes: &[u8]) -> Result<Vec<u16>, LoadError> {
    if bytes.len() % 2 != 0 {
        return Err(LoadError::OddSize { len: bytes.len() });
    }
    let words = bytes.len() / 2;
    if words > INSTRUCTION_CAPACITY {
        return Err(LoadError::TooLarge {
            words,
            capacity: INSTRUCTION_CAPACITY,
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Converts instruction words into the little-endian file image.
#[must_use]
pub fn encode_words(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}
