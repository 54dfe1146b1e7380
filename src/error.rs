use std::io;
use thiserror::Error;

/// Everything that can stop the machine. Undecodable instruction words are
/// not in here: they are logged and skipped.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("call stack overflow at {pc:#06x}: more than 16 nested calls")]
    StackOverflow { pc: u16 },

    #[error("call stack underflow at {pc:#06x}: return with an empty stack")]
    StackUnderflow { pc: u16 },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    /// `addr` is where the access started, or `0x1000` when it started in
    /// bounds and ran off the end of memory.
    #[error("memory access out of bounds at address {addr:#06x}")]
    AddressOutOfBounds { addr: usize },

    #[error("unsupported program file format: {0}")]
    UnsupportedRomFormat(String),

    #[error("invalid hex program: {0}")]
    InvalidHexRom(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
