use crate::error::Chip8Error;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc. Every access is bounds checked: an
/// address past the end of memory is an error, never a wraparound.
pub trait MemoryMap {
    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error>;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error>;

    fn read_byte(&self, addr: u16) -> Result<u8, Chip8Error> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn read_word(&self, addr: u16) -> Result<u16, Chip8Error> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), Chip8Error> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// largest program image that fits between the load address and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x004f  unused
///   0x0050-0x009f  built-in hex font
///   0x00a0-0x01ff  unused
///   0x0200-0x0fff  program
///
/// The call stack, registers and display live outside of addressable memory.
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let range = Self::range(addr, len)?;
        Ok(&self.bytes[range])
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], Chip8Error> {
        let range = Self::range(addr, len)?;
        Ok(&mut self.bytes[range])
    }
}

impl Chip8MemoryMap {
    /// initialises memory with the font baked in and everything else zeroed
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let font = CHIP8_FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap { bytes }
    }

    /// load a CHIP-8 program image at 0x200. Oversized images are rejected
    /// outright rather than truncated.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        self.write(program, CHIP8_PROGRAM_ADDR)
    }

    /// load a CHIP-8 program from any reader
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }

    fn range(addr: u16, len: usize) -> Result<std::ops::Range<usize>, Chip8Error> {
        let start = addr as usize;
        let end = start + len;
        if end > CHIP8_RAM_SIZE_BYTES {
            // report the first address that doesn't exist
            return Err(Chip8Error::AddressOutOfBounds {
                addr: start.max(CHIP8_RAM_SIZE_BYTES),
            });
        }
        Ok(start..end)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

pub const CHIP8_FONT_ADDR: u16 = 0x050;
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;
pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
