//! # interpreter
//!
//! Machine state visible to CHIP-8 programs:
//!  V0-VF  8bit general registers; VF doubles as carry, borrow and collision flag
//!  I      index register, 12 bits wide
//!  PC     program counter                     -- 0x200
//!  stack  16 return addresses
//!  DT     delay timer, counts down once per host frame
//!  ST     sound timer, ditto; tone plays while non-zero
//!
//! The host calls `step` as often as it likes per frame and `tick_timers`
//! once per frame, so instruction speed and timer speed are independent.
use crate::display::FrameBuffer;
use crate::error::Chip8Error;
use crate::input::Keypad;
use crate::instruction::Instruction;
use crate::memory::{
    Chip8MemoryMap, MemoryMap, CHIP8_FONT_ADDR, CHIP8_FONT_GLYPH_BYTES, CHIP8_PROGRAM_ADDR,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
const FLAG: usize = 0xF;
const ADDRESS_MASK: u16 = 0x0FFF;

/// What a call to `step` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// fetched, decoded and executed one instruction (unknown words included)
    Executed(Instruction),
    /// blocked in Fx0A and no key is down
    WaitingForKey,
    /// blocked in Fx0A and this key released the block
    KeyReceived(u8),
    /// the host has paused the machine
    Paused,
}

impl StepOutcome {
    pub fn made_progress(&self) -> bool {
        !matches!(self, StepOutcome::WaitingForKey | StepOutcome::Paused)
    }
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    frame_buffer: FrameBuffer,
    keypad: Keypad,
    registers: [u8; REGISTER_COUNT],
    i: u16,
    program_counter: u16,
    stack: Vec<u16>,
    delay_timer: u8,
    sound_timer: u8,
    /// register waiting for a key, while blocked in Fx0A
    key_wait: Option<usize>,
    paused: bool,
    rng: StdRng,
}

impl Chip8Interpreter {
    /// a machine with an empty program
    pub fn new() -> Self {
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            frame_buffer: FrameBuffer::new(),
            keypad: Keypad::new(),
            registers: [0; REGISTER_COUNT],
            i: 0,
            program_counter: CHIP8_PROGRAM_ADDR,
            stack: Vec::with_capacity(STACK_DEPTH),
            delay_timer: 0,
            sound_timer: 0,
            key_wait: None,
            paused: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// a fresh machine with `program` loaded at 0x200
    pub fn with_program(program: &[u8]) -> Result<Self, Chip8Error> {
        let mut interpreter = Chip8Interpreter::new();
        interpreter.memory.load_program(program)?;
        log::info!("loaded {} byte program", program.len());
        Ok(interpreter)
    }

    /// a fresh machine with a program read from `reader`
    pub fn from_reader(reader: &mut impl io::Read) -> Result<Self, Chip8Error> {
        let mut interpreter = Chip8Interpreter::new();
        interpreter.memory.load_program_from(reader)?;
        log::info!("loaded program from reader");
        Ok(interpreter)
    }

    /// make Cxkk deterministic
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Execute one instruction, or poll for the key an Fx0A is waiting on.
    pub fn step(&mut self) -> Result<StepOutcome, Chip8Error> {
        if self.paused {
            return Ok(StepOutcome::Paused);
        }
        if let Some(x) = self.key_wait {
            return Ok(match self.keypad.any_pressed() {
                Some(key) => {
                    self.registers[x] = key;
                    self.key_wait = None;
                    log::debug!("key {:x} released wait into V{:X}", key, x);
                    StepOutcome::KeyReceived(key)
                }
                None => StepOutcome::WaitingForKey,
            });
        }

        let pc = self.program_counter;
        let word = self.memory.read_word(pc)?;
        self.program_counter = pc.wrapping_add(2);
        let instruction = Instruction::decode(word);
        log::trace!("{:04x}: {:04x} {:?}", pc, word, instruction);
        self.execute(instruction, pc)?;
        Ok(StepOutcome::Executed(instruction))
    }

    /// Count both timers down by one, stopping at zero. Call once per frame.
    pub fn tick_timers(&mut self) {
        if self.paused {
            return;
        }
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// `pc` is the address the instruction was fetched from; the program
    /// counter already points past it
    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<(), Chip8Error> {
        match instruction {
            // Flow control
            Instruction::ClearScreen => self.frame_buffer.clear(),
            Instruction::Return => {
                self.program_counter = self
                    .stack
                    .pop()
                    .ok_or(Chip8Error::StackUnderflow { pc })?;
            }
            Instruction::Sys { nnn } => {
                log::debug!("{:04x}: ignoring machine code call to {:03x}", pc, nnn);
            }
            Instruction::Jump { nnn } => self.program_counter = nnn,
            Instruction::Call { nnn } => {
                if self.stack.len() >= STACK_DEPTH {
                    return Err(Chip8Error::StackOverflow { pc });
                }
                self.stack.push(self.program_counter);
                self.program_counter = nnn;
            }
            Instruction::JumpOffset { nnn } => {
                self.program_counter = (nnn + self.registers[0] as u16) & ADDRESS_MASK;
            }

            // Conditionals
            Instruction::SkipEqImm { x, kk } => self.skip_if(self.registers[x] == kk),
            Instruction::SkipNeImm { x, kk } => self.skip_if(self.registers[x] != kk),
            Instruction::SkipEqReg { x, y } => {
                self.skip_if(self.registers[x] == self.registers[y])
            }
            Instruction::SkipNeReg { x, y } => {
                self.skip_if(self.registers[x] != self.registers[y])
            }
            Instruction::SkipKeyPressed { x } => {
                self.skip_if(self.keypad.is_pressed(self.registers[x]))
            }
            Instruction::SkipKeyNotPressed { x } => {
                self.skip_if(!self.keypad.is_pressed(self.registers[x]))
            }

            // Register arithmetic
            Instruction::LoadImm { x, kk } => self.registers[x] = kk,
            Instruction::AddImm { x, kk } => {
                self.registers[x] = self.registers[x].wrapping_add(kk)
            }
            Instruction::Move { x, y } => self.registers[x] = self.registers[y],
            Instruction::Or { x, y } => self.registers[x] |= self.registers[y],
            Instruction::And { x, y } => self.registers[x] &= self.registers[y],
            Instruction::Xor { x, y } => self.registers[x] ^= self.registers[y],
            Instruction::Add { x, y } => {
                let (value, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.set_with_flag(x, value, carry);
            }
            Instruction::Sub { x, y } => {
                let (vx, vy) = (self.registers[x], self.registers[y]);
                self.set_with_flag(x, vx.wrapping_sub(vy), vx > vy);
            }
            Instruction::SubReverse { x, y } => {
                let (vx, vy) = (self.registers[x], self.registers[y]);
                self.set_with_flag(x, vy.wrapping_sub(vx), vy > vx);
            }
            Instruction::ShiftRight { x } => {
                let vx = self.registers[x];
                self.set_with_flag(x, vx >> 1, vx & 0x01 != 0);
            }
            Instruction::ShiftLeft { x } => {
                let vx = self.registers[x];
                self.set_with_flag(x, vx << 1, vx & 0x80 != 0);
            }
            Instruction::Random { x, kk } => {
                self.registers[x] = self.rng.gen::<u8>() & kk;
            }

            // Graphics
            Instruction::Draw { x, y, n } => {
                let sprite = self.memory.get_ro_slice(self.i, n as usize)?;
                let collided = composite_sprite(
                    &mut self.frame_buffer,
                    self.registers[x],
                    self.registers[y],
                    sprite,
                );
                self.registers[FLAG] = collided as u8;
            }

            // Keys and timers
            Instruction::WaitKey { x } => {
                log::debug!("{:04x}: waiting for a key into V{:X}", pc, x);
                self.key_wait = Some(x);
            }
            Instruction::ReadDelay { x } => self.registers[x] = self.delay_timer,
            Instruction::SetDelay { x } => self.delay_timer = self.registers[x],
            Instruction::SetSound { x } => self.sound_timer = self.registers[x],

            // I register and memory
            Instruction::LoadIndex { nnn } => self.i = nnn,
            Instruction::AddIndex { x } => {
                self.i = (self.i + self.registers[x] as u16) & ADDRESS_MASK;
            }
            Instruction::LoadGlyph { x } => {
                let digit = (self.registers[x] & 0xF) as u16;
                self.i = CHIP8_FONT_ADDR + digit * CHIP8_FONT_GLYPH_BYTES;
            }
            Instruction::StoreBcd { x } => {
                let value = self.registers[x];
                self.memory
                    .write(&[value / 100, value / 10 % 10, value % 10], self.i)?;
            }
            Instruction::StoreRegisters { x } => {
                self.memory.write(&self.registers[..=x], self.i)?;
            }
            Instruction::LoadRegisters { x } => {
                let values = self.memory.get_ro_slice(self.i, x + 1)?;
                self.registers[..=x].copy_from_slice(values);
            }

            Instruction::Unknown(word) => {
                log::warn!("{:04x}: unknown opcode {:04x}, skipping", pc, word);
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(2);
        }
    }

    /// result first, flag last: with x == F the flag wins
    fn set_with_flag(&mut self, x: usize, value: u8, flag: bool) {
        self.registers[x] = value;
        self.registers[FLAG] = flag as u8;
    }

    /// Freeze the machine. `step` and `tick_timers` do nothing until
    /// `resume`; a pending key wait is kept.
    pub fn pause(&mut self) {
        log::debug!("paused at {:04x}", self.program_counter);
        self.paused = true;
    }

    pub fn resume(&mut self) {
        log::debug!("resumed at {:04x}", self.program_counter);
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_blocked(&self) -> bool {
        self.key_wait.is_some()
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn register(&self, x: usize) -> u8 {
        self.registers[x]
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// XOR `sprite` onto the frame, one byte per row, most significant bit on the
/// left, wrapping around the edges. Returns whether any lit pixel was turned
/// off. Drawing the same sprite twice in the same place erases it.
fn composite_sprite(frame: &mut FrameBuffer, x0: u8, y0: u8, sprite: &[u8]) -> bool {
    let mut collided = false;
    for (row, bits) in sprite.iter().enumerate() {
        for col in 0..8 {
            if bits & (0x80 >> col) == 0 {
                continue;
            }
            let x = x0 as usize + col;
            let y = y0 as usize + row;
            let pixel = frame.get_pixel(x, y);
            collided |= pixel;
            frame.set_pixel(x, y, !pixel);
        }
    }
    collided
}
