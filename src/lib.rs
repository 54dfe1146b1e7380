//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter core owns memory, registers, timers and the frame
//!   buffer, and knows nothing about terminals, speakers or keyboards
//! * the host drives it: `step()` as many times per frame as it likes, then
//!   `tick_timers()` once, then reads the frame buffer
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for reading key-presses
//! * audio device, with trait for making beeps
//! * undecodable instructions are logged and skipped; stack and memory
//!   violations stop the machine with an error
//!
//! Model
//!
//! ```text
//! Environment(config, display, input, sound)
//!  |-- interpreter
//!  |    |-- memory (font at 0x050, program at 0x200)
//!  |    |-- frame buffer
//!  |    `-- keypad
//!  `-- main loop
//!       |-- input.scan(keypad)            -- host commands: quit, pause, mute
//!       |-- interpreter.step() x N        -- N = cycles per frame
//!       |-- interpreter.tick_timers()
//!       |-- sound on while the sound timer runs
//!       |-- display.draw(frame buffer)
//!       `-- sleep out the rest of the frame
//! ```
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod rom;
pub mod sound;

pub use config::Config;
pub use environment::Environment;
pub use error::Chip8Error;
pub use interpreter::{Chip8Interpreter, StepOutcome};
