use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// number of keys on the COSMAC hex keypad
pub const KEY_COUNT: usize = 16;

/// The 16 key latches the interpreter reads. Only the host writes them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// codes above 0xf don't exist and are ignored
    pub fn set_key(&mut self, code: u8, pressed: bool) {
        if let Some(key) = self.keys.get_mut(code as usize) {
            *key = pressed;
        }
    }

    pub fn is_pressed(&self, code: u8) -> bool {
        self.keys.get(code as usize).copied().unwrap_or(false)
    }

    /// lowest pressed key code, if any
    pub fn any_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|code| code as u8)
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

/// Things the user can ask of the host rather than of the running program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCommand {
    Quit,
    TogglePause,
    ToggleMute,
}

/// reads keypresses
pub trait Input {
    /// bring the keypad up to date with the physical keys and report any
    /// host command that was issued since the last scan
    fn scan(&mut self, keypad: &mut Keypad) -> Result<Option<HostCommand>, io::Error>;
}

/// conventional layout using left-hand side of qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only report presses (plus autorepeat), so a key stays down for
/// this many scans after its last press event
const KEY_HOLD_SCANS: u8 = 6;

/// simple implementation of Input, using crossterm events from STDIN
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    held: [u8; KEY_COUNT],
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; KEY_COUNT],
        })
    }

    fn press(&mut self, c: char) {
        match self.keymap.get(&c.to_ascii_lowercase()) {
            Some(code) => self.held[*code as usize] = KEY_HOLD_SCANS,
            None => log::debug!("can't map {:?} to a COSMAC key", c),
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn scan(&mut self, keypad: &mut Keypad) -> Result<Option<HostCommand>, io::Error> {
        for held in self.held.iter_mut() {
            *held = held.saturating_sub(1);
        }

        let mut command = None;
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => command = Some(HostCommand::Quit),
                    KeyCode::Char('p') => command = Some(HostCommand::TogglePause),
                    KeyCode::Char('m') => command = Some(HostCommand::ToggleMute),
                    KeyCode::Char(c) => self.press(c),
                    _ => log::debug!("unmapped key event {:?}", evt),
                }
            }
        }

        for (code, held) in self.held.iter().enumerate() {
            keypad.set_key(code as u8, *held > 0);
        }
        Ok(command)
    }
}

/// scripted Input implementation for testing: each scan plays back the next
/// frame of the script, then everything is released once it runs out
pub struct DummyInput {
    frames: Vec<(Vec<u8>, Option<HostCommand>)>,
    next: usize,
}

impl DummyInput {
    pub fn new() -> Self {
        DummyInput {
            frames: Vec::new(),
            next: 0,
        }
    }

    /// append a frame during which `keys` are held
    pub fn hold(mut self, keys: &[u8]) -> Self {
        self.frames.push((Vec::from(keys), None));
        self
    }

    /// append a frame that issues a host command
    pub fn command(mut self, command: HostCommand) -> Self {
        self.frames.push((Vec::new(), Some(command)));
        self
    }
}

impl Default for DummyInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Input for DummyInput {
    fn scan(&mut self, keypad: &mut Keypad) -> Result<Option<HostCommand>, io::Error> {
        keypad.release_all();
        let Some((keys, command)) = self.frames.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        for key in keys {
            keypad.set_key(*key, true);
        }
        Ok(*command)
    }
}
