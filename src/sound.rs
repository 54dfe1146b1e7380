use beep::beep;
use std::error::Error;

/// The tone generator. The host turns it on while the sound timer is running.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_beeping(&self) -> bool;
}

const SIMPLEBEEP_PITCH: u16 = 440; // A

pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.is_beeping {
            beep(SIMPLEBEEP_PITCH)?;
            self.is_beeping = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_beeping {
            beep(0)?;
            self.is_beeping = false;
        }
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// silent Sound that still tracks whether it would be beeping
#[derive(Default)]
pub struct Mute {
    is_beeping: bool,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}
