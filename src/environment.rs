use crate::config::Config;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::input::{HostCommand, Input};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use std::time::{Duration, Instant};

/// Sets everything up and runs the main loop. Each frame: read the keys,
/// run a batch of instructions, tick the timers once, drive the tone, draw.
pub struct Environment<'a> {
    config: Config,
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    muted: bool,
}

impl<'a> Environment<'a> {
    pub fn new(
        config: Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        let muted = config.muted;
        let mut interpreter = Chip8Interpreter::new();
        if let Some(seed) = config.seed {
            interpreter.seed_rng(seed);
        }
        Environment {
            config,
            interpreter,
            display,
            input,
            sound,
            muted,
        }
    }

    /// Replace the running machine with a fresh one holding `program`. On
    /// error the old machine is left untouched.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        let mut interpreter = Chip8Interpreter::with_program(program)?;
        if let Some(seed) = self.config.seed {
            interpreter.seed_rng(seed);
        }
        self.interpreter = interpreter;
        self.update_sound();
        Ok(())
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Run frames until the user quits or `max_frames` is reached. Returns
    /// the number of frames run. The tone is always off when this returns.
    pub fn main_loop(&mut self) -> Result<u64, Chip8Error> {
        let frame_time = Duration::from_secs(1) / self.config.frame_rate.max(1);
        log::info!(
            "running at {} instructions per frame, {} frames per second",
            self.config.cycles_per_frame,
            self.config.frame_rate
        );

        let mut frames = 0;
        let result = loop {
            if self.config.max_frames.map_or(false, |max| frames >= max) {
                break Ok(());
            }
            let started = Instant::now();
            match self.frame() {
                Ok(true) => frames += 1,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
            spin_sleep::sleep(frame_time.saturating_sub(started.elapsed()));
        };

        if let Err(e) = self.sound.stop() {
            log::warn!("could not stop the tone: {}", e);
        }
        log::info!("stopped after {} frames", frames);
        result.map(|_| frames)
    }

    /// one pass of the loop; false when the user asked to quit
    fn frame(&mut self) -> Result<bool, Chip8Error> {
        match self.input.scan(self.interpreter.keypad_mut())? {
            Some(HostCommand::Quit) => return Ok(false),
            Some(HostCommand::TogglePause) => {
                if self.interpreter.is_paused() {
                    self.interpreter.resume();
                } else {
                    self.interpreter.pause();
                }
            }
            Some(HostCommand::ToggleMute) => self.muted = !self.muted,
            None => {}
        }
        self.run_frame()?;
        self.update_sound();
        self.display.draw(self.interpreter.frame_buffer())?;
        Ok(true)
    }

    /// Up to `cycles_per_frame` instructions, then one timer tick. Stops
    /// stepping early once the machine can't make progress this frame.
    pub fn run_frame(&mut self) -> Result<(), Chip8Error> {
        for _ in 0..self.config.cycles_per_frame {
            if !self.interpreter.step()?.made_progress() {
                break;
            }
        }
        self.interpreter.tick_timers();
        Ok(())
    }

    /// A failing sound device mutes the machine; it never stops it.
    fn update_sound(&mut self) {
        let audible = self.interpreter.sound_timer() > 0
            && !self.muted
            && !self.interpreter.is_paused();
        let result = match (audible, self.sound.is_beeping()) {
            (true, false) => self.sound.beep(),
            (false, true) => self.sound.stop(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::warn!("sound device failed, muting: {}", e);
            self.muted = true;
        }
    }
}
