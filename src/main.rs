use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use chip8vm::display::MonoTermDisplay;
use chip8vm::input::StdinInput;
use chip8vm::rom::load_rom_file;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use chip8vm::{Config, Environment};

#[derive(Parser, Debug)]
#[command(
    name = "chip8vm",
    about = "Run a CHIP-8 program in the terminal. Esc quits, p pauses, m mutes."
)]
struct Args {
    /// Program image (.ch8/.c8 raw bytes, or .hex text).
    rom: PathBuf,

    /// Instructions executed per frame.
    #[arg(long, default_value_t = 10)]
    cycles: u32,

    /// Frames per second; timers tick once per frame.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Start with the tone muted.
    #[arg(long)]
    mute: bool,

    /// Never touch the speaker at all.
    #[arg(long)]
    silent: bool,

    /// Stop after this many frames (0 = run until Esc).
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Seed for the random number instruction.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = Config {
        cycles_per_frame: args.cycles,
        frame_rate: args.fps,
        muted: args.mute,
        max_frames: (args.frames > 0).then_some(args.frames),
        seed: args.seed,
    };

    // read the program before touching the terminal so errors print cleanly
    let program = load_rom_file(&args.rom)?;
    let title = args
        .rom
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "CHIP-8".to_string());

    // initialise
    let mut input = StdinInput::new()?;
    let mut display = MonoTermDisplay::new(&title)?;
    let mut sound: Box<dyn Sound> = if args.silent {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let result = {
        let mut environment =
            Environment::new(config, &mut display, &mut input, sound.as_mut());
        environment
            .load_program(&program)
            .and_then(|_| environment.main_loop())
    };

    // give the terminal back before reporting anything
    drop(display);
    drop(input);
    match result {
        Ok(frames) => {
            log::info!("{} finished after {} frames", title, frames);
            Ok(())
        }
        Err(e) => {
            log::error!("{} stopped: {}", title, e);
            Err(e.into())
        }
    }
}
