use chip8vm::display::DummyDisplay;
use chip8vm::input::DummyInput;
use chip8vm::sound::Mute;
use chip8vm::{Chip8Error, Chip8Interpreter, Config, Environment, StepOutcome};

/// assemble instruction words into a program image
fn assemble(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// step until the program parks itself on a jump-to-self
fn run_until_loop(vm: &mut Chip8Interpreter) -> Result<usize, Chip8Error> {
    let mut steps = 0;
    loop {
        let pc = vm.program_counter();
        vm.step()?;
        steps += 1;
        if vm.program_counter() == pc {
            return Ok(steps);
        }
    }
}

/// prints 137 with the built-in font at the top left, then spins
const SHOW_137: [u16; 15] = [
    0x6089, // V0 = 137
    0xA300, // I = 0x300
    0xF033, // BCD V0 -> [I]
    0xF265, // V0..V2 = [I]
    0x6300, // V3 = 0 (x)
    0x6400, // V4 = 0 (y)
    0xF029, // I = glyph(V0)
    0xD345, // draw
    0x7305, // x += 5
    0xF129, // I = glyph(V1)
    0xD345, // draw
    0x7305, // x += 5
    0xF229, // I = glyph(V2)
    0xD345, // draw
    0x121C, // spin
];

const EXPECTED_137: [&str; 5] = [
    "  @  @@@@ @@@@",
    " @@     @    @",
    "  @  @@@@   @",
    "  @     @  @",
    " @@@ @@@@  @",
];

fn assert_shows_137(screen: &str) {
    let rows: Vec<&str> = screen.lines().map(|r| r.trim_end()).collect();
    assert_eq!(rows[..5], EXPECTED_137);
    assert!(rows[5..].iter().all(|r| r.is_empty()));
}

#[test]
fn test_bcd_and_font_rendering() -> Result<(), Chip8Error> {
    let mut vm = Chip8Interpreter::with_program(&assemble(&SHOW_137))?;
    run_until_loop(&mut vm)?;
    assert_eq!(vm.program_counter(), 0x21C);
    assert_eq!(vm.register(0xF), 0);
    assert_shows_137(&vm.frame_buffer().to_string());
    Ok(())
}

#[test]
fn test_counting_loop() -> Result<(), Chip8Error> {
    let mut vm = Chip8Interpreter::with_program(&assemble(&[
        0x6000, // V0 = 0
        0x7001, // V0 += 1
        0x300A, // skip if V0 == 10
        0x1202, // loop
        0x1208, // spin
    ]))?;
    let steps = run_until_loop(&mut vm)?;
    assert_eq!(vm.register(0), 10);
    // setup, 10 adds and skips, 9 back jumps, and the spin
    assert_eq!(steps, 1 + 10 * 2 + 9 + 1);
    Ok(())
}

#[test]
fn test_nested_subroutines() -> Result<(), Chip8Error> {
    let mut image = assemble(&[
        0x2210, // call A
        0x6A01, // VA = 1
        0x1204, // spin
    ]);
    image.resize(0x10, 0);
    image.extend(assemble(&[
        0x2220, // A: call B
        0x7B01, //    VB += 1
        0x00EE, //    return
    ]));
    image.resize(0x20, 0);
    image.extend(assemble(&[
        0x7B10, // B: VB += 0x10
        0x00EE, //    return
    ]));

    let mut vm = Chip8Interpreter::with_program(&image)?;
    run_until_loop(&mut vm)?;
    assert_eq!(vm.register(0xB), 0x11);
    assert_eq!(vm.register(0xA), 1);
    assert_eq!(vm.stack_depth(), 0);
    Ok(())
}

#[test]
fn test_runaway_recursion_overflows() {
    let mut vm = Chip8Interpreter::with_program(&assemble(&[0x6001, 0x2202])).unwrap();
    vm.step().unwrap();
    for _ in 0..16 {
        vm.step().unwrap();
    }
    assert!(matches!(vm.step(), Err(Chip8Error::StackOverflow { .. })));
}

#[test]
fn test_key_wait_through_public_api() -> Result<(), Chip8Error> {
    let mut vm = Chip8Interpreter::with_program(&assemble(&[0xF20A, 0x8020, 0x1204]))?;
    vm.step()?;
    assert!(vm.is_blocked());
    assert_eq!(vm.step()?, StepOutcome::WaitingForKey);
    vm.keypad_mut().set_key(0x9, true);
    assert_eq!(vm.step()?, StepOutcome::KeyReceived(0x9));
    vm.step()?;
    assert_eq!(vm.register(0), 0x9);
    Ok(())
}

#[test]
fn test_environment_presents_program_output() -> Result<(), Chip8Error> {
    let mut display = DummyDisplay::new();
    let mut input = DummyInput::new();
    let mut sound = Mute::new();
    let config = Config {
        frame_rate: 1000,
        max_frames: Some(2),
        ..Config::default()
    };
    {
        let mut env = Environment::new(config, &mut display, &mut input, &mut sound);
        env.load_program(&assemble(&SHOW_137))?;
        assert_eq!(env.main_loop()?, 2);
    }
    let frame = display.last_frame.expect("frames were drawn");
    assert_shows_137(&frame.to_string());
    Ok(())
}
