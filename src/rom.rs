use crate::error::Chip8Error;
use std::fs;
use std::path::Path;

/// Read a program file from disk. `.ch8`/`.c8` files are raw images, `.hex`
/// files are text made of hex byte pairs. Size is checked at load time.
pub fn load_rom_file(path: &Path) -> Result<Vec<u8>, Chip8Error> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("ch8") | Some("c8") => Ok(fs::read(path)?),
        Some("hex") => parse_hex(&fs::read_to_string(path)?),
        _ => Err(Chip8Error::UnsupportedRomFormat(path.display().to_string())),
    }
}

/// "00e0 a22a" => [0x00, 0xe0, 0xa2, 0x2a]; whitespace anywhere is ignored
pub fn parse_hex(text: &str) -> Result<Vec<u8>, Chip8Error> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(Chip8Error::InvalidHexRom(format!(
            "odd number of hex digits ({})",
            digits.len()
        )));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16);
            let lo = pair[1].to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi << 4 | lo) as u8),
                _ => Err(Chip8Error::InvalidHexRom(format!(
                    "not a hex byte: {}{}",
                    pair[0], pair[1]
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_parse_hex() -> Result<(), Chip8Error> {
        assert_eq!(parse_hex("00e0A22A")?, vec![0x00, 0xe0, 0xa2, 0x2a]);
        assert_eq!(parse_hex("00 e0\na2 2a\n")?, vec![0x00, 0xe0, 0xa2, 0x2a]);
        assert_eq!(parse_hex("")?, Vec::<u8>::new());
        Ok(())
    }

    #[test]
    fn test_parse_hex_rejects_odd_length() {
        assert!(matches!(parse_hex("00e"), Err(Chip8Error::InvalidHexRom(_))));
    }

    #[test]
    fn test_parse_hex_rejects_junk() {
        assert!(matches!(parse_hex("0g"), Err(Chip8Error::InvalidHexRom(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            load_rom_file(Path::new("game.gb")),
            Err(Chip8Error::UnsupportedRomFormat(_))
        ));
        assert!(matches!(
            load_rom_file(Path::new("game")),
            Err(Chip8Error::UnsupportedRomFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_rom_file(Path::new("definitely/not/here.ch8")),
            Err(Chip8Error::Io(_))
        ));
    }

    #[test]
    fn test_load_both_formats() -> Result<(), Chip8Error> {
        let dir = env::temp_dir();
        let raw = dir.join(format!("chip8vm-{}.ch8", std::process::id()));
        let hex = dir.join(format!("chip8vm-{}.HEX", std::process::id()));
        fs::write(&raw, [0x12, 0x00])?;
        fs::write(&hex, "1200\n")?;
        let from_raw = load_rom_file(&raw);
        let from_hex = load_rom_file(&hex);
        let _ = fs::remove_file(&raw);
        let _ = fs::remove_file(&hex);
        assert_eq!(from_raw?, vec![0x12, 0x00]);
        assert_eq!(from_hex?, vec![0x12, 0x00]);
        Ok(())
    }
}
