/// One decoded CHIP-8 instruction word. `x` and `y` are register indices,
/// `kk` an immediate byte, `nnn` a 12-bit address and `n` a nibble count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 0nnn: machine code routine, which this machine can't run
    Sys { nnn: u16 },
    /// 1nnn
    Jump { nnn: u16 },
    /// 2nnn
    Call { nnn: u16 },
    /// 3xkk
    SkipEqImm { x: usize, kk: u8 },
    /// 4xkk
    SkipNeImm { x: usize, kk: u8 },
    /// 5xy0
    SkipEqReg { x: usize, y: usize },
    /// 6xkk
    LoadImm { x: usize, kk: u8 },
    /// 7xkk
    AddImm { x: usize, kk: u8 },
    /// 8xy0
    Move { x: usize, y: usize },
    /// 8xy1
    Or { x: usize, y: usize },
    /// 8xy2
    And { x: usize, y: usize },
    /// 8xy3
    Xor { x: usize, y: usize },
    /// 8xy4
    Add { x: usize, y: usize },
    /// 8xy5
    Sub { x: usize, y: usize },
    /// 8xy6
    ShiftRight { x: usize },
    /// 8xy7
    SubReverse { x: usize, y: usize },
    /// 8xyE
    ShiftLeft { x: usize },
    /// 9xy0
    SkipNeReg { x: usize, y: usize },
    /// Annn
    LoadIndex { nnn: u16 },
    /// Bnnn
    JumpOffset { nnn: u16 },
    /// Cxkk
    Random { x: usize, kk: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: usize },
    /// ExA1
    SkipKeyNotPressed { x: usize },
    /// Fx07
    ReadDelay { x: usize },
    /// Fx0A
    WaitKey { x: usize },
    /// Fx15
    SetDelay { x: usize },
    /// Fx18
    SetSound { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    LoadGlyph { x: usize },
    /// Fx33
    StoreBcd { x: usize },
    /// Fx55
    StoreRegisters { x: usize },
    /// Fx65
    LoadRegisters { x: usize },
    /// anything else; the raw word is kept for reporting
    Unknown(u16),
}

impl Instruction {
    pub fn decode(word: u16) -> Instruction {
        // 0x73EE
        // 73 = high byte, EE = low byte
        // 7 = opcode family, 3 = x, E = y, E = n
        let family = (word >> 12) as u8;
        let x = ((word >> 8) & 0xF) as usize;
        let y = ((word >> 4) & 0xF) as usize;
        let n = (word & 0xF) as u8;
        let kk = (word & 0xFF) as u8;
        let nnn = word & 0x0FFF;

        match (family, x, y, n) {
            (0x0, 0, 0xE, 0x0) => Instruction::ClearScreen,
            (0x0, 0, 0xE, 0xE) => Instruction::Return,
            (0x0, _, _, _) => Instruction::Sys { nnn },
            (0x1, _, _, _) => Instruction::Jump { nnn },
            (0x2, _, _, _) => Instruction::Call { nnn },
            (0x3, _, _, _) => Instruction::SkipEqImm { x, kk },
            (0x4, _, _, _) => Instruction::SkipNeImm { x, kk },
            (0x5, _, _, 0x0) => Instruction::SkipEqReg { x, y },
            (0x6, _, _, _) => Instruction::LoadImm { x, kk },
            (0x7, _, _, _) => Instruction::AddImm { x, kk },
            (0x8, _, _, 0x0) => Instruction::Move { x, y },
            (0x8, _, _, 0x1) => Instruction::Or { x, y },
            (0x8, _, _, 0x2) => Instruction::And { x, y },
            (0x8, _, _, 0x3) => Instruction::Xor { x, y },
            (0x8, _, _, 0x4) => Instruction::Add { x, y },
            (0x8, _, _, 0x5) => Instruction::Sub { x, y },
            (0x8, _, _, 0x6) => Instruction::ShiftRight { x },
            (0x8, _, _, 0x7) => Instruction::SubReverse { x, y },
            (0x8, _, _, 0xE) => Instruction::ShiftLeft { x },
            (0x9, _, _, 0x0) => Instruction::SkipNeReg { x, y },
            (0xA, _, _, _) => Instruction::LoadIndex { nnn },
            (0xB, _, _, _) => Instruction::JumpOffset { nnn },
            (0xC, _, _, _) => Instruction::Random { x, kk },
            (0xD, _, _, _) => Instruction::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Instruction::SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => Instruction::SkipKeyNotPressed { x },
            (0xF, _, 0x0, 0x7) => Instruction::ReadDelay { x },
            (0xF, _, 0x0, 0xA) => Instruction::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Instruction::SetSound { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Instruction::LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => Instruction::StoreBcd { x },
            (0xF, _, 0x5, 0x5) => Instruction::StoreRegisters { x },
            (0xF, _, 0x6, 0x5) => Instruction::LoadRegisters { x },
            _ => Instruction::Unknown(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_system_words() {
        assert_eq!(Instruction::decode(0x00E0), Instruction::ClearScreen);
        assert_eq!(Instruction::decode(0x00EE), Instruction::Return);
        assert_eq!(Instruction::decode(0x0123), Instruction::Sys { nnn: 0x123 });
        assert_eq!(Instruction::decode(0x0000), Instruction::Sys { nnn: 0 });
    }

    #[test]
    fn test_decode_operand_fields() {
        assert_eq!(Instruction::decode(0x1ABC), Instruction::Jump { nnn: 0xABC });
        assert_eq!(Instruction::decode(0x2300), Instruction::Call { nnn: 0x300 });
        assert_eq!(
            Instruction::decode(0x3A42),
            Instruction::SkipEqImm { x: 0xA, kk: 0x42 }
        );
        assert_eq!(
            Instruction::decode(0x5120),
            Instruction::SkipEqReg { x: 1, y: 2 }
        );
        assert_eq!(
            Instruction::decode(0xD12F),
            Instruction::Draw { x: 1, y: 2, n: 0xF }
        );
        assert_eq!(Instruction::decode(0xF365), Instruction::LoadRegisters { x: 3 });
    }

    #[test]
    fn test_decode_alu_group() {
        let expected = [
            (0x8010, Instruction::Move { x: 0, y: 1 }),
            (0x8011, Instruction::Or { x: 0, y: 1 }),
            (0x8012, Instruction::And { x: 0, y: 1 }),
            (0x8013, Instruction::Xor { x: 0, y: 1 }),
            (0x8014, Instruction::Add { x: 0, y: 1 }),
            (0x8015, Instruction::Sub { x: 0, y: 1 }),
            (0x8016, Instruction::ShiftRight { x: 0 }),
            (0x8017, Instruction::SubReverse { x: 0, y: 1 }),
            (0x801E, Instruction::ShiftLeft { x: 0 }),
        ];
        for (word, instruction) in expected {
            assert_eq!(Instruction::decode(word), instruction, "{:04x}", word);
        }
    }

    #[test]
    fn test_decode_misses() {
        for word in [0x5121, 0x8018, 0x801F, 0x9121, 0xE000, 0xE19F, 0xF0FF, 0xF101] {
            assert_eq!(Instruction::decode(word), Instruction::Unknown(word));
        }
    }
}
