//! Hack assembly lines and their 16-bit encodings.
//!
//! The computation, destination and jump fields are closed enums:
//! a mnemonic that does not parse into one of them is rejected,
//! never encoded with a default.

use std::str::FromStr;

use super::error::ErrorKind;

pub type Word = u16;

/// Bits 15..13 of every C-instruction.
const C_PREFIX: Word = 0b111 << 13;
/// Bit 12: the ALU reads `M` instead of `A`.
const MEMORY_OPERAND: Word = 1 << 12;
/// Largest value an A-instruction can load.
pub const MAX_ADDRESS: Word = 0x7FFF;

/// A single meaningful line of assembly
/// (blank lines and comments never become a `Line`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `(NAME)`, emits no instruction.
    Label(String),
    /// `@value`, the raw symbol or decimal literal.
    Address(String),
    /// `dest=comp;jump`
    Compute(ComputeInstruction),
}

impl Line {
    /// Parses a raw source line, returning `None` if it holds no code.
    ///
    /// Everything after `//` is a comment; whitespace inside an
    /// instruction is insignificant.
    pub fn parse(raw: &str) -> Option<Result<Self, ErrorKind>> {
        let code = raw.split("//").next().unwrap_or_default();
        let code: String = code.chars().filter(|c| !c.is_whitespace()).collect();

        if code.is_empty() {
            return None;
        }

        let line = if let Some(label) = code.strip_prefix('(') {
            match label.strip_suffix(')') {
                Some(name) if !name.is_empty() => Ok(Self::Label(name.to_owned())),
                _ => Err(ErrorKind::InvalidUserSymbol(code.clone())),
            }
        } else if let Some(symbol) = code.strip_prefix('@') {
            if symbol.is_empty() {
                Err(ErrorKind::InvalidUserSymbol(code.clone()))
            } else {
                Ok(Self::Address(symbol.to_owned()))
            }
        } else {
            ComputeInstruction::from_str(&code).map(Self::Compute)
        };

        Some(line)
    }

    /// Whether this line occupies an address in instruction memory.
    pub const fn emits_instruction(&self) -> bool {
        !matches!(self, Self::Label(_))
    }
}

/// Encodes an A-instruction; bit 15 is always clear.
pub const fn encode_address(value: Word) -> Word {
    value & MAX_ADDRESS
}

/// Parses a decimal A-instruction literal, rejecting values above [`MAX_ADDRESS`].
pub fn parse_literal(literal: &str) -> Option<Result<Word, ErrorKind>> {
    if !literal.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = literal
        .parse::<Word>()
        .ok()
        .filter(|value| *value <= MAX_ADDRESS)
        .ok_or_else(|| ErrorKind::AddressOutOfRange(literal.to_owned()));

    Some(value)
}

// region: ComputeInstruction

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeInstruction {
    pub destination: Destination,
    pub computation: Computation,
    pub memory_operand: bool,
    pub jump: Jump,
}

impl ComputeInstruction {
    pub const fn encode(&self) -> Word {
        let memory = if self.memory_operand { MEMORY_OPERAND } else { 0 };

        C_PREFIX
            | memory
            | (self.computation.alu_bits() << 6)
            | (self.destination.bits() << 3)
            | self.jump.bits()
    }
}

impl FromStr for ComputeInstruction {
    type Err = ErrorKind;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let (destination, rest) = code.split_once('=').unwrap_or(("", code));
        let (computation, jump) = rest.split_once(';').unwrap_or((rest, ""));

        let destination = if destination.is_empty() {
            Destination::Null
        } else {
            Destination::from_str(destination)
                .map_err(|_| ErrorKind::InvalidDestination(destination.to_owned()))?
        };

        let jump = if jump.is_empty() {
            Jump::Null
        } else {
            Jump::from_str(jump).map_err(|_| ErrorKind::InvalidJump(jump.to_owned()))?
        };

        let memory_operand = computation.contains('M');
        let computation = Computation::from_str(computation)
            .map_err(|_| ErrorKind::InvalidComputation(computation.to_owned()))?;

        Ok(Self {
            destination,
            computation,
            memory_operand,
            jump,
        })
    }
}

/// ALU operation, with `A` and `M` forms sharing a variant;
/// which operand is read is decided separately by the `M` in the mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString)]
pub enum Computation {
    #[strum(serialize = "0")]
    Zero,
    #[strum(serialize = "1")]
    One,
    #[strum(serialize = "-1")]
    MinusOne,
    #[strum(serialize = "D")]
    D,
    #[strum(serialize = "A", serialize = "M")]
    A,
    #[strum(serialize = "!D")]
    NotD,
    #[strum(serialize = "!A", serialize = "!M")]
    NotA,
    #[strum(serialize = "-D")]
    NegD,
    #[strum(serialize = "-A", serialize = "-M")]
    NegA,
    #[strum(serialize = "D+1")]
    DPlusOne,
    #[strum(serialize = "A+1", serialize = "M+1")]
    APlusOne,
    #[strum(serialize = "D-1")]
    DMinusOne,
    #[strum(serialize = "A-1", serialize = "M-1")]
    AMinusOne,
    #[strum(serialize = "D+A", serialize = "D+M")]
    DPlusA,
    #[strum(serialize = "D-A", serialize = "D-M")]
    DMinusA,
    #[strum(serialize = "A-D", serialize = "M-D")]
    AMinusD,
    #[strum(serialize = "D&A", serialize = "D&M")]
    DAndA,
    #[strum(serialize = "D|A", serialize = "D|M")]
    DOrA,
}

impl Computation {
    /// The `zx nx zy ny f no` control bits.
    pub const fn alu_bits(self) -> Word {
        match self {
            Self::Zero => 0b10_1010,
            Self::One => 0b11_1111,
            Self::MinusOne => 0b11_1010,
            Self::D => 0b00_1100,
            Self::A => 0b11_0000,
            Self::NotD => 0b00_1101,
            Self::NotA => 0b11_0001,
            Self::NegD => 0b00_1111,
            Self::NegA => 0b11_0011,
            Self::DPlusOne => 0b01_1111,
            Self::APlusOne => 0b11_0111,
            Self::DMinusOne => 0b00_1110,
            Self::AMinusOne => 0b11_0010,
            Self::DPlusA => 0b00_0010,
            Self::DMinusA => 0b01_0011,
            Self::AMinusD => 0b00_0111,
            Self::DAndA => 0b00_0000,
            Self::DOrA => 0b01_0101,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString)]
pub enum Destination {
    #[strum(serialize = "null")]
    Null,
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Destination {
    /// The `A D M` store bits.
    pub const fn bits(self) -> Word {
        match self {
            Self::Null => 0b000,
            Self::M => 0b001,
            Self::D => 0b010,
            Self::MD => 0b011,
            Self::A => 0b100,
            Self::AM => 0b101,
            Self::AD => 0b110,
            Self::AMD => 0b111,
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString)]
pub enum Jump {
    #[strum(serialize = "null")]
    Null,
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl Jump {
    /// The `lt eq gt` condition bits.
    pub const fn bits(self) -> Word {
        match self {
            Self::Null => 0b000,
            Self::JGT => 0b001,
            Self::JEQ => 0b010,
            Self::JGE => 0b011,
            Self::JLT => 0b100,
            Self::JNE => 0b101,
            Self::JLE => 0b110,
            Self::JMP => 0b111,
        }
    }
}

// endregion

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(code: &str) -> Result<Word, ErrorKind> {
        ComputeInstruction::from_str(code).map(|instruction| instruction.encode())
    }

    #[test]
    fn test_compute_encoding() {
        assert_eq!(encode("D=D+A"), Ok(0b1110_0000_1001_0000));
        assert_eq!(encode("0;JMP"), Ok(0b1110_1010_1000_0111));
        assert_eq!(encode("AM=M-1"), Ok(0b1111_1100_1010_1000));
        assert_eq!(encode("D;JNE"), Ok(0b1110_0011_0000_0101));
        assert_eq!(encode("M=D|M"), Ok(0b1111_0101_0100_1000));
        assert_eq!(encode("AMD=!A;JLE"), Ok(0b1110_1100_0111_1110));
    }

    #[test]
    fn test_memory_bit_follows_mnemonic() {
        assert!(encode("D=M").is_ok_and(|word| word & MEMORY_OPERAND != 0));
        assert!(encode("D=A").is_ok_and(|word| word & MEMORY_OPERAND == 0));
    }

    #[test]
    fn test_unmapped_mnemonics() {
        assert_eq!(
            encode("D=D+2"),
            Err(ErrorKind::InvalidComputation(String::from("D+2")))
        );
        assert_eq!(
            encode("X=D"),
            Err(ErrorKind::InvalidDestination(String::from("X")))
        );
        assert_eq!(
            encode("D;JUMP"),
            Err(ErrorKind::InvalidJump(String::from("JUMP")))
        );
        assert_eq!(
            encode("M="),
            Err(ErrorKind::InvalidComputation(String::new()))
        );
    }

    #[test]
    fn test_line_parsing() {
        assert_eq!(Line::parse("   // only a comment"), None);
        assert_eq!(Line::parse(""), None);
        assert_eq!(
            Line::parse("(LOOP) // loop start"),
            Some(Ok(Line::Label(String::from("LOOP"))))
        );
        assert_eq!(
            Line::parse("  @i"),
            Some(Ok(Line::Address(String::from("i"))))
        );
        assert_eq!(
            Line::parse("(LOOP"),
            Some(Err(ErrorKind::InvalidUserSymbol(String::from("(LOOP"))))
        );
        assert!(matches!(Line::parse("D = D + A"), Some(Ok(Line::Compute(_)))));
    }

    #[test]
    fn test_literal_parsing() {
        assert_eq!(parse_literal("21"), Some(Ok(21)));
        assert_eq!(parse_literal("i"), None);
        assert_eq!(
            parse_literal("32768"),
            Some(Err(ErrorKind::AddressOutOfRange(String::from("32768"))))
        );
    }
}
