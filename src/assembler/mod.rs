//! Two-pass assembler from Hack assembly to 16-bit Hack machine words.
//!
//! The first pass binds every `(LABEL)` to the address of the instruction
//! that follows it, the second pass encodes instructions, allocating
//! variables from address 16 upward as new symbols are met.

pub mod error;
pub mod instruction;
mod symbol_table;

use error::{Error, ErrorKind};
use instruction::{Line, Word, MAX_ADDRESS};
use symbol_table::SymbolTable;

use crate::fileio::input::SourceFile;

/// An assembly session.
///
/// Labels and variables persist across calls to [`Assembler::assemble`]
/// until [`Assembler::reset`], so several sources can be assembled
/// as parts of one program.
#[derive(Debug)]
pub struct Assembler {
    symbols: SymbolTable,
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
        }
    }

    pub fn reset(&mut self) {
        self.symbols.reset();
    }

    /// Assemble `source`, returning one word per instruction line.
    pub fn assemble(&mut self, source: &str) -> Result<Vec<Word>, Error> {
        let lines = parse_lines(source)?;

        self.bind_labels(&lines)?;

        lines
            .into_iter()
            .filter_map(|(line_number, line)| self.encode(line_number, line).transpose())
            .collect()
    }

    fn bind_labels(&mut self, lines: &[(usize, Line)]) -> Result<(), Error> {
        let mut address: usize = 0;

        for (line_number, line) in lines {
            if line.emits_instruction() {
                address += 1;
            } else if let Line::Label(name) = line {
                let bound = Word::try_from(address)
                    .ok()
                    .filter(|value| *value <= MAX_ADDRESS)
                    .ok_or_else(|| {
                        Error::new(*line_number, ErrorKind::AddressOutOfRange(name.clone()))
                    })?;

                if !self.symbols.define_label(name, bound) {
                    return Err(Error::new(
                        *line_number,
                        ErrorKind::InvalidUserSymbol(name.clone()),
                    ));
                }
            }
        }

        Ok(())
    }

    fn encode(&mut self, line_number: usize, line: Line) -> Result<Option<Word>, Error> {
        let word = match line {
            Line::Label(_) => return Ok(None),
            Line::Compute(instruction) => instruction.encode(),
            Line::Address(symbol) => {
                let value = match self.symbols.address_of(&symbol) {
                    Some(address) => address,
                    None => match instruction::parse_literal(&symbol) {
                        Some(literal) => {
                            literal.map_err(|kind| Error::new(line_number, kind))?
                        }
                        None => self
                            .symbols
                            .resolve_or_allocate(&symbol)
                            .map_err(|kind| Error::new(line_number, kind))?,
                    },
                };

                instruction::encode_address(value)
            }
        };

        Ok(Some(word))
    }
}

/// Parse every line, keeping the 1-based line number of those holding code.
fn parse_lines(source: &str) -> Result<Vec<(usize, Line)>, Error> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            Line::parse(raw).map(|line| {
                line.map(|line| (idx + 1, line))
                    .map_err(|kind| Error::new(idx + 1, kind))
            })
        })
        .collect()
}

/// Render words as `.hack` text: one 16-character binary string per line.
pub fn to_text(words: &[Word]) -> String {
    words
        .iter()
        .map(|word| format!("{word:016b}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble a single unit in a fresh session.
pub fn assemble(source_file: &SourceFile) -> Result<String, Error> {
    Assembler::new()
        .assemble(source_file.content())
        .map(|words| to_text(&words))
}
