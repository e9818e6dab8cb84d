use std::collections::HashMap;

use phf::phf_map;

use super::{
    error::ErrorKind,
    instruction::{Word, MAX_ADDRESS},
};

/// First address handed out to variables.
const FIRST_VARIABLE_ADDRESS: Word = 16;

static PREDEFINED: phf::Map<&'static str, Word> = phf_map! {
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,

    "SCREEN" => 16384,
    "KBD" => 24576,

    // `SP` and `R0` name the same register
    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,
};

/// Addresses of every symbol known to one assembly session:
/// the predefined ones, labels and allocated variables.
#[derive(Debug)]
pub struct SymbolTable {
    user_symbols: HashMap<String, Word>,
    next_variable: Word,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            user_symbols: HashMap::new(),
            next_variable: FIRST_VARIABLE_ADDRESS,
        }
    }

    /// Forgets every label and variable, keeping only the predefined symbols.
    pub fn reset(&mut self) {
        self.user_symbols.clear();
        self.next_variable = FIRST_VARIABLE_ADDRESS;
    }

    pub fn address_of(&self, symbol: &str) -> Option<Word> {
        PREDEFINED
            .get(symbol)
            .or_else(|| self.user_symbols.get(symbol))
            .copied()
    }

    /// Binds a label to an instruction address.
    ///
    /// Returns `false` (leaving the table untouched)
    /// if the name is already taken.
    pub fn define_label(&mut self, name: &str, address: Word) -> bool {
        if self.address_of(name).is_some() {
            return false;
        }

        self.user_symbols.insert(name.to_owned(), address);
        true
    }

    /// Looks up a symbol, allocating the next free variable address for it if it is new.
    pub fn resolve_or_allocate(&mut self, symbol: &str) -> Result<Word, ErrorKind> {
        if let Some(address) = self.address_of(symbol) {
            return Ok(address);
        }

        let address = self.next_variable;
        if address > MAX_ADDRESS {
            return Err(ErrorKind::AddressOutOfRange(symbol.to_owned()));
        }

        self.user_symbols.insert(symbol.to_owned(), address);
        self.next_variable += 1;

        Ok(address)
    }
}
