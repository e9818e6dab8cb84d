//! Translation of Hack VM code into Hack assembly.
//!
//! All units of one build are translated by a single [`Translator`],
//! so the counter behind generated labels keeps increasing across units
//! and no two units ever produce the same label.

mod codegen;
pub mod error;

use error::{Error, ErrorKind};

use crate::{fileio::input::SourceFile, vm::VMInstruction};

/// Translate the units of one program into a single assembly text.
///
/// With more than one unit, the output starts with the bootstrap code
/// (`SP = 256`, `call Sys.init 0`). Nothing is returned unless every
/// unit translates successfully.
pub fn translate(units: &[SourceFile]) -> Result<String, Error> {
    let mut translator = Translator::new();

    if units.len() > 1 {
        translator.bootstrap();
    }

    for unit in units {
        translator.translate_unit(unit)?;
    }

    Ok(translator.finish())
}

/// A translation session.
#[derive(Debug)]
pub struct Translator {
    output: Vec<String>,
    unit_name: String,
    current_function: Option<String>,
    next_label_id: usize,
}

impl Translator {
    pub const fn new() -> Self {
        Self {
            output: Vec::new(),
            unit_name: String::new(),
            current_function: None,
            next_label_id: 0,
        }
    }

    /// Emit the code that sets up the stack and calls `Sys.init`.
    pub fn bootstrap(&mut self) {
        self.output.push(String::from("// bootstrap"));

        let code = [
            codegen::lines(&["@256", "D=A", "@SP", "M=D"]),
            self.call("Sys.init", 0),
        ]
        .concat();
        self.output.extend(code);
    }

    /// Translate every instruction of `unit`, appending to the session output.
    pub fn translate_unit(&mut self, unit: &SourceFile) -> Result<(), Error> {
        let unit_name = unit.module_name();
        self.unit_name = unit_name.to_owned();
        self.current_function = None;

        for (idx, raw) in unit.content().lines().enumerate() {
            let code = raw.split("//").next().unwrap_or_default().trim();
            if code.is_empty() {
                continue;
            }

            let error = |kind: ErrorKind| Error {
                unit: unit_name.to_owned(),
                line: idx + 1,
                kind,
            };

            let instruction = code
                .parse::<VMInstruction>()
                .map_err(|err| error(err.into()))?;
            let assembly = self.translate_instruction(&instruction).map_err(error)?;

            self.output.push(format!("// {instruction}"));
            self.output.extend(assembly);
        }

        Ok(())
    }

    pub fn finish(self) -> String {
        self.output.join("\n")
    }

    /// Hands out the next session-wide unique label number.
    fn next_label_id(&mut self) -> usize {
        let id = self.next_label_id;
        self.next_label_id += 1;
        id
    }
}
