//! Hack VM instruction set, shared by the Jack compiler
//! (which prints instructions) and the VM translator (which parses them).
//!
//! Strings only appear at the boundary: [`std::fmt::Display`] when writing
//! `.vm` text and [`std::str::FromStr`] when reading it back.

use std::str::FromStr;

// region: VMInstruction utility functions

/// Utility function for the `push` VM instruction.
pub const fn push(segment: Segment, i: usize) -> VMInstruction {
    VMInstruction::Push(segment, i)
}

/// Utility function for the `pop` VM instruction.
pub const fn pop(segment: Segment, i: usize) -> VMInstruction {
    VMInstruction::Pop(segment, i)
}

/// Utility function for arithmetic/logical VM instructions.
pub const fn command(command: VMCommand) -> VMInstruction {
    VMInstruction::Command(command)
}

/// Utility function for the `return` VM instruction.
pub const fn vm_return() -> VMInstruction {
    VMInstruction::Command(VMCommand::Return)
}

/// Utility function for the `label`, `goto` and `if-goto` VM instructions.
pub fn label<S: Into<String>>(label_action: LabelAction, label: S) -> VMInstruction {
    VMInstruction::Label(label_action, label.into())
}

/// Utility function for the `function` VM instruction.
pub fn function<S: Into<String>>(function_name: S, local_count: usize) -> VMInstruction {
    VMInstruction::Function(function_name.into(), local_count)
}

/// Utility function for the `call` VM instruction.
pub fn call<S: Into<String>>(function_name: S, argument_count: usize) -> VMInstruction {
    VMInstruction::Call(function_name.into(), argument_count)
}

// endregion

// region: VMInstruction

type Index = usize;
type Label = String;
type Count = usize;
type FunctionName = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VMInstruction {
    Push(Segment, Index),
    Pop(Segment, Index),
    Command(VMCommand),
    Label(LabelAction, Label),
    Function(FunctionName, Count),
    Call(FunctionName, Count),
}

impl VMInstruction {
    fn as_instruction(&self) -> String {
        match self {
            Self::Push(segment, i) => format!("push {segment} {i}"),
            Self::Pop(segment, i) => format!("pop {segment} {i}"),
            Self::Command(command) => command.to_string(),
            Self::Label(label_action, label) => format!("{label_action} {label}"),
            Self::Function(function_name, local_count) => {
                format!("function {function_name} {local_count}")
            }
            Self::Call(function_name, argument_count) => {
                format!("call {function_name} {argument_count}")
            }
        }
    }
}

impl std::fmt::Display for VMInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_instruction())
    }
}

/// Reasons a single line of `.vm` text could not be read as an instruction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("`{0}` is missing operands")]
    MissingOperand(String),

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("unknown segment `{0}`")]
    UnknownSegment(String),

    #[error("`{0}` is not a valid index")]
    InvalidIndex(String),
}

impl FromStr for VMInstruction {
    type Err = ParseError;

    /// Parses one instruction with comments already stripped.
    /// Trailing fields beyond the ones an instruction needs are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        let Some((&name, operands)) = fields.split_first() else {
            return Err(ParseError::MissingOperand(String::new()));
        };

        let operand = |i: usize| {
            operands
                .get(i)
                .copied()
                .ok_or_else(|| ParseError::MissingOperand(name.to_owned()))
        };
        let count = |i: usize| {
            operand(i).and_then(|field| {
                field
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidIndex(field.to_owned()))
            })
        };
        let segment = |i: usize| {
            operand(i).and_then(|field| {
                Segment::from_str(field).map_err(|_| ParseError::UnknownSegment(field.to_owned()))
            })
        };

        if let Ok(command) = VMCommand::from_str(name) {
            return Ok(Self::Command(command));
        }

        if let Ok(label_action) = LabelAction::from_str(name) {
            return Ok(Self::Label(label_action, operand(0)?.to_owned()));
        }

        match name {
            "push" => Ok(Self::Push(segment(0)?, count(1)?)),
            "pop" => Ok(Self::Pop(segment(0)?, count(1)?)),
            "function" => Ok(Self::Function(operand(0)?.to_owned(), count(1)?)),
            "call" => Ok(Self::Call(operand(0)?.to_owned(), count(1)?)),
            _ => Err(ParseError::UnknownCommand(name.to_owned())),
        }
    }
}

#[derive(Debug, strum::Display, strum::EnumString, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum VMCommand {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    Return,
}

#[derive(Debug, strum::Display, strum::EnumString, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum LabelAction {
    Label,
    Goto,
    IfGoto,
}

#[derive(Debug, strum::Display, strum::EnumString, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum Segment {
    Local,
    Argument,
    Static,
    Constant,
    This,
    That,
    Pointer,
    Temp,
}

// endregion
