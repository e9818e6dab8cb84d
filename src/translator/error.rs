use crate::vm;

/// A fatal translation error, located at a 1-based line of one unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{unit} ln-{line}: {kind}")]
pub struct Error {
    pub unit: String,
    pub line: usize,
    pub kind: ErrorKind,
}

/// List of all errors that could possibly occur during translation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Parse(#[from] vm::ParseError),

    #[error("cannot pop into the constant segment")]
    PopConstant,

    #[error("pointer index must be 0 or 1, found {0}")]
    PointerIndex(usize),

    #[error("temp index must be between 0 and 7, found {0}")]
    TempIndex(usize),

    #[error("constant {0} does not fit in 15 bits")]
    ConstantOutOfRange(usize),
}
