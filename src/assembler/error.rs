/// A fatal assembly error, located at a 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Ln-{line}: {kind}")]
pub struct Error {
    pub line: usize,
    pub kind: ErrorKind,
}

impl Error {
    pub const fn new(line: usize, kind: ErrorKind) -> Self {
        Self { line, kind }
    }
}

/// List of all errors that could possibly occur while assembling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Invalid User Symbol `{0}`")]
    InvalidUserSymbol(String),

    #[error("Invalid computation `{0}`")]
    InvalidComputation(String),

    #[error("Invalid destination `{0}`")]
    InvalidDestination(String),

    #[error("Invalid jump `{0}`")]
    InvalidJump(String),

    #[error("address `{0}` does not fit in 15 bits")]
    AddressOutOfRange(String),
}
