use super::token::Span;

/// List of all errors that could possibly occur while compiling a class.
///
/// Every error aborts the class it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unreadable input")]
    Lex { span: Span },

    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("expected an identifier, found `{found}`")]
    ExpectedIdentifier { found: String, span: Span },

    #[error("expected a type, found `{found}`")]
    ExpectedType { found: String, span: Span },

    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: String, span: Span },

    #[error("integer constant `{value}` is out of range (0..=32767)")]
    IntegerOverflow { value: String, span: Span },

    #[error("character `{character}` does not fit in a string constant")]
    CharacterOutOfRange { character: char, span: Span },

    #[error("`{name}` is not defined")]
    UndefinedVariable { name: String, span: Span },
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Self::Lex { span }
            | Self::UnexpectedToken { span, .. }
            | Self::ExpectedIdentifier { span, .. }
            | Self::ExpectedType { span, .. }
            | Self::UnexpectedEnd { span, .. }
            | Self::IntegerOverflow { span, .. }
            | Self::CharacterOutOfRange { span, .. }
            | Self::UndefinedVariable { span, .. } => span.clone(),
        }
    }

    /// Short text for the label placed under the offending source.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Lex { .. } => "cannot be tokenized",
            Self::UnexpectedToken { .. }
            | Self::ExpectedIdentifier { .. }
            | Self::ExpectedType { .. } => "unexpected token",
            Self::UnexpectedEnd { .. } => "input ends here",
            Self::IntegerOverflow { .. } | Self::CharacterOutOfRange { .. } => {
                "does not fit in 15 bits"
            }
            Self::UndefinedVariable { .. } => "not declared in this scope",
        }
    }
}

pub type Fallable<T> = Result<T, Error>;
pub type FallableAction = Fallable<()>;
