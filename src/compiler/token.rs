use std::ops::Range;

/// Character offsets of a token in its source.
pub type Span = Range<usize>;

/// Characters that always form a token of their own.
pub const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn is_symbol(&self, symbol: char) -> bool {
        self.kind == TokenKind::Symbol && self.lexeme.chars().eq([symbol])
    }

    pub const fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }
}

/// Token categories, displayed as their XML tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TokenKind {
    #[strum(serialize = "keyword")]
    Keyword(Keyword),
    #[strum(serialize = "symbol")]
    Symbol,
    #[strum(serialize = "integerConstant")]
    IntConstant,
    #[strum(serialize = "stringConstant")]
    StringConstant,
    #[strum(serialize = "identifier")]
    Identifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}
