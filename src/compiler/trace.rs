//! Optional observation of the parse.
//!
//! The compilation engine reports every production it enters and leaves
//! and every token it consumes to a [`ParseListener`]. Code generation
//! never depends on one being attached.

use super::token::Token;

/// Grammar productions, displayed as their XML element names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum Production {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
}

pub trait ParseListener {
    fn enter(&mut self, _production: Production) {}
    fn exit(&mut self, _production: Production) {}
    fn token(&mut self, _token: &Token) {}
}

/// Listener that ignores everything.
#[derive(Debug, Default)]
pub struct NoTrace;

impl ParseListener for NoTrace {}

/// Records the parse tree as indented XML.
#[derive(Debug, Default)]
pub struct XmlTrace {
    lines: Vec<String>,
    depth: usize,
}

impl XmlTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(&self) -> String {
        self.lines.join("\n")
    }

    fn push_line(&mut self, line: String) {
        self.lines.push(format!("{}{line}", "  ".repeat(self.depth)));
    }
}

impl ParseListener for XmlTrace {
    fn enter(&mut self, production: Production) {
        self.push_line(format!("<{production}>"));
        self.depth += 1;
    }

    fn exit(&mut self, production: Production) {
        self.depth = self.depth.saturating_sub(1);
        self.push_line(format!("</{production}>"));
    }

    fn token(&mut self, token: &Token) {
        self.push_line(token_element(token));
    }
}

/// The flat `<tokens>` listing of a token sequence.
pub fn tokens_xml(tokens: &[Token]) -> String {
    let mut lines = vec![String::from("<tokens>")];
    lines.extend(tokens.iter().map(token_element));
    lines.push(String::from("</tokens>"));

    lines.join("\n")
}

fn token_element(token: &Token) -> String {
    let tag = token.kind;
    format!("<{tag}> {} </{tag}>", escape(&token.lexeme))
}

fn escape(text: &str) -> String {
    text.chars().fold(String::new(), |mut escaped, c| {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
        escaped
    })
}
