//! Splitting raw `Jack` code into tokens.
//!
//! The tokenizer is lenient: every input yields tokens. A run of
//! characters that is neither blank, a symbol nor a string becomes a word,
//! classified afterwards as an integer constant, a keyword or an identifier.
//! An unterminated string ends at the end of its line and an
//! unterminated block comment at the end of the input.

use std::str::FromStr;

use chumsky::prelude::*;

use super::token::{Keyword, Span, Token, TokenKind, SYMBOLS};

pub type LexError = Simple<char>;

pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<LexError>> {
    lexer().parse(source)
}

fn lexer() -> impl Parser<char, Vec<Token>, Error = LexError> {
    let token = string()
        .or(symbol())
        .or(word())
        .map_with_span(|(lexeme, kind), span| Token { lexeme, kind, span });

    trivia()
        .ignore_then(token.then_ignore(trivia()).repeated())
        .then_ignore(end())
}

/// Whitespace and comments.
fn trivia() -> impl Parser<char, (), Error = LexError> + Clone {
    let whitespace = filter(|c: &char| c.is_whitespace()).ignored();

    let line_comment = just("//")
        .then(take_until(text::newline().or(end())))
        .ignored();

    let block_comment = just("/*")
        .then(take_until(just("*/").ignored().or(end())))
        .ignored();

    whitespace
        .or(line_comment)
        .or(block_comment)
        .repeated()
        .ignored()
}

fn string() -> impl Parser<char, (String, TokenKind), Error = LexError> {
    just('"')
        .ignore_then(none_of("\"\r\n").repeated())
        .then_ignore(just('"').or_not())
        .map(|chars| (chars.into_iter().collect::<String>(), TokenKind::StringConstant))
}

fn symbol() -> impl Parser<char, (String, TokenKind), Error = LexError> {
    one_of(SYMBOLS).map(|c: char| (c.to_string(), TokenKind::Symbol))
}

fn word() -> impl Parser<char, (String, TokenKind), Error = LexError> {
    filter(|c: &char| !c.is_whitespace() && *c != '"' && !SYMBOLS.contains(*c))
        .repeated()
        .at_least(1)
        .map(|chars| classify(chars.into_iter().collect::<String>()))
}

fn classify(word: String) -> (String, TokenKind) {
    let kind = if word.chars().all(|c| c.is_ascii_digit()) {
        TokenKind::IntConstant
    } else if let Ok(keyword) = Keyword::from_str(&word) {
        TokenKind::Keyword(keyword)
    } else {
        TokenKind::Identifier
    };

    (word, kind)
}

// region: TokenStream

/// Tokens of one unit together with a cursor.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn has_more_tokens(&self) -> bool {
        self.position < self.tokens.len()
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// The token `offset` places after the current one.
    pub fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    /// Moves past the current token, returning it.
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }

        token
    }

    /// Empty span right after the last token.
    pub fn end_span(&self) -> Span {
        let end = self.tokens.last().map_or(0, |token| token.span.end);
        end..end
    }
}

// endregion

#[cfg(test)]
mod tests {
    use super::*;

    fn lexemes(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .unwrap_or_default()
            .into_iter()
            .map(|token| (token.kind, token.lexeme))
            .collect()
    }

    #[test]
    fn test_whitespace_invariance() {
        let spaced = lexemes("if (x < 0) { let sign = \"negative\"}");
        let packed = lexemes("if(x<0){let sign=\"negative\"}");

        assert_eq!(spaced.len(), 12);
        assert_eq!(spaced, packed);
    }

    #[test]
    fn test_token_kinds() {
        let expected = vec![
            (TokenKind::Keyword(Keyword::Let), String::from("let")),
            (TokenKind::Identifier, String::from("x_1")),
            (TokenKind::Symbol, String::from("=")),
            (TokenKind::IntConstant, String::from("42")),
            (TokenKind::Symbol, String::from(";")),
        ];

        assert_eq!(lexemes("let x_1 = 42;"), expected);
    }

    #[test]
    fn test_string_keeps_blanks_without_quotes() {
        assert_eq!(
            lexemes("\"  hello,  world \""),
            vec![(TokenKind::StringConstant, String::from("  hello,  world "))]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = [
            "/** API doc",
            " * spanning lines */",
            "class // trailing",
            "/* inline */ Main",
            "// last line without newline",
        ]
        .join("\n");

        assert_eq!(
            lexemes(&source),
            vec![
                (TokenKind::Keyword(Keyword::Class), String::from("class")),
                (TokenKind::Identifier, String::from("Main")),
            ]
        );
    }

    #[test]
    fn test_division_is_not_a_comment() {
        assert_eq!(
            lexemes("a/b"),
            vec![
                (TokenKind::Identifier, String::from("a")),
                (TokenKind::Symbol, String::from("/")),
                (TokenKind::Identifier, String::from("b")),
            ]
        );
    }

    #[test]
    fn test_lenient_words() {
        assert_eq!(
            lexemes("123abc 007"),
            vec![
                (TokenKind::Identifier, String::from("123abc")),
                (TokenKind::IntConstant, String::from("007")),
            ]
        );
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert!(tokenize("").is_ok_and(|tokens| tokens.is_empty()));
        assert!(tokenize("  // nothing\n/* at all").is_ok_and(|tokens| tokens.is_empty()));
    }

    #[test]
    fn test_spans() {
        assert!(tokenize("do  Main.run();").is_ok_and(|tokens| tokens[0].span == (0..2)
            && tokens[1].span == (4..8)
            && tokens[2].span == (8..9)));
    }

    #[test]
    fn test_token_stream_cursor() {
        let tokens = tokenize("let x = 1;").unwrap_or_default();
        let mut stream = TokenStream::new(tokens);

        assert!(stream.current().and_then(Token::keyword) == Some(Keyword::Let));
        assert!(stream.peek(2).is_some_and(|token| token.is_symbol('=')));
        assert!(stream.advance().is_some_and(|token| token.lexeme == "let"));
        assert!(stream.current().is_some_and(|token| token.lexeme == "x"));

        for _ in 0..4 {
            stream.advance();
        }
        assert!(!stream.has_more_tokens());
        assert_eq!(stream.advance(), None);
        assert_eq!(stream.end_span(), 10..10);
    }
}
