//! Recursive descent over the `Jack` grammar, emitting VM code
//! as soon as each construct is recognised.
//!
//! Expressions are evaluated strictly left to right, without operator
//! precedence. The first mismatch aborts the whole class.

use phf::phf_map;

use super::{
    error::{Error, Fallable, FallableAction},
    symbol_table::{SubroutineKind, SymbolKind, SymbolTable},
    token::{Keyword, Span, Token, TokenKind},
    tokenizer::TokenStream,
    trace::{ParseListener, Production},
    vm_writer::VMWriter,
};
use crate::vm::{Segment, VMCommand};

const MAX_INTEGER: u16 = 0x7FFF;

#[derive(Debug, Clone, Copy)]
enum BinaryOperator {
    Command(VMCommand),
    /// Implemented by the OS `Math` class.
    Call(&'static str),
}

static BINARY_OPERATORS: phf::Map<char, BinaryOperator> = phf_map! {
    '+' => BinaryOperator::Command(VMCommand::Add),
    '-' => BinaryOperator::Command(VMCommand::Sub),
    '&' => BinaryOperator::Command(VMCommand::And),
    '|' => BinaryOperator::Command(VMCommand::Or),
    '<' => BinaryOperator::Command(VMCommand::Lt),
    '>' => BinaryOperator::Command(VMCommand::Gt),
    '=' => BinaryOperator::Command(VMCommand::Eq),
    '*' => BinaryOperator::Call("Math.multiply"),
    '/' => BinaryOperator::Call("Math.divide"),
};

/// Compiles the tokens of a single class.
pub struct Engine<L: ParseListener> {
    tokens: TokenStream,
    symbols: SymbolTable,
    writer: VMWriter,
    class_name: String,
    listener: L,
}

impl<L: ParseListener> Engine<L> {
    pub fn new(tokens: Vec<Token>, listener: L) -> Self {
        Self {
            tokens: TokenStream::new(tokens),
            symbols: SymbolTable::new(),
            writer: VMWriter::new(),
            class_name: String::new(),
            listener,
        }
    }

    /// Compile the class, handing back the generated code and the listener.
    ///
    /// A unit without any tokens compiles to no code at all.
    pub fn compile(mut self) -> Fallable<(VMWriter, L)> {
        if self.tokens.has_more_tokens() {
            self.compile_class()?;
        }

        if let Some(token) = self.tokens.current() {
            return Err(unexpected("end of input", token));
        }

        Ok((self.writer, self.listener))
    }

    // region: Program structure

    fn compile_class(&mut self) -> FallableAction {
        self.listener.enter(Production::Class);

        self.expect_keyword(&[Keyword::Class])?;
        let (class_name, _) = self.expect_identifier()?;
        self.symbols.start_class(&class_name);
        self.class_name = class_name;

        self.expect_symbol('{')?;
        while matches!(
            self.current_keyword(),
            Some(Keyword::Static | Keyword::Field)
        ) {
            self.compile_class_var_dec()?;
        }
        while matches!(
            self.current_keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            self.compile_subroutine()?;
        }
        self.expect_symbol('}')?;

        self.listener.exit(Production::Class);
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> FallableAction {
        self.listener.enter(Production::ClassVarDec);

        let kind = match self.expect_keyword(&[Keyword::Static, Keyword::Field])? {
            Keyword::Static => SymbolKind::Static,
            _ => SymbolKind::Field,
        };
        let type_name = self.expect_type(false)?;
        self.compile_var_names(&type_name, kind)?;
        self.expect_symbol(';')?;

        self.listener.exit(Production::ClassVarDec);
        Ok(())
    }

    fn compile_subroutine(&mut self) -> FallableAction {
        self.listener.enter(Production::SubroutineDec);

        let kind = match self.expect_keyword(&[
            Keyword::Constructor,
            Keyword::Function,
            Keyword::Method,
        ])? {
            Keyword::Constructor => SubroutineKind::Constructor,
            Keyword::Method => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };
        self.symbols.start_subroutine(kind);

        self.expect_type(true)?;
        let (name, _) = self.expect_identifier()?;

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;
        self.compile_subroutine_body(kind, &name)?;

        self.listener.exit(Production::SubroutineDec);
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> FallableAction {
        self.listener.enter(Production::ParameterList);

        if !self.current_is_symbol(')') {
            loop {
                let type_name = self.expect_type(false)?;
                let (name, _) = self.expect_identifier()?;
                self.symbols.define(&name, &type_name, SymbolKind::Argument);

                if !self.current_is_symbol(',') {
                    break;
                }
                self.expect_symbol(',')?;
            }
        }

        self.listener.exit(Production::ParameterList);
        Ok(())
    }

    fn compile_subroutine_body(&mut self, kind: SubroutineKind, name: &str) -> FallableAction {
        self.listener.enter(Production::SubroutineBody);
        self.expect_symbol('{')?;

        while self.current_keyword() == Some(Keyword::Var) {
            self.compile_var_dec()?;
        }

        // the local count is only known once every `var` is read
        let function_name = format!("{}.{name}", self.class_name);
        self.writer
            .write_function(&function_name, self.symbols.var_count(SymbolKind::Local));

        match kind {
            SubroutineKind::Constructor => {
                self.writer.write_push(
                    Segment::Constant,
                    self.symbols.var_count(SymbolKind::Field),
                );
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;

        self.expect_symbol('}')?;
        self.listener.exit(Production::SubroutineBody);
        Ok(())
    }

    fn compile_var_dec(&mut self) -> FallableAction {
        self.listener.enter(Production::VarDec);

        self.expect_keyword(&[Keyword::Var])?;
        let type_name = self.expect_type(false)?;
        self.compile_var_names(&type_name, SymbolKind::Local)?;
        self.expect_symbol(';')?;

        self.listener.exit(Production::VarDec);
        Ok(())
    }

    /// `name (, name)*`, defining each name.
    fn compile_var_names(&mut self, type_name: &str, kind: SymbolKind) -> FallableAction {
        loop {
            let (name, _) = self.expect_identifier()?;
            self.symbols.define(&name, type_name, kind);

            if !self.current_is_symbol(',') {
                return Ok(());
            }
            self.expect_symbol(',')?;
        }
    }

    // endregion

    // region: Statements

    fn compile_statements(&mut self) -> FallableAction {
        self.listener.enter(Production::Statements);

        loop {
            match self.current_keyword() {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => break,
            }
        }

        self.listener.exit(Production::Statements);
        Ok(())
    }

    /// `{ statements }`
    fn compile_block(&mut self) -> FallableAction {
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')
    }

    fn compile_let(&mut self) -> FallableAction {
        self.listener.enter(Production::LetStatement);

        self.expect_keyword(&[Keyword::Let])?;
        let (name, span) = self.expect_identifier()?;
        let (segment, index) = self.variable(&name, span)?;

        if self.current_is_symbol('[') {
            // the target address stays on the stack while the value is computed
            self.expect_symbol('[')?;
            self.writer.write_push(segment, index);
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_arithmetic(VMCommand::Add);

            self.expect_symbol('=')?;
            self.compile_expression()?;

            self.writer.write_pop(Segment::Temp, 0);
            self.writer.write_pop(Segment::Pointer, 1);
            self.writer.write_push(Segment::Temp, 0);
            self.writer.write_pop(Segment::That, 0);
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.writer.write_pop(segment, index);
        }

        self.expect_symbol(';')?;
        self.listener.exit(Production::LetStatement);
        Ok(())
    }

    fn compile_if(&mut self) -> FallableAction {
        self.listener.enter(Production::IfStatement);

        self.expect_keyword(&[Keyword::If])?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        let id = self.writer.new_label_id();
        let else_label = format!("IF_ELSE{id}");
        let end_label = format!("IF_END{id}");

        self.writer.write_arithmetic(VMCommand::Not);
        let condition = self.writer.write_if(&else_label);
        self.compile_block()?;

        if self.current_keyword() == Some(Keyword::Else) {
            self.expect_keyword(&[Keyword::Else])?;
            self.writer.write_goto(&end_label);
            self.writer.write_label(&else_label);
            self.compile_block()?;
        } else {
            self.writer.retarget(condition, &end_label);
        }
        self.writer.write_label(&end_label);

        self.listener.exit(Production::IfStatement);
        Ok(())
    }

    fn compile_while(&mut self) -> FallableAction {
        self.listener.enter(Production::WhileStatement);

        let id = self.writer.new_label_id();
        let condition_label = format!("WHILE_EXP{id}");
        let end_label = format!("WHILE_END{id}");

        self.expect_keyword(&[Keyword::While])?;
        self.writer.write_label(&condition_label);
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(VMCommand::Not);
        self.writer.write_if(&end_label);

        self.compile_block()?;
        self.writer.write_goto(&condition_label);
        self.writer.write_label(&end_label);

        self.listener.exit(Production::WhileStatement);
        Ok(())
    }

    fn compile_do(&mut self) -> FallableAction {
        self.listener.enter(Production::DoStatement);

        self.expect_keyword(&[Keyword::Do])?;
        self.compile_subroutine_call()?;
        self.expect_symbol(';')?;
        // discard the returned value
        self.writer.write_pop(Segment::Temp, 0);

        self.listener.exit(Production::DoStatement);
        Ok(())
    }

    fn compile_return(&mut self) -> FallableAction {
        self.listener.enter(Production::ReturnStatement);

        self.expect_keyword(&[Keyword::Return])?;
        if self.current_is_symbol(';') {
            self.writer.write_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.write_return();

        self.listener.exit(Production::ReturnStatement);
        Ok(())
    }

    // endregion

    // region: Expressions

    fn compile_expression(&mut self) -> FallableAction {
        self.listener.enter(Production::Expression);

        self.compile_term()?;
        while let Some(operator) = self.current_operator() {
            self.next_token("an operator")?;
            self.compile_term()?;

            match operator {
                BinaryOperator::Command(command) => self.writer.write_arithmetic(command),
                BinaryOperator::Call(function_name) => self.writer.write_call(function_name, 2),
            }
        }

        self.listener.exit(Production::Expression);
        Ok(())
    }

    fn compile_term(&mut self) -> FallableAction {
        self.listener.enter(Production::Term);

        let token = self
            .tokens
            .current()
            .cloned()
            .ok_or_else(|| self.unexpected_end("a term"))?;

        match token.kind {
            TokenKind::IntConstant => {
                self.next_token("a term")?;
                let value = integer_constant(&token)?;
                self.writer.write_push(Segment::Constant, value);
            }
            TokenKind::StringConstant => {
                self.next_token("a term")?;
                self.write_string(&token)?;
            }
            TokenKind::Keyword(Keyword::True) => {
                self.next_token("a term")?;
                self.writer.write_push(Segment::Constant, 1);
                self.writer.write_arithmetic(VMCommand::Neg);
            }
            TokenKind::Keyword(Keyword::False | Keyword::Null) => {
                self.next_token("a term")?;
                self.writer.write_push(Segment::Constant, 0);
            }
            TokenKind::Keyword(Keyword::This) => {
                self.next_token("a term")?;
                self.writer.write_push(Segment::Pointer, 0);
            }
            TokenKind::Symbol if token.is_symbol('(') => {
                self.expect_symbol('(')?;
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            TokenKind::Symbol if token.is_symbol('-') || token.is_symbol('~') => {
                self.next_token("a term")?;
                self.compile_term()?;

                let command = if token.is_symbol('-') {
                    VMCommand::Neg
                } else {
                    VMCommand::Not
                };
                self.writer.write_arithmetic(command);
            }
            TokenKind::Identifier => {
                let next = self.tokens.peek(1);

                if next.is_some_and(|next| next.is_symbol('[')) {
                    self.compile_array_access()?;
                } else if next.is_some_and(|next| next.is_symbol('(') || next.is_symbol('.')) {
                    self.compile_subroutine_call()?;
                } else {
                    let (name, span) = self.expect_identifier()?;
                    let (segment, index) = self.variable(&name, span)?;
                    self.writer.write_push(segment, index);
                }
            }
            _ => return Err(unexpected("a term", &token)),
        }

        self.listener.exit(Production::Term);
        Ok(())
    }

    /// `name[index]` as a value.
    fn compile_array_access(&mut self) -> FallableAction {
        let (name, span) = self.expect_identifier()?;
        let (segment, index) = self.variable(&name, span)?;

        self.expect_symbol('[')?;
        self.writer.write_push(segment, index);
        self.compile_expression()?;
        self.expect_symbol(']')?;

        self.writer.write_arithmetic(VMCommand::Add);
        self.writer.write_pop(Segment::Pointer, 1);
        self.writer.write_push(Segment::That, 0);
        Ok(())
    }

    /// `f(args)`, `var.m(args)` or `Class.f(args)`.
    fn compile_subroutine_call(&mut self) -> FallableAction {
        let (name, span) = self.expect_identifier()?;

        let (function_name, implicit_arguments) = if self.current_is_symbol('.') {
            self.expect_symbol('.')?;
            let (subroutine, _) = self.expect_identifier()?;

            // a name missing from the symbol table is a class name
            match self.symbols.type_of(&name).map(str::to_owned) {
                Some(type_name) => {
                    let (segment, index) = self.variable(&name, span)?;
                    self.writer.write_push(segment, index);
                    (format!("{type_name}.{subroutine}"), 1)
                }
                None => (format!("{name}.{subroutine}"), 0),
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0);
            (format!("{}.{name}", self.class_name), 1)
        };

        self.expect_symbol('(')?;
        let argument_count = self.compile_expression_list()?;
        self.expect_symbol(')')?;

        self.writer
            .write_call(&function_name, argument_count + implicit_arguments);
        Ok(())
    }

    /// Returns the number of expressions compiled.
    fn compile_expression_list(&mut self) -> Fallable<usize> {
        self.listener.enter(Production::ExpressionList);

        let mut count = 0;
        if !self.current_is_symbol(')') {
            loop {
                self.compile_expression()?;
                count += 1;

                if !self.current_is_symbol(',') {
                    break;
                }
                self.expect_symbol(',')?;
            }
        }

        self.listener.exit(Production::ExpressionList);
        Ok(count)
    }

    /// Every character becomes a `push constant`, so all of them must fit in 15 bits.
    fn write_string(&mut self, token: &Token) -> FallableAction {
        let text = &token.lexeme;

        if let Some(character) = text
            .chars()
            .find(|c| u32::from(*c) > u32::from(MAX_INTEGER))
        {
            return Err(Error::CharacterOutOfRange {
                character,
                span: token.span.clone(),
            });
        }

        self.writer
            .write_push(Segment::Constant, text.chars().count());
        self.writer.write_call("String.new", 1);

        for c in text.chars() {
            self.writer.write_push(Segment::Constant, c as usize);
            self.writer.write_call("String.appendChar", 2);
        }

        Ok(())
    }

    // endregion

    // region: Token helpers

    /// Consume the current token, whatever it is.
    fn next_token(&mut self, expected: &str) -> Fallable<Token> {
        let token = self
            .tokens
            .advance()
            .ok_or_else(|| self.unexpected_end(expected))?;
        self.listener.token(&token);

        Ok(token)
    }

    fn expect_symbol(&mut self, symbol: char) -> FallableAction {
        let expected = format!("`{symbol}`");
        let token = self.next_token(&expected)?;

        if token.is_symbol(symbol) {
            Ok(())
        } else {
            Err(unexpected(&expected, &token))
        }
    }

    fn expect_keyword(&mut self, keywords: &[Keyword]) -> Fallable<Keyword> {
        let expected = keywords
            .iter()
            .map(|keyword| format!("`{keyword}`"))
            .collect::<Vec<_>>()
            .join(" or ");
        let token = self.next_token(&expected)?;

        token
            .keyword()
            .filter(|keyword| keywords.contains(keyword))
            .ok_or_else(|| unexpected(&expected, &token))
    }

    fn expect_identifier(&mut self) -> Fallable<(String, Span)> {
        let token = self.next_token("an identifier")?;

        if token.kind == TokenKind::Identifier {
            Ok((token.lexeme, token.span))
        } else {
            Err(Error::ExpectedIdentifier {
                found: token.lexeme,
                span: token.span,
            })
        }
    }

    /// `int`, `char`, `boolean` or a class name (and `void` for return types).
    fn expect_type(&mut self, allow_void: bool) -> Fallable<String> {
        let token = self.next_token("a type")?;

        let is_type = match token.kind {
            TokenKind::Identifier
            | TokenKind::Keyword(Keyword::Int | Keyword::Char | Keyword::Boolean) => true,
            TokenKind::Keyword(Keyword::Void) => allow_void,
            _ => false,
        };

        if is_type {
            Ok(token.lexeme)
        } else {
            Err(Error::ExpectedType {
                found: token.lexeme,
                span: token.span,
            })
        }
    }

    fn current_keyword(&self) -> Option<Keyword> {
        self.tokens.current().and_then(Token::keyword)
    }

    fn current_is_symbol(&self, symbol: char) -> bool {
        self.tokens
            .current()
            .is_some_and(|token| token.is_symbol(symbol))
    }

    fn current_operator(&self) -> Option<BinaryOperator> {
        let token = self
            .tokens
            .current()
            .filter(|token| token.kind == TokenKind::Symbol)?;

        token
            .lexeme
            .chars()
            .next()
            .and_then(|symbol| BINARY_OPERATORS.get(&symbol).copied())
    }

    fn variable(&self, name: &str, span: Span) -> Fallable<(Segment, usize)> {
        match (self.symbols.kind_of(name), self.symbols.index_of(name)) {
            (Some(kind), Some(index)) => Ok((kind.segment(), index)),
            _ => Err(Error::UndefinedVariable {
                name: name.to_owned(),
                span,
            }),
        }
    }

    fn unexpected_end(&self, expected: &str) -> Error {
        Error::UnexpectedEnd {
            expected: expected.to_owned(),
            span: self.tokens.end_span(),
        }
    }

    // endregion
}

fn unexpected(expected: &str, token: &Token) -> Error {
    Error::UnexpectedToken {
        expected: expected.to_owned(),
        found: token.lexeme.clone(),
        span: token.span.clone(),
    }
}

fn integer_constant(token: &Token) -> Fallable<usize> {
    token
        .lexeme
        .parse::<u16>()
        .ok()
        .filter(|value| *value <= MAX_INTEGER)
        .map(usize::from)
        .ok_or_else(|| Error::IntegerOverflow {
            value: token.lexeme.clone(),
            span: token.span.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{tokenizer::tokenize, trace::NoTrace};

    fn compile(source: &str) -> Fallable<String> {
        let tokens = tokenize(source).unwrap_or_default();
        Engine::new(tokens, NoTrace)
            .compile()
            .map(|(writer, _)| writer.finish())
    }

    /// Wraps `body` in a function `Main.run` with the given locals.
    fn compile_function(locals: &str, body: &str) -> Fallable<String> {
        compile(&format!(
            "class Main {{ function void run() {{ {locals} {body} }} }}"
        ))
    }

    #[test]
    fn test_method_scenario() {
        let source = [
            "class Class {",
            "    static int a;",
            "    field int b;",
            "",
            "    method int test(int dx) {",
            "        let a = b + dx;",
            "        return a;",
            "    }",
            "}",
        ]
        .join("\n");

        let expected = [
            "function Class.test 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push argument 1",
            "add",
            "pop static 0",
            "push static 0",
            "return",
        ]
        .join("\n");

        assert_eq!(compile(&source), Ok(expected));
    }

    #[test]
    fn test_constructor() {
        let source = [
            "class Point {",
            "    field int x, y;",
            "    static int count;",
            "    constructor Point new(int ax, int ay) {",
            "        let x = ax;",
            "        let y = ay;",
            "        return this;",
            "    }",
            "}",
        ]
        .join("\n");

        let expected = [
            "function Point.new 0",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push pointer 0",
            "return",
        ]
        .join("\n");

        assert_eq!(compile(&source), Ok(expected));
    }

    #[test]
    fn test_subroutine_calls() {
        let source = [
            "class Game {",
            "    field Ball ball;",
            "    method void run() {",
            "        var int n;",
            "        do ball.move(n, 2);",
            "        do step();",
            "        do Output.printInt(n);",
            "        return;",
            "    }",
            "}",
        ]
        .join("\n");

        let expected = [
            "function Game.run 1",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push local 0",
            "push constant 2",
            "call Ball.move 3",
            "pop temp 0",
            "push pointer 0",
            "call Game.step 1",
            "pop temp 0",
            "push local 0",
            "call Output.printInt 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
        .join("\n");

        assert_eq!(compile(&source), Ok(expected));
    }

    #[test]
    fn test_expressions_are_left_to_right() {
        let expected = [
            "function Main.run 1",
            "push constant 1",
            "push constant 2",
            "add",
            "push constant 3",
            "call Math.multiply 2",
            "push local 0",
            "neg",
            "push constant 4",
            "push constant 2",
            "call Math.divide 2",
            "sub",
            "lt",
            "pop local 0",
            "push local 0",
            "not",
            "pop local 0",
        ]
        .join("\n");

        assert!(compile_function("var int x;", "let x = 1 + 2 * 3 < (-x - (4 / 2)); let x = ~x;")
            .is_ok_and(|code| code.starts_with(&expected)));
    }

    #[test]
    fn test_constants() {
        let expected = [
            "function Main.run 1",
            "push constant 1",
            "neg",
            "pop local 0",
            "push constant 0",
            "pop local 0",
            "push constant 0",
            "pop local 0",
            "push constant 2",
            "call String.new 1",
            "push constant 72",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "pop local 0",
            "push constant 0",
            "return",
        ]
        .join("\n");

        assert_eq!(
            compile_function(
                "var boolean b;",
                "let b = true; let b = false; let b = null; let b = \"Hi\"; return;"
            ),
            Ok(expected)
        );
    }

    #[test]
    fn test_if_labels() {
        let expected = [
            "function Main.run 1",
            "push local 0",
            "not",
            "if-goto IF_END0",
            "push constant 1",
            "pop local 0",
            "label IF_END0",
            "push local 0",
            "not",
            "if-goto IF_ELSE1",
            "push constant 2",
            "pop local 0",
            "goto IF_END1",
            "label IF_ELSE1",
            "push constant 3",
            "pop local 0",
            "label IF_END1",
        ]
        .join("\n");

        assert!(compile_function(
            "var int x;",
            "if (x) { let x = 1; } if (x) { let x = 2; } else { let x = 3; }"
        )
        .is_ok_and(|code| code == expected));
    }

    #[test]
    fn test_while_labels() {
        let expected = [
            "function Main.run 1",
            "label WHILE_EXP0",
            "push local 0",
            "push constant 10",
            "lt",
            "not",
            "if-goto WHILE_END0",
            "push local 0",
            "push constant 1",
            "add",
            "pop local 0",
            "goto WHILE_EXP0",
            "label WHILE_END0",
        ]
        .join("\n");

        assert_eq!(
            compile_function("var int i;", "while (i < 10) { let i = i + 1; }"),
            Ok(expected)
        );
    }

    #[test]
    fn test_array_store_and_load() {
        let expected = [
            "function Main.run 2",
            "push local 0",
            "push local 1",
            "add",
            "push local 0",
            "push constant 1",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
        ]
        .join("\n");

        assert_eq!(
            compile_function("var Array a; var int i;", "let a[i] = a[1];"),
            Ok(expected)
        );
    }

    #[test]
    fn test_label_ids_restart_per_class() {
        let source = "class A { function void f() { while (true) {} return; } }";

        assert!(compile(source).is_ok_and(|code| code.contains("label WHILE_EXP0")));
        assert!(compile(source).is_ok_and(|code| !code.contains("WHILE_EXP1")));
    }

    #[test]
    fn test_empty_unit() {
        assert_eq!(compile("// nothing to see"), Ok(String::new()));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            compile_function("var int x;", "let x = 1"),
            Err(Error::UnexpectedToken {
                expected: String::from("`;`"),
                found: String::from("}"),
                span: 56..57,
            })
        );

        assert!(compile("class 1 {}").is_err_and(|err| err
            == Error::ExpectedIdentifier {
                found: String::from("1"),
                span: 6..7,
            }));

        assert!(compile("class Main { field foo; }")
            .is_err_and(|err| matches!(err, Error::ExpectedIdentifier { found, .. } if found == ";")));

        assert!(compile("class Main { static void x; }")
            .is_err_and(|err| matches!(err, Error::ExpectedType { found, .. } if found == "void")));

        assert!(compile("class Main {")
            .is_err_and(|err| matches!(err, Error::UnexpectedEnd { expected, .. } if expected == "`}`")));

        assert!(compile("class Main {} class Other {}").is_err_and(|err| matches!(
            err,
            Error::UnexpectedToken { expected, .. } if expected == "end of input"
        )));

        assert!(compile_function("", "let = 1;")
            .is_err_and(|err| matches!(err, Error::ExpectedIdentifier { .. })));

        assert!(compile_function("var int x;", "let x = ;")
            .is_err_and(|err| matches!(err, Error::UnexpectedToken { expected, .. } if expected == "a term")));
    }

    #[test]
    fn test_semantic_errors() {
        assert!(compile_function("", "let y = 1;").is_err_and(|err| err
            == Error::UndefinedVariable {
                name: String::from("y"),
                span: 40..41,
            }));

        assert!(compile_function("var int x;", "let x = 32768;")
            .is_err_and(|err| matches!(err, Error::IntegerOverflow { value, .. } if value == "32768")));

        assert!(compile_function("var int x;", "let x = 32767; return;").is_ok());

        assert!(compile_function("var String s;", "let s = \"ok \u{8000}\";")
            .is_err_and(|err| matches!(err, Error::CharacterOutOfRange { character, .. } if character == '\u{8000}')));

        assert!(compile_function("var String s;", "let s = \"\u{7FFF}\"; return;").is_ok());
    }
}
