//! The `Jack` compiler: one `.jack` class in, one `.vm` unit out.

pub mod engine;
pub mod error;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod trace;
pub mod vm_writer;

use engine::Engine;
use error::{Error, Fallable};
use token::Token;
use trace::{NoTrace, XmlTrace};

use crate::fileio::input::SourceFile;

/// Compile a single class into VM code.
pub fn compile_class(source_file: &SourceFile) -> Fallable<String> {
    let tokens = tokenize(source_file)?;
    let (writer, _) = Engine::new(tokens, NoTrace).compile()?;

    Ok(writer.finish())
}

/// A compiled class together with its XML listings.
#[derive(Debug)]
pub struct TracedClass {
    pub vm_code: String,
    pub tokens_xml: String,
    pub tree_xml: String,
}

/// Compile a single class, also recording its tokens and parse tree as XML.
pub fn compile_class_traced(source_file: &SourceFile) -> Fallable<TracedClass> {
    let tokens = tokenize(source_file)?;
    let tokens_xml = trace::tokens_xml(&tokens);

    let (writer, trace) = Engine::new(tokens, XmlTrace::new()).compile()?;

    Ok(TracedClass {
        vm_code: writer.finish(),
        tokens_xml,
        tree_xml: trace.finish(),
    })
}

fn tokenize(source_file: &SourceFile) -> Fallable<Vec<Token>> {
    tokenizer::tokenize(source_file.content()).map_err(|errors| Error::Lex {
        span: errors.first().map_or(0..0, |error| error.span()),
    })
}
