use std::{
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use color_print::ceprintln;

use fileio::{
    input::SourceFile,
    output::{self, OutputFile},
};

mod assembler;
mod compiler;
mod fileio;
#[cfg(test)]
mod testing;
mod translator;
mod vm;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Print a status line for every processed file
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile `.jack` classes into `.vm` files next to their sources
    Compile {
        /// A `.jack` file or a directory of them
        path: PathBuf,

        /// Also write the token listing (`<Name>T.xml`) and parse tree (`<Name>.xml`)
        #[clap(long)]
        xml: bool,
    },

    /// Translate `.vm` files into a single `.asm` program
    Translate {
        /// A `.vm` file or a directory of them
        path: PathBuf,

        /// Output file [default: `<file>.asm` or `<dir>/<dir>.asm`]
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble `.asm` programs into `.hack` files
    Assemble {
        /// An `.asm` file or a directory of them
        path: PathBuf,

        /// Output file, for a single input only [default: `<file>.hack`]
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile, translate and assemble a `Jack` program, keeping every intermediate file
    Build {
        /// A `.jack` file or a directory of them
        path: PathBuf,
    },
}

/// Anything that stops a command.
#[derive(Debug, thiserror::Error)]
enum Failure {
    #[error("cannot access `{}`: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{0}")]
    Usage(String),

    #[error("{error}")]
    Compile {
        unit: SourceFile,
        error: compiler::error::Error,
    },

    #[error("{error}")]
    Translate {
        unit: Option<SourceFile>,
        error: translator::error::Error,
    },

    #[error("{error}")]
    Assemble {
        unit: SourceFile,
        error: assembler::error::Error,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error_report::display(&failure);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Failure> {
    let verbose = args.verbose;

    match &args.command {
        Command::Compile { path, xml } => compile(path, *xml, verbose).map(|_| ()),
        Command::Translate { path, output } => {
            let units = load_units(path, "vm")?;
            let output = match output {
                Some(output) => output.clone(),
                None => default_output(path, "asm")?,
            };

            translate(&units, &output, verbose).map(|_| ())
        }
        Command::Assemble { path, output } => {
            let units = load_units(path, "asm")?;
            if output.is_some() && units.len() > 1 {
                return Err(Failure::Usage(String::from(
                    "`--output` needs a single `.asm` file",
                )));
            }

            assemble(&units, output.as_deref(), verbose)
        }
        Command::Build { path } => build(path, verbose),
    }
}

// region: Stages

/// Compile every class, writing the `.vm` (and optionally `.xml`) files
/// only once all of them compiled.
fn compile(path: &Path, xml: bool, verbose: bool) -> Result<Vec<SourceFile>, Failure> {
    let units = load_units(path, "jack")?;

    let mut outputs = Vec::new();
    let mut vm_units = Vec::new();

    for unit in &units {
        let vm_path = unit.path().with_extension("vm");
        status(verbose, "Compiling", unit.path(), &vm_path);

        let compile_error = |error| Failure::Compile {
            unit: unit.clone(),
            error,
        };

        let vm_code = if xml {
            let traced = compiler::compile_class_traced(unit).map_err(compile_error)?;
            outputs.push(OutputFile::new(xml_path(unit, "T"), traced.tokens_xml));
            outputs.push(OutputFile::new(xml_path(unit, ""), traced.tree_xml));
            traced.vm_code
        } else {
            compiler::compile_class(unit).map_err(compile_error)?
        };

        vm_units.push(SourceFile::new(vm_path.clone(), vm_code.clone()));
        outputs.push(OutputFile::new(vm_path, vm_code));
    }

    outputs.iter().try_for_each(write)?;
    Ok(vm_units)
}

fn translate(units: &[SourceFile], output: &Path, verbose: bool) -> Result<String, Failure> {
    for unit in units {
        status(verbose, "Translating", unit.path(), output);
    }

    let assembly = translator::translate(units).map_err(|error| Failure::Translate {
        unit: units
            .iter()
            .find(|unit| unit.module_name() == error.unit)
            .cloned(),
        error,
    })?;

    write(&OutputFile::new(output.to_path_buf(), assembly.clone()))?;
    Ok(assembly)
}

/// Assemble each unit as a program of its own.
fn assemble(units: &[SourceFile], output: Option<&Path>, verbose: bool) -> Result<(), Failure> {
    let mut session = assembler::Assembler::new();
    let mut outputs = Vec::new();

    for unit in units {
        let hack_path = output.map_or_else(|| unit.path().with_extension("hack"), Path::to_path_buf);
        status(verbose, "Assembling", unit.path(), &hack_path);

        session.reset();
        let words = session
            .assemble(unit.content())
            .map_err(|error| Failure::Assemble {
                unit: unit.clone(),
                error,
            })?;

        outputs.push(OutputFile::new(hack_path, assembler::to_text(&words)));
    }

    outputs.iter().try_for_each(write)
}

fn build(path: &Path, verbose: bool) -> Result<(), Failure> {
    let vm_units = compile(path, false, verbose)?;

    let asm_path = default_output(path, "asm")?;
    let assembly = translate(&vm_units, &asm_path, verbose)?;

    let hack_path = default_output(path, "hack")?;
    let asm_unit = SourceFile::new(asm_path, assembly);
    status(verbose, "Assembling", asm_unit.path(), &hack_path);

    let binary = assembler::assemble(&asm_unit).map_err(|error| Failure::Assemble {
        unit: asm_unit.clone(),
        error,
    })?;

    write(&OutputFile::new(hack_path, binary))
}

// endregion

// region: File helpers

fn load_units(path: &Path, extension: &str) -> Result<Vec<SourceFile>, Failure> {
    let paths = fileio::input::discover(path, extension).map_err(|source| Failure::Io {
        path: path.to_path_buf(),
        source,
    })?;

    paths
        .into_iter()
        .map(|path| {
            SourceFile::load(&path).map_err(|source| Failure::Io { path, source })
        })
        .collect()
}

fn default_output(path: &Path, extension: &str) -> Result<PathBuf, Failure> {
    fileio::default_output(path, extension).map_err(|source| Failure::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn xml_path(unit: &SourceFile, suffix: &str) -> PathBuf {
    unit.path()
        .with_file_name(format!("{}{suffix}.xml", unit.module_name()))
}

fn write(output_file: &OutputFile) -> Result<(), Failure> {
    output::generate(output_file).map_err(|source| Failure::Io {
        path: output_file.path().to_path_buf(),
        source,
    })
}

fn status(verbose: bool, action: &str, from: &Path, to: &Path) {
    if verbose {
        ceprintln!(
            "<g,s>{:>12}</> {} -> {}",
            action,
            from.display(),
            to.display()
        );
    }
}

// endregion

mod error_report {
    use std::ops::Range;

    use ariadne::{Label, Report, ReportKind, Source};
    use color_print::ceprintln;

    use super::Failure;
    use crate::fileio::input::SourceFile;

    pub fn display(failure: &Failure) {
        match failure {
            Failure::Compile { unit, error } => {
                report(unit, error.span(), &error.to_string(), error.label());
            }
            Failure::Translate {
                unit: Some(unit),
                error,
            } => report(
                unit,
                line_span(unit.content(), error.line),
                &error.kind.to_string(),
                "in this instruction",
            ),
            Failure::Assemble { unit, error } => report(
                unit,
                line_span(unit.content(), error.line),
                &error.kind.to_string(),
                "in this instruction",
            ),
            _ => ceprintln!("<r,s>error</>: {failure}"),
        }
    }

    fn report(unit: &SourceFile, span: Range<usize>, message: &str, label: &str) {
        let file_path = unit.path().to_string_lossy();
        let file_path = file_path.as_ref();

        let printed = Report::build(ReportKind::Error, file_path, span.start)
            .with_message(message)
            .with_label(Label::new((file_path, span)).with_message(label))
            .finish()
            .eprint((file_path, Source::from(unit.content())));

        if printed.is_err() {
            ceprintln!("<r,s>error</>: {file_path}: {message}");
        }
    }

    /// Character range of the 1-based `line`.
    fn line_span(content: &str, line: usize) -> Range<usize> {
        let mut start = 0;

        for (idx, text) in content.split('\n').enumerate() {
            let length = text.chars().count();
            if idx + 1 == line {
                return start..start + length;
            }
            start += length + 1;
        }

        start..start
    }

}
