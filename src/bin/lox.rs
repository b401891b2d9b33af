//! Lox interpreter command-line.
//!
//! Four subcommands expose different truncation points of the pipeline:
//! `tokenize` stops after the lexer, `parse` after the parser, `evaluate`
//! parses and evaluates a single expression, and `run` executes a program.
//!
//! Exit codes: 0 on success, 65 on a lexical or parse error, 70 on a runtime
//! error, 1 on CLI misuse.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use lox::interpreter::{Interpreter, LoxError};

#[derive(Parser, Debug)]
#[command(version, about = "Tree-walking interpreter for a small Lox-family language")]
struct Cli {
    /// Enable diagnostic logging on standard error.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token stream, one token per line.
    Tokenize { file: PathBuf },
    /// Print the parsed syntax tree in s-expression form.
    Parse { file: PathBuf },
    /// Evaluate a single expression and print its value.
    Evaluate { file: PathBuf },
    /// Execute a program.
    Run { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    init_logging(cli.verbose);

    let file: &Path = match &cli.command {
        Command::Tokenize { file } => file,
        Command::Parse { file } => file,
        Command::Evaluate { file } => file,
        Command::Run { file } => file,
    };

    let source = match read_source(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(1);
        }
    };

    let mut stdout = io::stdout();
    let mut interp = Interpreter::new(&mut stdout);
    let result = match &cli.command {
        Command::Tokenize { .. } => interp.tokenize(&source),
        Command::Parse { .. } => interp.parse(&source),
        Command::Evaluate { .. } => interp.evaluate(&source),
        Command::Run { .. } => interp.run(&source),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        // Lexical diagnostics were already printed by the scanner.
        Err(LoxError::Lex) => ExitCode::from(65),
        Err(e @ LoxError::Parse(_)) => {
            eprintln!("{}", e);
            ExitCode::from(65)
        }
        Err(e @ LoxError::Runtime(_)) => {
            eprintln!("{}", e);
            ExitCode::from(70)
        }
    }
}

fn read_source(path: &Path) -> Result<String, anyhow::Error> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Off
    };
    env_logger::Builder::new().filter_level(level).init();
}
