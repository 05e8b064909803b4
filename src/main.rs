// ABOUTME: CLI entry point: runs a script file or drops into a REPL

use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;
use thanatos::error::Diagnostics;
use thanatos::interpreter::Interpreter;

/// A tree-walking interpreter for a small, dynamically-typed, C-like
/// scripting language.
#[derive(ClapParser, Debug)]
#[command(name = "thanatos")]
#[command(version)]
#[command(about = "A tree-walking interpreter for the Language")]
struct CliArgs {
    /// Script file to execute. If omitted, starts the REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    // `try_parse` rather than `parse`: clap's own usage-error exit code is 2,
    // but spec.md §6 reserves 64 for CLI misuse (e.g. more than one script
    // argument), so we intercept and remap it rather than letting clap exit
    // the process directly.
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(64),
            };
        }
    };

    match args.script {
        Some(path) => run_file(&path),
        None => {
            run_repl();
            ExitCode::SUCCESS
        }
    }
}

/// Runs a whole file through the pipeline once and maps the outcome to the
/// process exit codes spec.md §6 assigns: 0 on success, 65 on a compile-time
/// (lex/parse/resolve) error, 70 on a runtime error.
fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Cannot read script file {}: {}", path.display(), err);
            return ExitCode::from(65);
        }
    };

    let diagnostics = Diagnostics::new();
    let mut interpreter = Interpreter::new();
    thanatos::run(&source, &mut interpreter, &diagnostics);

    if diagnostics.had_error() {
        ExitCode::from(65)
    } else if diagnostics.had_runtime_error() {
        ExitCode::from(70)
    } else {
        ExitCode::SUCCESS
    }
}

/// Interactive read-eval-print loop. Interpreter state (the global
/// environment) persists across lines; the compile-error flag is reset
/// after each line so one bad line doesn't poison the session (spec.md
/// §4.6, §7).
fn run_repl() {
    let diagnostics = Diagnostics::new();
    let mut interpreter = Interpreter::new();

    let config = Config::builder().auto_add_history(true).build();
    let mut editor = match Editor::<(), DefaultHistory>::with_config(config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to initialize REPL: {err}");
            return;
        }
    };

    let history_file = ".thanatos_history";
    let _ = editor.load_history(history_file);

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                thanatos::run(&line, &mut interpreter, &diagnostics);
                diagnostics.reset();
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = editor.save_history(history_file);
}
