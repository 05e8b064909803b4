// ABOUTME: Library module exposing the scan/parse/resolve/interpret pipeline for testing

pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use error::Diagnostics;
use interpreter::Interpreter;

/// Runs one chunk of source text to completion against a persistent
/// interpreter: scan, parse, resolve, execute, reporting through
/// `diagnostics` at whichever stage halts the pipeline (spec.md §2, §7).
/// Used by both the file driver (one chunk, the whole file) and the REPL
/// (one chunk per line, same interpreter and `Diagnostics` reused across
/// calls so global state and history persist).
pub fn run(source: &str, interpreter: &mut Interpreter, diagnostics: &Diagnostics) {
    let (tokens, lex_errors) = scanner::Scanner::new(source).scan_tokens();
    for err in &lex_errors {
        diagnostics.report_lex(err);
    }

    let (statements, parse_errors) = parser::Parser::new(tokens).parse();
    for err in &parse_errors {
        diagnostics.report_parse(err);
    }

    if diagnostics.had_error() {
        return;
    }

    let (locals, resolve_errors) = resolver::Resolver::new().resolve_program(&statements);
    for err in &resolve_errors {
        diagnostics.report_resolve(err);
    }

    if diagnostics.had_error() {
        return;
    }

    interpreter.set_locals(locals);
    if let Err(err) = interpreter.interpret(&statements) {
        diagnostics.report_runtime(&err);
    }
}

/// Convenience wrapper for tests: runs one self-contained program against a
/// fresh interpreter and returns whether any error was reported at any
/// stage, distinguishing compile-time from runtime per spec.md §6 exit codes.
pub fn run_once(source: &str) -> Result<(), RunFailure> {
    let diagnostics = Diagnostics::new();
    let mut interpreter = Interpreter::new();
    run(source, &mut interpreter, &diagnostics);

    if diagnostics.had_error() {
        Err(RunFailure::Compile)
    } else if diagnostics.had_runtime_error() {
        Err(RunFailure::Runtime)
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunFailure {
    Compile,
    Runtime,
}

impl RunFailure {
    /// Maps to the process exit code spec.md §6 assigns to each failure kind.
    pub fn exit_code(self) -> i32 {
        match self {
            RunFailure::Compile => 65,
            RunFailure::Runtime => 70,
        }
    }
}

// Error types re-exported at crate root so callers (the driver, tests) only
// need one `use` for the full diagnostic vocabulary.
pub use error::{LexError, ParseError, ResolveError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_once_succeeds_on_a_clean_program() {
        assert_eq!(run_once("print 1 + 2;"), Ok(()));
    }

    #[test]
    fn run_once_classifies_a_compile_error() {
        assert_eq!(run_once("{ let a = a; }"), Err(RunFailure::Compile));
    }

    #[test]
    fn run_once_classifies_a_runtime_error() {
        assert_eq!(run_once("print \"x\" + 1;"), Err(RunFailure::Runtime));
    }

    #[test]
    fn exit_code_matches_spec_assignment() {
        assert_eq!(RunFailure::Compile.exit_code(), 65);
        assert_eq!(RunFailure::Runtime.exit_code(), 70);
    }
}
