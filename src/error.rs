// ABOUTME: Error types and the process-wide diagnostic sink for the interpreter pipeline

use crate::token::{Token, TokenType};
use std::cell::Cell;
use thiserror::Error;

/// A single scan-time failure (unexpected character, unterminated string).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

/// A single parse-time failure, carrying enough context to render
/// "at end" vs. "at 'lexeme'" diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub line: usize,
    pub at_end: bool,
    pub lexeme: String,
    pub message: String,
}

impl ParseError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        ParseError {
            line: token.line,
            at_end: token.kind == TokenType::Eof,
            lexeme: token.lexeme.clone(),
            message: message.into(),
        }
    }
}

/// A single semantic-analysis failure found by the resolver.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ResolveError {
    pub line: usize,
    pub message: String,
}

impl ResolveError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        ResolveError {
            line: token.line,
            message: message.into(),
        }
    }
}

/// A failure raised while executing already-resolved code: type mismatch,
/// arity mismatch, undefined variable/property, non-callable call, etc.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        RuntimeError {
            line: token.line,
            message: message.into(),
        }
    }
}

/// Process-wide diagnostic sink. Formats and prints errors to stdout in the
/// bit-exact shapes spec.md §6 requires, and tracks the two flags the driver
/// uses to pick an exit code. Mirrors the role of `Logger` in the original
/// implementation, but as an instance rather than a type with static state,
/// so REPL mode can reset `had_error` between lines without touching a
/// process-global.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    /// Resets the compile-time error flag; used by the REPL between lines.
    pub fn reset(&self) {
        self.had_error.set(false);
    }

    pub fn report_lex(&self, err: &LexError) {
        println!("[line {}] Error : {}", err.line, err.message);
        self.had_error.set(true);
    }

    pub fn report_parse(&self, err: &ParseError) {
        let location = if err.at_end {
            "at end".to_string()
        } else {
            format!("at '{}'", err.lexeme)
        };
        println!("[line {}] Error {}: {}", err.line, location, err.message);
        self.had_error.set(true);
    }

    pub fn report_resolve(&self, err: &ResolveError) {
        println!("[line {}] Error : {}", err.line, err.message);
        self.had_error.set(true);
    }

    pub fn report_runtime(&self, err: &RuntimeError) {
        println!("{}", err.message);
        println!("[line {}]", err.line);
        self.had_runtime_error.set(true);
    }
}
