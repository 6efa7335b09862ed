//! Centralised error hierarchy for the **Rox interpreter**.
//!
//! Compile-time problems (lexical, syntactic and resolution errors, plus
//! unused-local warnings) are gathered into a [`Diagnostics`] collector that
//! each front-end pass returns to its caller.  Runtime failures travel as
//! [`RoxError::Runtime`] and carry the line of the token that triggered them.
//!
//! The module **does not** print diagnostics itself.

use std::fmt;
use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// One or more compile-time errors; the program never started running.
    #[error("{0}")]
    Compile(Diagnostics),

    /// Runtime evaluation error.
    #[error("{message} [line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl RoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        RoxError::Lex { message, line }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", line, message);

        RoxError::Runtime { message, line }
    }

    /// Process exit status the CLI reports for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RoxError::Lex { .. } | RoxError::Compile(_) | RoxError::Utf8(_) => 65,
            RoxError::Runtime { .. } => 70,
            RoxError::Io(_) => 74,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, RoxError>;

/// Whether a diagnostic blocks execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single compile-time report: `[line N] Error at 'x': message`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,

    /// ` at 'lexeme'`, ` at end`, or empty when no token applies.
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    /// An error without a token, as the scanner reports them.
    pub fn error<S: Into<String>>(line: usize, message: S) -> Self {
        Self {
            severity: Severity::Error,
            line,
            location: String::new(),
            message: message.into(),
        }
    }

    /// An error attributed to `token`.
    pub fn error_at<S: Into<String>>(token: &Token, message: S) -> Self {
        Self {
            severity: Severity::Error,
            line: token.line,
            location: location_of(token),
            message: message.into(),
        }
    }

    /// A non-blocking warning attributed to `token`.
    pub fn warning_at<S: Into<String>>(token: &Token, message: S) -> Self {
        Self {
            severity: Severity::Warning,
            line: token.line,
            location: location_of(token),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };

        write!(
            f,
            "[line {}] {}{}: {}",
            self.line, kind, self.location, self.message
        )
    }
}

/// Ordered collector of diagnostics produced by one front-end pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        info!("Recording diagnostic: {}", diagnostic);

        self.entries.push(diagnostic);
    }

    /// Append every entry of `other`, keeping order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| !d.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }

        Ok(())
    }
}
