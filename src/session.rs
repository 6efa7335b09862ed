//! Front-to-back pipeline: tokenize → parse → resolve → interpret.
//!
//! A [`Session`] keeps one interpreter alive across calls, so globals defined
//! by one prompt line are visible to the next.

use std::io::{BufRead, Write};

use log::{debug, info};

use crate::ast::Stmt;
use crate::error::{Diagnostics, Result, RoxError};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner;
use crate::token::{Token, TokenType};

/// How a chunk of source is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A whole file.
    Script,

    /// One prompt line: a missing trailing `;` is supplied and bare
    /// expression values are echoed.
    Interactive,
}

pub struct Session {
    interpreter: Interpreter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_io(input, output),
        }
    }

    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Run `src`.  On success the returned collector holds only warnings.
    /// Any lexical, syntax or resolution error yields
    /// [`RoxError::Compile`] without running anything.
    pub fn run(&mut self, src: &str, mode: Mode) -> Result<Diagnostics> {
        info!("Running {:?} source ({} bytes)", mode, src.len());

        let (tokens, mut diagnostics) = scanner::tokenize(src);

        let (statements, parse_diagnostics) = match mode {
            Mode::Script => Parser::new(tokens).parse(),
            Mode::Interactive => parse_line(tokens),
        };
        diagnostics.extend(parse_diagnostics);

        if diagnostics.has_errors() {
            return Err(RoxError::Compile(diagnostics));
        }

        let (locals, resolve_diagnostics) = Resolver::new().resolve(&statements);
        diagnostics.extend(resolve_diagnostics);

        if diagnostics.has_errors() {
            return Err(RoxError::Compile(diagnostics));
        }

        self.interpreter.resolve(locals);

        match mode {
            Mode::Script => self.interpreter.interpret(&statements)?,
            Mode::Interactive => self.interpreter.interpret_echo(&statements)?,
        }

        debug!("Run finished with {} warning(s)", diagnostics.len());
        Ok(diagnostics)
    }
}

/// Parse one prompt line.  When the line as typed does not parse, it is
/// parsed again with a `;` before `EOF`; if that fails too, the errors of the
/// line as typed are reported.
fn parse_line(tokens: Vec<Token>) -> (Vec<Stmt>, Diagnostics) {
    let Some(terminated) = terminate_statement(&tokens) else {
        return Parser::new(tokens).parse();
    };

    let typed = Parser::new(tokens).parse();
    if !typed.1.has_errors() {
        return typed;
    }

    debug!("Retrying prompt line with a trailing ';'");
    let retried = Parser::new(terminated).parse();
    if retried.1.has_errors() {
        typed
    } else {
        retried
    }
}

/// `tokens` with `;` inserted before `EOF`, or `None` when the line is empty
/// or already ends with `;`.
fn terminate_statement(tokens: &[Token]) -> Option<Vec<Token>> {
    let eof_at = match tokens.last() {
        Some(last) if last.token_type == TokenType::EOF => tokens.len() - 1,
        _ => tokens.len(),
    };

    let last = &tokens[eof_at.checked_sub(1)?];
    if last.token_type == TokenType::SEMICOLON {
        return None;
    }

    let mut terminated = tokens.to_vec();
    terminated.insert(eof_at, Token::new(TokenType::SEMICOLON, ";", last.line));
    Some(terminated)
}
