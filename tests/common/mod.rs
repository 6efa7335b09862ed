#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::rc::Rc;

use rox as lox;

use lox::error::{Diagnostics, Result, RoxError};
use lox::session::{Mode, Session};

/// Output sink whose contents stay readable after it is boxed into an
/// interpreter.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session reading `input` and writing into the returned buffer.
pub fn session_with_input(input: &str) -> (Session, SharedBuffer) {
    let out = SharedBuffer::default();
    let session = Session::with_io(
        Box::new(Cursor::new(input.as_bytes().to_vec())),
        Box::new(out.clone()),
    );

    (session, out)
}

pub fn run(src: &str) -> (String, Result<Diagnostics>) {
    let (mut session, out) = session_with_input("");
    let result = session.run(src, Mode::Script);

    (out.contents(), result)
}

/// Output of a program expected to succeed.
pub fn run_ok(src: &str) -> String {
    let (out, result) = run(src);

    if let Err(e) = result {
        panic!("program failed: {}\noutput so far:\n{}", e, out);
    }

    out
}

/// `(message, line)` of the runtime error a program is expected to raise.
pub fn runtime_error(src: &str) -> (String, usize) {
    match run(src).1 {
        Err(RoxError::Runtime { message, line }) => (message, line),
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

/// Rendered compile-time errors of a program expected not to compile.
pub fn compile_errors(src: &str) -> Vec<String> {
    match run(src).1 {
        Err(RoxError::Compile(diagnostics)) => {
            diagnostics.errors().map(|d| d.to_string()).collect()
        }
        other => panic!("expected compile errors, got {:?}", other),
    }
}
