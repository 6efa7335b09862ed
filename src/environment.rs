use crate::error::{Result, RoxError};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope frame.  Every closure created in a frame holds one,
/// so a frame lives as long as its longest holder.
pub type Env = Rc<RefCell<Environment>>;

/// One lexical scope frame.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Env>,
}

impl Environment {
    /// The global frame.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Env) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// A fresh frame nested in `enclosing`, already wrapped for sharing.
    pub fn child(enclosing: &Env) -> Env {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Bind `name` in this frame.  Redefinition overwrites.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Name lookup in this frame only; used for globals.
    pub fn get(&self, name: &Token) -> Result<Value> {
        self.values.get(&name.lexeme).cloned().ok_or_else(|| {
            RoxError::runtime(name.line, format!("Undefined variable '{}'.", name.lexeme))
        })
    }

    /// Overwrite an existing binding in this frame only.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        match self.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }

            None => Err(RoxError::runtime(
                name.line,
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    /// The frame exactly `distance` hops out from `env`.
    pub fn ancestor(env: &Env, distance: usize) -> Option<Env> {
        let mut frame: Env = Rc::clone(env);

        for _ in 0..distance {
            let next: Env = frame.borrow().enclosing.clone()?;
            frame = next;
        }

        Some(frame)
    }

    pub fn get_at(env: &Env, distance: usize, name: &str) -> Option<Value> {
        let frame: Env = Self::ancestor(env, distance)?;
        let found = frame.borrow().values.get(name).cloned();
        found
    }

    /// Returns `false` when no such binding exists at that depth.
    pub fn assign_at(env: &Env, distance: usize, name: &str, value: Value) -> bool {
        let Some(frame) = Self::ancestor(env, distance) else {
            return false;
        };

        let mut frame = frame.borrow_mut();

        match frame.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }

            None => false,
        }
    }
}
