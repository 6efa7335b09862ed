//! The builtin list.  Its methods are native functions bound to the backing
//! vector at property-access time, so `var add = xs.add;` keeps working on
//! `xs` after the fact.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::function::NativeFunction;
use crate::value::Value;

pub struct List {
    items: Rc<RefCell<Vec<Value>>>,
}

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Bound method `name`, or `None` when lists have no such property.
    pub fn method(&self, name: &str) -> Option<NativeFunction> {
        let items = Rc::clone(&self.items);

        let native = match name {
            "size" => NativeFunction::new("size", 0, move |_, _| {
                Ok(Value::Number(items.borrow().len() as f64))
            }),

            "get" => NativeFunction::new("get", 1, move |_, args| {
                let items = items.borrow();
                let index = checked_index(&args[0], items.len())?;
                Ok(items[index].clone())
            }),

            "add" => NativeFunction::new("add", 1, move |_, args| {
                items.borrow_mut().push(args[0].clone());
                Ok(args[0].clone())
            }),

            "remove" => NativeFunction::new("remove", 1, move |_, args| {
                let mut items = items.borrow_mut();
                let index = checked_index(&args[0], items.len())?;
                Ok(items.remove(index))
            }),

            _ => return None,
        };

        Some(native)
    }
}

fn checked_index(value: &Value, len: usize) -> Result<usize, String> {
    let Value::Number(n) = value else {
        return Err(format!("List index must be a number, got {}.", value.type_name()));
    };

    if n.fract() != 0.0 {
        return Err("List index must be an integer.".to_string());
    }

    if *n < 0.0 || *n >= len as f64 {
        return Err(format!("List index {} out of range for size {}.", n, len));
    }

    Ok(*n as usize)
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<list of {}>", self.len())
    }
}
