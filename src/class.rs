use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::error::Result;
use crate::function::{Callable, Function};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// A class value.  Static members live on a separate metaclass whose table is
/// searched on its own, with no superclass fallback.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    methods: HashMap<String, Rc<Function>>,
    metaclass: Option<Rc<Class>>,
}

impl Class {
    pub fn new(
        name: &str,
        superclass: Option<Rc<Class>>,
        methods: HashMap<String, Rc<Function>>,
        statics: HashMap<String, Rc<Function>>,
    ) -> Self {
        let metaclass = Class {
            name: format!("{} metaclass", name),
            superclass: None,
            methods: statics,
            metaclass: None,
        };

        Self {
            name: name.to_string(),
            superclass,
            methods,
            metaclass: Some(Rc::new(metaclass)),
        }
    }

    /// Own table first, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass.as_ref()?.find_method(name)
    }

    pub fn find_static(&self, name: &str) -> Option<Rc<Function>> {
        self.metaclass.as_ref()?.methods.get(name).cloned()
    }

    /// The method named after the class, or the nearest inherited one.
    pub fn initializer(&self) -> Option<Rc<Function>> {
        if let Some(init) = self.methods.get(&self.name) {
            return Some(Rc::clone(init));
        }

        self.superclass.as_ref()?.initializer()
    }
}

impl Callable for Rc<Class> {
    fn arity(&self) -> usize {
        self.initializer().map_or(0, |init| init.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value> {
        debug!("Instantiating class '{}'", self.name);

        let instance = Value::Instance(Rc::new(Instance::new(Rc::clone(self))));

        if let Some(init) = self.initializer() {
            init.bind(instance.clone())
                .call(interpreter, arguments, line)?;
        }

        Ok(instance)
    }
}

pub struct Instance {
    pub class: Rc<Class>,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    pub fn set_field(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)
    }
}
