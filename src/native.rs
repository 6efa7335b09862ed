//! Builtins installed in the global frame of every interpreter.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::environment::Env;
use crate::function::NativeFunction;
use crate::value::Value;

pub fn define_globals(globals: &Env) {
    let natives = [
        NativeFunction::new("clock", 0, |_, _| {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| e.to_string())?;

            Ok(Value::Number(now.as_secs_f64()))
        }),
        NativeFunction::new("input", 0, |interpreter, _| {
            match interpreter.read_line().map_err(|e| e.to_string())? {
                Some(line) => Ok(Value::String(line)),
                None => Ok(Value::Nil),
            }
        }),
        NativeFunction::new("print", 1, |interpreter, args| {
            interpreter
                .write_output(&args[0].to_string())
                .map_err(|e| e.to_string())?;

            Ok(Value::Nil)
        }),
        NativeFunction::new("println", 1, |interpreter, args| {
            interpreter
                .write_output(&format!("{}\n", args[0]))
                .map_err(|e| e.to_string())?;

            Ok(Value::Nil)
        }),
    ];

    let mut frame = globals.borrow_mut();

    for native in natives {
        debug!("Defining native '{}'", native.name);

        let name = native.name.clone();
        frame.define(&name, Value::Native(Rc::new(native)));
    }
}
