//! Tree‑walking evaluator.
//!
//! Statements return a [`Flow`] describing how control leaves them; `break`,
//! `continue` and `return` propagate as ordinary values up to the loop or call
//! that consumes them.  Runtime failures propagate as [`RoxError::Runtime`]
//! and abort the current top‑level pass.
//!
//! Variable references consult the binding distances computed by the
//! [`Resolver`](crate::resolver::Resolver); a reference without an entry is a
//! global and is looked up by name in the global frame.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{ClassDecl, Expr, ExprId, LiteralValue, Stmt};
use crate::class::Class;
use crate::environment::{Env, Environment};
use crate::error::{Result, RoxError};
use crate::function::{Callable, Function};
use crate::list::List;
use crate::native;
use crate::resolver::Locals;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How control left a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub struct Interpreter {
    globals: Env,
    environment: Env,
    locals: Locals,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter wired to the process's stdin/stdout.
    pub fn new() -> Self {
        Self::with_io(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// Interpreter whose `input`/`print`/`println` builtins use the given
    /// streams.
    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals: Env = Rc::new(std::cell::RefCell::new(Environment::new()));
        native::define_globals(&globals);

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            input,
            output,
        }
    }

    /// Record binding distances from a resolver pass.  Entries accumulate
    /// across prompt lines: closures from earlier lines still look up their
    /// nodes here, and ids are never reused, so nothing is evicted.
    pub fn resolve(&mut self, locals: Locals) {
        debug!("Absorbing {} resolved binding(s)", locals.len());

        self.locals.extend(locals);
    }

    /// Interprets a list of statements (a "program").  The first runtime
    /// error abandons the remaining statements.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            self.execute(stmt)?;
        }

        info!("Interpretation completed successfully");
        self.flush()
    }

    /// Like [`interpret`](Self::interpret) but echoes the value of every bare
    /// expression statement, as the interactive prompt does.
    pub fn interpret_echo(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            match stmt {
                Stmt::Expression(expr) => {
                    let value = self.evaluate(expr)?;
                    writeln!(self.output, "{}", value)?;
                }

                other => {
                    self.execute(other)?;
                }
            }
        }

        self.flush()
    }

    // ───────────────────────── I/O used by natives ─────────────────────────

    pub fn write_output(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()
    }

    /// One line without its terminator; `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        Ok(Some(line))
    }

    fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    // ───────────────────────────── statements ─────────────────────────────

    /// Executes a single statement.
    pub(crate) fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let env: Env = Environment::child(&self.environment);
                self.execute_block(statements, env)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::Loop {
                condition,
                body,
                increment,
            } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }

                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Break(_) => Ok(Flow::Break),

            Stmt::Continue(_) => Ok(Flow::Continue),

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = Function::new(Rc::clone(decl), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Class(decl) => {
                self.declare_class(decl)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` in `environment`, restoring the current frame
    /// afterwards whatever the outcome.
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], environment: Env) -> Result<Flow> {
        let previous: Env = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_sequence(statements);
        self.environment = previous;

        result
    }

    fn execute_sequence(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }

        Ok(Flow::Normal)
    }

    fn declare_class(&mut self, decl: &ClassDecl) -> Result<()> {
        debug!("Declaring class '{}'", decl.name.lexeme);

        let superclass: Option<Rc<Class>> = match &decl.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    let line = match expr {
                        Expr::Variable { name, .. } => name.line,
                        _ => decl.name.line,
                    };

                    return Err(RoxError::runtime(line, "Superclass must be a class."));
                }
            },

            None => None,
        };

        let previous: Env = Rc::clone(&self.environment);

        if let Some(superclass) = &superclass {
            let env: Env = Environment::child(&self.environment);
            env.borrow_mut()
                .define("super", Value::Class(Rc::clone(superclass)));
            self.environment = env;
        }

        let methods: HashMap<String, Rc<Function>> = decl
            .methods
            .iter()
            .map(|method| {
                let is_initializer = method.name.lexeme == decl.name.lexeme;
                let function =
                    Function::new(Rc::clone(method), Rc::clone(&self.environment), is_initializer);

                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let statics: HashMap<String, Rc<Function>> = decl
            .statics
            .iter()
            .map(|method| {
                let function = Function::new(Rc::clone(method), Rc::clone(&self.environment), false);

                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        self.environment = previous;

        let class = Class::new(&decl.name.lexeme, superclass, methods, statics);
        self.environment
            .borrow_mut()
            .define(&decl.name.lexeme, Value::Class(Rc::new(class)));

        info!("Class '{}' defined", decl.name.lexeme);
        Ok(())
    }

    // ───────────────────────────── expressions ────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                self.assign_variable(*id, name, value.clone())?;

                Ok(value)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuits = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Unary { operator, right } => match operator.token_type {
                TokenType::PLUS_PLUS | TokenType::MINUS_MINUS => {
                    self.increment(operator, right, true)
                }

                TokenType::MINUS => match self.evaluate(right)? {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    _ => Err(RoxError::runtime(operator.line, "Operand must be a number.")),
                },

                TokenType::BANG => Ok(Value::Bool(!self.evaluate(right)?.is_truthy())),

                _ => Err(RoxError::runtime(
                    operator.line,
                    format!("Invalid unary operator '{}'.", operator.lexeme),
                )),
            },

            Expr::Postfix { operator, operand } => self.increment(operator, operand, false),

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call_value(callee, values, paren)
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                self.get_property(&object, name)
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                let value = self.evaluate(value)?;
                self.set_property(&object, name, value.clone())?;

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),

            Expr::Lambda(decl) => {
                let function = Function::new(Rc::clone(decl), Rc::clone(&self.environment), false);

                Ok(Value::Function(Rc::new(function)))
            }

            Expr::List { elements, .. } => {
                let mut items: Vec<Value> = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element)?);
                }

                Ok(Value::List(Rc::new(List::new(items))))
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme)
                .ok_or_else(|| {
                    RoxError::runtime(name.line, format!("Undefined variable '{}'.", name.lexeme))
                }),

            None => self.globals.borrow().get(name),
        }
    }

    fn assign_variable(&mut self, id: ExprId, name: &Token, value: Value) -> Result<()> {
        match self.locals.get(&id) {
            Some(&distance) => {
                if Environment::assign_at(&self.environment, distance, &name.lexeme, value) {
                    Ok(())
                } else {
                    Err(RoxError::runtime(
                        name.line,
                        format!("Undefined variable '{}'.", name.lexeme),
                    ))
                }
            }

            None => self.globals.borrow_mut().assign(name, value),
        }
    }

    /// Shared by prefix and postfix `++`/`--`.  Prefix yields the updated
    /// value, postfix the prior one.
    fn increment(&mut self, operator: &Token, target: &Expr, prefix: bool) -> Result<Value> {
        let delta: f64 = if operator.token_type == TokenType::PLUS_PLUS {
            1.0
        } else {
            -1.0
        };

        let updated = |old: &Value| -> Result<(f64, f64)> {
            match old {
                Value::Number(n) => Ok((*n, *n + delta)),
                _ => Err(RoxError::runtime(
                    operator.line,
                    format!("Operand of '{}' must be a number.", operator.lexeme),
                )),
            }
        };

        let (old, new) = match target {
            Expr::Variable { id, name } => {
                let (old, new) = updated(&self.look_up_variable(*id, name)?)?;
                self.assign_variable(*id, name, Value::Number(new))?;
                (old, new)
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                let (old, new) = updated(&self.get_property(&object, name)?)?;
                self.set_property(&object, name, Value::Number(new))?;
                (old, new)
            }

            _ => {
                return Err(RoxError::runtime(
                    operator.line,
                    format!("Invalid operand for '{}'.", operator.lexeme),
                ))
            }
        };

        Ok(Value::Number(if prefix { new } else { old }))
    }

    fn call_value(&mut self, callee: Value, arguments: Vec<Value>, paren: &Token) -> Result<Value> {
        match &callee {
            Value::Function(function) => self.invoke(function.as_ref(), arguments, paren),
            Value::Native(native) => self.invoke(native.as_ref(), arguments, paren),
            Value::Class(class) => self.invoke(class, arguments, paren),
            _ => Err(RoxError::runtime(
                paren.line,
                "Can only call functions and classes.",
            )),
        }
    }

    fn invoke(
        &mut self,
        callable: &dyn Callable,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        if arguments.len() != callable.arity() {
            return Err(RoxError::runtime(
                paren.line,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            ));
        }

        callable.call(self, arguments, paren.line)
    }

    /// A method found by property access: getters run immediately, anything
    /// else is handed back as a bound function.
    fn method_access(&mut self, method: Function, name: &Token) -> Result<Value> {
        if method.is_getter() {
            method.call(self, Vec::new(), name.line)
        } else {
            Ok(Value::Function(Rc::new(method)))
        }
    }

    fn get_property(&mut self, object: &Value, name: &Token) -> Result<Value> {
        match object {
            Value::Instance(instance) => {
                if let Some(value) = instance.get_field(&name.lexeme) {
                    return Ok(value);
                }

                match instance.class.find_method(&name.lexeme) {
                    Some(method) => self.method_access(method.bind(object.clone()), name),
                    None => Err(undefined_property(name)),
                }
            }

            Value::Class(class) => match class.find_static(&name.lexeme) {
                Some(method) => self.method_access(method.bind(object.clone()), name),
                None => Err(undefined_property(name)),
            },

            Value::List(list) => match list.method(&name.lexeme) {
                Some(native) => Ok(Value::Native(Rc::new(native))),
                None => Err(undefined_property(name)),
            },

            _ => Err(RoxError::runtime(
                name.line,
                "Only instances have properties.",
            )),
        }
    }

    fn set_property(&mut self, object: &Value, name: &Token, value: Value) -> Result<()> {
        match object {
            Value::Instance(instance) => {
                instance.set_field(&name.lexeme, value);
                Ok(())
            }

            Value::Class(_) => Err(RoxError::runtime(
                name.line,
                "Can't set properties on a class.",
            )),

            Value::List(_) => Err(RoxError::runtime(
                name.line,
                "Can't set properties on a list.",
            )),

            _ => Err(RoxError::runtime(name.line, "Only instances have fields.")),
        }
    }

    /// `super.name`: look the method up from the lexically captured
    /// superclass and bind it to the instance one frame further in.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let misuse = || RoxError::runtime(keyword.line, "Can't use 'super' here.");

        let distance: usize = self.locals.get(&id).copied().ok_or_else(misuse)?;

        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Some(Value::Class(class)) => class,
            _ => return Err(misuse()),
        };

        let receiver: Value = distance
            .checked_sub(1)
            .and_then(|d| Environment::get_at(&self.environment, d, "this"))
            .ok_or_else(misuse)?;

        match superclass.find_method(&method.lexeme) {
            Some(found) => self.method_access(found.bind(receiver), method),
            None => Err(undefined_property(method)),
        }
    }
}

fn undefined_property(name: &Token) -> RoxError {
    RoxError::runtime(name.line, format!("Undefined property '{}'.", name.lexeme))
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RoxError::runtime(
            operator.line,
            format!("Operands of '{}' must be numbers.", operator.lexeme),
        )),
    }
}

/// Applies a strict binary operator to already‑evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::COMMA => Ok(right),

        TokenType::PLUS => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{}{}", left, right)))
            }

            _ => Err(RoxError::runtime(
                operator.line,
                "Operands must be two numbers or at least one string.",
            )),
        },

        TokenType::MINUS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a - b))
        }

        TokenType::STAR => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Number(a * b))
        }

        TokenType::SLASH => {
            let (a, b) = number_operands(operator, &left, &right)?;
            if b == 0.0 {
                return Err(RoxError::runtime(operator.line, "Division by zero."));
            }
            Ok(Value::Number(a / b))
        }

        TokenType::PERCENT => {
            let (a, b) = number_operands(operator, &left, &right)?;
            if b == 0.0 {
                return Err(RoxError::runtime(operator.line, "Modulo by zero."));
            }
            Ok(Value::Number(a % b))
        }

        TokenType::GREATER => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a > b))
        }

        TokenType::GREATER_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a >= b))
        }

        TokenType::LESS => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a < b))
        }

        TokenType::LESS_EQUAL => {
            let (a, b) = number_operands(operator, &left, &right)?;
            Ok(Value::Bool(a <= b))
        }

        TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

        TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

        _ => Err(RoxError::runtime(
            operator.line,
            format!("Invalid binary operator '{}'.", operator.lexeme),
        )),
    }
}
