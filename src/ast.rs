//! Syntax tree produced by the [`Parser`](crate::parser::Parser) and walked by
//! the resolver, the interpreter and the printer.
//!
//! Nodes that name a binding (`Variable`, `Assign`, `This`, `Super`) carry an
//! [`ExprId`].  The resolver keys its binding-distance table on that id rather
//! than on the node's contents, so two textually identical references resolve
//! independently.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a binding-bearing expression node.
///
/// Ids are unique for the whole process, so a table built for one prompt line
/// never collides with nodes parsed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, always an IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,
    False,
    Nil,
}

/// Every kind of *expression*.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(LiteralValue),

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// `name = value`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Infix operator (`+`, `==`, the comma operator, …).
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Prefix operator: `!`, `-`, `++`, `--`.
    Unary { operator: Token, right: Box<Expr> },

    /// Postfix `++` / `--`.
    Postfix { operator: Token, operand: Box<Expr> },

    /// `condition ? then_branch : else_branch`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr>),

    /// Function‑, method‑ or class‑call expression.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    This { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },

    /// Anonymous function literal `fun (a, b) { … }`.
    Lambda(Rc<FunctionDecl>),

    /// `[a, b, c]`
    List { bracket: Token, elements: Vec<Expr> },
}

/// A named function, method or lambda.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Token,

    /// `None` marks a getter (`area { … }`), which is distinct from an empty
    /// parameter list (`area() { … }`).
    pub params: Option<Vec<Token>>,

    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn is_getter(&self) -> bool {
        self.params.is_none()
    }

    pub fn arity(&self) -> usize {
        self.params.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: Token,

    /// Always an [`Expr::Variable`] when present.
    pub superclass: Option<Expr>,

    pub methods: Vec<Rc<FunctionDecl>>,

    /// Members declared with the `static` modifier.
    pub statics: Vec<Rc<FunctionDecl>>,
}

/// Every kind of *statement*.  A program is a sequence of these.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// Both `while` and `for`; the increment runs after every iteration that
    /// does not end in `break`.
    Loop {
        condition: Expr,
        body: Box<Stmt>,
        increment: Option<Expr>,
    },

    Break(Token),

    Continue(Token),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Function(Rc<FunctionDecl>),

    Class(ClassDecl),
}
