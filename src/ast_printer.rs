//! Canonical source printer.
//!
//! Renders a tree back to source text that re-parses to the same shape.
//! Parentheses come only from [`Expr::Grouping`] nodes; every other node
//! prints in the order the parser consumed it, so precedence takes care of
//! itself.  Printing, re-parsing and printing again yields identical text.

use crate::ast::{ClassDecl, Expr, FunctionDecl, LiteralValue, Stmt};
use crate::token::{Token, TokenType};
use crate::value::format_number;

const INDENT: &str = "    ";

pub struct AstPrinter {
    out: String,
    depth: usize,
}

impl AstPrinter {
    /// Whole program, one top-level statement per line.
    pub fn print_program(statements: &[Stmt]) -> String {
        let mut printer = AstPrinter {
            out: String::new(),
            depth: 0,
        };

        for stmt in statements {
            printer.stmt(stmt);
        }

        printer.out
    }

    /// A single expression.  Lambda bodies span lines, indented from column
    /// zero.
    pub fn print(expr: &Expr) -> String {
        Self::render(expr, 0)
    }

    /// `depth` is the indentation of the line the expression starts on; a
    /// lambda body nests one level below it.
    fn render(expr: &Expr, depth: usize) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::True => "true".into(),
                LiteralValue::False => "false".into(),
                LiteralValue::Nil => "nil".into(),
                LiteralValue::Str(s) => format!("\"{}\"", s),
                LiteralValue::Number(n) => format_number(*n),
            },

            Expr::Grouping(inner) => format!("({})", Self::render(inner, depth)),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("{} = {}", name.lexeme, Self::render(value, depth))
            }

            Expr::Binary {
                left,
                operator,
                right,
            } if operator.token_type == TokenType::COMMA => {
                format!("{}, {}", Self::render(left, depth), Self::render(right, depth))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                Self::render(left, depth),
                operator.lexeme,
                Self::render(right, depth)
            ),

            Expr::Unary { operator, right } => match operator.token_type {
                TokenType::PLUS_PLUS | TokenType::MINUS_MINUS => {
                    format!("{}{}", operator.lexeme, Self::render(right, depth))
                }
                _ => format!("{} {}", operator.lexeme, Self::render(right, depth)),
            },

            Expr::Postfix { operator, operand } => {
                format!("{}{}", Self::render(operand, depth), operator.lexeme)
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "{} ? {} : {}",
                Self::render(condition, depth),
                Self::render(then_branch, depth),
                Self::render(else_branch, depth)
            ),

            Expr::Call {
                callee, arguments, ..
            } => format!("{}({})", Self::render(callee, depth), Self::print_list(arguments, depth)),

            Expr::Get { object, name } => format!("{}.{}", Self::render(object, depth), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "{}.{} = {}",
                Self::render(object, depth),
                name.lexeme,
                Self::render(value, depth)
            ),

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("super.{}", method.lexeme),

            Expr::Lambda(decl) => {
                let mut printer = AstPrinter {
                    out: String::new(),
                    depth,
                };
                printer.out.push_str("fun ");
                printer.params(decl);
                printer.out.push(' ');
                printer.body(&decl.body);

                printer.out
            }

            Expr::List { elements, .. } => format!("[{}]", Self::print_list(elements, depth)),
        }
    }

    fn print_list(exprs: &[Expr], depth: usize) -> String {
        exprs
            .iter()
            .map(|expr| Self::render(expr, depth))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // ───────────────────────────── statements ─────────────────────────────

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Lambda bodies inside `expr` arrive already indented, so only the
    /// first line gets the current depth.
    fn expr_line(&mut self, prefix: &str, expr: &Expr, suffix: &str) {
        let text = format!("{}{}{}", prefix, Self::render(expr, self.depth), suffix);
        self.line(&text);
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) => self.expr_line("", expr, ";"),

            Stmt::Var { name, initializer } => match initializer {
                Some(expr) => self.expr_line(&format!("var {} = ", name.lexeme), expr, ";"),
                None => self.line(&format!("var {};", name.lexeme)),
            },

            Stmt::Block(statements) => {
                self.line("{");
                self.nested(statements);
                self.line("}");
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr_line("if (", condition, ")");
                self.branch(then_branch);

                if let Some(else_stmt) = else_branch {
                    self.line("else");
                    self.branch(else_stmt);
                }
            }

            Stmt::Loop {
                condition,
                body,
                increment,
            } => {
                match increment {
                    Some(increment) => {
                        let header = format!(
                            "for (; {}; {})",
                            Self::render(condition, self.depth),
                            Self::render(increment, self.depth)
                        );
                        self.line(&header);
                    }
                    None => self.expr_line("while (", condition, ")"),
                }

                self.branch(body);
            }

            Stmt::Break(_) => self.line("break;"),

            Stmt::Continue(_) => self.line("continue;"),

            Stmt::Return { value, .. } => match value {
                Some(expr) => self.expr_line("return ", expr, ";"),
                None => self.line("return;"),
            },

            Stmt::Function(decl) => self.function("fun ", decl),

            Stmt::Class(decl) => self.class(decl),
        }
    }

    fn nested(&mut self, statements: &[Stmt]) {
        self.depth += 1;
        for stmt in statements {
            self.stmt(stmt);
        }
        self.depth -= 1;
    }

    /// Branch and loop bodies sit one level deeper unless they are blocks.
    fn branch(&mut self, stmt: &Stmt) {
        if matches!(stmt, Stmt::Block(_)) {
            self.stmt(stmt);
        } else {
            self.nested(std::slice::from_ref(stmt));
        }
    }

    fn class(&mut self, decl: &ClassDecl) {
        let header = match &decl.superclass {
            Some(superclass) => format!(
                "class {} < {} {{",
                decl.name.lexeme,
                Self::print(superclass)
            ),
            None => format!("class {} {{", decl.name.lexeme),
        };
        self.line(&header);

        self.depth += 1;
        for method in &decl.methods {
            self.function("", method);
        }
        for method in &decl.statics {
            self.function("static ", method);
        }
        self.depth -= 1;

        self.line("}");
    }

    fn function(&mut self, prefix: &str, decl: &FunctionDecl) {
        let mut header = AstPrinter {
            out: format!("{}{}", prefix, decl.name.lexeme),
            depth: 0,
        };
        header.params(decl);
        header.out.push_str(" {");
        self.line(&header.out);

        self.nested(&decl.body);
        self.line("}");
    }

    fn params(&mut self, decl: &FunctionDecl) {
        if let Some(params) = &decl.params {
            let names: Vec<&str> = params.iter().map(|p: &Token| p.lexeme.as_str()).collect();
            self.out.push('(');
            self.out.push_str(&names.join(", "));
            self.out.push(')');
        }
    }

    /// Lambda body: a braced block whose inner lines are indented relative to
    /// the line the lambda starts on.
    fn body(&mut self, statements: &[Stmt]) {
        self.out.push_str("{\n");
        self.depth += 1;
        for stmt in statements {
            self.stmt(stmt);
        }
        self.depth -= 1;
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push('}');
    }
}
