//! Tree-walking interpreter
//!
//! Executes the (optionally folded) syntax tree directly against a mutable
//! environment and collects the ordered output sequence. The IR plays no
//! part here; interpretation and code generation are independent consumers
//! of the optimized tree.

use crate::ast::{Block, Expr, Number, Program, Stmt};
use crate::sema::placeholder_count;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Runtime errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Variable '{0}' not defined")]
    UndefinedVariable(String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// One emitted output value: a number from `print` or a bare `printf`
/// argument, or formatted text from `printf` with a format string.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Number(Number),
    Text(String),
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::Number(n) => write!(f, "{}", n),
            OutputValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// The interpreter: one instance per run, owning its environment
#[derive(Default)]
pub struct Interpreter {
    env: HashMap<String, Number>,
    output: Vec<OutputValue>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute the program, returning the ordered output sequence
    pub fn run(mut self, program: &Program) -> Result<Vec<OutputValue>, RuntimeError> {
        for stmt in &program.stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(self.output)
    }

    fn exec_block(&mut self, block: &Block) -> Result<(), RuntimeError> {
        for stmt in &block.stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Declaration { name, init, .. } => {
                // A declaration without an initializer binds to zero.
                let value = match init {
                    Some(init) => self.eval(init)?,
                    None => Number::Int(0),
                };
                self.env.insert(name.clone(), value);
                Ok(())
            }
            Stmt::Assignment { name, expr } => {
                let value = self.eval(expr)?;
                self.env.insert(name.clone(), value);
                Ok(())
            }
            Stmt::Print { expr } => {
                let value = self.eval(expr)?;
                self.output.push(OutputValue::Number(value));
                Ok(())
            }
            Stmt::Printf { format, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                match format {
                    Some(format) => {
                        let format = unescape(format);
                        // Fall back to the raw format text when the
                        // placeholders cannot be matched to the arguments.
                        let text = substitute(&format, &args).unwrap_or(format);
                        self.output.push(OutputValue::Text(text));
                    }
                    None => {
                        for arg in args {
                            self.output.push(OutputValue::Number(arg));
                        }
                    }
                }
                Ok(())
            }
            // No call stack to unwind: return is accepted and ignored.
            Stmt::Return { .. } => Ok(()),
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.exec_block(then_block)
                } else if let Some(else_block) = else_block {
                    self.exec_block(else_block)
                } else {
                    Ok(())
                }
            }
            Stmt::While { cond, body } => {
                while self.eval(cond)?.is_truthy() {
                    self.exec_block(body)?;
                }
                Ok(())
            }
            Stmt::Block(block) => self.exec_block(block),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Number, RuntimeError> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::Ident(name) => self
                .env
                .get(name)
                .copied()
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
            Expr::Binary { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                left.apply(*op, right).ok_or(RuntimeError::DivisionByZero)
            }
        }
    }
}

/// Process the `\n`, `\t` and `\\` escape sequences of a format string
fn unescape(format: &str) -> String {
    format
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\\", "\\")
}

/// Substitute `%d`/`%s`/`%f` placeholders left-to-right with the arguments.
///
/// The i-th placeholder receives the i-th argument; `%f` coerces its
/// argument to floating-point text. Returns `None` when the placeholder
/// count does not match the argument count.
fn substitute(format: &str, args: &[Number]) -> Option<String> {
    if placeholder_count(format) != args.len() {
        return None;
    }

    let mut result = String::with_capacity(format.len());
    let mut rest = format;
    let mut args = args.iter();

    while let Some(pos) = rest.find('%') {
        let (before, tail) = rest.split_at(pos);
        result.push_str(before);
        match tail.as_bytes().get(1) {
            Some(b'd') | Some(b's') => {
                result.push_str(&args.next()?.to_string());
                rest = &tail[2..];
            }
            Some(b'f') => {
                let value = Number::Float(args.next()?.as_f64());
                result.push_str(&value.to_string());
                rest = &tail[2..];
            }
            _ => {
                result.push('%');
                rest = &tail[1..];
            }
        }
    }
    result.push_str(rest);
    Some(result)
}
