//! IR instruction definitions
//!
//! Textual grammar produced by the `Display` impls:
//!
//! ```text
//! <name> = <literal|name> [<op> <literal|name>]
//! if_false <name> goto <label>
//! goto <label>
//! <label>:
//! print <name>
//! printf <format>, <args>
//! return [<name>]
//! # <comment>
//! ```

use crate::ast::{BinOp, Number};
use std::fmt;

/// An operand: a literal constant or a name (variable or temporary)
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Const(Number),
    Name(String),
}

impl Operand {
    /// The referenced name, if this operand is a name
    pub fn name(&self) -> Option<&str> {
        match self {
            Operand::Name(name) => Some(name),
            Operand::Const(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(n) => write!(f, "{}", n),
            Operand::Name(name) => write!(f, "{}", name),
        }
    }
}

/// The right-hand side of an `assign` instruction
#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    /// A bare literal or name
    Operand(Operand),
    /// One binary operation over two operands
    Binary {
        left: Operand,
        op: BinOp,
        right: Operand,
    },
}

impl fmt::Display for IrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrExpr::Operand(op) => write!(f, "{}", op),
            IrExpr::Binary { left, op, right } => write!(f, "{} {} {}", left, op, right),
        }
    }
}

/// A three-address instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// `dest = expr`
    Assign { dest: String, expr: IrExpr },
    /// `if_false cond goto target`
    IfFalse { cond: Operand, target: String },
    /// `goto target`
    Goto { target: String },
    /// `name:`
    Label { name: String },
    /// `print value`
    Print { value: Operand },
    /// `printf "format", args...`
    Printf {
        format: String,
        args: Vec<Operand>,
    },
    /// `return [value]`
    Return { value: Option<Operand> },
    /// `# text`
    Comment(String),
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Assign { dest, expr } => write!(f, "{} = {}", dest, expr),
            Instr::IfFalse { cond, target } => write!(f, "if_false {} goto {}", cond, target),
            Instr::Goto { target } => write!(f, "goto {}", target),
            Instr::Label { name } => write!(f, "{}:", name),
            Instr::Print { value } => write!(f, "print {}", value),
            Instr::Printf { format, args } => {
                write!(f, "printf \"{}\"", format)?;
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                Ok(())
            }
            Instr::Return { value: None } => write!(f, "return"),
            Instr::Return { value: Some(v) } => write!(f, "return {}", v),
            Instr::Comment(text) => write!(f, "# {}", text),
        }
    }
}

/// Render an instruction sequence as display lines
pub fn render(code: &[Instr]) -> Vec<String> {
    code.iter().map(|instr| instr.to_string()).collect()
}
