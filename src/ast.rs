//! Syntax tree for the C subset
//!
//! A closed set of node variants; every pass over the tree is an exhaustive
//! `match`, so adding a variant is a compile error in each consumer until it
//! is handled.

use std::fmt;

/// A declared variable type. The only legal C data types in this subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
        }
    }
}

/// Binary operators. A single precedence level; the parser chains them
/// left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// A numeric literal value, integer or floating-point.
///
/// This is also the runtime value representation of the interpreter and the
/// constant representation of the optimizers, so arithmetic lives here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Nonzero is true
    pub fn is_truthy(&self) -> bool {
        match *self {
            Number::Int(i) => i != 0,
            Number::Float(f) => f != 0.0,
        }
    }

    /// Numeric value as `f64`
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Apply a binary operator to two values.
    ///
    /// Arithmetic on mixed int/float operands promotes to float. `/` is
    /// floor (not truncating) division and `%` is floor-sign modulo, for
    /// integers and floats alike. Comparisons yield `Int(1)`/`Int(0)`.
    ///
    /// Returns `None` for division or modulo by zero; callers decide
    /// whether that means "leave unfolded" or "runtime failure".
    pub fn apply(self, op: BinOp, rhs: Number) -> Option<Number> {
        use BinOp::*;
        match op {
            Add | Sub | Mul | Div | Mod => match (self, rhs) {
                (Number::Int(a), Number::Int(b)) => match op {
                    Add => Some(Number::Int(a.wrapping_add(b))),
                    Sub => Some(Number::Int(a.wrapping_sub(b))),
                    Mul => Some(Number::Int(a.wrapping_mul(b))),
                    Div => (b != 0).then(|| Number::Int(floor_div(a, b))),
                    Mod => (b != 0).then(|| Number::Int(floor_mod(a, b))),
                    _ => unreachable!(),
                },
                (a, b) => {
                    let (a, b) = (a.as_f64(), b.as_f64());
                    match op {
                        Add => Some(Number::Float(a + b)),
                        Sub => Some(Number::Float(a - b)),
                        Mul => Some(Number::Float(a * b)),
                        Div => (b != 0.0).then(|| Number::Float((a / b).floor())),
                        Mod => (b != 0.0).then(|| Number::Float(a - (a / b).floor() * b)),
                        _ => unreachable!(),
                    }
                }
            },
            Eq | Ne | Lt | Le | Gt | Ge => {
                let truth = match (self, rhs) {
                    (Number::Int(a), Number::Int(b)) => compare(op, &a, &b),
                    (a, b) => compare(op, &a.as_f64(), &b.as_f64()),
                };
                Some(Number::Int(truth as i64))
            }
        }
    }
}

fn compare<T: PartialOrd>(op: BinOp, a: &T, b: &T) -> bool {
    match op {
        BinOp::Eq => a == b,
        BinOp::Ne => a != b,
        BinOp::Lt => a < b,
        BinOp::Le => a <= b,
        BinOp::Gt => a > b,
        BinOp::Ge => a >= b,
        _ => unreachable!(),
    }
}

/// Floor division: rounds toward negative infinity, so `-7 / 2 == -4`.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Floor-sign modulo: the result takes the sign of the divisor.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            // Whole floats keep a trailing `.0` so that float-ness is
            // visible in artifacts and printf output.
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(Number),
    /// Variable reference
    Ident(String),
    /// Binary operation, owning both operands
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
}

/// A brace-delimited statement sequence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `int x;` or `float y = expr;`
    Declaration {
        ty: Type,
        name: String,
        init: Option<Expr>,
    },
    /// `x = expr;`
    Assignment { name: String, expr: Expr },
    /// `print(expr);` — parsed, but never legal C (rejected by sema)
    Print { expr: Expr },
    /// `printf("fmt", args...);` or `printf(args...);`
    ///
    /// The format string is stored without its surrounding quotes.
    Printf {
        format: Option<String>,
        args: Vec<Expr>,
    },
    /// `return;` or `return expr;` — semantically inert in this language
    Return { value: Option<Expr> },
    /// `if (cond) { ... } else { ... }`
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    /// `while (cond) { ... }`
    While { cond: Expr, body: Block },
    /// A bare braced block used as a statement
    Block(Block),
}

/// A whole program: an ordered statement sequence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_division() {
        assert_eq!(
            Number::Int(-7).apply(BinOp::Div, Number::Int(2)),
            Some(Number::Int(-4))
        );
        assert_eq!(
            Number::Int(7).apply(BinOp::Div, Number::Int(2)),
            Some(Number::Int(3))
        );
        assert_eq!(
            Number::Int(7).apply(BinOp::Div, Number::Int(-2)),
            Some(Number::Int(-4))
        );
    }

    #[test]
    fn test_floor_modulo_takes_divisor_sign() {
        assert_eq!(
            Number::Int(-7).apply(BinOp::Mod, Number::Int(2)),
            Some(Number::Int(1))
        );
        assert_eq!(
            Number::Int(7).apply(BinOp::Mod, Number::Int(-2)),
            Some(Number::Int(-1))
        );
    }

    #[test]
    fn test_division_by_zero_is_none() {
        assert_eq!(Number::Int(1).apply(BinOp::Div, Number::Int(0)), None);
        assert_eq!(Number::Int(1).apply(BinOp::Mod, Number::Int(0)), None);
        assert_eq!(
            Number::Float(1.0).apply(BinOp::Div, Number::Float(0.0)),
            None
        );
    }

    #[test]
    fn test_mixed_arithmetic_promotes_to_float() {
        assert_eq!(
            Number::Int(1).apply(BinOp::Add, Number::Float(2.5)),
            Some(Number::Float(3.5))
        );
    }

    #[test]
    fn test_comparisons_yield_zero_or_one() {
        assert_eq!(
            Number::Int(2).apply(BinOp::Eq, Number::Int(2)),
            Some(Number::Int(1))
        );
        assert_eq!(
            Number::Int(2).apply(BinOp::Lt, Number::Int(1)),
            Some(Number::Int(0))
        );
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Int(8).to_string(), "8");
        assert_eq!(Number::Float(8.0).to_string(), "8.0");
        assert_eq!(Number::Float(2.5).to_string(), "2.5");
    }
}
