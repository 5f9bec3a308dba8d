//! Tree-level constant folding
//!
//! Rewrites every binary operation whose operands are both literals into a
//! single literal, bottom-up so folded children are visible to their parent.
//! Division and modulo by a literal zero are left alone; the failure is
//! deferred to execution time.
//!
//! The pass is pure (the input tree is not mutated) and idempotent.

use crate::ast::{Block, Expr, Program, Stmt};

/// Fold a whole program
pub fn fold_program(program: &Program) -> Program {
    Program::new(program.stmts.iter().map(fold_stmt).collect())
}

fn fold_block(block: &Block) -> Block {
    Block::new(block.stmts.iter().map(fold_stmt).collect())
}

fn fold_stmt(stmt: &Stmt) -> Stmt {
    match stmt {
        Stmt::Declaration { ty, name, init } => Stmt::Declaration {
            ty: *ty,
            name: name.clone(),
            init: init.as_ref().map(fold_expr),
        },
        Stmt::Assignment { name, expr } => Stmt::Assignment {
            name: name.clone(),
            expr: fold_expr(expr),
        },
        Stmt::Print { expr } => Stmt::Print {
            expr: fold_expr(expr),
        },
        Stmt::Printf { format, args } => Stmt::Printf {
            format: format.clone(),
            args: args.iter().map(fold_expr).collect(),
        },
        Stmt::Return { value } => Stmt::Return {
            value: value.as_ref().map(fold_expr),
        },
        Stmt::If {
            cond,
            then_block,
            else_block,
        } => Stmt::If {
            cond: fold_expr(cond),
            then_block: fold_block(then_block),
            else_block: else_block.as_ref().map(fold_block),
        },
        Stmt::While { cond, body } => Stmt::While {
            cond: fold_expr(cond),
            body: fold_block(body),
        },
        Stmt::Block(block) => Stmt::Block(fold_block(block)),
    }
}

/// Fold one expression, post-order
pub fn fold_expr(expr: &Expr) -> Expr {
    match expr {
        Expr::Number(n) => Expr::Number(*n),
        Expr::Ident(name) => Expr::Ident(name.clone()),
        Expr::Binary { left, op, right } => {
            let left = fold_expr(left);
            let right = fold_expr(right);
            if let (Expr::Number(l), Expr::Number(r)) = (&left, &right) {
                // `apply` returns None for division/modulo by zero, which
                // keeps the node intact here.
                if let Some(result) = l.apply(*op, *r) {
                    return Expr::Number(result);
                }
            }
            Expr::Binary {
                left: Box::new(left),
                op: *op,
                right: Box::new(right),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Number};
    use crate::parser;

    fn fold_source(source: &str) -> Program {
        let (program, _) = parser::parse(source).expect("parse failed");
        fold_program(&program)
    }

    #[test]
    fn test_folds_literal_addition() {
        let folded = fold_source("int x = 2 + 3;");
        let Stmt::Declaration { init, .. } = &folded.stmts[0] else {
            panic!("expected declaration");
        };
        assert_eq!(*init, Some(Expr::Number(Number::Int(5))));
    }

    #[test]
    fn test_folds_nested_chain() {
        // (2 + 3) * 4 under the single-precedence grammar
        let folded = fold_source("int x = 2 + 3 * 4;");
        let Stmt::Declaration { init, .. } = &folded.stmts[0] else {
            panic!("expected declaration");
        };
        assert_eq!(*init, Some(Expr::Number(Number::Int(20))));
    }

    #[test]
    fn test_division_by_zero_not_folded() {
        let folded = fold_source("int x = 1 / 0;");
        let Stmt::Declaration { init, .. } = &folded.stmts[0] else {
            panic!("expected declaration");
        };
        assert!(matches!(
            init,
            Some(Expr::Binary { op: BinOp::Div, .. })
        ));
    }

    #[test]
    fn test_modulo_by_zero_not_folded() {
        let folded = fold_source("int x = 1 % 0;");
        let Stmt::Declaration { init, .. } = &folded.stmts[0] else {
            panic!("expected declaration");
        };
        assert!(matches!(
            init,
            Some(Expr::Binary { op: BinOp::Mod, .. })
        ));
    }

    #[test]
    fn test_non_literal_operands_untouched() {
        let folded = fold_source("int a = 1; int b = a + 2;");
        let Stmt::Declaration { init, .. } = &folded.stmts[1] else {
            panic!("expected declaration");
        };
        assert!(matches!(init, Some(Expr::Binary { .. })));
    }

    #[test]
    fn test_folds_inside_conditions_and_bodies() {
        let folded = fold_source("int a = 0; while (1 < 2) { a = 3 * 3; }");
        let Stmt::While { cond, body } = &folded.stmts[1] else {
            panic!("expected while");
        };
        assert_eq!(*cond, Expr::Number(Number::Int(1)));
        let Stmt::Assignment { expr, .. } = &body.stmts[0] else {
            panic!("expected assignment");
        };
        assert_eq!(*expr, Expr::Number(Number::Int(9)));
    }

    #[test]
    fn test_idempotent() {
        let once = fold_source("int x = 2 + 3 * 4; int y = 1 / 0; int z = x + 1;");
        let twice = fold_program(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_folds_float_arithmetic() {
        let folded = fold_source("float f = 1.5 + 2;");
        let Stmt::Declaration { init, .. } = &folded.stmts[0] else {
            panic!("expected declaration");
        };
        assert_eq!(*init, Some(Expr::Number(Number::Float(3.5))));
    }
}
