//! Lowering from the syntax tree to three-address code
//!
//! Every binary operation materializes its result into a fresh temporary;
//! statements lower to the flat instruction shapes described on each method.
//! Temporary and label counters belong to the generator instance, so a new
//! generator per compilation guarantees unique names without any global
//! state.

use super::instr::{Instr, IrExpr, Operand};
use crate::ast::{Block, Expr, Program, Stmt};
use std::collections::HashSet;

/// The result of lowering: the instruction sequence plus the names of the
/// temporaries minted while producing it. The set is what distinguishes a
/// generated temporary from a user variable that happens to share its
/// spelling.
#[derive(Debug, Clone)]
pub struct LoweredIr {
    pub code: Vec<Instr>,
    pub temps: HashSet<String>,
}

/// The IR generator: one instance per compilation
#[derive(Default)]
pub struct IrGenerator {
    temp_count: u32,
    label_count: u32,
    code: Vec<Instr>,
    temps: HashSet<String>,
}

impl IrGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower a whole program into a flat instruction sequence
    pub fn generate(mut self, program: &Program) -> LoweredIr {
        for stmt in &program.stmts {
            self.lower_stmt(stmt);
        }
        LoweredIr {
            code: self.code,
            temps: self.temps,
        }
    }

    fn new_temp(&mut self) -> String {
        self.temp_count += 1;
        let name = format!("t{}", self.temp_count);
        self.temps.insert(name.clone());
        name
    }

    fn new_label(&mut self) -> String {
        self.label_count += 1;
        format!("L{}", self.label_count)
    }

    fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    fn lower_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.lower_stmt(stmt);
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration { ty, name, init } => match init {
                Some(init) => {
                    let value = self.lower_expr(init);
                    self.emit(Instr::Assign {
                        dest: name.clone(),
                        expr: IrExpr::Operand(value),
                    });
                }
                None => self.emit(Instr::Comment(format!("declare {} {}", ty, name))),
            },
            Stmt::Assignment { name, expr } => {
                let value = self.lower_expr(expr);
                self.emit(Instr::Assign {
                    dest: name.clone(),
                    expr: IrExpr::Operand(value),
                });
            }
            Stmt::Print { expr } => {
                let value = self.lower_expr(expr);
                self.emit(Instr::Print { value });
            }
            Stmt::Printf { format, args } => {
                // printf without a format string has no IR form; the
                // interpreter still executes it from the tree.
                if let Some(format) = format {
                    let args = args.iter().map(|arg| self.lower_expr(arg)).collect();
                    self.emit(Instr::Printf {
                        format: format.clone(),
                        args,
                    });
                }
            }
            Stmt::Return { value } => {
                let value = value.as_ref().map(|v| self.lower_expr(v));
                self.emit(Instr::Return { value });
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                // evaluate cond; if_false -> else label; then-branch;
                // goto end; else label; else-branch; end label
                let cond = self.lower_expr(cond);
                let label_else = self.new_label();
                let label_end = self.new_label();

                self.emit(Instr::IfFalse {
                    cond,
                    target: label_else.clone(),
                });
                self.lower_block(then_block);
                self.emit(Instr::Goto {
                    target: label_end.clone(),
                });

                self.emit(Instr::Label { name: label_else });
                if let Some(else_block) = else_block {
                    self.lower_block(else_block);
                }

                self.emit(Instr::Label { name: label_end });
            }
            Stmt::While { cond, body } => {
                // start label; evaluate cond; if_false -> end label; body;
                // goto start; end label
                let label_start = self.new_label();
                let label_end = self.new_label();

                self.emit(Instr::Label {
                    name: label_start.clone(),
                });
                let cond = self.lower_expr(cond);
                self.emit(Instr::IfFalse {
                    cond,
                    target: label_end.clone(),
                });

                self.lower_block(body);
                self.emit(Instr::Goto {
                    target: label_start,
                });
                self.emit(Instr::Label { name: label_end });
            }
            Stmt::Block(block) => self.lower_block(block),
        }
    }

    /// Lower an expression, returning the operand holding its value
    fn lower_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Number(n) => Operand::Const(*n),
            Expr::Ident(name) => Operand::Name(name.clone()),
            Expr::Binary { left, op, right } => {
                let left = self.lower_expr(left);
                let right = self.lower_expr(right);
                let result = self.new_temp();
                self.emit(Instr::Assign {
                    dest: result.clone(),
                    expr: IrExpr::Binary {
                        left,
                        op: *op,
                        right,
                    },
                });
                Operand::Name(result)
            }
        }
    }
}
