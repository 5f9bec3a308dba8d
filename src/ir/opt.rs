//! Linear IR optimization
//!
//! Three sequential passes over the instruction sequence, in order:
//! constant folding, constant propagation into output instructions, and
//! dead-temporary elimination. Each pass is semantics-preserving for this
//! language.
//!
//! Constant tracking is purely linear and forward: there is no control-flow
//! merge reasoning, and a value known constant before a branch is still
//! treated as constant after it. This is a simplifying assumption, not a
//! general data-flow analysis; it is sound here because the pipeline never
//! reconverges differing branch values into one folded variable.

use super::instr::{Instr, IrExpr, Operand};
use super::lower::LoweredIr;
use crate::ast::Number;
use std::collections::{HashMap, HashSet};

/// Run all three passes
pub fn optimize(ir: LoweredIr) -> Vec<Instr> {
    let LoweredIr { code, temps } = ir;
    let code = fold_constants(code);
    let code = propagate_into_outputs(code);
    eliminate_dead_temps(code, &temps)
}

fn resolve(op: &Operand, consts: &HashMap<String, Number>) -> Option<Number> {
    match op {
        Operand::Const(n) => Some(*n),
        Operand::Name(name) => consts.get(name).copied(),
    }
}

/// Rewrite every `assign` whose right-hand side is computable at this
/// program point into a literal assignment, recording the result for
/// subsequent folds.
pub fn fold_constants(code: Vec<Instr>) -> Vec<Instr> {
    let mut consts: HashMap<String, Number> = HashMap::new();
    let mut optimized = Vec::with_capacity(code.len());

    for instr in code {
        match instr {
            Instr::Assign { dest, expr } => {
                let folded = match &expr {
                    IrExpr::Operand(Operand::Const(n)) => Some(*n),
                    IrExpr::Operand(Operand::Name(_)) => None,
                    IrExpr::Binary { left, op, right } => {
                        match (resolve(left, &consts), resolve(right, &consts)) {
                            // apply is None for division by zero; keep the
                            // instruction and let execution fail instead.
                            (Some(l), Some(r)) => l.apply(*op, r),
                            _ => None,
                        }
                    }
                };
                match folded {
                    Some(value) => {
                        consts.insert(dest.clone(), value);
                        optimized.push(Instr::Assign {
                            dest,
                            expr: IrExpr::Operand(Operand::Const(value)),
                        });
                    }
                    None => {
                        // The destination no longer holds a known constant.
                        consts.remove(&dest);
                        optimized.push(Instr::Assign { dest, expr });
                    }
                }
            }
            other => optimized.push(other),
        }
    }

    optimized
}

/// Substitute variables known to hold constants directly into `print` and
/// `printf` operands.
pub fn propagate_into_outputs(code: Vec<Instr>) -> Vec<Instr> {
    let mut consts: HashMap<String, Number> = HashMap::new();
    let mut optimized = Vec::with_capacity(code.len());

    let substitute = |op: Operand, consts: &HashMap<String, Number>| match &op {
        Operand::Name(name) => match consts.get(name) {
            Some(value) => Operand::Const(*value),
            None => op,
        },
        Operand::Const(_) => op,
    };

    for instr in code {
        match instr {
            Instr::Assign { dest, expr } => {
                match &expr {
                    IrExpr::Operand(Operand::Const(n)) => {
                        consts.insert(dest.clone(), *n);
                    }
                    _ => {
                        consts.remove(&dest);
                    }
                }
                optimized.push(Instr::Assign { dest, expr });
            }
            Instr::Print { value } => optimized.push(Instr::Print {
                value: substitute(value, &consts),
            }),
            Instr::Printf { format, args } => optimized.push(Instr::Printf {
                format,
                args: args
                    .into_iter()
                    .map(|arg| substitute(arg, &consts))
                    .collect(),
            }),
            other => optimized.push(other),
        }
    }

    optimized
}

/// Drop assignments into compiler-generated temporaries that are never
/// referenced. `temps` is the set of names the generator minted; only those
/// destinations are eligible, so a user variable spelled like a temporary
/// (`int t1;`) is never dropped.
///
/// Labels, jumps, prints and returns are never dropped.
pub fn eliminate_dead_temps(code: Vec<Instr>, temps: &HashSet<String>) -> Vec<Instr> {
    let mut used: HashSet<&str> = HashSet::new();

    for instr in &code {
        match instr {
            Instr::Assign { expr, .. } => match expr {
                IrExpr::Operand(op) => used.extend(op.name()),
                IrExpr::Binary { left, right, .. } => {
                    used.extend(left.name());
                    used.extend(right.name());
                }
            },
            Instr::IfFalse { cond, .. } => used.extend(cond.name()),
            Instr::Print { value } => used.extend(value.name()),
            Instr::Printf { args, .. } => used.extend(args.iter().filter_map(|a| a.name())),
            Instr::Return { value } => used.extend(value.iter().filter_map(|v| v.name())),
            Instr::Goto { .. } | Instr::Label { .. } | Instr::Comment(_) => {}
        }
    }

    let keep: Vec<bool> = code
        .iter()
        .map(|instr| match instr {
            Instr::Assign { dest, .. } => !temps.contains(dest) || used.contains(dest.as_str()),
            _ => true,
        })
        .collect();

    code.into_iter()
        .zip(keep)
        .filter_map(|(instr, keep)| keep.then_some(instr))
        .collect()
}
