//! Didactic code generation
//!
//! Two independent renderers over the optimized instruction sequence. Both
//! produce explanatory text, not executable output, and share no state.

use crate::ast::BinOp;
use crate::ir::{Instr, IrExpr, Operand};
use std::collections::HashMap;

/// Render the instruction sequence as readable pseudocode lines
pub fn pseudocode(code: &[Instr]) -> Vec<String> {
    let mut lines = Vec::new();

    for instr in code {
        match instr {
            Instr::Label { name } => {
                lines.push(String::new());
                lines.push(format!("{}:", name));
            }
            Instr::IfFalse { cond, target } => {
                lines.push(format!("    if NOT {} goto {}", cond, target));
            }
            Instr::Goto { target } => lines.push(format!("    goto {}", target)),
            Instr::Printf { .. } => lines.push(format!("    OUTPUT: {}", instr)),
            Instr::Print { value } => lines.push(format!("    PRINT {}", value)),
            Instr::Return { value: None } => lines.push("    RETURN".to_string()),
            Instr::Return { value: Some(v) } => lines.push(format!("    RETURN {}", v)),
            Instr::Assign { dest, expr } => lines.push(format!("    {} := {}", dest, expr)),
            Instr::Comment(text) => lines.push(format!("    # {}", text)),
        }
    }

    lines
}

/// First-touch register allocator: each distinct variable or temporary gets
/// one of 8 cyclic slots the first time it is produced or read.
#[derive(Default)]
struct RegisterFile {
    map: HashMap<String, String>,
}

impl RegisterFile {
    fn get(&mut self, name: &str) -> String {
        if let Some(reg) = self.map.get(name) {
            return reg.clone();
        }
        let reg = format!("r{}", self.map.len() % 8);
        self.map.insert(name.to_string(), reg.clone());
        reg
    }

    /// A literal stays immediate; a name goes through its register
    fn location(&mut self, op: &Operand) -> String {
        match op {
            Operand::Const(n) => n.to_string(),
            Operand::Name(name) => self.get(name),
        }
    }
}

fn mnemonic(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "imul",
        BinOp::Div | BinOp::Mod => "idiv",
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => "cmp",
    }
}

/// Render the instruction sequence as pseudo-assembly lines
pub fn assembly(code: &[Instr]) -> Vec<String> {
    let mut lines = vec![".text".to_string(), "main:".to_string()];
    let mut regs = RegisterFile::default();

    for instr in code {
        match instr {
            Instr::Label { name } => lines.push(format!("{}:", name)),
            Instr::IfFalse { cond, target } => {
                let loc = regs.location(cond);
                lines.push(format!("    cmp {}, 0", loc));
                lines.push(format!("    je {}", target));
            }
            Instr::Goto { target } => lines.push(format!("    jmp {}", target)),
            Instr::Assign { dest, expr } => match expr {
                IrExpr::Operand(op) => {
                    let src = regs.location(op);
                    let reg = regs.get(dest);
                    lines.push(format!("    mov {}, {}", reg, src));
                }
                IrExpr::Binary { left, op, right } => {
                    // Decompose into a move of the left operand followed by
                    // one arithmetic instruction with the right operand.
                    let left = regs.location(left);
                    let right = regs.location(right);
                    let reg = regs.get(dest);
                    lines.push(format!("    mov {}, {}", reg, left));
                    lines.push(format!("    {} {}, {}", mnemonic(*op), reg, right));
                }
            },
            Instr::Print { .. } | Instr::Printf { .. } => {
                lines.push(format!("    call print_function  # {}", instr));
            }
            Instr::Return { .. } => {
                lines.push("    mov eax, 0".to_string());
                lines.push("    ret".to_string());
            }
            Instr::Comment(text) => lines.push(format!("    # {}", text)),
        }
    }

    lines.push(String::new());
    lines.push(".data".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{optimize, IrGenerator};
    use crate::parser;

    fn lowered(source: &str) -> Vec<Instr> {
        let (program, _) = parser::parse(source).expect("parse failed");
        optimize(IrGenerator::new().generate(&program))
    }

    fn lowered_raw(source: &str) -> Vec<Instr> {
        let (program, _) = parser::parse(source).expect("parse failed");
        IrGenerator::new().generate(&program).code
    }

    #[test]
    fn test_pseudocode_assignment_and_print() {
        let lines = pseudocode(&lowered("int s = 7; print(s);"));
        assert_eq!(lines, vec!["    s := 7", "    PRINT 7"]);
    }

    #[test]
    fn test_pseudocode_label_preceded_by_blank_line() {
        let lines = pseudocode(&lowered("int i = 0; while (i < 3) { i = i + 1; }"));
        let pos = lines.iter().position(|l| l == "L1:").unwrap();
        assert_eq!(lines[pos - 1], "");
        assert!(lines.contains(&"    goto L1".to_string()));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("    if NOT ") && l.ends_with("goto L2")));
    }

    #[test]
    fn test_pseudocode_printf_keeps_raw_instruction() {
        let source = "#include <stdio.h>\nint x = 1;\nprintf(\"%d\", x);";
        let lines = pseudocode(&lowered(source));
        assert!(lines.contains(&"    OUTPUT: printf \"%d\", 1".to_string()));
    }

    #[test]
    fn test_pseudocode_return_forms() {
        let lines = pseudocode(&lowered("int x = 1; return x; return;"));
        assert!(lines.contains(&"    RETURN x".to_string()));
        assert!(lines.contains(&"    RETURN".to_string()));
    }

    #[test]
    fn test_assembly_header_and_footer() {
        let lines = assembly(&lowered("int x = 1;"));
        assert_eq!(lines[0], ".text");
        assert_eq!(lines[1], "main:");
        assert_eq!(lines[lines.len() - 2], "");
        assert_eq!(lines[lines.len() - 1], ".data");
    }

    #[test]
    fn test_assembly_literal_assignment() {
        let lines = assembly(&lowered("int x = 5;"));
        assert!(lines.contains(&"    mov r0, 5".to_string()));
    }

    #[test]
    fn test_assembly_binary_decomposition() {
        // Unoptimized IR keeps the binary assignment intact.
        let lines = assembly(&lowered_raw("int a = 1; int b = 2; a = a + b;"));
        // a -> r0, b -> r1, t1 -> r2: mov of the left operand, then add of
        // the right.
        assert!(lines.contains(&"    mov r2, r0".to_string()));
        assert!(lines.contains(&"    add r2, r1".to_string()));
    }

    #[test]
    fn test_assembly_conditional_jump() {
        let lines = assembly(&lowered("int i = 0; while (i < 3) { i = i + 1; }"));
        assert!(lines.iter().any(|l| l.starts_with("    cmp ")));
        assert!(lines.contains(&"    je L2".to_string()));
        assert!(lines.contains(&"    jmp L1".to_string()));
    }

    #[test]
    fn test_assembly_print_call_carries_instruction_comment() {
        let lines = assembly(&lowered("int s = 7; print(s);"));
        assert!(lines.contains(&"    call print_function  # print 7".to_string()));
    }

    #[test]
    fn test_assembly_return() {
        let lines = assembly(&lowered("return;"));
        assert!(lines.contains(&"    mov eax, 0".to_string()));
        assert!(lines.contains(&"    ret".to_string()));
    }

    #[test]
    fn test_register_slots_cycle_after_eight_names() {
        let source = "int a=1; int b=1; int c=1; int d=1; int e=1; int f=1; int g=1; int h=1; int i=1;";
        let lines = assembly(&lowered(source));
        assert!(lines.contains(&"    mov r7, 1".to_string()));
        // The ninth distinct name wraps around to r0.
        assert_eq!(
            lines.iter().filter(|l| *l == "    mov r0, 1").count(),
            2
        );
    }

    #[test]
    fn test_declaration_comment_rendered() {
        let lines = assembly(&lowered("int x;"));
        assert!(lines.contains(&"    # declare int x".to_string()));
        let lines = pseudocode(&lowered("int x;"));
        assert_eq!(lines, vec!["    # declare int x"]);
    }
}
