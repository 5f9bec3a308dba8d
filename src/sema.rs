//! Semantic analysis
//!
//! A single top-down traversal over the syntax tree that populates the
//! symbol table and enforces the static rules of the language. There is no
//! recovery: the first violation aborts the whole analysis.
//!
//! The language has exactly one flat scope, so the symbol table is a plain
//! insertion-ordered name-to-type mapping with no shadowing.

use crate::ast::{Block, Expr, Program, Stmt, Type};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Semantic errors. Display-ready; by design these carry no line number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("Error: C program cannot be empty.")]
    EmptyProgram,

    #[error("Error: Variable '{0}' already declared.")]
    Redeclaration(String),

    #[error("Error: Variable '{0}' used before declaration.")]
    UseBeforeDeclaration(String),

    #[error("Error: 'print' is not valid C syntax. Use 'printf' instead.")]
    PrintNotC,

    #[error("Error: 'printf' requires '#include <stdio.h>' at the top of the program.")]
    PrintfWithoutStdio,

    #[error(
        "Error: Format string expects {placeholders} placeholders but {args} arguments provided. \
         Check your printf() call."
    )]
    FormatArityMismatch { placeholders: usize, args: usize },
}

/// Mapping from declared variable name to its type, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    names: Vec<String>,
    types: HashMap<String, Type>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Type> {
        self.types.get(name).copied()
    }

    /// Record a declaration. The caller must have checked for redeclaration.
    fn insert(&mut self, name: String, ty: Type) {
        debug_assert!(!self.types.contains_key(&name));
        self.types.insert(name.clone(), ty);
        self.names.push(name);
    }

    /// Iterate symbols in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Type)> {
        self.names
            .iter()
            .map(|name| (name.as_str(), self.types[name]))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The semantic analyzer: one instance per compilation
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    has_stdio: bool,
}

impl SemanticAnalyzer {
    /// Create an analyzer given the include set recognized by the parser
    pub fn new(includes: &BTreeSet<String>) -> Self {
        Self {
            symbols: SymbolTable::new(),
            has_stdio: includes.contains("stdio.h"),
        }
    }

    /// Validate the program, producing the populated symbol table
    pub fn analyze(mut self, program: &Program) -> Result<SymbolTable, SemanticError> {
        if program.stmts.is_empty() {
            return Err(SemanticError::EmptyProgram);
        }
        for stmt in &program.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(self.symbols)
    }

    fn check_block(&mut self, block: &Block) -> Result<(), SemanticError> {
        for stmt in &block.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Declaration { ty, name, init } => {
                if self.symbols.contains(name) {
                    return Err(SemanticError::Redeclaration(name.clone()));
                }
                // The name is visible to its own initializer, matching the
                // single-pass population order.
                self.symbols.insert(name.clone(), *ty);
                if let Some(init) = init {
                    self.check_expr(init)?;
                }
                Ok(())
            }
            Stmt::Assignment { name, expr } => {
                if !self.symbols.contains(name) {
                    return Err(SemanticError::UseBeforeDeclaration(name.clone()));
                }
                self.check_expr(expr)
            }
            Stmt::Print { .. } => Err(SemanticError::PrintNotC),
            Stmt::Printf { format, args } => {
                // The include check comes first: a missing stdio.h is
                // reported even when arguments are also invalid.
                if !self.has_stdio {
                    return Err(SemanticError::PrintfWithoutStdio);
                }
                if let Some(format) = format {
                    let placeholders = placeholder_count(format);
                    if placeholders != args.len() {
                        return Err(SemanticError::FormatArityMismatch {
                            placeholders,
                            args: args.len(),
                        });
                    }
                }
                for arg in args {
                    self.check_expr(arg)?;
                }
                Ok(())
            }
            Stmt::Return { value } => match value {
                Some(value) => self.check_expr(value),
                None => Ok(()),
            },
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                self.check_expr(cond)?;
                self.check_block(then_block)?;
                match else_block {
                    Some(block) => self.check_block(block),
                    None => Ok(()),
                }
            }
            Stmt::While { cond, body } => {
                self.check_expr(cond)?;
                self.check_block(body)
            }
            Stmt::Block(block) => self.check_block(block),
        }
    }

    fn check_expr(&self, expr: &Expr) -> Result<(), SemanticError> {
        match expr {
            Expr::Number(_) => Ok(()),
            Expr::Ident(name) => {
                if !self.symbols.contains(name) {
                    return Err(SemanticError::UseBeforeDeclaration(name.clone()));
                }
                Ok(())
            }
            Expr::Binary { left, right, .. } => {
                self.check_expr(left)?;
                self.check_expr(right)
            }
        }
    }
}

/// Count `%d`, `%f` and `%s` placeholders in a format string
pub fn placeholder_count(format: &str) -> usize {
    format.matches("%d").count() + format.matches("%f").count() + format.matches("%s").count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn analyze(source: &str) -> Result<SymbolTable, SemanticError> {
        let (program, includes) = parser::parse(source).expect("parse failed");
        SemanticAnalyzer::new(&includes).analyze(&program)
    }

    #[test]
    fn test_empty_program_rejected() {
        assert_eq!(analyze(""), Err(SemanticError::EmptyProgram));
    }

    #[test]
    fn test_symbols_in_declaration_order() {
        let symbols = analyze("int x = 5; float y = 1.5; int z;").unwrap();
        let entries: Vec<_> = symbols.iter().collect();
        assert_eq!(
            entries,
            vec![("x", Type::Int), ("y", Type::Float), ("z", Type::Int)]
        );
    }

    #[test]
    fn test_symbol_tables_compare_by_contents() {
        let a = analyze("int x = 1; float y = 2.0;").unwrap();
        let b = analyze("int x = 1; float y = 2.0;").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, analyze("int x = 1;").unwrap());
    }

    #[test]
    fn test_redeclaration_fails() {
        assert_eq!(
            analyze("int x = 1; float x = 2.0;"),
            Err(SemanticError::Redeclaration("x".into()))
        );
    }

    #[test]
    fn test_use_before_declaration_in_assignment() {
        assert_eq!(
            analyze("x = 1;"),
            Err(SemanticError::UseBeforeDeclaration("x".into()))
        );
    }

    #[test]
    fn test_use_before_declaration_in_expression() {
        assert_eq!(
            analyze("int x = y + 1;"),
            Err(SemanticError::UseBeforeDeclaration("y".into()))
        );
    }

    #[test]
    fn test_print_is_rejected() {
        assert_eq!(
            analyze("int x = 1; print(x);"),
            Err(SemanticError::PrintNotC)
        );
    }

    #[test]
    fn test_printf_requires_stdio() {
        // The missing include wins over any other printf diagnosis, and is
        // reported even though `x` is declared.
        assert_eq!(
            analyze(r#"int x = 1; printf("%d", x);"#),
            Err(SemanticError::PrintfWithoutStdio)
        );
    }

    #[test]
    fn test_printf_with_stdio_accepted() {
        let source = "#include <stdio.h>\nint x = 1;\nprintf(\"%d\", x);";
        assert!(analyze(source).is_ok());
    }

    #[test]
    fn test_placeholder_arity_mismatch() {
        let source = "#include <stdio.h>\nint x = 1;\nprintf(\"%d and %d\", x);";
        assert_eq!(
            analyze(source),
            Err(SemanticError::FormatArityMismatch {
                placeholders: 2,
                args: 1
            })
        );
    }

    #[test]
    fn test_placeholder_count_mixes_kinds() {
        assert_eq!(placeholder_count("%d %f %s %%"), 3);
        assert_eq!(placeholder_count("no placeholders"), 0);
    }

    #[test]
    fn test_undeclared_printf_argument() {
        let source = "#include <stdio.h>\nint x = 1;\nprintf(\"%d\", y);";
        assert_eq!(
            analyze(source),
            Err(SemanticError::UseBeforeDeclaration("y".into()))
        );
    }

    #[test]
    fn test_nested_blocks_share_flat_scope() {
        assert_eq!(
            analyze("int x = 1; if (x) { int x = 2; }"),
            Err(SemanticError::Redeclaration("x".into()))
        );
    }
}
