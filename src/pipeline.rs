//! The compilation pipeline
//!
//! The single boundary with any presentation layer: [`compile`] accepts a
//! source string and returns either every artifact of a successful run or
//! the first stage failure. Every stage is instantiated fresh per call, so
//! independent compilations share no state.

use crate::ast::Program;
use crate::codegen;
use crate::fold::fold_program;
use crate::interp::{Interpreter, OutputValue, RuntimeError};
use crate::ir::{optimize, Instr, IrGenerator};
use crate::lexer::{self, LexicalError};
use crate::parser::{Parser, SyntaxError};
use crate::sema::{SemanticAnalyzer, SemanticError, SymbolTable};
use crate::span::LineMap;
use crate::token::Token;
use std::collections::BTreeSet;
use thiserror::Error;

/// The single failure type of a compilation: exactly one of the four
/// disjoint stage errors, surfaced verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Everything a successful compilation produces
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// Token sequence, ending with the end-of-input token
    pub tokens: Vec<Token>,
    /// Byte-offset to source-line table for the tokens
    pub line_map: LineMap,
    /// Syntax tree as parsed
    pub ast: Program,
    /// Syntax tree after constant folding
    pub optimized_ast: Program,
    /// Declared variables, in declaration order
    pub symbols: SymbolTable,
    /// Header names recognized during parsing
    pub includes: BTreeSet<String>,
    /// Three-address code lowered from the unoptimized tree
    pub ir: Vec<Instr>,
    /// Three-address code lowered from the folded tree, after the linear
    /// IR passes
    pub optimized_ir: Vec<Instr>,
    /// Pseudocode rendering of the optimized IR
    pub pseudocode: Vec<String>,
    /// Pseudo-assembly rendering of the optimized IR
    pub assembly: Vec<String>,
    /// Ordered interpreter output
    pub output: Vec<OutputValue>,
}

/// Run the whole pipeline over one source string.
///
/// Stage order: lex, parse, semantic analysis, then IR generation from the
/// unoptimized tree (for inspection), tree folding, IR generation from the
/// folded tree, the linear IR passes, both code generators, and finally the
/// interpreter on the folded tree. The first failing stage aborts the whole
/// request.
pub fn compile(source: &str) -> Result<Artifacts, CompileError> {
    let (tokens, line_map) = lexer::lex(source)?;

    let parser = Parser::new(source, tokens.clone(), line_map.clone());
    let (ast, includes) = parser.parse()?;

    let symbols = SemanticAnalyzer::new(&includes).analyze(&ast)?;

    let ir = IrGenerator::new().generate(&ast).code;

    let optimized_ast = fold_program(&ast);
    let optimized_ir = optimize(IrGenerator::new().generate(&optimized_ast));

    let pseudocode = codegen::pseudocode(&optimized_ir);
    let assembly = codegen::assembly(&optimized_ir);

    let output = Interpreter::new().run(&optimized_ast)?;

    Ok(Artifacts {
        tokens,
        line_map,
        ast,
        optimized_ast,
        symbols,
        includes,
        ir,
        optimized_ir,
        pseudocode,
        assembly,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Number;
    use crate::ir::render;

    fn output_texts(source: &str) -> Vec<String> {
        compile(source)
            .expect("compile failed")
            .output
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_scenario_printf_arithmetic() {
        let source =
            "#include <stdio.h>\nint x = 5;\nint y = 3;\nprintf(\"%d and %d\", x + y, x - y);";
        assert_eq!(output_texts(source), vec!["8 and 2"]);
    }

    #[test]
    fn test_scenario_while_loop() {
        // `print` is not legal C, so the loop result goes through printf.
        let source = "#include <stdio.h>\nint i = 0;\nint s = 0;\nwhile (i < 5) { s = s + i; i = i + 1; }\nprintf(\"%d\", s);";
        assert_eq!(output_texts(source), vec!["10"]);
    }

    #[test]
    fn test_scenario_if_else() {
        let source = "#include <stdio.h>\nint x = 2;\nif (x == 2) { printf(\"%d\", 1); } else { printf(\"%d\", 0); }";
        assert_eq!(output_texts(source), vec!["1"]);
    }

    #[test]
    fn test_scenario_missing_semicolon() {
        let err = compile("int x = 5 x = x + 1;").unwrap_err();
        assert_eq!(
            err,
            CompileError::Syntax(SyntaxError::MissingSemicolon { line: 1 })
        );
        assert_eq!(
            err.to_string(),
            "Line 1: Missing semicolon (;) at end of statement"
        );
    }

    #[test]
    fn test_scenario_printf_without_include() {
        // The missing include is reported, not the undeclared-variable path.
        let err = compile("int x = 1;\nprintf(\"%d\", x);").unwrap_err();
        assert_eq!(
            err,
            CompileError::Semantic(SemanticError::PrintfWithoutStdio)
        );
    }

    #[test]
    fn test_lexical_failure_surfaces() {
        let err = compile("int x = $;").unwrap_err();
        assert!(matches!(err, CompileError::Lexical(_)));
        assert_eq!(err.to_string(), "Line 1: Unexpected character '$'");
    }

    #[test]
    fn test_runtime_failure_surfaces() {
        let source = "#include <stdio.h>\nint z = 0;\nint x = 1 / z;";
        let err = compile(source).unwrap_err();
        assert_eq!(err, CompileError::Runtime(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_empty_program_is_semantic_failure() {
        let err = compile("").unwrap_err();
        assert_eq!(err, CompileError::Semantic(SemanticError::EmptyProgram));
    }

    #[test]
    fn test_all_artifacts_present_on_success() {
        let source = "#include <stdio.h>\nint main() {\nint x = 2 + 3;\nprintf(\"%d\", x);\n}";
        let artifacts = compile(source).unwrap();

        assert!(!artifacts.tokens.is_empty());
        assert_eq!(artifacts.ast.stmts.len(), 2);
        assert_eq!(artifacts.symbols.len(), 1);
        assert!(artifacts.includes.contains("stdio.h"));
        // Unoptimized IR still computes 2 + 3 through a temporary; the
        // optimized IR does not.
        assert!(render(&artifacts.ir).contains(&"t1 = 2 + 3".to_string()));
        assert_eq!(
            render(&artifacts.optimized_ir),
            vec!["x = 5", "printf \"%d\", 5"]
        );
        assert!(!artifacts.pseudocode.is_empty());
        assert_eq!(artifacts.assembly[0], ".text");
        assert_eq!(artifacts.output, vec![OutputValue::Text("5".into())]);
    }

    #[test]
    fn test_main_wrapper_and_flat_form_agree() {
        let wrapped = "#include <stdio.h>\nint main() { int x = 1; printf(\"%d\", x); }";
        let flat = "#include <stdio.h>\nint x = 1;\nprintf(\"%d\", x);";
        assert_eq!(
            compile(wrapped).unwrap().output,
            compile(flat).unwrap().output
        );
    }

    #[test]
    fn test_division_by_literal_zero_reaches_runtime() {
        // Folding leaves 1 / 0 intact at every level, so the failure is a
        // runtime error rather than a fold-time panic.
        let source = "#include <stdio.h>\nint x = 1 / 0;";
        let err = compile(source).unwrap_err();
        assert_eq!(err, CompileError::Runtime(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_float_output() {
        let source = "#include <stdio.h>\nfloat f = 2.5;\nprintf(\"%f\", f + f);";
        assert_eq!(output_texts(source), vec!["5.0"]);
    }

    #[test]
    fn test_interpreter_output_is_numbers_for_bare_printf() {
        let source = "#include <stdio.h>\nint x = 4;\nprintf(x, x + 1);";
        let artifacts = compile(source).unwrap();
        assert_eq!(
            artifacts.output,
            vec![
                OutputValue::Number(Number::Int(4)),
                OutputValue::Number(Number::Int(5))
            ]
        );
    }
}
