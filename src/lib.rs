//! Mini-C Compiler
//!
//! A compiler pipeline for a restricted subset of C. The pipeline turns
//! source text into several intermediate artifacts and also executes the
//! program by tree-walking interpretation; the pseudocode and assembly
//! outputs are explanatory, not machine code.
//!
//! # Architecture
//!
//! ```text
//! Source Code (.c)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    Lexer    │  → Tokens + line table
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Parser    │  → AST + include set
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Semantic   │  → Symbol table
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Tree Fold  │  → Constant-folded AST ──────────┐
//! └─────────────┘                                  │
//!       │                                          ▼
//!       ▼                                   ┌─────────────┐
//! ┌─────────────┐     ┌─────────────┐      │ Interpreter │ → Output
//! │  IR Lower   │ ──▶ │  IR Passes  │      └─────────────┘
//! └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │  Code Gen   │  → Pseudocode / Assembly text
//!                     └─────────────┘
//! ```

pub mod ast;
pub mod codegen;
pub mod fold;
pub mod interp;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod sema;
pub mod span;
pub mod token;

// Re-exports for convenience
pub use interp::{Interpreter, OutputValue};
pub use lexer::Lexer;
pub use parser::Parser;
pub use pipeline::{compile, Artifacts, CompileError};
pub use sema::{SemanticAnalyzer, SymbolTable};
pub use span::{LineMap, Span};
pub use token::{Token, TokenKind};

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension for source files
pub const FILE_EXTENSION: &str = "c";
