//! Token definitions for the C subset
//!
//! This module defines all the tokens the lexer can produce. Patterns are
//! attached with `logos` attributes; fixed keywords win over the identifier
//! regex, and two-character relational operators win over their
//! one-character prefixes.

use crate::span::Span;
use logos::Logos;
use std::fmt;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Get the text of this token from source
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// All token types of the C subset
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
pub enum TokenKind {
    // ============ Directives and literals ============

    /// `#include`
    #[token("#include")]
    Include,

    /// String literal: "hello %d"
    #[regex(r#""[^"]*""#)]
    Str,

    /// Numeric literal: 42, 3.14, 5.
    #[regex(r"[0-9]+(\.[0-9]*)?")]
    Number,

    // ============ Keywords ============

    #[token("int")]
    Int,
    #[token("float")]
    Float,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("printf")]
    Printf,
    #[token("print")]
    Print,
    #[token("return")]
    Return,

    /// Identifier: variable names, `main`, include targets
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // ============ Operators ============

    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token(">=")]
    GtEq,
    #[token("<=")]
    LtEq,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // ============ Punctuation ============

    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    /// End of input, appended once by the lexer
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Include => "'#include'",
            TokenKind::Str => "string literal",
            TokenKind::Number => "number",
            TokenKind::Int => "'int'",
            TokenKind::Float => "'float'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::Printf => "'printf'",
            TokenKind::Print => "'print'",
            TokenKind::Return => "'return'",
            TokenKind::Ident => "identifier",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::GtEq => "'>='",
            TokenKind::LtEq => "'<='",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{}", s)
    }
}
