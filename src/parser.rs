//! Parser for the C subset
//!
//! A recursive descent parser that converts the token sequence into a
//! syntax tree, collecting the set of `#include` targets along the way.
//!
//! The expression grammar is a single left-associative precedence chain:
//! `a + b * c` parses as `(a + b) * c`. This is the documented grammar of
//! the language, not an oversight.

use crate::ast::{BinOp, Block, Expr, Number, Program, Stmt, Type};
use crate::lexer;
use crate::span::LineMap;
use crate::token::{Token, TokenKind};
use std::collections::BTreeSet;
use thiserror::Error;

/// Parser errors. Each carries the 1-based source line it is attributed to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("Line {line}: Missing semicolon (;) at end of statement")]
    MissingSemicolon { line: u32 },

    #[error("Line {line}: Missing opening parenthesis '('")]
    MissingLParen { line: u32 },

    #[error("Line {line}: Missing closing parenthesis ')'")]
    MissingRParen { line: u32 },

    #[error("Line {line}: Missing opening brace '{{'")]
    MissingLBrace { line: u32 },

    #[error("Line {line}: Missing closing brace '}}'")]
    MissingRBrace { line: u32 },

    #[error("Line {line}: Expected identifier but found {found}")]
    ExpectedIdentifier { line: u32, found: String },

    #[error("Line {line}: Expected {expected} but found {found}")]
    ExpectedToken {
        line: u32,
        expected: String,
        found: String,
    },

    #[error("Line {line}: Unexpected token {found}")]
    Unexpected { line: u32, found: String },
}

/// Parse result
pub type ParseResult<T> = Result<T, SyntaxError>;

/// The parser for the C subset
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    line_map: LineMap,
    pos: usize,
    includes: BTreeSet<String>,
}

impl<'src> Parser<'src> {
    /// Create a parser over an already-lexed token sequence.
    ///
    /// The token sequence must end with an [`TokenKind::Eof`] token, which
    /// is what [`lexer::lex`] produces.
    pub fn new(source: &'src str, tokens: Vec<Token>, line_map: LineMap) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof)
        ));
        Self {
            source,
            tokens,
            line_map,
            pos: 0,
            includes: BTreeSet::new(),
        }
    }

    /// Lex and parse in one step
    pub fn from_source(source: &'src str) -> Result<Self, crate::lexer::LexicalError> {
        let (tokens, line_map) = lexer::lex(source)?;
        Ok(Self::new(source, tokens, line_map))
    }

    // ============ Token plumbing ============

    fn peek(&self) -> &Token {
        // The Eof token is never consumed, so `pos` stays in range.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume the current token if it matches
    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn text(&self, token: &Token) -> &'src str {
        token.text(self.source)
    }

    /// The line a required-token diagnostic should cite: the line of the
    /// last consumed token, so a missing semicolon is reported on the line
    /// where the statement actually ended.
    fn error_line(&self) -> u32 {
        if self.pos > 0 {
            self.line_map.line_at(self.tokens[self.pos - 1].span.start)
        } else {
            self.current_line()
        }
    }

    /// The line of the current (unconsumed) token
    fn current_line(&self) -> u32 {
        self.line_map.line_at(self.peek().span.start)
    }

    /// Describe the current token for a diagnostic, e.g. `identifier (foo)`
    fn describe_current(&self) -> String {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => token.kind.to_string(),
            _ => format!("{} ({})", token.kind, self.text(token)),
        }
    }

    /// Consume a required token, mapping the failure to the construct-aware
    /// error message for that token kind.
    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let line = self.error_line();
        Err(match kind {
            TokenKind::Semicolon => SyntaxError::MissingSemicolon { line },
            TokenKind::LParen => SyntaxError::MissingLParen { line },
            TokenKind::RParen => SyntaxError::MissingRParen { line },
            TokenKind::LBrace => SyntaxError::MissingLBrace { line },
            TokenKind::RBrace => SyntaxError::MissingRBrace { line },
            TokenKind::Ident => SyntaxError::ExpectedIdentifier {
                line,
                found: self.peek().kind.to_string(),
            },
            _ => SyntaxError::ExpectedToken {
                line,
                expected: kind.to_string(),
                found: self.peek().kind.to_string(),
            },
        })
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(self.text(&token).to_string())
    }

    // ============ Top-level parsing ============

    /// Parse a complete program, returning the tree and the include set.
    ///
    /// If the program opens with `int main ( ) { ... }`, only that block's
    /// statements become the program body and the wrapper is discarded.
    /// Otherwise the whole token stream is parsed as a flat statement
    /// sequence.
    pub fn parse(mut self) -> ParseResult<(Program, BTreeSet<String>)> {
        while self.check(TokenKind::Include) {
            self.include_directive()?;
        }

        let stmts = if self.check(TokenKind::Int)
            && self.peek_nth(1).kind == TokenKind::Ident
            && self.text(self.peek_nth(1)) == "main"
        {
            self.main_function()?
        } else {
            let mut stmts = Vec::new();
            while !self.is_at_end() {
                stmts.push(self.statement()?);
            }
            stmts
        };

        Ok((Program::new(stmts), self.includes))
    }

    /// `#include <name>` or `#include "name"`; records the target name and
    /// produces no tree node.
    fn include_directive(&mut self) -> ParseResult<()> {
        self.expect(TokenKind::Include)?;
        if self.consume(TokenKind::Lt) {
            let mut name = String::new();
            while !self.check(TokenKind::Gt) && !self.is_at_end() {
                let token = self.advance();
                name.push_str(self.text(&token));
            }
            self.expect(TokenKind::Gt)?;
            self.includes.insert(name.trim().to_string());
        } else if self.check(TokenKind::Str) {
            let token = self.advance();
            let name = self.text(&token).trim_matches('"').to_string();
            self.includes.insert(name);
        }
        Ok(())
    }

    fn main_function(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::Int)?;
        self.expect(TokenKind::Ident)?; // main
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    // ============ Statements ============

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Int | TokenKind::Float => self.declaration(),
            TokenKind::Print => self.print_statement(),
            TokenKind::Printf => self.printf_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Ident => self.assignment(),
            TokenKind::LBrace => Ok(Stmt::Block(self.block()?)),
            _ => Err(SyntaxError::Unexpected {
                line: self.current_line(),
                found: self.describe_current(),
            }),
        }
    }

    fn declaration(&mut self) -> ParseResult<Stmt> {
        let ty = match self.advance().kind {
            TokenKind::Int => Type::Int,
            TokenKind::Float => Type::Float,
            _ => unreachable!("declaration() called on a non-type token"),
        };
        let name = self.expect_ident()?;
        let init = if self.consume(TokenKind::Assign) {
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Declaration { ty, name, init })
    }

    fn assignment(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        let expr = self.expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Assignment { name, expr })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // print
        self.expect(TokenKind::LParen)?;
        let expr = self.expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Print { expr })
    }

    fn printf_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // printf
        self.expect(TokenKind::LParen)?;
        let mut format = None;
        let mut args = Vec::new();
        if self.check(TokenKind::Str) {
            let token = self.advance();
            format = Some(self.text(&token).trim_matches('"').to_string());
            while self.consume(TokenKind::Comma) {
                args.push(self.expr()?);
            }
        } else if !self.check(TokenKind::RParen) {
            args.push(self.expr()?);
            while self.consume(TokenKind::Comma) {
                args.push(self.expr()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Printf { format, args })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // return
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return { value })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // if
        self.expect(TokenKind::LParen)?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen)?;
        let then_block = self.block()?;
        let else_block = if self.consume(TokenKind::Else) {
            Some(self.block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // while
        self.expect(TokenKind::LParen)?;
        let cond = self.expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        Ok(Stmt::While { cond, body })
    }

    fn block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block::new(stmts))
    }

    // ============ Expressions ============

    /// `expr := term ( op term )*` — one left-associative chain, no
    /// precedence levels.
    fn expr(&mut self) -> ParseResult<Expr> {
        let mut node = self.term()?;
        while let Some(op) = binop_for(self.peek().kind) {
            self.advance();
            let right = self.term()?;
            node = Expr::Binary {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                let text = self.text(&token);
                let value = if text.contains('.') {
                    Number::Float(text.parse().map_err(|_| SyntaxError::Unexpected {
                        line: self.error_line(),
                        found: format!("number ({})", text),
                    })?)
                } else {
                    Number::Int(text.parse().map_err(|_| SyntaxError::Unexpected {
                        line: self.error_line(),
                        found: format!("number ({})", text),
                    })?)
                };
                Ok(Expr::Number(value))
            }
            TokenKind::Ident => {
                let token = self.advance();
                Ok(Expr::Ident(self.text(&token).to_string()))
            }
            TokenKind::LParen => {
                self.advance();
                let node = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(node)
            }
            _ => Err(SyntaxError::Unexpected {
                line: self.current_line(),
                found: self.peek().kind.to_string(),
            }),
        }
    }
}

fn binop_for(kind: TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Sub),
        TokenKind::Star => Some(BinOp::Mul),
        TokenKind::Slash => Some(BinOp::Div),
        TokenKind::Percent => Some(BinOp::Mod),
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::NotEq => Some(BinOp::Ne),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::LtEq => Some(BinOp::Le),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::GtEq => Some(BinOp::Ge),
        _ => None,
    }
}

/// Helper function to parse source code into a program plus its include set
pub fn parse(source: &str) -> Result<(Program, BTreeSet<String>), crate::pipeline::CompileError> {
    let parser = Parser::from_source(source)?;
    Ok(parser.parse()?)
}
