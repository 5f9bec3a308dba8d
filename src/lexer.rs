//! Lexer for the C subset
//!
//! The lexer converts source text into a token sequence plus a [`LineMap`]
//! attributing every token to the 1-based line on which it began. It uses
//! the `logos` crate for the actual pattern matching.
//!
//! Tokenization is fail-fast: the first character that matches no pattern
//! aborts the whole scan with a [`LexicalError`].

use crate::span::{LineMap, Span};
use crate::token::{Token, TokenKind};
use logos::Logos;
use thiserror::Error;

/// Lexer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexicalError {
    #[error("Line {line}: Unexpected character '{ch}'")]
    UnexpectedChar { ch: char, line: u32 },
}

/// The lexer for the C subset
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    line_map: LineMap,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            line_map: LineMap::new(source),
        }
    }

    /// Scan the whole input, producing the token sequence and the line
    /// table, or the first lexical error.
    ///
    /// An explicit [`TokenKind::Eof`] token is always appended last.
    pub fn tokenize(mut self) -> Result<(Vec<Token>, LineMap), LexicalError> {
        let mut tokens = Vec::new();

        while let Some(result) = self.inner.next() {
            let span = self.inner.span();
            match result {
                Ok(kind) => tokens.push(Token::new(kind, Span::new(span.start, span.end))),
                Err(()) => {
                    let ch = self.source[span.start..].chars().next().unwrap_or('\0');
                    return Err(LexicalError::UnexpectedChar {
                        ch,
                        line: self.line_map.line_at(span.start),
                    });
                }
            }
        }

        let pos = self.source.len();
        tokens.push(Token::new(TokenKind::Eof, Span::new(pos, pos)));
        Ok((tokens, self.line_map))
    }
}

/// Helper function to lex source code
pub fn lex(source: &str) -> Result<(Vec<Token>, LineMap), LexicalError> {
    Lexer::new(source).tokenize()
}
