//! Lexer output: [`Token`] and [`TokenKind`].

use serde::{Deserialize, Serialize};

/// Classification of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    BlockHeader,
    Integer,
    Float,
    String,
    Identifier,
    Delimiter,
    Newline,
    Whitespace,
    Comment,
    Error,
    Eof,
}

/// A single lexed token with its source position.
///
/// `lexeme` is the original source text; `value` is the normalized text
/// (trailing unit suffix and surrounding noise stripped, sign preserved).
/// Normalizing further — e.g. deciding integer vs. float, or stripping a
/// face-code prefix — is deferred to the block parser per spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub value: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        value: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        let lexeme = lexeme.into();
        let length = lexeme.chars().count();
        Token {
            kind,
            lexeme,
            value: value.into(),
            line,
            column,
            length,
        }
    }

    /// Tokens that carry no parsing-relevant content: whitespace, newlines,
    /// and comments. The block parser buffers only the complement of this.
    pub fn is_significant(&self) -> bool {
        !matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
