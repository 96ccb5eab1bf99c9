//! C2 — byte buffer to token stream (spec.md §4.2).
//!
//! A hand-written, restartable scanner. Every lexed token keeps its original
//! line/column so later stages can report precise diagnostics.

use crate::model::{Diagnostic, Token, TokenKind};

/// The closed set of two-letter DSTV header codes recognized at columns 1-2.
/// Kept in sync with [`crate::model::BlockType::from_header`] but lexed
/// purely as text — the lexer does not know about block semantics.
const HEADER_CODES: &[&str] = &[
    "ST", "EN", "BO", "AK", "IK", "SI", "SC", "PU", "KO", "TO", "UE", "PR", "KA", "BR", "VO", "NU",
    "FP", "LP", "RT", "EB", "VB", "GR", "WA", "FB", "BF", "KL", "KN", "RO", "IN", "E0", "E1", "E2",
    "E3", "E4", "E5", "E6", "E7", "E8", "E9",
];

fn is_header_code(s: &str) -> bool {
    HEADER_CODES.contains(&s)
}

/// Output of a lexer run: the significant-and-insignificant token stream
/// (always ending in `Eof`) and any warnings raised for unrecognized bytes.
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Restartable line-oriented scanner over a UTF-8 source buffer.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    at_line_start: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            diagnostics: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Tokenize the full source buffer. Each call starts fresh; the lexer
    /// carries no state across calls (spec.md §4.2 "restartable per call").
    pub fn tokenize(mut self) -> LexOutput {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let line = self.line;
            let column = self.column;
            let at_start = self.at_line_start;
            self.at_line_start = false;

            if c == '\r' {
                self.advance();
                if self.peek() == Some('\n') {
                    self.advance();
                }
                tokens.push(Token::new(TokenKind::Newline, "\r\n", "", line, column));
                self.at_line_start = true;
                continue;
            }
            if c == '\n' {
                self.advance();
                tokens.push(Token::new(TokenKind::Newline, "\n", "", line, column));
                self.at_line_start = true;
                continue;
            }
            if c == '\t' {
                self.advance();
                tokens.push(Token::new(TokenKind::Delimiter, "\t", "\t", line, column));
                continue;
            }
            if c == ' ' {
                let mut lexeme = String::new();
                while self.peek() == Some(' ') {
                    lexeme.push(self.advance().unwrap());
                }
                tokens.push(Token::new(TokenKind::Whitespace, lexeme, " ", line, column));
                continue;
            }
            if c == '*' && self.peek_at(1) == Some('*') || c == '#' {
                let lexeme = self.consume_comment();
                tokens.push(Token::new(TokenKind::Comment, &lexeme, &lexeme, line, column));
                continue;
            }
            if at_start && self.column <= 2 && c.is_ascii_uppercase() {
                if let Some(tok) = self.try_header(line, column) {
                    tokens.push(tok);
                    continue;
                }
            }
            if c == '+' || c == '-' || c.is_ascii_digit() {
                if let Some(tok) = self.try_number(line, column) {
                    tokens.push(tok);
                    continue;
                }
            }
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                tokens.push(self.consume_word(line, column));
                continue;
            }

            // Unrecognized byte.
            let bad = self.advance().unwrap();
            self.diagnostics.push(Diagnostic::warning(
                "GLOBAL_LEX_UNEXPECTED_BYTE",
                format!("unexpected character '{bad}' at line {line}, column {column}"),
            ));
            tokens.push(Token::new(
                TokenKind::Error,
                bad.to_string(),
                bad.to_string(),
                line,
                column,
            ));
        }

        tokens.push(Token::new(TokenKind::Eof, "", "", self.line, self.column));

        LexOutput {
            tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn consume_comment(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            s.push(self.advance().unwrap());
        }
        s
    }

    /// Attempt to lex a two-letter block header at columns 1-2. Falls back
    /// to `None` (caller retries as a word) if the two letters aren't a
    /// recognized header code.
    fn try_header(&mut self, line: usize, column: usize) -> Option<Token> {
        let save = (self.pos, self.line, self.column);
        let mut lexeme = String::new();
        for _ in 0..2 {
            match self.peek() {
                Some(c) if c.is_ascii_alphanumeric() => lexeme.push(self.advance().unwrap()),
                _ => {
                    (self.pos, self.line, self.column) = save;
                    return None;
                }
            }
        }
        // Header must be immediately followed by whitespace/newline/EOF —
        // otherwise it's a longer identifier that happens to start with two
        // uppercase letters.
        let followed_ok = matches!(self.peek(), None | Some(' ') | Some('\t') | Some('\r') | Some('\n'));
        if is_header_code(&lexeme) && followed_ok {
            Some(Token::new(TokenKind::BlockHeader, &lexeme, &lexeme, line, column))
        } else {
            (self.pos, self.line, self.column) = save;
            None
        }
    }

    /// Number: `[+-]? digit+ ('.' digit+)? letter?` — the trailing letter is
    /// the DSTV unit suffix (`u`, occasionally `r`) and is discarded from
    /// `value` but kept in `lexeme`.
    fn try_number(&mut self, line: usize, column: usize) -> Option<Token> {
        let save = (self.pos, self.line, self.column);
        let mut lexeme = String::new();
        let mut is_float = false;

        if matches!(self.peek(), Some('+') | Some('-')) {
            lexeme.push(self.advance().unwrap());
        }

        let digits_start = lexeme.len();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            lexeme.push(self.advance().unwrap());
        }
        if lexeme.len() == digits_start {
            // No digits followed the sign: not a number after all.
            (self.pos, self.line, self.column) = save;
            return None;
        }

        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            lexeme.push(self.advance().unwrap());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                lexeme.push(self.advance().unwrap());
            }
        }

        let value = lexeme.clone();
        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            // Absorb and discard the trailing unit-suffix letter (`u`, `r`).
            lexeme.push(self.advance().unwrap());
        }

        let kind = if is_float { TokenKind::Float } else { TokenKind::Integer };
        Some(Token::new(kind, &lexeme, &value, line, column))
    }

    /// Identifier/string run: alphanumeric plus `_-.`. Tagged `Identifier`
    /// when it matches a profile-code shape, else `String`.
    fn consume_word(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                lexeme.push(self.advance().unwrap());
            } else {
                break;
            }
        }
        let kind = if looks_like_profile_code(&lexeme) {
            TokenKind::Identifier
        } else {
            TokenKind::String
        };
        Token::new(kind, &lexeme, &lexeme, line, column)
    }
}

/// Matches the profile-code shapes named in spec.md §4.2: all-uppercase
/// (`^[A-Z]{2,}$`), a letter followed by digits (`^[A-Z]\d+`), or digits
/// followed by letters (`^\d+[A-Z]+`).
fn looks_like_profile_code(s: &str) -> bool {
    if s.len() < 2 {
        return false;
    }
    let all_upper = s.len() >= 2 && s.chars().all(|c| c.is_ascii_uppercase());
    if all_upper {
        return true;
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    if first.is_ascii_uppercase() && chars.clone().all(|c| c.is_ascii_digit()) && s.len() > 1 {
        return true;
    }
    let digit_prefix_len = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_prefix_len > 0 && digit_prefix_len < s.len() {
        let rest = &s[digit_prefix_len..];
        if rest.chars().all(|c| c.is_ascii_uppercase()) {
            return true;
        }
    }
    false
}

/// Convenience entry point: lex a full source buffer.
pub fn lex(source: &str) -> LexOutput {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(tokens: &[Token]) -> Vec<&Token> {
        tokens.iter().filter(|t| t.is_significant()).collect()
    }

    #[test]
    fn lexes_block_header_at_line_start() {
        let out = lex("ST\nORD1\n");
        let sig = significant(&out.tokens);
        assert_eq!(sig[0].kind, TokenKind::BlockHeader);
        assert_eq!(sig[0].lexeme, "ST");
    }

    #[test]
    fn strips_unit_suffix_from_numbers() {
        let out = lex("500.00u");
        let sig = significant(&out.tokens);
        assert_eq!(sig[0].kind, TokenKind::Float);
        assert_eq!(sig[0].value, "500.00");
        assert_eq!(sig[0].lexeme, "500.00u");
    }

    #[test]
    fn recognizes_signed_integer() {
        let out = lex("-12");
        let sig = significant(&out.tokens);
        assert_eq!(sig[0].kind, TokenKind::Integer);
        assert_eq!(sig[0].value, "-12");
    }

    #[test]
    fn comment_to_end_of_line() {
        let out = lex("** a comment\nST\n");
        assert_eq!(out.tokens[0].kind, TokenKind::Comment);
    }

    #[test]
    fn face_letter_is_standalone_identifier() {
        let out = lex("v 500.00u");
        let sig = significant(&out.tokens);
        assert_eq!(sig[0].kind, TokenKind::String);
        assert_eq!(sig[0].lexeme, "v");
    }

    #[test]
    fn profile_code_tagged_identifier() {
        let out = lex("IPE200\n");
        let sig = significant(&out.tokens);
        assert_eq!(sig[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn unrecognized_byte_emits_error_token_and_warning() {
        let out = lex("\x01\n");
        assert!(out.diagnostics.iter().any(|d| d.code == "GLOBAL_LEX_UNEXPECTED_BYTE"));
        assert_eq!(out.tokens[0].kind, TokenKind::Error);
    }

    #[test]
    fn lexer_is_idempotent_on_significant_lexemes() {
        let out1 = lex("ST\nORD1 DRW1 22.00u\nEN\n");
        let sig1: Vec<String> = significant(&out1.tokens)
            .iter()
            .map(|t| t.lexeme.clone())
            .collect();
        let joined = sig1.join(" ");
        let out2 = lex(&joined);
        let sig2: Vec<String> = significant(&out2.tokens).iter().map(|t| t.lexeme.clone()).collect();
        assert_eq!(sig1, sig2);
    }
}
