//! Shared field-parsing helpers used by every per-block parser (spec.md §4.3
//! "Face-code parsing is shared across BO, SI, AK, IK").

use crate::model::{Diagnostic, FaceCode, Token, TokenKind};

/// A cursor over a block's significant tokens, used by each block-specific
/// parser to consume fields left to right.
pub struct FieldCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        FieldCursor { tokens, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn next_token(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    /// Consume one token and parse it as `f64`. Returns `None` (and the
    /// caller records a Critical diagnostic) if it isn't numeric.
    pub fn next_number(&mut self) -> Option<f64> {
        let t = self.next_token()?;
        parse_number(&t.value)
    }

    pub fn next_string(&mut self) -> Option<String> {
        self.next_token().map(|t| t.lexeme.clone())
    }

    /// A point record's optional leading face-code letter, as a standalone
    /// token (`v`, followed by a separate numeric token). Does not handle
    /// the fused form (`v500.00`) — use [`Self::take_face_and_number`] when
    /// a numeric value is expected to immediately follow.
    pub fn take_face_prefix(&mut self) -> Option<FaceCode> {
        let t = self.peek()?;
        if t.kind == TokenKind::String && t.lexeme.len() == 1 {
            if let Some(face) = FaceCode::from_letter(t.lexeme.chars().next().unwrap()) {
                self.pos += 1;
                return Some(face);
            }
        }
        None
    }

    /// Consume an optional leading face code together with the coordinate
    /// value that follows it, handling both the spaced form (`v`, `500.00`
    /// as separate tokens) and the fused form the lexer produces when there
    /// is no whitespace between them (`v500.00` as one `String` token,
    /// since the scanner has no DSTV-aware grammar to split it).
    pub fn take_face_and_number(&mut self) -> (Option<FaceCode>, Option<f64>) {
        let Some(t) = self.peek() else { return (None, None) };
        if t.kind == TokenKind::String && t.lexeme.len() > 1 {
            let mut chars = t.lexeme.char_indices();
            if let Some((_, first)) = chars.next() {
                if let Some(face) = FaceCode::from_letter(first) {
                    let rest_start = first.len_utf8();
                    let rest = &t.lexeme[rest_start..];
                    if let Some(value) = parse_number(rest) {
                        self.pos += 1;
                        return (Some(face), Some(value));
                    }
                }
            }
        }
        let face = self.take_face_prefix();
        let value = self.next_number();
        (face, value)
    }

    pub fn raw_fields(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.lexeme.clone()).collect()
    }

    /// Consume the next token only if it parses as numeric; otherwise leaves
    /// the cursor untouched. Used for trailing optional fields (depth,
    /// angle, tolerance) that a short record may omit entirely.
    pub fn try_next_number(&mut self) -> Option<f64> {
        let t = self.peek()?;
        let v = parse_number(&t.value)?;
        self.pos += 1;
        Some(v)
    }

    /// Consume the next token only if it is a short alphanumeric string
    /// matching `pred`; otherwise leaves the cursor untouched. Used for the
    /// optional trailing work-plane code on a hole record.
    pub fn try_next_string_if(&mut self, pred: impl Fn(&str) -> bool) -> Option<String> {
        let t = self.peek()?;
        if t.kind == TokenKind::String && pred(&t.lexeme) {
            let lexeme = t.lexeme.clone();
            self.pos += 1;
            Some(lexeme)
        } else {
            None
        }
    }
}

pub fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok()
}

pub fn insufficient_fields(code: &str, block: &str) -> Diagnostic {
    Diagnostic::error(code, format!("{block}: insufficient fields for block layout"))
}

pub fn non_numeric(code: &str, block: &str, raw: &str) -> Diagnostic {
    Diagnostic::critical(code, format!("{block}: expected numeric field, got '{raw}'"))
}

pub fn unknown_face_code(block: &str, raw: &str) -> Diagnostic {
    Diagnostic::warning(
        "COORD_UNKNOWN_FACE",
        format!("{block}: unrecognized face code '{raw}', defaulting to Web"),
    )
}
