//! KO — contour marking (spec.md §4.3): a polyline, not required to close.

use super::super::fields::FieldCursor;
use super::super::BlockParseContext;
use crate::model::{Diagnostic, KoData, ParsedBlockData, RawPoint};

pub struct KoParser;

impl super::super::BlockParser for KoParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let mut points = Vec::new();

        for idx in 0..ctx.lines.len() {
            let line_tokens = &ctx.lines[idx];
            if line_tokens.is_empty() {
                continue;
            }
            let owned: Vec<_> = line_tokens.iter().map(|t| (*t).clone()).collect();
            let mut cursor = FieldCursor::new(&owned);
            // Same per-point grammar as AK/IK, so the face prefix is
            // accepted standalone or fused to the X token (spec.md §4.3).
            let (face, x) = cursor.take_face_and_number();
            let Some(x) = x else {
                diagnostics.push(Diagnostic::critical(
                    "MARK_POINT_NON_NUMERIC",
                    format!("KO: point at line {idx} missing/invalid X coordinate"),
                ));
                continue;
            };
            let Some(y) = cursor.next_number() else {
                diagnostics.push(Diagnostic::critical(
                    "MARK_POINT_NON_NUMERIC",
                    format!("KO: point at line {idx} missing/invalid Y coordinate"),
                ));
                continue;
            };
            let z = cursor.next_number();
            points.push(RawPoint { face, x, y, z });
        }

        if points.len() < 2 {
            diagnostics.push(Diagnostic::error(
                "MARK_TOO_FEW_POINTS",
                format!("KO: marking line has {} point(s), at least 2 required", points.len()),
            ));
        }

        (ParsedBlockData::Ko(KoData { points }), diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn parses_two_point_line() {
        let src = "KO\nv 0.00 0.00\nv 100.00 0.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let ko = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Ko(d) => Some(d.clone()),
            _ => None,
        });
        let ko = ko.expect("KO parsed");
        assert_eq!(ko.points.len(), 2);
    }
}
