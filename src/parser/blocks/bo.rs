//! BO — holes, one or more per block (spec.md §4.3).

use super::super::fields::{non_numeric, FieldCursor};
use super::super::BlockParseContext;
use crate::model::{BoData, Diagnostic, HoleRecord, ParsedBlockData};

pub struct BoParser;

impl super::super::BlockParser for BoParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let flat = ctx.flat();
        let mut cursor = FieldCursor::new(&flat);
        let mut holes = Vec::new();

        while cursor.remaining() > 0 {
            // The face prefix may be its own token (`v 500.00`) or fused to
            // the X token (`v500.00`); `take_face_and_number` already falls
            // back to the spaced form internally (spec.md §4.3).
            let (face, x) = cursor.take_face_and_number();

            let Some(x) = x else {
                if cursor.remaining() > 0 {
                    let raw = cursor.next_string().unwrap_or_default();
                    diagnostics.push(non_numeric("HOLE_X", "BO", &raw));
                }
                break;
            };
            let Some(y) = cursor.next_number() else {
                diagnostics.push(Diagnostic::error(
                    "HOLE_INCOMPLETE",
                    "BO: hole record missing Y",
                ));
                break;
            };
            let Some(diameter) = cursor.next_number() else {
                diagnostics.push(Diagnostic::error(
                    "HOLE_INCOMPLETE",
                    "BO: hole record missing diameter",
                ));
                break;
            };
            // diameter > 0 is a C4 (semantic validator) concern, not a parse
            // failure — this stage only rejects lexically malformed fields.

            let depth = cursor.try_next_number().unwrap_or(0.0);
            let angle = cursor.try_next_number();
            let plane = cursor.try_next_string_if(|s| s.len() == 2 && s.starts_with('E'));
            let tolerance = cursor.try_next_number();

            holes.push(HoleRecord {
                face,
                x,
                y,
                diameter,
                depth,
                angle,
                plane,
                tolerance,
            });
        }

        if holes.is_empty() {
            diagnostics.push(Diagnostic::critical("HOLE_EMPTY", "BO: no hole records found"));
        }

        (ParsedBlockData::Bo(BoData { holes }), diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::model::FaceCode;
    use crate::parser::parse;

    #[test]
    fn parses_through_hole() {
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\nEN\n\nBO\nv 500.00 100.00 22.00 0.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let bo = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Bo(d) => Some(d.clone()),
            _ => None,
        });
        let bo = bo.expect("BO parsed");
        assert_eq!(bo.holes.len(), 1);
        let h = &bo.holes[0];
        assert_eq!(h.face, Some(FaceCode::V));
        assert_eq!(h.x, 500.0);
        assert_eq!(h.y, 100.0);
        assert_eq!(h.diameter, 22.0);
        assert_eq!(h.depth, 0.0);
    }

    #[test]
    fn parses_multiple_holes_same_block() {
        let src = "BO\nv 500.00 100.00 22.00 0.00\nu 500.00 150.00 18.00 10.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let bo = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Bo(d) => Some(d.clone()),
            _ => None,
        });
        let bo = bo.expect("BO parsed");
        assert_eq!(bo.holes.len(), 2);
        assert_eq!(bo.holes[1].face, Some(FaceCode::U));
        assert_eq!(bo.holes[1].depth, 10.0);
    }

    #[test]
    fn parses_fused_face_and_x() {
        let src = "BO\nv500.00 100.00 22.00 0.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let bo = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Bo(d) => Some(d.clone()),
            _ => None,
        });
        let bo = bo.expect("BO parsed");
        assert_eq!(bo.holes.len(), 1);
        assert_eq!(bo.holes[0].face, Some(FaceCode::V));
        assert_eq!(bo.holes[0].x, 500.0);
    }

    #[test]
    fn accepts_zero_diameter_as_parser_concern() {
        // diameter <= 0 is flagged by the semantic validator (HOLE_001), not
        // the parser, so this still parses cleanly.
        let src = "BO\n500.00 100.00 0.00 0.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let bo = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Bo(d) => Some(d.clone()),
            _ => None,
        });
        let bo = bo.expect("BO parsed");
        assert_eq!(bo.holes[0].diameter, 0.0);
    }
}
