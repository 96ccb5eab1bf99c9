//! AK/IK — outer/inner contour, one point per physical line (spec.md §4.3).

use super::super::fields::FieldCursor;
use super::super::BlockParseContext;
use crate::model::{ContourData, Diagnostic, ParsedBlockData, RawPoint};

pub struct AkParser;
pub struct IkParser;

impl super::super::BlockParser for AkParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let (data, diagnostics) = parse_contour(ctx, "AK");
        (ParsedBlockData::Ak(data), diagnostics)
    }
}

impl super::super::BlockParser for IkParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let (data, diagnostics) = parse_contour(ctx, "IK");
        (ParsedBlockData::Ik(data), diagnostics)
    }
}

/// Shared by AK and IK: each non-empty line is one point, `face x y [z]`
/// with `face` optional (defaults to the block's ambient face when absent —
/// left to the normalizer, which has the profile context to resolve it).
fn parse_contour(ctx: &BlockParseContext, block: &str) -> (ContourData, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut points = Vec::new();

    for idx in 0..ctx.lines.len() {
        let line_tokens = &ctx.lines[idx];
        if line_tokens.is_empty() {
            continue;
        }
        let owned: Vec<_> = line_tokens.iter().map(|t| (*t).clone()).collect();
        let mut cursor = FieldCursor::new(&owned);
        // The face prefix may be its own token or fused to the X token
        // (`v500.00`); `take_face_and_number` falls back to the spaced form
        // internally (spec.md §4.3).
        let (face, x) = cursor.take_face_and_number();

        let Some(x) = x else {
            diagnostics.push(Diagnostic::critical(
                "CONT_POINT_NON_NUMERIC",
                format!("{block}: point at line {idx} missing/invalid X coordinate"),
            ));
            continue;
        };
        let Some(y) = cursor.next_number() else {
            diagnostics.push(Diagnostic::critical(
                "CONT_POINT_NON_NUMERIC",
                format!("{block}: point at line {idx} missing/invalid Y coordinate"),
            ));
            continue;
        };
        let z = cursor.next_number();

        points.push(RawPoint { face, x, y, z });
    }

    // Point-count and closure validity (CONT_002 etc.) are C4 concerns; this
    // stage only records whether the first and last point coincide.
    let closed = points.len() >= 2
        && points.first().zip(points.last()).is_some_and(|(a, b)| {
            (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
        });

    (ContourData { points, closed }, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn parses_closed_rectangle() {
        let src = "AK\nv 0.00 0.00\nv 100.00 0.00\nv 100.00 50.00\nv 0.00 50.00\nv 0.00 0.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let ak = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Ak(d) => Some(d.clone()),
            _ => None,
        });
        let ak = ak.expect("AK parsed");
        assert_eq!(ak.points.len(), 5);
        assert!(ak.closed);
    }

    #[test]
    fn parses_fused_face_and_x_per_point() {
        let src = "AK\nv0.00 0.00\nv100.00 0.00\nv100.00 50.00\nv0.00 50.00\nv0.00 0.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let ak = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Ak(d) => Some(d.clone()),
            _ => None,
        });
        let ak = ak.expect("AK parsed");
        assert_eq!(ak.points.len(), 5);
        assert!(ak.closed);
        assert_eq!(ak.points[0].x, 0.0);
        assert_eq!(ak.points[1].x, 100.0);
    }

    #[test]
    fn parses_unclosed_short_contour_without_rejecting() {
        // Point-count and closure validity belong to the semantic validator
        // (CONT_002 etc.); the parser just reports what it read.
        let src = "AK\nv 0.00 0.00\nv 100.00 0.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let ak = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Ak(d) => Some(d.clone()),
            _ => None,
        });
        let ak = ak.expect("AK parsed");
        assert_eq!(ak.points.len(), 2);
        assert!(!ak.closed);
    }
}
