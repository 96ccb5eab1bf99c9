//! SC — rectangular cut (spec.md §4.3).

use super::super::fields::FieldCursor;
use super::super::BlockParseContext;
use crate::model::{Diagnostic, ParsedBlockData, ScData};

pub struct ScParser;

impl super::super::BlockParser for ScParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let flat = ctx.flat();
        let mut cursor = FieldCursor::new(&flat);

        // A leading face letter is tolerated (some generators emit one even
        // though the cut applies to the whole cross-section) and discarded;
        // it may be its own token or fused to the X token (spec.md §4.3).
        let (_, fused_x) = cursor.take_face_and_number();

        let x = fused_x.unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("CUT_X_MISSING", "SC: missing X coordinate"));
            0.0
        });
        let y = cursor.next_number().unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("CUT_Y_MISSING", "SC: missing Y coordinate"));
            0.0
        });
        let width = cursor.next_number().unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("CUT_WIDTH_MISSING", "SC: missing width"));
            0.0
        });
        let height = cursor.next_number().unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("CUT_HEIGHT_MISSING", "SC: missing height"));
            0.0
        });

        // width, height > 0 is a C4 (semantic validator) concern.
        let angle = cursor.try_next_number();
        let radius = cursor.try_next_number();
        let plane = cursor.try_next_string_if(|s| s.len() == 2 && s.starts_with('E'));

        let data = ScData {
            x,
            y,
            width,
            height,
            angle,
            radius,
            plane,
        };

        (ParsedBlockData::Sc(data), diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn parses_rectangular_cut() {
        let src = "SC\n10.00 10.00 50.00 20.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let sc = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Sc(d) => Some(d.clone()),
            _ => None,
        });
        let sc = sc.expect("SC parsed");
        assert_eq!(sc.width, 50.0);
        assert_eq!(sc.height, 20.0);
    }

    #[test]
    fn parses_zero_width_without_rejecting() {
        // width/height > 0 is enforced by the semantic validator, not here.
        let src = "SC\n10.00 10.00 0.00 20.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let sc = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Sc(d) => Some(d.clone()),
            _ => None,
        });
        assert_eq!(sc.expect("SC parsed").width, 0.0);
    }
}
