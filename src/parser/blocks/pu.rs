//! PU — punch mark (spec.md §4.3).

use super::super::fields::FieldCursor;
use super::super::BlockParseContext;
use crate::model::{Diagnostic, ParsedBlockData, PuData};

pub struct PuParser;

impl super::super::BlockParser for PuParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let flat = ctx.flat();
        let mut cursor = FieldCursor::new(&flat);

        // A leading face letter is tolerated and discarded; it may be its
        // own token or fused to the X token (spec.md §4.3).
        let (_, fused_x) = cursor.take_face_and_number();

        let x = fused_x.unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("MARK_X_MISSING", "PU: missing X coordinate"));
            0.0
        });
        let y = cursor.next_number().unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("MARK_Y_MISSING", "PU: missing Y coordinate"));
            0.0
        });
        let depth = cursor.try_next_number();
        let diameter = cursor.try_next_number();
        let plane = cursor.try_next_string_if(|s| s.len() == 2 && s.starts_with('E'));

        let data = PuData {
            x,
            y,
            depth,
            diameter,
            plane,
        };

        (ParsedBlockData::Pu(data), diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn parses_punch_mark() {
        let src = "PU\n25.00 25.00 2.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let pu = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Pu(d) => Some(d.clone()),
            _ => None,
        });
        let pu = pu.expect("PU parsed");
        assert_eq!(pu.x, 25.0);
        assert_eq!(pu.depth, Some(2.0));
    }
}
