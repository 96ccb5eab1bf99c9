//! SI — marking/text (spec.md §4.3, §9 Open Question 1).

use super::super::fields::FieldCursor;
use super::super::BlockParseContext;
use crate::model::{Diagnostic, ParsedBlockData, SiData};

pub struct SiParser;

impl super::super::BlockParser for SiParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let flat = ctx.flat();
        let mut cursor = FieldCursor::new(&flat);

        // The face prefix may be its own token or fused to the X token
        // (`v500.00`); `take_face_and_number` falls back to the spaced form
        // internally (spec.md §4.3).
        let (face, fused_x) = cursor.take_face_and_number();
        let x = fused_x.unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("MARK_X_MISSING", "SI: missing X coordinate"));
            0.0
        });
        let y = cursor.next_number().unwrap_or_else(|| {
            diagnostics.push(Diagnostic::critical("MARK_Y_MISSING", "SI: missing Y coordinate"));
            0.0
        });
        let z = cursor.try_next_number().unwrap_or(0.0);
        let text_height = cursor.try_next_number().unwrap_or_else(|| {
            diagnostics.push(Diagnostic::warning(
                "MARK_TEXT_HEIGHT_MISSING",
                "SI: text height field missing, defaulting to 0",
            ));
            0.0
        });

        // An optional rotation angle can sit between textHeight and the
        // text itself; claim it only when the next token is numeric so a
        // text that happens to start with a digit (e.g. "10rM1002", spec.md
        // §9 OQ-1) isn't mistaken for it.
        let angle = cursor.try_next_number();

        // Whatever remains is the marking text. DSTV has no quoting
        // convention for embedded whitespace, so the lexer's whitespace
        // splitting is lossy whenever the text itself contained more than
        // one run of non-space characters (spec.md §9 OQ-1): rejoining
        // tokens with a single space is a best-effort reconstruction, not a
        // guaranteed round trip.
        let remaining_tokens = cursor.remaining();
        let text_parts: Vec<String> = std::iter::from_fn(|| cursor.next_string()).collect();
        let text = text_parts.join(" ");
        let text_reconstruction_uncertain = remaining_tokens > 1;

        if text.is_empty() {
            diagnostics.push(Diagnostic::warning("MARK_TEXT_EMPTY", "SI: marking text is empty"));
        }

        let data = SiData {
            face,
            x,
            y,
            z,
            text_height,
            angle,
            text,
            text_reconstruction_uncertain,
        };

        (ParsedBlockData::Si(data), diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn parses_single_word_text() {
        let src = "SI\nv 100.00 50.00 0.00 5.00 MARK1\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let si = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Si(d) => Some(d.clone()),
            _ => None,
        });
        let si = si.expect("SI parsed");
        assert_eq!(si.text, "MARK1");
        assert!(!si.text_reconstruction_uncertain);
    }

    #[test]
    fn parses_fused_face_and_x() {
        let src = "SI\nv100.00 50.00 0.00 5.00 MARK1\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let si = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Si(d) => Some(d.clone()),
            _ => None,
        });
        let si = si.expect("SI parsed");
        assert_eq!(si.x, 100.0);
        assert_eq!(si.text, "MARK1");
    }

    #[test]
    fn parses_optional_angle_between_text_height_and_text() {
        let src = "SI\nv 100.00 50.00 0.00 5.00 45.00 MARK1\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let si = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Si(d) => Some(d.clone()),
            _ => None,
        });
        let si = si.expect("SI parsed");
        assert_eq!(si.angle, Some(45.0));
        assert_eq!(si.text, "MARK1");
    }

    #[test]
    fn flags_multi_token_text_as_uncertain() {
        let src = "SI\nv 100.00 50.00 0.00 5.00 HELLO WORLD\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let si = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Si(d) => Some(d.clone()),
            _ => None,
        });
        let si = si.expect("SI parsed");
        assert_eq!(si.text, "HELLO WORLD");
        assert!(si.text_reconstruction_uncertain);
    }
}
