//! ST — piece header (spec.md §4.3).

use super::super::fields::parse_number;
use super::super::BlockParseContext;
use crate::model::{Diagnostic, ParsedBlockData, ProfileTypeCode, StData};

pub struct StParser;

impl super::super::BlockParser for StParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let text = |idx: usize| ctx.line_text(idx);

        let order_number = text(0);
        let drawing_number = text(1);
        let phase_number = text(2);
        let piece_number = text(3);
        let steel_grade = text(4);

        let quantity = parse_number(&text(5)).map(|v| v as i64).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::error(
                "PROF_QUANTITY",
                format!("ST: quantity field '{}' is not a valid integer", text(5)),
            ));
            0
        });

        // profileName may span several lines; reassemble until a line that
        // is itself exactly one valid profile-type-code letter.
        let mut profile_name_parts = Vec::new();
        let mut profile_type_code = None;
        let mut cursor = 6usize;
        while cursor < ctx.lines.len() {
            let line = text(cursor);
            let trimmed = line.trim();
            if trimmed.len() == 1 {
                if let Some(code) = ProfileTypeCode::from_letter(trimmed.chars().next().unwrap()) {
                    profile_type_code = Some(code);
                    cursor += 1;
                    break;
                }
            }
            if !trimmed.is_empty() {
                profile_name_parts.push(trimmed.to_string());
            }
            cursor += 1;
        }
        let profile_name = profile_name_parts.join("");

        if profile_type_code.is_none() {
            diagnostics.push(Diagnostic::warning(
                "PROF_TYPE_CODE_MISSING",
                "ST: no one-letter profile-type code found; normalizer will fall back to pattern-matching on profileName",
            ));
        }

        let mut geometric_fields = Vec::new();
        for idx in cursor..ctx.lines.len() {
            let line = text(idx);
            if line.trim().is_empty() {
                continue;
            }
            match parse_number(line.trim()) {
                Some(v) => geometric_fields.push(v),
                None => diagnostics.push(Diagnostic::critical(
                    "DIM_NON_NUMERIC",
                    format!("ST: expected numeric geometric field, got '{line}'"),
                )),
            }
        }

        if order_number.is_empty() || drawing_number.is_empty() || piece_number.is_empty() {
            diagnostics.push(Diagnostic::error(
                "PROF_REQUIRED_FIELD",
                "ST: one or more required text fields (orderNumber/drawingNumber/pieceNumber) are empty",
            ));
        }

        let data = StData {
            order_number,
            drawing_number,
            phase_number,
            piece_number,
            steel_grade,
            quantity,
            profile_name,
            profile_type_code,
            geometric_fields,
        };

        (ParsedBlockData::St(data), diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn parses_ipe200_header() {
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let st = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::St(d) => Some(d.clone()),
            _ => None,
        });
        let st = st.expect("ST block parsed");
        assert_eq!(st.order_number, "ORD1");
        assert_eq!(st.piece_number, "M1");
        assert_eq!(st.steel_grade, "S235");
        assert_eq!(st.quantity, 1);
        assert_eq!(st.profile_name, "IPE200");
        assert_eq!(st.geometric_fields, vec![1000.00, 200.00, 100.00, 5.60, 8.50, 12.00]);
    }
}
