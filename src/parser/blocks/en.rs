//! EN — end marker (spec.md §4.3). Carries at most an optional processing
//! time and checksum; most files leave both fields blank.

use super::super::fields::FieldCursor;
use super::super::BlockParseContext;
use crate::model::{Diagnostic, EnData, ParsedBlockData};

pub struct EnParser;

impl super::super::BlockParser for EnParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
        let flat = ctx.flat();
        let mut cursor = FieldCursor::new(&flat);

        let processing_time = cursor.try_next_number();
        let checksum = cursor.next_string();

        let data = EnData {
            processing_time,
            checksum,
        };

        (ParsedBlockData::En(data), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn parses_bare_end_marker() {
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let en = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::En(d) => Some(d.clone()),
            _ => None,
        });
        let en = en.expect("EN parsed");
        assert_eq!(en.processing_time, None);
    }
}
