//! Fallback for block types this crate does not interpret: TO, UE, PR, KA,
//! BR, VO, NU, FP, LP, RT, work-planes, and the rest of the extended set
//! (spec.md §4.3 "Unimplemented parsers fall back to a generic record").
//! Raw fields are preserved verbatim so nothing is silently dropped.

use super::super::BlockParseContext;
use crate::model::{BlockType, Diagnostic, GenericData, ParsedBlockData};

pub fn parse_generic(block_type: &BlockType, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>) {
    let data = GenericData {
        block_type: block_type.code(),
        raw_fields: ctx.raw_fields.clone(),
        parsed: false,
    };
    let diagnostics = vec![Diagnostic::info(
        "GLOBAL_GENERIC_BLOCK",
        format!("block '{}' captured as a raw record; semantics not interpreted", block_type.code()),
    )];
    (ParsedBlockData::Generic(data), diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    #[test]
    fn captures_unimplemented_block_raw() {
        let src = "TO\nsome\nfields\nEN\n";
        let out = lex(src);
        let parsed = parse(&out.tokens, true);
        let generic = parsed.blocks.iter().find_map(|b| match &b.data {
            ParsedBlockData::Generic(d) => Some(d.clone()),
            _ => None,
        });
        let generic = generic.expect("TO captured generically");
        assert_eq!(generic.block_type, "TO");
        assert_eq!(generic.raw_fields, vec!["some".to_string(), "fields".to_string()]);
    }
}
