//! C3 — token stream to ordered [`ParsedBlock`] list (spec.md §4.3).
//!
//! Iterates the token stream; on a `BlockHeader` token, buffers all
//! significant tokens (grouped by source line, so an empty line survives as
//! an empty field rather than silently shifting later fields) until the next
//! header or `Eof`, then dispatches to the block-type-specific parser
//! registered for that header code (spec.md §9 "Polymorphism over
//! capabilities": a factory keyed by header code, each parser implementing
//! a uniform contract).

mod blocks;
pub(crate) mod fields;

use crate::model::{BlockSpan, BlockType, Diagnostic, ParsedBlock, ParsedBlockData, Token, TokenKind};
use std::collections::HashMap;

/// Uniform contract every per-block-type parser implements.
pub trait BlockParser {
    fn parse(&self, ctx: &BlockParseContext) -> (ParsedBlockData, Vec<Diagnostic>);
}

/// Input handed to a [`BlockParser`]: the block's significant tokens grouped
/// by physical source line (the header's own line is excluded).
pub struct BlockParseContext<'a> {
    pub lines: Vec<Vec<&'a Token>>,
    pub raw_fields: Vec<String>,
}

impl<'a> BlockParseContext<'a> {
    /// All significant tokens of this block, owned and in source order,
    /// ignoring line boundaries — for blocks like BO/AK/IK whose records
    /// pack several fields onto one physical line.
    pub fn flat(&self) -> Vec<Token> {
        self.lines.iter().flatten().map(|t| (*t).clone()).collect()
    }

    pub fn line(&self, idx: usize) -> &[&'a Token] {
        self.lines.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn line_text(&self, idx: usize) -> String {
        self.line(idx)
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Registry of block-type parsers, keyed by two-letter header code.
pub struct BlockParserRegistry {
    parsers: HashMap<String, Box<dyn BlockParser>>,
}

impl BlockParserRegistry {
    pub fn new() -> Self {
        let mut parsers: HashMap<String, Box<dyn BlockParser>> = HashMap::new();
        parsers.insert("ST".into(), Box::new(blocks::st::StParser));
        parsers.insert("EN".into(), Box::new(blocks::en::EnParser));
        parsers.insert("BO".into(), Box::new(blocks::bo::BoParser));
        parsers.insert("AK".into(), Box::new(blocks::contour::AkParser));
        parsers.insert("IK".into(), Box::new(blocks::contour::IkParser));
        parsers.insert("SI".into(), Box::new(blocks::si::SiParser));
        parsers.insert("SC".into(), Box::new(blocks::sc::ScParser));
        parsers.insert("PU".into(), Box::new(blocks::pu::PuParser));
        parsers.insert("KO".into(), Box::new(blocks::ko::KoParser));
        BlockParserRegistry { parsers }
    }

    pub fn get(&self, code: &str) -> Option<&dyn BlockParser> {
        self.parsers.get(code).map(|b| b.as_ref())
    }
}

impl Default for BlockParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of the block parser stage.
pub struct ParseOutput {
    pub blocks: Vec<ParsedBlock>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a full token stream into an ordered [`ParsedBlock`] list.
///
/// `support_all_blocks`: when `false`, only `{ST, EN, BO, AK, IK, SI, SC}`
/// are accepted; other header codes are skipped with a warning (spec.md
/// §6 `supportAllBlocks`).
pub fn parse(tokens: &[Token], support_all_blocks: bool) -> ParseOutput {
    let registry = BlockParserRegistry::new();
    let mut blocks = Vec::new();
    let mut diagnostics = Vec::new();

    let mut i = 0usize;
    while i < tokens.len() {
        let tok = &tokens[i];
        if tok.kind == TokenKind::Eof {
            break;
        }
        if tok.kind != TokenKind::BlockHeader {
            // Stray significant token outside any block: ignore silently,
            // matching the "iterate tokens ... on a BlockHeader token"
            // algorithm, which has no defined behavior for leading noise.
            i += 1;
            continue;
        }

        let header_line = tok.line;
        let block_type = BlockType::from_header(&tok.lexeme);
        let start_token_idx = i;
        i += 1;

        // Buffer significant tokens grouped by physical source line, so a
        // blank line survives as an empty field instead of shifting every
        // field after it (e.g. ST's optional phaseNumber, spec.md §4.3).
        let mut lines: Vec<Vec<&Token>> = Vec::new();
        let mut current_line: Vec<&Token> = Vec::new();
        let mut seen_header_newline = false;
        while i < tokens.len() {
            let t = &tokens[i];
            if t.kind == TokenKind::BlockHeader || t.kind == TokenKind::Eof {
                break;
            }
            if t.kind == TokenKind::Newline {
                if !seen_header_newline && current_line.is_empty() && lines.is_empty() {
                    seen_header_newline = true;
                } else {
                    lines.push(std::mem::take(&mut current_line));
                }
                i += 1;
                continue;
            }
            if t.is_significant() {
                current_line.push(t);
            }
            i += 1;
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }

        let end_token_idx = i.saturating_sub(1);
        let raw_fields: Vec<String> = lines
            .iter()
            .flat_map(|l| l.iter().map(|t| t.lexeme.clone()))
            .collect();

        let Some(block_type) = block_type else {
            diagnostics.push(Diagnostic::warning(
                "GLOBAL_UNKNOWN_BLOCK",
                format!("unrecognized block header '{}' at line {header_line}", tok.lexeme),
            ));
            continue;
        };

        if !support_all_blocks && !block_type.is_basic() {
            diagnostics.push(Diagnostic::warning(
                "GLOBAL_BLOCK_NOT_SUPPORTED",
                format!(
                    "block '{}' at line {header_line} skipped: supportAllBlocks is disabled",
                    block_type.code()
                ),
            ));
            continue;
        }

        let ctx = BlockParseContext { lines, raw_fields: raw_fields.clone() };
        let code = block_type.code();
        let (data, local_diagnostics) = match registry.get(&code) {
            Some(parser) => parser.parse(&ctx),
            None => blocks::generic::parse_generic(&block_type, &ctx),
        };

        blocks.push(ParsedBlock {
            block_type,
            data,
            raw_fields,
            span: BlockSpan {
                start_token_idx,
                end_token_idx,
                start_line: header_line,
            },
            local_diagnostics,
        });
    }

    ParseOutput { blocks, diagnostics }
}
