//! Output of the semantic validator (C4), spec.md §3/§4.4.

use super::diagnostic::Diagnostic;
use super::parsed_block::ParsedBlock;
use serde::{Deserialize, Serialize};

/// Result of running the three-pass semantic validator over a parsed block
/// list: the surviving blocks, the ordered diagnostic list, and the overall
/// conformity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid_blocks: Vec<ParsedBlock>,
    pub diagnostics: Vec<Diagnostic>,
    pub conformity_score: f64,
}

impl ValidationResult {
    pub fn new(valid_blocks: Vec<ParsedBlock>, diagnostics: Vec<Diagnostic>, conformity_score: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&conformity_score));
        ValidationResult {
            valid_blocks,
            diagnostics,
            conformity_score,
        }
    }
}
