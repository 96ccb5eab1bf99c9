//! Shared diagnostic vocabulary used by the parser, validator and normalizer.

use serde::{Deserialize, Serialize};

/// Severity of a recorded diagnostic. See spec.md §7 for the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// A single diagnostic: a namespaced `code` (`PROF_*`, `HOLE_*`, `CONT_*`,
/// `COORD_*`, `GLOBAL_*`, ...), a human-readable `message`, and an optional
/// reference to the block it originated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_ref: Option<BlockRef>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            code: code.into(),
            message: message.into(),
            block_ref: None,
        }
    }

    pub fn with_block(mut self, block_ref: BlockRef) -> Self {
        self.block_ref = Some(block_ref);
        self
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn critical(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, code, message)
    }

    /// Per-block score contribution of this diagnostic (see spec.md §4.4
    /// scoring rule). `Critical` is handled separately by the caller because
    /// it forces the whole block's score to zero rather than subtracting.
    pub fn score_delta(&self) -> f64 {
        match self.severity {
            Severity::Critical => 0.0,
            Severity::Error => -0.2,
            Severity::Warning => -0.05,
            Severity::Info => 0.0,
        }
    }
}

/// A lightweight pointer back to the block a diagnostic concerns, identified
/// by its block type tag and the source line its header started on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRef {
    pub block_type: String,
    pub start_line: usize,
}
