//! Error and diagnostic types for the DSTV import pipeline.
//!
//! Diagnostics (recoverable, see [`crate::model::Severity`]) flow through the
//! pipeline context. Hard failures flow through this module's
//! [`PipelineError`], which a stage returns when it cannot produce usable
//! output at all (I/O failure, unparseable bytes, a strict-mode conformance
//! violation, cancellation, or timeout).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, namespaced error codes for hard pipeline failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    #[serde(rename = "IO_ERROR")]
    Io,
    #[serde(rename = "INVALID_UTF8")]
    InvalidUtf8,
    #[serde(rename = "NO_ST_BLOCK")]
    NoStBlock,
    #[serde(rename = "UNEXPECTED_TOKEN")]
    UnexpectedToken,
    #[serde(rename = "STRICT_MODE_VIOLATION")]
    StrictModeViolation,
    #[serde(rename = "STAGE_TIMEOUT")]
    StageTimeout,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Io => "IO_ERROR",
            ErrorCode::InvalidUtf8 => "INVALID_UTF8",
            ErrorCode::NoStBlock => "NO_ST_BLOCK",
            ErrorCode::UnexpectedToken => "UNEXPECTED_TOKEN",
            ErrorCode::StrictModeViolation => "STRICT_MODE_VIOLATION",
            ErrorCode::StageTimeout => "STAGE_TIMEOUT",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::Internal => "INTERNAL_ERROR",
        };
        write!(f, "{s}")
    }
}

/// Error raised by a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StageError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        StageError {
            code: code.to_string(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for StageError {}

impl StageError {
    pub fn io(msg: impl Into<String>) -> Self {
        StageError::new(ErrorCode::Io, msg)
    }

    pub fn invalid_utf8(msg: impl Into<String>) -> Self {
        StageError::new(ErrorCode::InvalidUtf8, msg)
    }

    pub fn no_st_block() -> Self {
        StageError::new(ErrorCode::NoStBlock, "no ST block found in input")
            .with_hint("every DSTV file must start with exactly one ST block")
    }

    pub fn strict_mode_violation(msg: impl Into<String>) -> Self {
        StageError::new(ErrorCode::StrictModeViolation, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        StageError::new(ErrorCode::Internal, msg)
    }
}

/// Top-level error returned by [`crate::pipeline::Pipeline::execute`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineError {
    pub stage: String,
    pub cause: StageError,
    pub diagnostics: Vec<crate::model::Diagnostic>,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline failed in stage '{}': {}", self.stage, self.cause)
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    pub fn timeout(stage: impl Into<String>, diagnostics: Vec<crate::model::Diagnostic>) -> Self {
        PipelineError {
            stage: stage.into(),
            cause: StageError::new(ErrorCode::StageTimeout, "stage exceeded its time budget"),
            diagnostics,
        }
    }

    pub fn cancelled(stage: impl Into<String>, diagnostics: Vec<crate::model::Diagnostic>) -> Self {
        PipelineError {
            stage: stage.into(),
            cause: StageError::new(ErrorCode::Cancelled, "pipeline execution was aborted"),
            diagnostics,
        }
    }
}

pub type StageResult<T> = Result<T, StageError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
