//! C1 — the generic pipeline runtime (spec.md §4.1) plus the four concrete
//! stages it drives for a DSTV import: lex, parse, validate, normalize.

mod builder;
mod context;
mod middleware;
mod stage;

pub use builder::{Pipeline, PipelineBuilder};
pub use context::{CancellationToken, PipelineContext, PipelineMetrics, StageMetric};
pub use middleware::{Middleware, TracingMiddleware};
pub use stage::{PipelineValue, Stage};

use crate::config::PipelineConfig;
use crate::errors::StageError;
use crate::model::Diagnostic;

/// C2 wrapped as a [`Stage`]: `Bytes -> Tokens`.
pub struct LexStage {
    max_file_size_bytes: u64,
}

impl LexStage {
    pub fn new(config: &PipelineConfig) -> Self {
        LexStage { max_file_size_bytes: config.max_file_size_bytes }
    }
}

impl Stage for LexStage {
    fn name(&self) -> &str {
        "lex"
    }

    fn validate(&self, input: &PipelineValue) -> Result<(), StageError> {
        match input {
            PipelineValue::Bytes(bytes) => {
                if bytes.len() as u64 > self.max_file_size_bytes {
                    return Err(StageError::io(format!(
                        "input is {} bytes, exceeds the configured maximum of {}",
                        bytes.len(),
                        self.max_file_size_bytes
                    )));
                }
                Ok(())
            }
            other => Err(StageError::internal(format!("lex stage expects Bytes, got {}", other.kind()))),
        }
    }

    fn process(&self, input: PipelineValue, ctx: &mut PipelineContext) -> Result<PipelineValue, StageError> {
        let PipelineValue::Bytes(bytes) = input else {
            return Err(StageError::internal("lex stage expects Bytes"));
        };
        let source = std::str::from_utf8(&bytes).map_err(|e| StageError::invalid_utf8(e.to_string()))?;
        let output = crate::lexer::lex(source);
        ctx.record_diagnostics(output.diagnostics);
        Ok(PipelineValue::Tokens(output.tokens))
    }
}

/// C3 wrapped as a [`Stage`]: `Tokens -> Blocks`.
pub struct ParseStage {
    support_all_blocks: bool,
}

impl ParseStage {
    pub fn new(config: &PipelineConfig) -> Self {
        ParseStage { support_all_blocks: config.support_all_blocks }
    }
}

impl Stage for ParseStage {
    fn name(&self) -> &str {
        "parse"
    }

    fn process(&self, input: PipelineValue, ctx: &mut PipelineContext) -> Result<PipelineValue, StageError> {
        let PipelineValue::Tokens(tokens) = input else {
            return Err(StageError::internal("parse stage expects Tokens"));
        };
        let output = crate::parser::parse(&tokens, self.support_all_blocks);
        ctx.record_diagnostics(output.diagnostics);
        Ok(PipelineValue::Blocks(output.blocks))
    }
}

/// C4 wrapped as a [`Stage`]: `Blocks -> Validated`.
pub struct ValidateStage {
    config: PipelineConfig,
}

impl ValidateStage {
    pub fn new(config: PipelineConfig) -> Self {
        ValidateStage { config }
    }
}

impl Stage for ValidateStage {
    fn name(&self) -> &str {
        "validate"
    }

    fn process(&self, input: PipelineValue, ctx: &mut PipelineContext) -> Result<PipelineValue, StageError> {
        let PipelineValue::Blocks(blocks) = input else {
            return Err(StageError::internal("validate stage expects Blocks"));
        };
        let result = crate::validate::validate(blocks, &self.config);

        if self.config.strict_mode {
            if let Some(d) = result.diagnostics.iter().find(|d| d.severity == crate::model::Severity::Error) {
                return Err(StageError::strict_mode_violation(format!("{}: {}", d.code, d.message)));
            }
        }

        ctx.record_diagnostics(result.diagnostics.clone());
        Ok(PipelineValue::Validated(result))
    }

    fn on_complete(&self, output: &PipelineValue, ctx: &mut PipelineContext) {
        if let PipelineValue::Validated(result) = output {
            ctx.shared_data.insert(
                "conformityScore".into(),
                serde_json::Value::from(result.conformity_score),
            );
        }
    }
}

/// C5 wrapped as a [`Stage`]: `Validated -> Profile`.
pub struct NormalizeStage {
    config: PipelineConfig,
}

impl NormalizeStage {
    pub fn new(config: PipelineConfig) -> Self {
        NormalizeStage { config }
    }
}

impl Stage for NormalizeStage {
    fn name(&self) -> &str {
        "normalize"
    }

    fn process(&self, input: PipelineValue, ctx: &mut PipelineContext) -> Result<PipelineValue, StageError> {
        let PipelineValue::Validated(validation) = input else {
            return Err(StageError::internal("normalize stage expects Validated"));
        };
        let (profile, diagnostics) = crate::normalize::normalize(&validation, &self.config)?;
        ctx.record_diagnostics(diagnostics);
        Ok(PipelineValue::Profile(profile))
    }
}

/// Assembles the standard four-stage DSTV import pipeline (lex -> parse ->
/// validate -> normalize) with tracing middleware installed, matching
/// spec.md §4.1's reference wiring.
pub fn build_dstv_pipeline(config: &PipelineConfig) -> Pipeline {
    PipelineBuilder::new("dstv-import")
        .with_stage_timeout(std::time::Duration::from_millis(config.stage_timeout_ms))
        .use_middleware(Box::new(TracingMiddleware))
        .add_stage(Box::new(LexStage::new(config)))
        .add_stage(Box::new(ParseStage::new(config)))
        .add_stage(Box::new(ValidateStage::new(config.clone())))
        .add_stage(Box::new(NormalizeStage::new(config.clone())))
        .build()
}

/// Diagnostics collected from a run, independent of success/failure, so
/// callers can inspect warnings even when the pipeline ultimately erred.
pub fn diagnostics_of(ctx: &PipelineContext) -> &[Diagnostic] {
    &ctx.diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\nEN\n";

    #[test]
    fn full_pipeline_produces_a_profile() {
        let config = PipelineConfig::default();
        let mut pipeline = build_dstv_pipeline(&config);
        let (output, _ctx) = pipeline
            .execute(PipelineValue::Bytes(SAMPLE.as_bytes().to_vec()))
            .expect("pipeline succeeds on a well-formed file");
        assert!(matches!(output, PipelineValue::Profile(_)));
    }

    #[test]
    fn oversized_input_is_rejected_before_lexing() {
        let mut config = PipelineConfig::default();
        config.max_file_size_bytes = 4;
        let mut pipeline = build_dstv_pipeline(&config);
        let result = pipeline.execute(PipelineValue::Bytes(SAMPLE.as_bytes().to_vec()));
        assert!(result.is_err());
    }

    #[test]
    fn missing_st_block_fails_at_normalize() {
        let config = PipelineConfig::default();
        let mut pipeline = build_dstv_pipeline(&config);
        let result = pipeline.execute(PipelineValue::Bytes(b"EN\n".to_vec()));
        let err = result.expect_err("no ST block must fail the pipeline");
        assert_eq!(err.stage, "normalize");
    }

    #[test]
    fn strict_mode_rejects_a_missing_en_block() {
        let mut config = PipelineConfig::default();
        config.strict_mode = true;
        let mut pipeline = build_dstv_pipeline(&config);
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n";
        let result = pipeline.execute(PipelineValue::Bytes(src.as_bytes().to_vec()));
        assert!(result.is_err());
    }
}
