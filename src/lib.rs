//! DSTV NC-1 (7th edition) import pipeline: turns a raw DSTV byte buffer
//! into a normalized, machine-agnostic steel-fabrication scene description.
//!
//! The crate is organized as five stages wired onto a generic pipeline
//! runtime (see [`pipeline`]):
//!
//! ```text
//! bytes --lex--> tokens --parse--> blocks --validate--> validated --normalize--> profile
//! ```
//!
//! [`run`] is the single entry point most callers need; the stage modules
//! ([`lexer`], [`parser`], [`validate`], [`normalize`]) are public so a
//! caller can drive the pipeline manually (e.g. to inspect intermediate
//! diagnostics, or to assemble a custom [`pipeline::Pipeline`] with
//! different middleware).

pub mod config;
pub mod coordinate;
pub mod errors;
pub mod lexer;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod validate;

pub use config::PipelineConfig;
pub use errors::{ErrorCode, PipelineError, StageError};
pub use model::{Diagnostic, NormalizedProfile, Severity};

use pipeline::{build_dstv_pipeline, PipelineContext, PipelineValue};

/// Result of a successful [`run`]: the normalized profile plus every
/// diagnostic raised by any stage along the way, in stage order.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub profile: NormalizedProfile,
    pub diagnostics: Vec<Diagnostic>,
    pub conformity_score: f64,
}

/// Run the full DSTV import pipeline over a raw byte buffer.
///
/// Convenience wrapper around [`pipeline::build_dstv_pipeline`] +
/// [`pipeline::Pipeline::execute`] for callers who don't need a custom
/// middleware stack or manual cancellation; `abort()` on the pipeline
/// itself is the way to cancel an in-flight run from another thread, which
/// this single-call wrapper cannot expose.
pub fn run(bytes: &[u8], config: &PipelineConfig) -> Result<PipelineOutcome, PipelineError> {
    let mut pipeline = build_dstv_pipeline(config);
    let (output, ctx) = pipeline.execute(PipelineValue::Bytes(bytes.to_vec()))?;

    let PipelineValue::Profile(profile) = output else {
        return Err(PipelineError {
            stage: "normalize".to_string(),
            cause: StageError::internal("pipeline completed without producing a profile"),
            diagnostics: ctx.diagnostics,
        });
    };

    let conformity_score = conformity_score_of(&ctx);
    Ok(PipelineOutcome {
        profile,
        diagnostics: ctx.diagnostics,
        conformity_score,
    })
}

fn conformity_score_of(ctx: &PipelineContext) -> f64 {
    ctx.shared_data
        .get("conformityScore")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n\
AK\nv 0.00 0.00\nv 1000.00 0.00\nv 1000.00 200.00\nv 0.00 200.00\nv 0.00 0.00\n\
BO\nv 500.00 100.00 0.00 20.00\nEN\n";

    #[test]
    fn run_produces_a_profile_with_features_and_a_conformity_score() {
        let config = PipelineConfig::default();
        let outcome = run(SAMPLE.as_bytes(), &config).expect("well-formed input succeeds");
        assert!(!outcome.profile.features.is_empty());
        assert!(outcome.conformity_score > 0.0);
    }

    #[test]
    fn invalid_utf8_is_an_io_stage_error() {
        let config = PipelineConfig::default();
        let bytes = vec![0xFF, 0xFE, 0xFD];
        let err = run(&bytes, &config).expect_err("non-utf8 input must fail");
        assert_eq!(err.stage, "lex");
    }

    #[test]
    fn empty_input_fails_with_no_st_block() {
        let config = PipelineConfig::default();
        let err = run(b"", &config).expect_err("empty input has no ST block");
        assert_eq!(err.cause.code, "NO_ST_BLOCK");
    }
}
