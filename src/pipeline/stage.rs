//! Stage contract (spec.md §4.1, §9 "Polymorphism over capabilities").
//!
//! A real `Stage<In, Out>` generic trait can't be made into trait objects
//! once `In`/`Out` differ per stage in a heterogeneous chain, so this
//! runtime's currency between stages is [`PipelineValue`] — a closed,
//! tagged union over the five shapes this crate's stages actually produce
//! (spec.md §9 "Tagged-variant discipline" applied to the pipeline's own
//! plumbing, not just the DSTV data model). Each concrete `Stage`
//! implementation still only reads/writes the one or two variants it
//! cares about; the enum exists so `Pipeline` can hold `Vec<Box<dyn
//! Stage>>` at all.

use super::context::PipelineContext;
use crate::errors::StageError;
use crate::model::{NormalizedProfile, ParsedBlock, Token, ValidationResult};

/// The value flowing between pipeline stages.
#[derive(Clone)]
pub enum PipelineValue {
    Bytes(Vec<u8>),
    Tokens(Vec<Token>),
    Blocks(Vec<ParsedBlock>),
    Validated(ValidationResult),
    Profile(NormalizedProfile),
}

impl PipelineValue {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineValue::Bytes(_) => "bytes",
            PipelineValue::Tokens(_) => "tokens",
            PipelineValue::Blocks(_) => "blocks",
            PipelineValue::Validated(_) => "validated",
            PipelineValue::Profile(_) => "profile",
        }
    }
}

/// Uniform contract every pipeline stage implements (spec.md §4.1: `{
/// name, description?, estimatedDurationMs?, validate?(input),
/// onStart?(ctx), process(input, ctx) -> output, onComplete?(out, ctx),
/// onError?(err, ctx) }`). Every hook except `process` has a default no-op
/// implementation, so a stage only overrides the ones it needs.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn estimated_duration_ms(&self) -> Option<u64> {
        None
    }

    /// Pre-flight check, run before `process`; a stage with no useful
    /// precondition leaves this as the default no-op pass.
    fn validate(&self, _input: &PipelineValue) -> Result<(), StageError> {
        Ok(())
    }

    fn on_start(&self, _ctx: &mut PipelineContext) {}

    fn process(&self, input: PipelineValue, ctx: &mut PipelineContext) -> Result<PipelineValue, StageError>;

    fn on_complete(&self, _output: &PipelineValue, _ctx: &mut PipelineContext) {}

    fn on_error(&self, _err: &StageError, _ctx: &mut PipelineContext) {}
}
