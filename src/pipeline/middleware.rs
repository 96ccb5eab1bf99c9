//! Middleware contract (spec.md §4.1): hooks that wrap the whole execution
//! and each individual stage, run in descending `priority` order.

use super::context::PipelineContext;
use super::stage::Stage;
use crate::errors::StageError;

pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first. Ties break by registration order (stable sort).
    fn priority(&self) -> i32 {
        0
    }

    fn before(&self, _ctx: &mut PipelineContext) {}
    fn after(&self, _ctx: &mut PipelineContext) {}
    fn on_error(&self, _err: &StageError, _ctx: &mut PipelineContext) {}
    fn on_stage_start(&self, _stage: &dyn Stage, _ctx: &mut PipelineContext) {}
    fn on_stage_complete(&self, _stage: &dyn Stage, _ctx: &mut PipelineContext) {}
}

/// Ambient logging middleware (SPEC_FULL.md §7 "Ambient logging"):
/// `tracing` spans per stage, matching how `freddiehaddad-oxidized` and
/// `logannye-tinyzkp` instrument their own pipelines. Emits no output on
/// its own — a `tracing_subscriber` installed by the embedding binary
/// decides whether/where these spans go.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn name(&self) -> &str {
        "tracing"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn before(&self, _ctx: &mut PipelineContext) {
        tracing::debug!("pipeline execution starting");
    }

    fn after(&self, ctx: &mut PipelineContext) {
        tracing::debug!(
            total_ms = ctx.metrics.total_duration.as_millis() as u64,
            stages = ctx.metrics.stages.len(),
            "pipeline execution finished"
        );
    }

    fn on_error(&self, err: &StageError, _ctx: &mut PipelineContext) {
        tracing::error!(code = %err.code, message = %err.message, "stage failed");
    }

    fn on_stage_start(&self, stage: &dyn Stage, _ctx: &mut PipelineContext) {
        tracing::debug!(stage = stage.name(), "stage starting");
    }

    fn on_stage_complete(&self, stage: &dyn Stage, ctx: &mut PipelineContext) {
        let warnings = ctx
            .diagnostics
            .iter()
            .filter(|d| d.severity == crate::model::Severity::Warning)
            .count();
        tracing::debug!(stage = stage.name(), warnings, "stage complete");
    }
}
