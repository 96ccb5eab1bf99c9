//! Per-execution [`PipelineContext`] (spec.md §4.1, §9 "Shared-context
//! state"): diagnostics, metrics, the shared-data map, progress, and the
//! one-shot cancellation flag. Owned for the lifetime of one
//! `Pipeline::execute` call.

use crate::model::{Diagnostic, SharedData};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Per-stage timing and outcome, recorded for `PipelineContext::metrics`.
#[derive(Debug, Clone)]
pub struct StageMetric {
    pub stage_name: String,
    pub duration: Duration,
    pub success: bool,
    pub attempts: u32,
}

/// Metrics accumulated across one pipeline execution (spec.md §4.1
/// "Metrics recorded").
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    pub stages: Vec<StageMetric>,
    pub total_duration: Duration,
}

/// A cloneable cancellation handle, so `Pipeline::abort()` can be called
/// from outside the execution that owns the `PipelineContext`.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Shared execution state threaded through every stage and middleware call
/// (spec.md §9: "Use a per-pipeline context object for diagnostics,
/// metrics, shared-data map, progress, and cancellation flag. Prefer
/// explicit threading over globals.").
pub struct PipelineContext {
    pub diagnostics: Vec<Diagnostic>,
    pub metrics: PipelineMetrics,
    pub shared_data: SharedData,
    pub progress: f64,
    cancellation: CancellationToken,
}

impl PipelineContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        PipelineContext {
            diagnostics: Vec::new(),
            metrics: PipelineMetrics::default(),
            shared_data: SharedData::new(),
            progress: 0.0,
            cancellation,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn record_diagnostics(&mut self, mut diagnostics: Vec<Diagnostic>) {
        self.diagnostics.append(&mut diagnostics);
    }
}
