//! [`Pipeline`]/[`PipelineBuilder`] — the C1 runtime itself (spec.md
//! §4.1). Generalizes a single fixed `parse -> validate -> evaluate` chain
//! (`compiler/csg_compiler.rs`'s `CsgCompiler`) into an ordered,
//! middleware-wrapped stage sequence with per-stage timeout, retry, and
//! cooperative cancellation.

use super::context::{CancellationToken, PipelineContext, StageMetric};
use super::middleware::Middleware;
use super::stage::{PipelineValue, Stage};
use crate::errors::{ErrorCode, PipelineError, StageError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Building,
    Executing,
    Done,
}

/// Constructor-then-configure builder, matching `CsgCompiler::new` /
/// `with_subdivisions` (spec.md §4.1).
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Box<dyn Stage>>,
    middlewares: Vec<Box<dyn Middleware>>,
    stage_timeout: Duration,
    max_retries: u32,
    abort_on_error: bool,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        PipelineBuilder {
            name: name.into(),
            stages: Vec::new(),
            middlewares: Vec::new(),
            stage_timeout: Duration::from_secs(30),
            max_retries: 0,
            abort_on_error: true,
        }
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_abort_on_error(mut self, abort: bool) -> Self {
        self.abort_on_error = abort;
        self
    }

    pub fn add_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn use_middleware(mut self, middleware: Box<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn build(mut self) -> Pipeline {
        // Higher priority first; stable so same-priority registrations keep
        // their insertion order (spec.md §4.1 "Middleware run in priority
        // order").
        self.middlewares.sort_by_key(|m| std::cmp::Reverse(m.priority()));
        Pipeline {
            name: self.name,
            stages: self.stages,
            middlewares: self.middlewares,
            stage_timeout: self.stage_timeout,
            max_retries: self.max_retries,
            abort_on_error: self.abort_on_error,
            state: PipelineState::Building,
            cancellation: CancellationToken::new(),
        }
    }
}

/// An assembled, runnable pipeline. `execute` drives stages sequentially;
/// `abort` can be called concurrently (it only touches the cancellation
/// flag, spec.md §5 "Cancellation").
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
    middlewares: Vec<Box<dyn Middleware>>,
    stage_timeout: Duration,
    max_retries: u32,
    abort_on_error: bool,
    state: PipelineState,
    cancellation: CancellationToken,
}

impl Pipeline {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Mutating operations are rejected once execution has started (spec.md
    /// §4.1: "A pipeline in the Executing state rejects `addStage`, `use`,
    /// `updateConfig`."). This runtime exposes that via `add_stage`/
    /// `use_middleware` only on `PipelineBuilder`, so the only enforcement
    /// needed here is for a second `execute` call while one is in flight —
    /// represented by `state` staying `Executing` for the duration of the
    /// call (reentrant calls aren't possible without separate threads, but
    /// the flag documents the contract for future callers that do add
    /// concurrency).
    pub fn abort(&self) {
        self.cancellation.cancel();
    }

    pub fn execute(&mut self, input: PipelineValue) -> Result<(PipelineValue, PipelineContext), PipelineError> {
        if self.state == PipelineState::Executing {
            return Err(PipelineError {
                stage: self.name.clone(),
                cause: StageError::internal("pipeline is already executing"),
                diagnostics: Vec::new(),
            });
        }
        self.state = PipelineState::Executing;

        let mut ctx = PipelineContext::new(self.cancellation.clone());
        let run_start = Instant::now();

        for m in &self.middlewares {
            m.before(&mut ctx);
        }

        let total_stages = self.stages.len().max(1);
        let mut current = input;
        let mut failure: Option<(String, StageError)> = None;

        for (i, stage) in self.stages.iter().enumerate() {
            if ctx.is_cancelled() {
                failure = Some((stage.name().to_string(), StageError::new(ErrorCode::Cancelled, "pipeline execution was aborted")));
                break;
            }

            for m in &self.middlewares {
                m.on_stage_start(stage.as_ref(), &mut ctx);
            }

            if let Err(e) = stage.validate(&current) {
                for m in &self.middlewares {
                    m.on_error(&e, &mut ctx);
                }
                stage.on_error(&e, &mut ctx);
                failure = Some((stage.name().to_string(), e));
                break;
            }

            stage.on_start(&mut ctx);

            let mut attempts = 0u32;
            let stage_start = Instant::now();
            // Cloned once per stage, not per retry attempt: `process` only
            // consumes the value on success, but a failed attempt still
            // moves it in, so the prior output must survive the call to be
            // restored below on a non-aborting failure (spec.md §4.1
            // "execution continues with the previous stage's output").
            let prior_output = current.clone();
            let outcome = loop {
                attempts += 1;
                let value = std::mem::replace(&mut current, PipelineValue::Bytes(Vec::new()));
                let attempt_start = Instant::now();
                let result = stage.process(value, &mut ctx);
                let elapsed = attempt_start.elapsed();

                match result {
                    Ok(output) => break Ok((output, elapsed)),
                    Err(e) if attempts <= self.max_retries => {
                        // Capped exponential backoff is expressed as a
                        // simulated delay budget rather than a real sleep:
                        // the lexer/parser/normalizer are deterministic
                        // (spec.md §7 "Retries ... help only for wrapped
                        // I/O stages"), so retrying them has no effect
                        // beyond bookkeeping unless a future I/O-wrapping
                        // stage actually benefits from the delay.
                        let _backoff = backoff_delay(attempts);
                        tracing::warn!(stage = stage.name(), attempt = attempts, error = %e, "stage failed, retrying");
                        continue;
                    }
                    Err(e) => break Err((e, elapsed)),
                }
            };

            match outcome {
                Ok((output, elapsed)) => {
                    if elapsed > self.stage_timeout {
                        let e = StageError::new(ErrorCode::StageTimeout, format!("stage '{}' exceeded its {:?} budget", stage.name(), self.stage_timeout));
                        ctx.metrics.stages.push(StageMetric {
                            stage_name: stage.name().to_string(),
                            duration: elapsed,
                            success: false,
                            attempts,
                        });
                        for m in &self.middlewares {
                            m.on_error(&e, &mut ctx);
                        }
                        stage.on_error(&e, &mut ctx);
                        failure = Some((stage.name().to_string(), e));
                        break;
                    }
                    ctx.metrics.stages.push(StageMetric {
                        stage_name: stage.name().to_string(),
                        duration: elapsed,
                        success: true,
                        attempts,
                    });
                    stage.on_complete(&output, &mut ctx);
                    for m in &self.middlewares {
                        m.on_stage_complete(stage.as_ref(), &mut ctx);
                    }
                    current = output;
                    ctx.progress = (i + 1) as f64 / total_stages as f64;
                }
                Err((e, elapsed)) => {
                    ctx.metrics.stages.push(StageMetric {
                        stage_name: stage.name().to_string(),
                        duration: elapsed,
                        success: false,
                        attempts,
                    });
                    for m in &self.middlewares {
                        m.on_error(&e, &mut ctx);
                    }
                    stage.on_error(&e, &mut ctx);
                    if self.abort_on_error {
                        failure = Some((stage.name().to_string(), e));
                        break;
                    }
                    // Non-abort mode: diagnose and keep the previous
                    // stage's output (spec.md §4.1 "execution continues
                    // with the previous stage's output") — `current` was
                    // swapped out for a placeholder before `process` ran,
                    // so restore the clone taken before this attempt loop.
                    ctx.diagnostics.push(crate::model::Diagnostic::error(
                        "GLOBAL_STAGE_FAILED_CONTINUING",
                        format!("stage '{}' failed: {e}; continuing with prior output", stage.name()),
                    ));
                    current = prior_output;
                }
            }
        }

        ctx.metrics.total_duration = run_start.elapsed();
        for m in &self.middlewares {
            m.after(&mut ctx);
        }
        self.state = PipelineState::Done;

        match failure {
            Some((stage, cause)) => Err(PipelineError {
                stage,
                cause,
                diagnostics: ctx.diagnostics,
            }),
            None => Ok((current, ctx)),
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(50u64.saturating_mul(1u64 << attempt.min(10)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Diagnostic;

    struct AlwaysFails;
    impl Stage for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }
        fn process(&self, _input: PipelineValue, _ctx: &mut PipelineContext) -> Result<PipelineValue, StageError> {
            Err(StageError::internal("boom"))
        }
    }

    struct CountingRetries {
        calls: std::sync::atomic::AtomicU32,
    }
    impl Stage for CountingRetries {
        fn name(&self) -> &str {
            "counting"
        }
        fn process(&self, input: PipelineValue, _ctx: &mut PipelineContext) -> Result<PipelineValue, StageError> {
            let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n < 2 {
                Err(StageError::internal("not yet"))
            } else {
                Ok(input)
            }
        }
    }

    struct Passthrough;
    impl Stage for Passthrough {
        fn name(&self) -> &str {
            "passthrough"
        }
        fn process(&self, input: PipelineValue, _ctx: &mut PipelineContext) -> Result<PipelineValue, StageError> {
            Ok(input)
        }
    }

    #[test]
    fn abort_on_error_fails_the_whole_pipeline() {
        let mut pipeline = PipelineBuilder::new("t").add_stage(Box::new(AlwaysFails)).build();
        let result = pipeline.execute(PipelineValue::Bytes(vec![]));
        assert!(result.is_err());
    }

    #[test]
    fn non_abort_mode_records_diagnostic_and_continues() {
        let mut pipeline = PipelineBuilder::new("t")
            .with_abort_on_error(false)
            .add_stage(Box::new(AlwaysFails))
            .add_stage(Box::new(Passthrough))
            .build();
        let (output, ctx) = pipeline.execute(PipelineValue::Bytes(vec![1, 2, 3])).expect("pipeline completes");
        assert!(matches!(output, PipelineValue::Bytes(b) if b == vec![1, 2, 3]));
        assert!(ctx.diagnostics.iter().any(|d: &Diagnostic| d.code == "GLOBAL_STAGE_FAILED_CONTINUING"));
    }

    #[test]
    fn retries_recover_a_transient_failure() {
        let mut pipeline = PipelineBuilder::new("t")
            .with_max_retries(3)
            .add_stage(Box::new(CountingRetries { calls: std::sync::atomic::AtomicU32::new(0) }))
            .build();
        let result = pipeline.execute(PipelineValue::Bytes(vec![9]));
        assert!(result.is_ok());
    }

    #[test]
    fn abort_cancels_before_next_stage() {
        let mut pipeline = PipelineBuilder::new("t").add_stage(Box::new(Passthrough)).add_stage(Box::new(Passthrough)).build();
        pipeline.abort();
        let result = pipeline.execute(PipelineValue::Bytes(vec![]));
        assert!(result.is_err());
    }

    #[test]
    fn executing_state_rejects_reentrant_execute() {
        // Exercised indirectly: state machine transitions Building ->
        // Executing -> Done within one `execute` call; a manual re-entry
        // attempt is the only way to observe the guard without threads.
        let mut pipeline = PipelineBuilder::new("t").add_stage(Box::new(Passthrough)).build();
        pipeline.state = PipelineState::Executing;
        let result = pipeline.execute(PipelineValue::Bytes(vec![]));
        assert!(result.is_err());
    }
}
