// campus-eats/src/pipeline/execution.rs

//! `Pipeline::run()`: walks the steps in order and drives their handlers.

use crate::core::{ContextData, PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned as-is. A
  /// non-optional step with no handlers fails with `FlowError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      // Entered spans must not live across an await, so only log inside them.
      let step_span = span!(
        Level::DEBUG,
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_cond) = &step_def.skip_if {
        if skip_cond(&ctx_data) {
          step_span.in_scope(|| event!(Level::DEBUG, "Step skipped due to 'skip_if' condition."));
          continue;
        }
      }

      let handlers = match self.on.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          step_span.in_scope(|| event!(Level::DEBUG, "Optional step has no handlers, skipping."));
          continue;
        }
        _ => {
          step_span.in_scope(|| event!(Level::ERROR, "Non-optional step has no handlers."));
          return Err(Err::from(FlowError::HandlerMissing {
            pipeline: self.name,
            step_name: step_def.name.clone(),
          }));
        }
      };

      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        match handler_fn(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            step_span.in_scope(|| event!(Level::INFO, handler_index = handler_idx, "Pipeline stopped by a handler."));
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            step_span.in_scope(|| event!(Level::WARN, handler_index = handler_idx, error = %e, "Handler failed."));
            return Err(e);
          }
        }
      }
      step_span.in_scope(|| event!(Level::TRACE, "Step finished."));
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
