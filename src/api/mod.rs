use std::sync::Arc;

use lambda_runtime::{Diagnostic, LambdaEvent};
use serde_json::Value;
use tracing::{debug, error, info_span, warn, Instrument};

use self::{appsync::Invocation, router::Command};
use crate::{
    infrastructure::state::AppState,
    services::{errors::ResolverError, notes::NoteService},
};

pub mod appsync;
pub mod router;

/// Lambda entry point: one invocation, one operation.
pub async fn handle_event(
    state: Arc<AppState>,
    event: LambdaEvent<Value>,
) -> Result<Value, Diagnostic> {
    let (payload, context) = event.into_parts();
    let span = info_span!("invocation", request_id = %context.request_id);
    resolve(state, payload)
        .instrument(span)
        .await
        .map_err(Diagnostic::from)
}

pub async fn resolve(state: Arc<AppState>, payload: Value) -> Result<Value, ResolverError> {
    let result = run(state, payload).await;
    if let Err(err) = &result {
        log_failure(err);
    }
    result
}

async fn run(state: Arc<AppState>, payload: Value) -> Result<Value, ResolverError> {
    let invocation = Invocation::from_payload(payload)?;
    let operation = invocation.operation()?;
    debug!(%operation, "dispatching");
    let command = Command::parse(operation, invocation.arguments)?;
    let service = NoteService::new(state);
    router::dispatch(&service, command).await
}

fn log_failure(err: &ResolverError) {
    let error_type = err.error_type();
    match err {
        ResolverError::Validation(_) | ResolverError::NotFound(_) => {
            debug!(error_type, error = %err, "request rejected")
        }
        ResolverError::UnsupportedOperation { .. } => {
            warn!(error_type, error = %err, "no handler for operation")
        }
        ResolverError::TransientStore(_) => {
            warn!(error_type, error = %err, retryable = true, "note store unavailable")
        }
        ResolverError::Integrity(_) => error!(error_type, error = %err, "note integrity violated"),
    }
}
