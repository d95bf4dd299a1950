use std::sync::Arc;

use serde_json::Value;
use shared::{
    error::{ApiError, ErrorCode, FieldError},
    protocol::ContactReceipt,
    schema::{self, FIELD_BODY},
};
use storage::SubmissionStore;
use tracing::{error, info, warn};

pub const STORE_FAILURE_MESSAGE: &str = "failed to store message; please try again later";

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn SubmissionStore>,
}

impl ApiContext {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }
}

/// Parses a raw request body into a JSON value without imposing any shape.
pub fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(ErrorCode::Validation, format!("body: malformed JSON ({e})"))
            .with_fields(vec![FieldError::new(FIELD_BODY, "malformed JSON")])
    })
}

/// Validates a candidate submission and persists it.
///
/// Nothing is written unless validation passes. A storage failure is reported
/// with a fixed message; the underlying error only goes to the log.
pub async fn submit_contact(ctx: &ApiContext, body: &Value) -> Result<ContactReceipt, ApiError> {
    let submission = schema::validate_value(body).map_err(|rejection| {
        let fields: Vec<&str> = rejection.fields().iter().map(|f| f.field.as_str()).collect();
        warn!(?fields, "contact submission rejected");
        ApiError::from(rejection)
    })?;

    let stored = ctx
        .store
        .create_submission(&submission)
        .await
        .map_err(|e| {
            error!(error = %format!("{e:#}"), "failed to store contact submission");
            ApiError::new(ErrorCode::Internal, STORE_FAILURE_MESSAGE)
        })?;

    info!(id = %stored.id, "contact submission stored");
    Ok(ContactReceipt {
        id: stored.id,
        created_at: stored.created_at,
    })
}

pub async fn storage_ready(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.store.health_check().await.map_err(|e| {
        warn!(error = %format!("{e:#}"), "storage health check failed");
        ApiError::new(ErrorCode::Unavailable, "storage unavailable")
    })
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
