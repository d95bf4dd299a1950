//! The one rule set for a contact submission.
//!
//! The server runs it against the raw request body and the client runs it
//! against the form fields before anything touches the network, so both sides
//! reject exactly the same payloads.

use serde_json::Value;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    domain::ValidSubmission,
    error::{ApiError, ErrorCode, FieldError},
    protocol::ContactRequest,
};

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_BODY: &str = "body";

pub const MSG_REQUIRED: &str = "required";
pub const MSG_INVALID_EMAIL: &str = "invalid format";
pub const MSG_NOT_OBJECT: &str = "expected a JSON object";

const FIELDS: [&str; 3] = [FIELD_NAME, FIELD_EMAIL, FIELD_MESSAGE];

#[derive(Debug, Validate)]
struct Draft {
    #[validate(length(min = 1, message = "required"))]
    name: String,
    #[validate(
        length(min = 1, message = "required"),
        email(message = "invalid format")
    )]
    email: String,
    #[validate(length(min = 1, message = "required"))]
    message: String,
}

/// Field-level rejection. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_fields(.fields))]
pub struct SchemaError {
    fields: Vec<FieldError>,
}

impl SchemaError {
    fn single(field: &str, message: &str) -> Self {
        Self {
            fields: vec![FieldError::new(field, message)],
        }
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FieldError> {
        self.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }
}

fn render_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<SchemaError> for ApiError {
    fn from(value: SchemaError) -> Self {
        ApiError::new(ErrorCode::Validation, value.to_string()).with_fields(value.fields)
    }
}

/// Validates three in-memory field values.
pub fn validate_fields(
    name: &str,
    email: &str,
    message: &str,
) -> Result<ValidSubmission, SchemaError> {
    let draft = Draft {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        message: message.trim().to_string(),
    };

    let mut fields = match draft.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect_errors(&errors),
    };
    if !fields.iter().any(|f| f.field == FIELD_EMAIL) && !has_dotted_domain(&draft.email) {
        fields.push(FieldError::new(FIELD_EMAIL, MSG_INVALID_EMAIL));
    }

    if fields.is_empty() {
        return Ok(ValidSubmission {
            name: draft.name,
            email: draft.email,
            message: draft.message,
        });
    }
    fields.sort_by_key(|f| FIELDS.iter().position(|name| *name == f.field));
    Err(SchemaError { fields })
}

/// Validates an arbitrary JSON value, as received over the wire.
///
/// Missing, `null` and non-string fields count as absent. Unknown keys are
/// ignored.
pub fn validate_value(value: &Value) -> Result<ValidSubmission, SchemaError> {
    let Some(object) = value.as_object() else {
        return Err(SchemaError::single(FIELD_BODY, MSG_NOT_OBJECT));
    };

    let text = |key: &str| object.get(key).and_then(Value::as_str).unwrap_or_default();
    validate_fields(text(FIELD_NAME), text(FIELD_EMAIL), text(FIELD_MESSAGE))
}

impl ContactRequest {
    pub fn validate(&self) -> Result<ValidSubmission, SchemaError> {
        validate_fields(&self.name, &self.email, &self.message)
    }
}

impl ValidSubmission {
    pub fn to_request(&self) -> ContactRequest {
        ContactRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
        }
    }
}

fn collect_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    FIELDS
        .iter()
        .filter_map(|field| {
            let found = by_field.get(*field)?;
            Some(FieldError::new(*field, first_reason(found)))
        })
        .collect()
}

// The email rule alone accepts intranet forms like `jane@localhost`; a
// contact address needs a dotted domain with non-empty labels.
fn has_dotted_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

// An empty value trips both the length and the email rule; report it once,
// as missing.
fn first_reason(errors: &[ValidationError]) -> String {
    let picked = errors
        .iter()
        .find(|e| e.code == "length")
        .or_else(|| errors.first());
    match picked.and_then(|e| e.message.as_ref()) {
        Some(message) => message.to_string(),
        None => MSG_REQUIRED.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/schema_tests.rs"]
mod tests;
