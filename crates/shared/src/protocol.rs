use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::SubmissionId;

pub const CONTACT_ROUTE: &str = "/api/contact";
pub const HEALTH_ROUTE: &str = "/healthz";

/// Request body for `POST /api/contact`, as the client builds it.
///
/// The server never deserializes into this type; it reads the body as an
/// untyped JSON value and runs it through the schema instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Success body for `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub id: SubmissionId,
    pub created_at: DateTime<Utc>,
}
