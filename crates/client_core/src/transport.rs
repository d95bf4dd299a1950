use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::ValidSubmission,
    error::ApiError,
    protocol::{ContactReceipt, CONTACT_ROUTE},
};
use tracing::{debug, warn};
use url::Url;

use crate::error::SubmitError;

/// Carries one validated submission to the endpoint.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn send(&self, submission: &ValidSubmission) -> Result<ContactReceipt, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct ContactClient {
    http: Client,
    endpoint: Url,
}

impl ContactClient {
    pub fn new(server_url: &str) -> Result<Self, url::ParseError> {
        Self::with_http(Client::new(), server_url)
    }

    pub fn with_http(http: Client, server_url: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(server_url)?.join(CONTACT_ROUTE)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionTransport for ContactClient {
    async fn send(&self, submission: &ValidSubmission) -> Result<ContactReceipt, SubmitError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(submission)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "contact request failed");
                SubmitError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            let receipt = response.json::<ContactReceipt>().await.map_err(|e| {
                SubmitError::Transport(format!("unexpected response from server: {e}"))
            })?;
            debug!(id = %receipt.id, "contact submission accepted");
            return Ok(receipt);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(classify_failure(status, &body))
    }
}

pub(crate) fn classify_failure(status: StatusCode, body: &[u8]) -> SubmitError {
    let api_error = serde_json::from_slice::<ApiError>(body).ok();
    let message = api_error
        .as_ref()
        .map(|e| e.message.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => status.as_u16().to_string(),
        });

    if status.is_client_error() {
        SubmitError::Rejected {
            status: status.as_u16(),
            message,
            fields: api_error.map(|e| e.fields).unwrap_or_default(),
        }
    } else {
        SubmitError::Server {
            status: status.as_u16(),
            message,
        }
    }
}
