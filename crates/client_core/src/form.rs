use std::sync::Arc;

use shared::{
    domain::ValidSubmission,
    error::FieldError,
    protocol::ContactReceipt,
    schema::{validate_fields, FIELD_EMAIL, FIELD_MESSAGE, FIELD_NAME},
};
use tracing::{debug, info, warn};

use crate::{
    error::SubmitError,
    notify::{Notification, Notifier},
    transport::SubmissionTransport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => FIELD_NAME,
            Self::Email => FIELD_EMAIL,
            Self::Message => FIELD_MESSAGE,
        }
    }
}

pub const INTERRUPTED_TEXT: &str = "The message was not sent; please try again.";

/// Proof that the form moved to `Pending` for this payload. Consumed by
/// [`ContactForm::complete_submit`] or [`ContactForm::abandon_submit`].
///
/// Dropping it any other way (a cancelled future, a panicking task) releases
/// the form: it reads as `Failed` and accepts the next submit.
#[derive(Debug)]
#[must_use = "a pending submission should be completed or abandoned"]
pub struct PendingSubmission {
    submission: ValidSubmission,
    _in_flight: Arc<()>,
}

impl PendingSubmission {
    pub fn submission(&self) -> &ValidSubmission {
        &self.submission
    }
}

/// Contact form state: `Idle -> Pending -> Succeeded | Failed`.
///
/// At most one submission is in flight. Entered values survive every failure
/// and are cleared only when the server confirms the write.
#[derive(Debug, Default)]
pub struct ContactForm {
    name: String,
    email: String,
    message: String,
    status: FormStatus,
    field_errors: Vec<FieldError>,
    last_error: Option<String>,
    in_flight: Option<Arc<()>>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Message => self.message = value,
        }
        self.field_errors.retain(|e| e.field != field.key());
        if self.status == FormStatus::Succeeded {
            self.status = FormStatus::Idle;
        }
    }

    pub fn status(&self) -> FormStatus {
        if self.status == FormStatus::Pending && !self.ticket_outstanding() {
            FormStatus::Failed
        } else {
            self.status
        }
    }

    pub fn can_submit(&self) -> bool {
        self.status() != FormStatus::Pending
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field.key())
            .map(|e| e.message.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn ticket_outstanding(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|token| Arc::strong_count(token) > 1)
    }

    // Pending with no live ticket: the attempt ended without an answer.
    fn release_orphaned(&mut self) {
        if self.status == FormStatus::Pending && !self.ticket_outstanding() {
            warn!("pending contact submission was dropped before completing");
            self.mark_interrupted();
        }
    }

    fn mark_interrupted(&mut self) {
        self.in_flight = None;
        self.status = FormStatus::Failed;
        self.last_error = Some(INTERRUPTED_TEXT.to_string());
    }

    /// Validates the current values and, if they pass, marks the form pending.
    ///
    /// Invalid input records per-field errors and leaves the status alone.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitError> {
        self.release_orphaned();
        if self.status == FormStatus::Pending {
            return Err(SubmitError::Busy);
        }

        match validate_fields(&self.name, &self.email, &self.message) {
            Ok(submission) => {
                self.field_errors.clear();
                self.last_error = None;
                self.status = FormStatus::Pending;
                let token = Arc::new(());
                self.in_flight = Some(token.clone());
                Ok(PendingSubmission {
                    submission,
                    _in_flight: token,
                })
            }
            Err(rejection) => {
                debug!(errors = %rejection, "contact form failed local validation");
                self.field_errors = rejection.fields().to_vec();
                Err(SubmitError::Invalid(rejection))
            }
        }
    }

    /// Applies the endpoint's answer for a pending submission and notifies.
    pub fn complete_submit<N: Notifier + ?Sized>(
        &mut self,
        _pending: PendingSubmission,
        outcome: Result<ContactReceipt, SubmitError>,
        notifier: &mut N,
    ) -> Result<ContactReceipt, SubmitError> {
        self.in_flight = None;
        match outcome {
            Ok(receipt) => {
                info!(id = %receipt.id, "contact message sent");
                self.name.clear();
                self.email.clear();
                self.message.clear();
                self.field_errors.clear();
                self.last_error = None;
                self.status = FormStatus::Succeeded;
                notifier.notify(Notification::success());
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "contact message failed");
                let text = err.user_message();
                self.field_errors = err.field_errors().to_vec();
                self.last_error = Some(text.clone());
                self.status = FormStatus::Failed;
                notifier.notify(Notification::failure(text));
                Err(err)
            }
        }
    }

    /// Gives up on a pending submission without an answer from the endpoint.
    ///
    /// The form moves to `Failed`, keeps the entered values, and notifies
    /// nothing.
    pub fn abandon_submit(&mut self, pending: PendingSubmission) {
        drop(pending);
        if self.status == FormStatus::Pending {
            self.mark_interrupted();
        }
    }

    /// Validates, sends once, and applies the result.
    pub async fn submit<T, N>(
        &mut self,
        transport: &T,
        notifier: &mut N,
    ) -> Result<ContactReceipt, SubmitError>
    where
        T: SubmissionTransport + ?Sized,
        N: Notifier + ?Sized,
    {
        let pending = self.begin_submit()?;
        let outcome = transport.send(pending.submission()).await;
        self.complete_submit(pending, outcome, notifier)
    }
}
