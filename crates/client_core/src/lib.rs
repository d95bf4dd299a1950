//! Client side of the contact form: local validation, the single in-flight
//! request, and the notifications shown for each outcome.

pub mod error;
pub mod form;
pub mod notify;
pub mod transport;

pub use error::SubmitError;
pub use form::{ContactForm, Field, FormStatus, PendingSubmission};
pub use notify::{Notification, Notifier, Tone};
pub use transport::{ContactClient, SubmissionTransport};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
