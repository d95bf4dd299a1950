pub const SUCCESS_TITLE: &str = "Message sent successfully!";
pub const SUCCESS_DESCRIPTION: &str = "Thank you for reaching out. I'll get back to you soon.";
pub const FAILURE_TITLE: &str = "Failed to send message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub tone: Tone,
}

impl Notification {
    pub fn success() -> Self {
        Self {
            title: SUCCESS_TITLE.to_string(),
            description: SUCCESS_DESCRIPTION.to_string(),
            tone: Tone::Success,
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            title: FAILURE_TITLE.to_string(),
            description: description.into(),
            tone: Tone::Destructive,
        }
    }
}

/// Surface that shows a title and description to the user.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl Notifier for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}
