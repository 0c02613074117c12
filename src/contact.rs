//! Contact form stub: the message is logged locally and acknowledged, never sent.

pub const ACKNOWLEDGEMENT: &str = "Thank you for your message! I will get back to you soon.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactSubmission {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }
}

/// Record a submission and return the text shown to the visitor.
pub fn acknowledge(submission: &ContactSubmission) -> &'static str {
    tracing::info!(
        name = %submission.name,
        email = %submission.email,
        message_len = submission.message.chars().count(),
        "contact form submitted"
    );
    ACKNOWLEDGEMENT
}
