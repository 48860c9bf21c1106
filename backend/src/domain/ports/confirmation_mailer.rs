//! Port for the transactional email provider.

use async_trait::async_trait;

use crate::domain::ConfirmationEmail;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum ConfirmationMailerError {
        /// Mail credentials or the template are missing.
        NotConfigured =>
            "confirmation email is not configured",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "mail provider rejected the message ({status}): {message}",
        /// The provider could not be reached.
        Transport { message: String } =>
            "mail provider transport failed: {message}",
    }
}

/// Port for sending confirmation emails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    /// Send one templated email.
    async fn send(&self, email: &ConfirmationEmail) -> Result<(), ConfirmationMailerError>;
}

