//! Port for the webinar provider.
//!
//! Registration is two calls: a client-credentials token exchange, then
//! registrant creation on one webinar. Tokens are never cached.

use std::fmt;

use async_trait::async_trait;

use crate::domain::{EmailAddress, WebinarSeat};

use super::define_port_error;

define_port_error! {
    /// Errors raised by webinar provider adapters.
    pub enum WebinarGatewayError {
        /// Provider credentials are missing.
        NotConfigured =>
            "webinar provider credentials are not configured",
        /// The token exchange failed.
        Authentication { message: String } =>
            "webinar provider authentication failed: {message}",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "webinar provider rejected the request ({status}): {message}",
        /// The provider could not be reached.
        Transport { message: String } =>
            "webinar provider transport failed: {message}",
        /// The provider response could not be decoded.
        Decode { message: String } =>
            "webinar provider response was invalid: {message}",
    }
}

/// Short-lived bearer token for one registration.
#[derive(Clone, PartialEq, Eq)]
pub struct WebinarToken(String);

impl WebinarToken {
    /// Wrap a token issued by the provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw bearer value.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for WebinarToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebinarToken(<redacted>)")
    }
}

/// Registrant details sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebinarRegistrant {
    pub first_name: String,
    pub last_name: String,
    pub email: EmailAddress,
    pub org: Option<String>,
}

/// Port for reserving webinar seats.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebinarGateway: Send + Sync {
    /// Exchange client credentials for a bearer token.
    async fn acquire_token(&self) -> Result<WebinarToken, WebinarGatewayError>;

    /// Register `registrant` on `webinar_id`.
    async fn create_registrant(
        &self,
        token: &WebinarToken,
        webinar_id: &str,
        registrant: &WebinarRegistrant,
    ) -> Result<WebinarSeat, WebinarGatewayError>;
}
