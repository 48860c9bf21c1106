//! Runtime configuration loaded via OrthoConfig.
//!
//! Every field is optional. Accessors apply the documented fallbacks and
//! reject values that cannot be used, so a bad setting stops startup
//! instead of surfacing on the first request.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{
    ClosedEventPolicy, ClosedEventPolicyParseError, EmailAddress, EmailValidationError,
    EventGroupId,
};
use crate::outbound::persistence::{EventSource, EventSourceParseError};
use crate::outbound::webinar::{ZoomCredentials, ZoomEndpoints};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CONTACT: &str = "contactasae@apoyoconsultoria.com";
const DEFAULT_ZOOM_OAUTH_URL: &str = "https://zoom.us/oauth/token";
const DEFAULT_ZOOM_API_URL: &str = "https://api.zoom.us/v2";
const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 15;
/// Lima, UTC-05:00.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -300;

/// Raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error(transparent)]
    EventSource(#[from] EventSourceParseError),
    #[error(transparent)]
    ClosedEvents(#[from] ClosedEventPolicyParseError),
    #[error("invalid URL for {field}: {source}")]
    Url {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid sender address: {0}")]
    MailFrom(#[from] EmailValidationError),
    #[error("UTC offset of {0} minutes is out of range")]
    UtcOffset(i32),
}

/// Application settings, read from `REGISTRATION_*` environment variables,
/// CLI flags, and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
pub struct AppSettings {
    /// Listener address.
    pub bind_addr: Option<String>,
    /// PostgreSQL DSN. Without it the server runs on empty fixture ports.
    pub database_url: Option<String>,
    /// `joined` or `consolidated`.
    pub event_source: Option<String>,
    /// `read_only` or `omit`.
    pub closed_events: Option<String>,
    /// Event group used when a request names none.
    pub current_event_group: Option<i64>,
    /// Contact quoted in the closed-registration notice.
    pub help_contact: Option<String>,
    pub zoom_account_id: Option<String>,
    pub zoom_client_id: Option<String>,
    pub zoom_client_secret: Option<String>,
    pub zoom_oauth_url: Option<String>,
    pub zoom_api_url: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_api_url: Option<String>,
    /// Sender address for confirmation emails.
    pub mail_from: Option<String>,
    /// Dynamic template id. Without it confirmations are skipped.
    pub confirmation_template_id: Option<String>,
    /// Base of the personal link placed in confirmation emails.
    pub public_base_url: Option<String>,
    /// Timeout applied to outbound HTTP clients.
    pub http_timeout_seconds: Option<u64>,
    /// Offset used to render event dates in emails.
    pub display_utc_offset_minutes: Option<i32>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|raw| raw.trim()).filter(|raw| !raw.is_empty())
}

fn parse_url(
    field: &'static str,
    value: Option<&String>,
    fallback: &str,
) -> Result<Url, SettingsError> {
    let raw = non_blank(value).unwrap_or(fallback);
    Url::parse(raw).map_err(|source| SettingsError::Url { field, source })
}

impl AppSettings {
    /// Return the listener address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = non_blank(self.bind_addr.as_ref()).unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Return the configured DSN, if any.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_ref())
    }

    /// Return the event data-access strategy.
    pub fn event_source(&self) -> Result<EventSource, SettingsError> {
        non_blank(self.event_source.as_ref())
            .map_or(Ok(EventSource::default()), str::parse)
            .map_err(SettingsError::from)
    }

    /// Return the closed-event presentation policy.
    pub fn closed_events(&self) -> Result<ClosedEventPolicy, SettingsError> {
        non_blank(self.closed_events.as_ref())
            .map_or(Ok(ClosedEventPolicy::default()), str::parse)
            .map_err(SettingsError::from)
    }

    pub fn current_event_group(&self) -> Option<EventGroupId> {
        self.current_event_group.map(EventGroupId::new)
    }

    pub fn help_contact(&self) -> &str {
        non_blank(self.help_contact.as_ref()).unwrap_or(DEFAULT_CONTACT)
    }

    /// Return webinar credentials when all three parts are present.
    pub fn zoom_credentials(&self) -> Option<ZoomCredentials> {
        Some(ZoomCredentials {
            account_id: non_blank(self.zoom_account_id.as_ref())?.to_owned(),
            client_id: non_blank(self.zoom_client_id.as_ref())?.to_owned(),
            client_secret: non_blank(self.zoom_client_secret.as_ref())?.to_owned(),
        })
    }

    pub fn zoom_endpoints(&self) -> Result<ZoomEndpoints, SettingsError> {
        Ok(ZoomEndpoints {
            oauth_url: parse_url(
                "zoom_oauth_url",
                self.zoom_oauth_url.as_ref(),
                DEFAULT_ZOOM_OAUTH_URL,
            )?,
            api_url: parse_url(
                "zoom_api_url",
                self.zoom_api_url.as_ref(),
                DEFAULT_ZOOM_API_URL,
            )?,
        })
    }

    pub fn sendgrid_api_key(&self) -> Option<String> {
        non_blank(self.sendgrid_api_key.as_ref()).map(str::to_owned)
    }

    pub fn sendgrid_api_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "sendgrid_api_url",
            self.sendgrid_api_url.as_ref(),
            DEFAULT_SENDGRID_API_URL,
        )
    }

    pub fn mail_from(&self) -> Result<EmailAddress, SettingsError> {
        let raw = non_blank(self.mail_from.as_ref()).unwrap_or(DEFAULT_CONTACT);
        Ok(EmailAddress::parse(raw)?)
    }

    pub fn confirmation_template_id(&self) -> Option<String> {
        non_blank(self.confirmation_template_id.as_ref()).map(str::to_owned)
    }

    pub fn public_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "public_base_url",
            self.public_base_url.as_ref(),
            DEFAULT_PUBLIC_BASE_URL,
        )
    }

    /// Return the outbound HTTP timeout. Zero falls back to the default.
    pub fn http_timeout(&self) -> Duration {
        let seconds = self
            .http_timeout_seconds
            .filter(|seconds| *seconds > 0)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS);
        Duration::from_secs(seconds)
    }

    /// Return the offset used to render event dates.
    pub fn display_offset(&self) -> Result<FixedOffset, SettingsError> {
        let minutes = self
            .display_utc_offset_minutes
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::UtcOffset(minutes))
    }
}
