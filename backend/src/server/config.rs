//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use registration_backend::domain::{ConfirmationTemplate, EmailAddress, InvitationsSettings};
use registration_backend::outbound::persistence::{DbPool, EventSource};
use registration_backend::outbound::webinar::{ZoomCredentials, ZoomEndpoints};
use registration_backend::settings::{AppSettings, SettingsError};
use url::Url;

/// Mail adapter inputs.
pub(crate) struct MailConfig {
    pub(crate) api_key: Option<String>,
    pub(crate) endpoint: Url,
    pub(crate) from: EmailAddress,
}

/// Webinar adapter inputs.
pub(crate) struct WebinarConfig {
    pub(crate) credentials: Option<ZoomCredentials>,
    pub(crate) endpoints: ZoomEndpoints,
}

/// Validated configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) event_source: EventSource,
    pub(crate) invitations: InvitationsSettings,
    pub(crate) webinar: WebinarConfig,
    pub(crate) mail: MailConfig,
    pub(crate) template: ConfirmationTemplate,
    pub(crate) http_timeout: Duration,
}

impl ServerConfig {
    /// Resolve every setting up front so bad values stop startup.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for the first unusable value.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            db_pool: None,
            event_source: settings.event_source()?,
            invitations: InvitationsSettings {
                current_event_group: settings.current_event_group(),
                closed_events: settings.closed_events()?,
                help_contact: settings.help_contact().to_owned(),
            },
            webinar: WebinarConfig {
                credentials: settings.zoom_credentials(),
                endpoints: settings.zoom_endpoints()?,
            },
            mail: MailConfig {
                api_key: settings.sendgrid_api_key(),
                endpoint: settings.sendgrid_api_url()?,
                from: settings.mail_from()?,
            },
            template: ConfirmationTemplate {
                template_id: settings.confirmation_template_id(),
                register_link_base: settings.public_base_url()?,
                display_offset: settings.display_offset()?,
            },
            http_timeout: settings.http_timeout(),
        })
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one every driven port falls back to its empty fixture.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
