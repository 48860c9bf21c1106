//! Builders wiring outbound adapters into the HTTP use cases.

use std::sync::Arc;

use tracing::{info, warn};

use registration_backend::domain::ports::{
    ConfirmationMailer, EventCatalogue, FixtureEventCatalogue, FixtureGuestRepository,
    FixtureRegistrationRepository, FixtureSubstitutionRepository, GuestRepository,
    RegistrationRepository, SubstitutionRepository, WebinarGateway,
};
use registration_backend::domain::{
    InvitationsService, NotificationDispatcher, RegistrationDependencies, RegistrationService,
    SubstitutionService,
};
use registration_backend::inbound::http::state::HttpState;
use registration_backend::outbound::mail::SendGridMailer;
use registration_backend::outbound::persistence::{
    DbPool, DieselEventCatalogue, DieselGuestRepository, DieselRegistrationRepository,
    DieselSubstitutionRepository, EventSource,
};
use registration_backend::outbound::webinar::ZoomWebinarGateway;

use super::ServerConfig;

/// Data-store ports shared by every use case.
#[derive(Clone)]
struct DrivenPorts {
    guests: Arc<dyn GuestRepository>,
    catalogue: Arc<dyn EventCatalogue>,
    registrations: Arc<dyn RegistrationRepository>,
    substitutions: Arc<dyn SubstitutionRepository>,
}

impl DrivenPorts {
    fn diesel(pool: &DbPool, source: EventSource) -> Self {
        info!(event_source = %source, "using database-backed ports");
        Self {
            guests: Arc::new(DieselGuestRepository::new(pool.clone())),
            catalogue: Arc::new(DieselEventCatalogue::new(pool.clone(), source)),
            registrations: Arc::new(DieselRegistrationRepository::new(pool.clone())),
            substitutions: Arc::new(DieselSubstitutionRepository::new(pool.clone())),
        }
    }

    fn fixtures() -> Self {
        warn!("no database configured; serving empty fixture data");
        Self {
            guests: Arc::new(FixtureGuestRepository),
            catalogue: Arc::new(FixtureEventCatalogue),
            registrations: Arc::new(FixtureRegistrationRepository),
            substitutions: Arc::new(FixtureSubstitutionRepository),
        }
    }
}

fn build_webinar_gateway(config: &ServerConfig) -> std::io::Result<Arc<dyn WebinarGateway>> {
    if config.webinar.credentials.is_none() {
        warn!("webinar credentials missing; virtual registrations will fail");
    }
    let gateway = ZoomWebinarGateway::new(
        config.webinar.credentials.clone(),
        config.webinar.endpoints.clone(),
        config.http_timeout,
    )
    .map_err(|err| std::io::Error::other(format!("webinar client init failed: {err}")))?;
    Ok(Arc::new(gateway))
}

fn build_mailer(config: &ServerConfig) -> std::io::Result<Arc<dyn ConfirmationMailer>> {
    if config.mail.api_key.is_none() {
        warn!("mail API key missing; confirmation emails will be skipped");
    }
    let mailer = SendGridMailer::new(
        config.mail.api_key.clone(),
        config.mail.endpoint.clone(),
        config.mail.from.clone(),
        config.http_timeout,
    )
    .map_err(|err| std::io::Error::other(format!("mail client init failed: {err}")))?;
    Ok(Arc::new(mailer))
}

/// Build the HTTP state from configuration.
///
/// Uses the Diesel adapters when a pool is attached, otherwise the empty
/// fixtures. Webinar and mail adapters are always real; missing
/// credentials make their calls fail softly.
///
/// # Errors
/// Returns [`std::io::Error`] when an HTTP client cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => DrivenPorts::diesel(pool, config.event_source),
        None => DrivenPorts::fixtures(),
    };
    let notifications = NotificationDispatcher::new(build_mailer(config)?, config.template.clone());

    let invitations = InvitationsService::new(
        ports.guests.clone(),
        ports.substitutions.clone(),
        ports.catalogue.clone(),
        config.invitations.clone(),
    );
    let registrations = RegistrationService::new(RegistrationDependencies {
        guests: ports.guests.clone(),
        catalogue: ports.catalogue.clone(),
        registrations: ports.registrations.clone(),
        substitutions: ports.substitutions.clone(),
        webinar: build_webinar_gateway(config)?,
        notifications,
    });
    let substitutions = SubstitutionService::new(
        ports.guests,
        ports.substitutions,
        config.invitations.current_event_group,
    );

    Ok(HttpState::new(
        Arc::new(invitations),
        Arc::new(registrations),
        Arc::new(substitutions),
    ))
}
