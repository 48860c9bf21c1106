//! Registration orchestrator.
//!
//! One attempt runs webinar registration (virtual events only), then the
//! idempotent upsert, then the confirmation email. A webinar failure halts
//! the attempt before anything is persisted. Failures after persistence are
//! returned as warnings on a confirmed registration.
//!
//! There is no compensation for a webinar seat booked before a failed
//! upsert; that case is logged at error level for manual follow-up.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use super::substitution_service::SubstitutionTracker;
use crate::domain::ports::{
    EventCatalogue, EventCatalogueError, GuestRepository, RegistrationCommand,
    RegistrationRepository, RegistrationRepositoryError, SubstitutionRepository,
    WebinarGateway, WebinarGatewayError, WebinarRegistrant,
};
use crate::domain::{
    EmailAddress, Error, Event, Guest, NotificationDispatcher, Registration, RegistrationOutcome,
    RegistrationPlan, RegistrationRequest, RegistrationStatus, RegistrationStep,
    RegistrationWarning, WebinarSeat,
};

use super::guest_resolver::map_guest_repository_error;

/// First name sent to the webinar provider when a guest has none.
const FALLBACK_FIRST_NAME: &str = "Invitado";
/// The provider requires a last name; guests only carry a full name.
const PLACEHOLDER_LAST_NAME: &str = "-";

fn map_catalogue_error(error: EventCatalogueError) -> Error {
    match error {
        EventCatalogueError::Connection { message } => {
            Error::service_unavailable(format!("event catalogue unavailable: {message}"))
        }
        EventCatalogueError::Query { message } => {
            Error::internal(format!("event catalogue error: {message}"))
        }
    }
}

fn map_registration_repository_error(error: RegistrationRepositoryError) -> Error {
    match error {
        RegistrationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("registration repository unavailable: {message}"))
        }
        RegistrationRepositoryError::Query { message } => {
            Error::internal(format!("registration repository error: {message}"))
        }
    }
}

fn map_webinar_error(error: &WebinarGatewayError, step: RegistrationStep) -> Error {
    let message = match error {
        WebinarGatewayError::Rejected { message, .. } => message.clone(),
        other => other.to_string(),
    };
    let mut details = json!({ "step": step.as_str() });
    if let WebinarGatewayError::Rejected { status, .. } = error {
        details["providerStatus"] = json!(status);
    }
    Error::webinar_registration_failed(message).with_details(details)
}

/// Driven ports and collaborators used by [`RegistrationService`].
#[derive(Clone)]
pub struct RegistrationDependencies {
    pub guests: Arc<dyn GuestRepository>,
    pub catalogue: Arc<dyn EventCatalogue>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub substitutions: Arc<dyn SubstitutionRepository>,
    pub webinar: Arc<dyn WebinarGateway>,
    pub notifications: NotificationDispatcher,
}

/// Use case registering one guest for one event.
pub struct RegistrationService {
    guests: Arc<dyn GuestRepository>,
    catalogue: Arc<dyn EventCatalogue>,
    registrations: Arc<dyn RegistrationRepository>,
    tracker: SubstitutionTracker<dyn SubstitutionRepository>,
    webinar: Arc<dyn WebinarGateway>,
    notifications: NotificationDispatcher,
}

impl RegistrationService {
    /// Create the orchestrator.
    pub fn new(dependencies: RegistrationDependencies) -> Self {
        Self {
            guests: dependencies.guests,
            catalogue: dependencies.catalogue,
            registrations: dependencies.registrations,
            tracker: SubstitutionTracker::new(dependencies.substitutions),
            webinar: dependencies.webinar,
            notifications: dependencies.notifications,
        }
    }

    async fn load(&self, request: &RegistrationRequest) -> Result<(Guest, Event), Error> {
        let guest = self
            .guests
            .find_by_id(request.guest_id)
            .await
            .map_err(map_guest_repository_error)?
            .ok_or_else(|| Error::not_found(format!("guest {} not found", request.guest_id)))?;
        let event = self
            .catalogue
            .find_event(request.event_id)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| Error::not_found(format!("event {} not found", request.event_id)))?;
        Ok((guest, event))
    }

    async fn ensure_registrable(&self, guest: &Guest, event: &Event) -> Result<(), Error> {
        if !event.register_open {
            return Err(Error::conflict(format!(
                "registration for event {} is closed",
                event.id
            )));
        }
        if let Some(substitution) = self
            .tracker
            .active_substitution(guest.event_group_id, &guest.email)
            .await?
        {
            return Err(Error::conflict(
                "attendance has been delegated to a replacement guest",
            )
            .with_details(json!({ "replacementEmail": substitution.new_email })));
        }
        Ok(())
    }

    async fn reserve_seat(
        &self,
        plan: &mut RegistrationPlan,
        guest: &Guest,
        event: &Event,
        webinar_email: Option<&EmailAddress>,
    ) -> Result<WebinarSeat, Error> {
        let step = plan.advance();
        let Some(webinar_id) = event.webinar_id.as_deref().filter(|id| !id.trim().is_empty())
        else {
            plan.fail();
            error!(event_id = %event.id, "virtual event has no webinar id");
            return Err(Error::webinar_registration_failed(
                "virtual event has no webinar configured",
            )
            .with_details(json!({ "step": step.as_str() })));
        };

        let token = self.webinar.acquire_token().await.map_err(|failure| {
            plan.fail();
            error!(event_id = %event.id, error = %failure, "webinar token request failed");
            map_webinar_error(&failure, step)
        })?;

        let step = plan.advance();
        let registrant = webinar_registrant(guest, webinar_email);
        let seat = self
            .webinar
            .create_registrant(&token, webinar_id, &registrant)
            .await
            .map_err(|failure| {
                plan.fail();
                error!(
                    event_id = %event.id,
                    guest_id = %guest.id,
                    error = %failure,
                    "webinar registrant creation failed"
                );
                map_webinar_error(&failure, step)
            })?;
        info!(event_id = %event.id, guest_id = %guest.id, "webinar seat reserved");
        Ok(seat)
    }

    async fn persist(
        &self,
        plan: &mut RegistrationPlan,
        registration: &Registration,
        seat: Option<&WebinarSeat>,
    ) -> Result<(), Error> {
        plan.advance();
        self.registrations
            .upsert(registration)
            .await
            .map_err(|failure| {
                plan.fail();
                if let Some(seat) = seat {
                    error!(
                        guest_id = %registration.guest_id,
                        event_id = %registration.event_id,
                        registrant_id = %seat.registrant_id,
                        error = %failure,
                        "webinar seat booked but registration not persisted"
                    );
                } else {
                    warn!(
                        guest_id = %registration.guest_id,
                        event_id = %registration.event_id,
                        error = %failure,
                        "registration upsert failed"
                    );
                }
                map_registration_repository_error(failure)
            })
    }
}

fn webinar_registrant(guest: &Guest, webinar_email: Option<&EmailAddress>) -> WebinarRegistrant {
    let display_name = guest.display_name();
    WebinarRegistrant {
        first_name: if display_name.is_empty() {
            FALLBACK_FIRST_NAME.to_owned()
        } else {
            display_name
        },
        last_name: PLACEHOLDER_LAST_NAME.to_owned(),
        email: webinar_email.unwrap_or(&guest.email).clone(),
        org: guest.company.clone().filter(|company| !company.trim().is_empty()),
    }
}

#[async_trait]
impl RegistrationCommand for RegistrationService {
    async fn register(&self, request: RegistrationRequest) -> Result<RegistrationOutcome, Error> {
        if !request.confirmed {
            return Err(Error::invalid_request("registration must be confirmed")
                .with_details(json!({ "field": "confirmed", "code": "not_confirmed" })));
        }

        let (guest, event) = self.load(&request).await?;
        self.ensure_registrable(&guest, &event).await?;

        let already_registered = self
            .registrations
            .find(guest.id, event.id)
            .await
            .map_err(map_registration_repository_error)?
            .is_some_and(|registration| registration.registered);

        let mut plan = RegistrationPlan::new(event.modality, already_registered);
        let webinar_email = request
            .webinar_email
            .as_ref()
            .filter(|_| event.modality.is_virtual());
        let persisted_webinar_email = webinar_email.filter(|_| request.persist_webinar_email);

        if already_registered {
            let registration = Registration {
                guest_id: guest.id,
                event_id: event.id,
                registered: true,
                webinar_email: None,
            };
            self.persist(&mut plan, &registration, None).await?;
            plan.advance();
            info!(guest_id = %guest.id, event_id = %event.id, "guest already registered");
            return Ok(RegistrationOutcome {
                status: RegistrationStatus::AlreadyRegistered,
                webinar: None,
                warnings: Vec::new(),
            });
        }

        let seat = if plan.includes(RegistrationStep::AwaitingWebinarToken) {
            Some(
                self.reserve_seat(&mut plan, &guest, &event, webinar_email)
                    .await?,
            )
        } else {
            None
        };

        let registration = Registration {
            guest_id: guest.id,
            event_id: event.id,
            registered: true,
            webinar_email: persisted_webinar_email.cloned(),
        };
        self.persist(&mut plan, &registration, seat.as_ref()).await?;
        info!(guest_id = %guest.id, event_id = %event.id, "registration persisted");

        let mut warnings = Vec::new();
        if let Some(email) = persisted_webinar_email {
            if let Err(failure) = self.guests.update_webinar_email(guest.id, email).await {
                warn!(guest_id = %guest.id, error = %failure, "webinar email not stored on guest");
                warnings.push(RegistrationWarning::WebinarEmailNotPersisted {
                    message: failure.to_string(),
                });
            }
        }

        plan.advance();
        if let Err(failure) = self.notifications.send_confirmation(&guest, &event).await {
            warnings.push(RegistrationWarning::NotificationFailed {
                message: failure.to_string(),
            });
        }
        plan.advance();

        Ok(RegistrationOutcome {
            status: RegistrationStatus::Registered,
            webinar: seat,
            warnings,
        })
    }
}

#[cfg(test)]
#[path = "registration_service_tests.rs"]
mod tests;
