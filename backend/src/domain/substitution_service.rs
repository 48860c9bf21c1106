//! Substitution tracking and the substitution write flow.
//!
//! Recording a substitution is best-effort rather than transactional:
//! replacement guests are inserted first and the mapping last, so a failure
//! may leave replacement guests behind but never a mapping without them.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::guest_resolver::map_guest_repository_error;
use crate::domain::ports::{
    GuestRepository, SubstitutionCommand, SubstitutionRepository, SubstitutionRepositoryError,
};
use crate::domain::{
    ActiveIdentity, EmailAddress, Error, EventGroupId, GuestId, NewGuest, NewSubstitution,
    Substitution, SubstitutionOutcome, SubstitutionRequest,
};

pub(crate) fn map_substitution_repository_error(error: SubstitutionRepositoryError) -> Error {
    match error {
        SubstitutionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("substitution repository unavailable: {message}"))
        }
        SubstitutionRepositoryError::Query { message } => {
            Error::internal(format!("substitution repository error: {message}"))
        }
        SubstitutionRepositoryError::Duplicate => {
            Error::internal("substitution repository reported an unexpected duplicate")
        }
    }
}

/// Redirects an email to its replacement when a substitution exists.
#[derive(Clone)]
pub struct SubstitutionTracker<S: ?Sized> {
    substitutions: Arc<S>,
}

impl<S: ?Sized> SubstitutionTracker<S> {
    /// Create a tracker over the substitution repository.
    pub fn new(substitutions: Arc<S>) -> Self {
        Self { substitutions }
    }
}

impl<S> SubstitutionTracker<S>
where
    S: SubstitutionRepository + ?Sized,
{
    /// Substitution replacing `email` in the group, if any.
    pub async fn active_substitution(
        &self,
        event_group_id: EventGroupId,
        email: &EmailAddress,
    ) -> Result<Option<Substitution>, Error> {
        self.substitutions
            .find_by_original(event_group_id, email)
            .await
            .map_err(map_substitution_repository_error)
    }

    /// Identity every downstream lookup for `email` should use.
    pub async fn resolve_active_identity(
        &self,
        event_group_id: EventGroupId,
        email: &EmailAddress,
    ) -> Result<ActiveIdentity, Error> {
        let identity = match self.active_substitution(event_group_id, email).await? {
            Some(substitution) => ActiveIdentity::replaced_by(&substitution),
            None => ActiveIdentity::original(email.clone()),
        };
        Ok(identity)
    }
}

/// Use case registering a replacement guest.
#[derive(Clone)]
pub struct SubstitutionService<G: ?Sized, S: ?Sized> {
    guests: Arc<G>,
    substitutions: Arc<S>,
    default_event_group: Option<EventGroupId>,
}

impl<G: ?Sized, S: ?Sized> SubstitutionService<G, S> {
    /// Create the service. `default_event_group` applies when a request
    /// names no group.
    pub fn new(
        guests: Arc<G>,
        substitutions: Arc<S>,
        default_event_group: Option<EventGroupId>,
    ) -> Self {
        Self {
            guests,
            substitutions,
            default_event_group,
        }
    }
}

struct ValidatedSubstitution {
    event_group_id: EventGroupId,
    original_email: EmailAddress,
    new_email: EmailAddress,
    new_name: String,
}

impl<G, S> SubstitutionService<G, S>
where
    G: GuestRepository + ?Sized,
    S: SubstitutionRepository + ?Sized,
{
    fn validate(&self, request: SubstitutionRequest) -> Result<ValidatedSubstitution, Error> {
        let event_group_id = request
            .event_group_id
            .or(self.default_event_group)
            .ok_or_else(|| {
                Error::invalid_request("eventGroupId is required")
                    .with_details(json!({ "field": "eventGroupId", "code": "missing" }))
            })?;
        let new_name = request.new_name.trim();
        if new_name.is_empty() {
            return Err(Error::invalid_request("newName must not be empty")
                .with_details(json!({ "field": "newName", "code": "empty" })));
        }
        if request.original_email == request.new_email {
            return Err(Error::invalid_request(
                "replacement email must differ from the original email",
            )
            .with_details(json!({ "field": "newEmail", "code": "same_as_original" })));
        }
        Ok(ValidatedSubstitution {
            event_group_id,
            original_email: request.original_email,
            new_email: request.new_email,
            new_name: new_name.to_owned(),
        })
    }

    async fn replacement_ids(
        &self,
        substitution: &Substitution,
    ) -> Result<Vec<GuestId>, Error> {
        let guests = self
            .guests
            .find_by_email(&substitution.new_email, Some(substitution.event_group_id))
            .await
            .map_err(map_guest_repository_error)?;
        Ok(guests.into_iter().map(|guest| guest.id).collect())
    }

    async fn existing_outcome(
        &self,
        substitution: Substitution,
    ) -> Result<SubstitutionOutcome, Error> {
        let replacement_guest_ids = self.replacement_ids(&substitution).await?;
        Ok(SubstitutionOutcome {
            created: false,
            substitution,
            replacement_guest_ids,
        })
    }

    async fn create_replacements(
        &self,
        request: &ValidatedSubstitution,
    ) -> Result<Vec<GuestId>, Error> {
        let originals: Vec<_> = self
            .guests
            .find_by_email(&request.original_email, Some(request.event_group_id))
            .await
            .map_err(map_guest_repository_error)?
            .into_iter()
            .filter(|guest| guest.event_group_id == request.event_group_id)
            .collect();
        if originals.is_empty() {
            return Err(Error::not_found(format!(
                "no guest found for {} in event group {}",
                request.original_email, request.event_group_id
            )));
        }

        let mut created = Vec::with_capacity(originals.len());
        for original in &originals {
            let replacement =
                NewGuest::replacement_for(original, request.new_email.clone(), &request.new_name);
            match self.guests.insert(&replacement).await {
                Ok(guest) => {
                    info!(
                        original_guest_id = %original.id,
                        replacement_guest_id = %guest.id,
                        list_id = %guest.list_id,
                        "replacement guest created"
                    );
                    created.push(guest.id);
                }
                Err(error) => {
                    warn!(
                        original_guest_id = %original.id,
                        created = created.len(),
                        error = %error,
                        "replacement guest insert failed"
                    );
                    return Err(Error::substitution_failed(format!(
                        "could not register the replacement guest: {error}"
                    ))
                    .with_details(json!({ "step": "create_guest", "created": created })));
                }
            }
        }
        Ok(created)
    }
}

#[async_trait]
impl<G, S> SubstitutionCommand for SubstitutionService<G, S>
where
    G: GuestRepository + ?Sized,
    S: SubstitutionRepository + ?Sized,
{
    async fn substitute(
        &self,
        request: SubstitutionRequest,
    ) -> Result<SubstitutionOutcome, Error> {
        let request = self.validate(request)?;
        let group = request.event_group_id;

        let chained = self
            .substitutions
            .find_by_replacement(group, &request.original_email)
            .await
            .map_err(map_substitution_repository_error)?;
        if chained.is_some() {
            return Err(Error::conflict(
                "a replacement guest cannot register a further substitution",
            ));
        }

        if let Some(existing) = self
            .substitutions
            .find_by_original(group, &request.original_email)
            .await
            .map_err(map_substitution_repository_error)?
        {
            info!(event_group_id = %group, "substitution already recorded");
            return self.existing_outcome(existing).await;
        }

        let delegated = self
            .substitutions
            .find_by_original(group, &request.new_email)
            .await
            .map_err(map_substitution_repository_error)?;
        if let Some(onward) = delegated {
            return Err(Error::conflict(
                "the replacement email has already been substituted in this event group",
            )
            .with_details(json!({ "replacementEmail": onward.new_email })));
        }

        let replacement_guest_ids = self.create_replacements(&request).await?;

        let mapping = NewSubstitution {
            event_group_id: group,
            original_email: request.original_email.clone(),
            new_email: request.new_email.clone(),
            new_name: request.new_name.clone(),
        };
        match self.substitutions.record(&mapping).await {
            Ok(substitution) => {
                info!(
                    event_group_id = %group,
                    replacements = replacement_guest_ids.len(),
                    "substitution recorded"
                );
                Ok(SubstitutionOutcome {
                    created: true,
                    substitution,
                    replacement_guest_ids,
                })
            }
            Err(SubstitutionRepositoryError::Duplicate) => {
                warn!(event_group_id = %group, "substitution raced; returning recorded mapping");
                let existing = self
                    .substitutions
                    .find_by_original(group, &request.original_email)
                    .await
                    .map_err(map_substitution_repository_error)?
                    .ok_or_else(|| {
                        Error::internal("substitution reported as duplicate but not found")
                    })?;
                self.existing_outcome(existing).await
            }
            Err(error) => {
                warn!(event_group_id = %group, error = %error, "substitution record failed");
                Err(Error::substitution_failed(format!(
                    "could not record the substitution: {error}"
                ))
                .with_details(json!({
                    "step": "record_substitution",
                    "created": replacement_guest_ids,
                })))
            }
        }
    }
}

#[cfg(test)]
#[path = "substitution_service_tests.rs"]
mod tests;
