//! Port for substitution mappings.

use async_trait::async_trait;

use crate::domain::{EmailAddress, EventGroupId, NewSubstitution, Substitution};

use super::define_port_error;

define_port_error! {
    /// Errors raised by substitution repository adapters.
    pub enum SubstitutionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "substitution repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "substitution repository query failed: {message}",
        /// A mapping already exists for the group and original email.
        Duplicate =>
            "substitution already recorded for this guest and event group",
    }
}

/// Port for reading and recording substitutions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubstitutionRepository: Send + Sync {
    /// Mapping that replaces `original_email` within the group.
    async fn find_by_original(
        &self,
        event_group_id: EventGroupId,
        original_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError>;

    /// Mapping whose replacement is `new_email` within the group.
    async fn find_by_replacement(
        &self,
        event_group_id: EventGroupId,
        new_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError>;

    /// Record a mapping. Fails with
    /// [`SubstitutionRepositoryError::Duplicate`] when one already exists.
    async fn record(
        &self,
        substitution: &NewSubstitution,
    ) -> Result<Substitution, SubstitutionRepositoryError>;
}

/// Fixture implementation with no substitutions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubstitutionRepository;

#[async_trait]
impl SubstitutionRepository for FixtureSubstitutionRepository {
    async fn find_by_original(
        &self,
        _event_group_id: EventGroupId,
        _original_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError> {
        Ok(None)
    }

    async fn find_by_replacement(
        &self,
        _event_group_id: EventGroupId,
        _new_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError> {
        Ok(None)
    }

    async fn record(
        &self,
        substitution: &NewSubstitution,
    ) -> Result<Substitution, SubstitutionRepositoryError> {
        Ok(substitution.clone().into())
    }
}
