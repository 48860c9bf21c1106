//! Port for the `(guest, event)` registration relation.

use async_trait::async_trait;

use crate::domain::{EventId, GuestId, Registration};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration repository adapters.
    pub enum RegistrationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "registration repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "registration repository query failed: {message}",
    }
}

/// Port for reading and upserting registrations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Registration row for the pair, if one exists.
    async fn find(
        &self,
        guest_id: GuestId,
        event_id: EventId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError>;

    /// Insert or update the row keyed on `(guest_id, event_id)`.
    ///
    /// A `None` webinar email leaves any stored value untouched.
    async fn upsert(&self, registration: &Registration) -> Result<(), RegistrationRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistrationRepository;

#[async_trait]
impl RegistrationRepository for FixtureRegistrationRepository {
    async fn find(
        &self,
        _guest_id: GuestId,
        _event_id: EventId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        Ok(None)
    }

    async fn upsert(&self, _registration: &Registration) -> Result<(), RegistrationRepositoryError> {
        Ok(())
    }
}
