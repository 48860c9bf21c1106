//! Port for guest identity lookups and the few guest writes this service
//! performs.

use async_trait::async_trait;

use crate::domain::{EmailAddress, EventGroupId, Guest, GuestId, NewGuest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by guest repository adapters.
    pub enum GuestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "guest repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "guest repository query failed: {message}",
    }
}

/// Port for reading and writing guest records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Every guest record for `email`, optionally limited to one event
    /// group. Records are returned in store order with their executive
    /// loaded.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
        event_group_id: Option<EventGroupId>,
    ) -> Result<Vec<Guest>, GuestRepositoryError>;

    /// Find a guest record by id.
    async fn find_by_id(&self, guest_id: GuestId) -> Result<Option<Guest>, GuestRepositoryError>;

    /// Insert a guest record and return it as stored.
    async fn insert(&self, guest: &NewGuest) -> Result<Guest, GuestRepositoryError>;

    /// Attach an alternate webinar address to a guest.
    async fn update_webinar_email(
        &self,
        guest_id: GuestId,
        email: &EmailAddress,
    ) -> Result<(), GuestRepositoryError>;
}

/// Fixture implementation backed by an empty guest list.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGuestRepository;

#[async_trait]
impl GuestRepository for FixtureGuestRepository {
    async fn find_by_email(
        &self,
        _email: &EmailAddress,
        _event_group_id: Option<EventGroupId>,
    ) -> Result<Vec<Guest>, GuestRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, _guest_id: GuestId) -> Result<Option<Guest>, GuestRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _guest: &NewGuest) -> Result<Guest, GuestRepositoryError> {
        Err(GuestRepositoryError::connection(
            "fixture guest repository is read-only",
        ))
    }

    async fn update_webinar_email(
        &self,
        _guest_id: GuestId,
        _email: &EmailAddress,
    ) -> Result<(), GuestRepositoryError> {
        Ok(())
    }
}
