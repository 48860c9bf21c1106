//! Port for events visible to a guest.
//!
//! Adapters implement one data-access strategy each (joined tables or the
//! consolidated view); the aggregator does not know which one it talks to.

use async_trait::async_trait;

use crate::domain::{Event, EventId, Guest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event catalogue adapters.
    pub enum EventCatalogueError {
        /// Catalogue connection could not be established.
        Connection { message: String } =>
            "event catalogue connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "event catalogue query failed: {message}",
    }
}

/// Event on a guest's invitation list with that guest's registration flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitedEvent {
    pub event: Event,
    /// `false` when no registration row exists.
    pub registered: bool,
}

/// Port for reading events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCatalogue: Send + Sync {
    /// Events on `guest`'s invitation list, in store order.
    async fn events_for_guest(&self, guest: &Guest)
    -> Result<Vec<InvitedEvent>, EventCatalogueError>;

    /// Find one event by id.
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, EventCatalogueError>;
}

/// Fixture implementation with no events.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEventCatalogue;

#[async_trait]
impl EventCatalogue for FixtureEventCatalogue {
    async fn events_for_guest(
        &self,
        _guest: &Guest,
    ) -> Result<Vec<InvitedEvent>, EventCatalogueError> {
        Ok(Vec::new())
    }

    async fn find_event(&self, _event_id: EventId) -> Result<Option<Event>, EventCatalogueError> {
        Ok(None)
    }
}
