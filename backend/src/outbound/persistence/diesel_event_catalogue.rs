//! PostgreSQL-backed `EventCatalogue` with two read strategies.
//!
//! [`EventSource::Joined`] walks `event_list`, `event` and `event_guest`.
//! [`EventSource::Consolidated`] reads the `guest_event_view` view. Both
//! return the same rows for the same data.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{EventCatalogue, EventCatalogueError, InvitedEvent};
use crate::domain::{Event, EventId, Guest};

use super::error_mapping::basic_diesel_error_mapper;
use super::models::{ConsolidatedEventRow, EventRow};
use super::pool::DbPool;
use super::schema::{event, event_guest, event_list, guest_event_view};

basic_diesel_error_mapper!(EventCatalogueError);

/// Which query backs the per-guest event listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSource {
    /// Join the list, event and registration tables.
    #[default]
    Joined,
    /// Read the consolidated view.
    Consolidated,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Joined => "joined",
            Self::Consolidated => "consolidated",
        })
    }
}

/// Raised for an unrecognised event source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event source `{0}` (expected `joined` or `consolidated`)")]
pub struct EventSourceParseError(pub String);

impl FromStr for EventSource {
    type Err = EventSourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "joined" => Ok(Self::Joined),
            "consolidated" => Ok(Self::Consolidated),
            other => Err(EventSourceParseError(other.to_owned())),
        }
    }
}

/// Convert listed rows, skipping events whose stored data is unusable.
fn into_invited_events(
    guest: &Guest,
    rows: impl IntoIterator<Item = (EventRow, bool)>,
) -> Vec<InvitedEvent> {
    rows.into_iter()
        .filter_map(|(row, registered)| match Event::try_from(row) {
            Ok(event) => Some(InvitedEvent { event, registered }),
            Err(error) => {
                warn!(guest_id = %guest.id, error = %error, "skipping unreadable event");
                None
            }
        })
        .collect()
}

/// Diesel implementation of [`EventCatalogue`].
#[derive(Clone)]
pub struct DieselEventCatalogue {
    pool: DbPool,
    source: EventSource,
}

impl DieselEventCatalogue {
    pub fn new(pool: DbPool, source: EventSource) -> Self {
        Self { pool, source }
    }

    async fn joined_rows(&self, guest: &Guest) -> Result<Vec<(EventRow, bool)>, EventCatalogueError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let guest_id = guest.id.get();

        let rows: Vec<(EventRow, Option<bool>)> = event_list::table
            .inner_join(event::table)
            .left_join(
                event_guest::table.on(event_guest::event_id
                    .eq(event_list::event_id)
                    .and(event_guest::guest_id.eq(guest_id))),
            )
            .filter(event_list::list_id.eq(guest.list_id.get()))
            .select((EventRow::as_select(), event_guest::registered.nullable()))
            .order((event::date_hour.asc(), event::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(row, registered)| (row, registered.unwrap_or(false)))
            .collect())
    }

    async fn consolidated_rows(
        &self,
        guest: &Guest,
    ) -> Result<Vec<(EventRow, bool)>, EventCatalogueError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ConsolidatedEventRow> = guest_event_view::table
            .filter(guest_event_view::guest_id.eq(guest.id.get()))
            .select(ConsolidatedEventRow::as_select())
            .order((guest_event_view::date_hour.asc(), guest_event_view::event_id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(ConsolidatedEventRow::into_parts).collect())
    }
}

#[async_trait]
impl EventCatalogue for DieselEventCatalogue {
    async fn events_for_guest(
        &self,
        guest: &Guest,
    ) -> Result<Vec<InvitedEvent>, EventCatalogueError> {
        let rows = match self.source {
            EventSource::Joined => self.joined_rows(guest).await?,
            EventSource::Consolidated => self.consolidated_rows(guest).await?,
        };
        Ok(into_invited_events(guest, rows))
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, EventCatalogueError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EventRow> = event::table
            .find(event_id.get())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Event::try_from)
            .transpose()
            .map_err(|error| EventCatalogueError::query(error.to_string()))
    }
}
