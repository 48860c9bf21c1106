//! Diesel row structs and their conversion into domain values.
//!
//! Rows never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{event, event_guest, executive, guest, guest_event_view, substitution};
use crate::domain::{
    EmailAddress, EmailValidationError, Event, EventGroupId, EventId, Executive, ExecutiveId,
    Guest, GuestId, ListId, Modality, NewGuest, SanitizedHtml, Substitution,
};

/// Stored data that does not satisfy a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RowConversionError {
    #[error("{table} row {id} has an invalid email: {source}")]
    Email {
        table: &'static str,
        id: i64,
        #[source]
        source: EmailValidationError,
    },
    #[error("event {id} has unknown modality `{value}`")]
    Modality { id: i64, value: String },
}

fn parse_email(
    table: &'static str,
    id: i64,
    raw: String,
) -> Result<EmailAddress, RowConversionError> {
    EmailAddress::parse(raw).map_err(|source| RowConversionError::Email { table, id, source })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = executive)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExecutiveRow {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub salutation: Option<String>,
}

impl From<ExecutiveRow> for Executive {
    fn from(row: ExecutiveRow) -> Self {
        Self {
            id: ExecutiveId::new(row.id),
            name: row.name,
            last_name: row.last_name,
            nickname: row.nickname,
            salutation: row.salutation,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guest)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GuestRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub is_user: bool,
    pub list_id: i64,
    pub company: Option<String>,
    pub guest_type: Option<String>,
    pub zoom_email: Option<String>,
}

impl GuestRow {
    /// Assemble a domain guest from the row and its joined columns.
    ///
    /// A malformed stored webinar email is dropped rather than failing the
    /// whole guest.
    pub fn into_guest(
        self,
        event_group_id: i64,
        executive: Option<ExecutiveRow>,
    ) -> Result<Guest, RowConversionError> {
        let email = parse_email("guest", self.id, self.email)?;
        Ok(Guest {
            id: GuestId::new(self.id),
            email,
            name: self.name,
            sponsored: self.is_user,
            executive: executive.map(Executive::from),
            list_id: ListId::new(self.list_id),
            event_group_id: EventGroupId::new(event_group_id),
            company: self.company,
            guest_type: self.guest_type,
            webinar_email: self
                .zoom_email
                .and_then(|raw| EmailAddress::parse(raw).ok()),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guest)]
pub(crate) struct NewGuestRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub is_user: bool,
    pub list_id: i64,
    pub company: Option<&'a str>,
    pub guest_type: &'a str,
}

impl<'a> From<&'a NewGuest> for NewGuestRow<'a> {
    fn from(new_guest: &'a NewGuest) -> Self {
        Self {
            email: new_guest.email.as_str(),
            name: &new_guest.name,
            is_user: false,
            list_id: new_guest.list_id.get(),
            company: new_guest.company.as_deref(),
            guest_type: &new_guest.guest_type,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = event)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: i64,
    pub name: String,
    pub event_type: String,
    pub date_hour: DateTime<Utc>,
    pub place: String,
    pub register_open: bool,
    pub html_description: Option<String>,
    pub zoom_webinar: Option<String>,
}

impl TryFrom<EventRow> for Event {
    type Error = RowConversionError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let modality = row
            .event_type
            .parse::<Modality>()
            .map_err(|_| RowConversionError::Modality {
                id: row.id,
                value: row.event_type.clone(),
            })?;
        Ok(Self {
            id: EventId::new(row.id),
            name: row.name,
            modality,
            scheduled_at: row.date_hour,
            place: row.place,
            description: row
                .html_description
                .as_deref()
                .map(SanitizedHtml::from_untrusted)
                .unwrap_or_default(),
            webinar_id: row.zoom_webinar,
            register_open: row.register_open,
        })
    }
}

/// Row of `guest_event_view`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guest_event_view)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConsolidatedEventRow {
    pub event_id: i64,
    pub name: String,
    pub event_type: String,
    pub date_hour: DateTime<Utc>,
    pub place: String,
    pub register_open: bool,
    pub html_description: Option<String>,
    pub zoom_webinar: Option<String>,
    pub registered: bool,
}

impl ConsolidatedEventRow {
    /// Split into the event row and its registration flag.
    pub fn into_parts(self) -> (EventRow, bool) {
        (
            EventRow {
                id: self.event_id,
                name: self.name,
                event_type: self.event_type,
                date_hour: self.date_hour,
                place: self.place,
                register_open: self.register_open,
                html_description: self.html_description,
                zoom_webinar: self.zoom_webinar,
            },
            self.registered,
        )
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = event_guest)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventGuestRow {
    pub guest_id: i64,
    pub event_id: i64,
    pub registered: bool,
    pub zoom_email: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = event_guest)]
pub(crate) struct NewEventGuestRow<'a> {
    pub guest_id: i64,
    pub event_id: i64,
    pub registered: bool,
    pub zoom_email: Option<&'a str>,
}

/// Upsert changeset. `None` fields are skipped so a stored webinar email
/// survives a re-registration without one.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = event_guest)]
pub(crate) struct EventGuestUpdate<'a> {
    pub registered: bool,
    pub zoom_email: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = substitution)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubstitutionRow {
    pub id: i64,
    pub event_group_id: i64,
    pub original_email: String,
    pub new_email: String,
    pub new_name: String,
}

impl TryFrom<SubstitutionRow> for Substitution {
    type Error = RowConversionError;

    fn try_from(row: SubstitutionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            event_group_id: EventGroupId::new(row.event_group_id),
            original_email: parse_email("substitution", row.id, row.original_email)?,
            new_email: parse_email("substitution", row.id, row.new_email)?,
            new_name: row.new_name,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = substitution)]
pub(crate) struct NewSubstitutionRow<'a> {
    pub event_group_id: i64,
    pub original_email: &'a str,
    pub new_email: &'a str,
    pub new_name: &'a str,
}
