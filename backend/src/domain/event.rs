//! Events and the per-guest event view.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::GuestId;
use super::guest::numeric_id;

numeric_id!(
    /// Event identifier.
    EventId
);

/// How an event is attended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Modality {
    /// In person at [`Event::place`].
    Presencial,
    /// Hosted on the webinar provider.
    Virtual,
}

impl Modality {
    /// Stored `event_type` value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Presencial => "Presencial",
            Self::Virtual => "Virtual",
        }
    }

    /// Whether attendance requires a webinar seat.
    pub const fn is_virtual(self) -> bool {
        matches!(self, Self::Virtual)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored `event_type` is neither modality.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event modality: {0}")]
pub struct ModalityParseError(pub String);

impl FromStr for Modality {
    type Err = ModalityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Presencial" => Ok(Self::Presencial),
            "Virtual" => Ok(Self::Virtual),
            other => Err(ModalityParseError(other.to_owned())),
        }
    }
}

/// Event description that has passed the HTML allow-list.
///
/// The only constructor runs the sanitiser, so holding a value proves the
/// markup is safe to embed in a page.
///
/// # Examples
/// ```
/// use registration_backend::domain::SanitizedHtml;
///
/// let html = SanitizedHtml::from_untrusted(r#"<p>Hola</p><script>alert(1)</script>"#);
/// assert_eq!(html.as_str(), "<p>Hola</p>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    /// Strip the store's backslash escaping and sanitise the markup.
    pub fn from_untrusted(raw: &str) -> Self {
        let unescaped = raw.replace('\\', "");
        Self(ammonia::clean(&unescaped))
    }

    /// Borrow the sanitised markup.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Event as configured by the organiser. Read-only for this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub modality: Modality,
    pub scheduled_at: DateTime<Utc>,
    pub place: String,
    pub description: SanitizedHtml,
    /// Provider webinar identifier, present for virtual events.
    pub webinar_id: Option<String>,
    pub register_open: bool,
}

/// Event visible to a guest, with that guest's registration state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: EventId,
    /// Guest record to pass back when registering.
    pub guest_id: GuestId,
    pub name: String,
    pub modality: Modality,
    pub scheduled_at: DateTime<Utc>,
    pub place: String,
    pub description_html: SanitizedHtml,
    pub register_open: bool,
    pub registered: bool,
}

impl EventView {
    /// Project an event for the owning guest.
    pub fn new(event: Event, guest_id: GuestId, registered: bool) -> Self {
        Self {
            id: event.id,
            guest_id,
            name: event.name,
            modality: event.modality,
            scheduled_at: event.scheduled_at,
            place: event.place,
            description_html: event.description,
            register_open: event.register_open,
            registered,
        }
    }
}
