//! Confirmation email composition and dispatch.
//!
//! The dispatcher never retries. Callers treat a failed send as a warning
//! because the registration it confirms is already durable.

use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use super::ports::{ConfirmationMailer, ConfirmationMailerError};
use super::{EmailAddress, Event, Guest};

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Render an instant as a Spanish long date in the given offset.
///
/// # Examples
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use registration_backend::domain::format_event_date;
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 15, 23, 30, 0).unwrap();
/// let lima = FixedOffset::west_opt(5 * 3600).unwrap();
/// assert_eq!(format_event_date(at, lima), "15 de enero de 2025, 18:30");
/// ```
pub fn format_event_date(at: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = at.with_timezone(&offset);
    let month = MONTHS_ES
        .get(local.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!(
        "{} de {} de {}, {:02}:{:02}",
        local.day(),
        month,
        local.year(),
        local.hour(),
        local.minute()
    )
}

/// Dynamic template data for the confirmation email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationFields {
    pub first_name: String,
    pub register_link: String,
    pub estimado: String,
    pub apodo: String,
    pub event_name: String,
    pub event_place: String,
    pub event_date: String,
    pub event_program: String,
}

/// Fully addressed confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEmail {
    pub to: EmailAddress,
    pub template_id: String,
    pub fields: ConfirmationFields,
}

/// Static inputs shared by every confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationTemplate {
    /// Provider template id. `None` disables sending.
    pub template_id: Option<String>,
    /// Base of the personal link back to the invitations page.
    pub register_link_base: Url,
    /// Offset used to render event dates.
    pub display_offset: FixedOffset,
}

impl ConfirmationTemplate {
    /// Personal link `{base}/{percent-encoded email}`.
    pub fn register_link(&self, email: &EmailAddress) -> String {
        let mut link = self.register_link_base.clone();
        if let Ok(mut segments) = link.path_segments_mut() {
            segments.pop_if_empty().push(email.as_str());
        }
        link.to_string()
    }

    /// Compose the email confirming `guest`'s seat at `event`.
    pub fn compose(&self, guest: &Guest, event: &Event) -> Option<ConfirmationEmail> {
        let template_id = self.template_id.clone()?;
        let (estimado, apodo) = guest.salutation();
        Some(ConfirmationEmail {
            to: guest.email.clone(),
            template_id,
            fields: ConfirmationFields {
                first_name: guest.display_name(),
                register_link: self.register_link(&guest.email),
                estimado,
                apodo,
                event_name: event.name.clone(),
                event_place: event.place.clone(),
                event_date: format_event_date(event.scheduled_at, self.display_offset),
                event_program: event.description.as_str().to_owned(),
            },
        })
    }
}

/// Sends registration confirmations through the mail port.
#[derive(Clone)]
pub struct NotificationDispatcher {
    mailer: Arc<dyn ConfirmationMailer>,
    template: ConfirmationTemplate,
}

impl NotificationDispatcher {
    /// Create a dispatcher over a mail adapter.
    pub fn new(mailer: Arc<dyn ConfirmationMailer>, template: ConfirmationTemplate) -> Self {
        Self { mailer, template }
    }

    /// Send the confirmation for `guest` and `event`. Failures are logged
    /// and returned; nothing is retried.
    pub async fn send_confirmation(
        &self,
        guest: &Guest,
        event: &Event,
    ) -> Result<(), ConfirmationMailerError> {
        let Some(email) = self.template.compose(guest, event) else {
            warn!(guest_id = %guest.id, "confirmation template not configured");
            return Err(ConfirmationMailerError::not_configured());
        };
        match self.mailer.send(&email).await {
            Ok(()) => {
                info!(guest_id = %guest.id, event_id = %event.id, "confirmation email sent");
                Ok(())
            }
            Err(error) => {
                warn!(
                    guest_id = %guest.id,
                    event_id = %event.id,
                    error = %error,
                    "confirmation email failed"
                );
                Err(error)
            }
        }
    }
}
