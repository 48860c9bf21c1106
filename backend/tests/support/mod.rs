//! In-memory driven ports for HTTP integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use registration_backend::domain::ports::{
    ConfirmationMailer, ConfirmationMailerError, EventCatalogue, EventCatalogueError,
    GuestRepository, GuestRepositoryError, InvitedEvent, RegistrationRepository,
    RegistrationRepositoryError, SubstitutionRepository, SubstitutionRepositoryError,
    WebinarGateway, WebinarGatewayError, WebinarRegistrant, WebinarToken,
};
use registration_backend::domain::{
    ConfirmationEmail, EmailAddress, Event, EventGroupId, EventId, Guest, GuestId, ListId,
    Modality, NewGuest, NewSubstitution, Registration, SanitizedHtml, Substitution, WebinarSeat,
};

pub const GROUP: EventGroupId = EventGroupId::new(1);
pub const VIRTUAL_EVENT: EventId = EventId::new(10);
pub const IN_PERSON_EVENT: EventId = EventId::new(11);
pub const CLOSED_EVENT: EventId = EventId::new(12);
pub const ANA: GuestId = GuestId::new(1);

fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(raw).expect("email")
}

fn event(id: EventId, modality: Modality, day: u32, register_open: bool) -> Event {
    Event {
        id,
        name: format!("Foro {}", id.get()),
        modality,
        scheduled_at: Utc
            .with_ymd_and_hms(2025, 3, day, 18, 0, 0)
            .single()
            .expect("timestamp"),
        place: match modality {
            Modality::Virtual => "Zoom".to_owned(),
            Modality::Presencial => "Lima".to_owned(),
        },
        description: SanitizedHtml::from_untrusted(r#"<p>Programa<\/p>"#),
        webinar_id: matches!(modality, Modality::Virtual).then(|| "81234567890".to_owned()),
        register_open,
    }
}

/// Guests, events, registrations and substitutions held in memory.
pub struct InMemoryStore {
    guests: Mutex<Vec<Guest>>,
    events: Vec<(ListId, Event)>,
    registrations: Mutex<HashMap<(GuestId, EventId), Registration>>,
    substitutions: Mutex<Vec<Substitution>>,
    next_guest_id: AtomicI64,
}

impl InMemoryStore {
    /// One guest, `ana@example.com`, invited through list 1 to a virtual,
    /// an in-person and a closed event.
    pub fn seeded() -> Self {
        let list = ListId::new(1);
        Self {
            guests: Mutex::new(vec![Guest {
                id: ANA,
                email: email("ana@example.com"),
                name: "Ana Torres".to_owned(),
                sponsored: false,
                executive: None,
                list_id: list,
                event_group_id: GROUP,
                company: Some("Apoyo".to_owned()),
                guest_type: None,
                webinar_email: None,
            }]),
            events: vec![
                (list, event(IN_PERSON_EVENT, Modality::Presencial, 20, true)),
                (list, event(VIRTUAL_EVENT, Modality::Virtual, 10, true)),
                (list, event(CLOSED_EVENT, Modality::Presencial, 5, false)),
            ],
            registrations: Mutex::new(HashMap::new()),
            substitutions: Mutex::new(Vec::new()),
            next_guest_id: AtomicI64::new(100),
        }
    }

    pub fn registration(&self, guest_id: GuestId, event_id: EventId) -> Option<Registration> {
        self.registrations
            .lock()
            .expect("registrations lock")
            .get(&(guest_id, event_id))
            .cloned()
    }

    pub fn guest(&self, guest_id: GuestId) -> Option<Guest> {
        self.guests
            .lock()
            .expect("guests lock")
            .iter()
            .find(|guest| guest.id == guest_id)
            .cloned()
    }
}

#[async_trait]
impl GuestRepository for InMemoryStore {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
        event_group_id: Option<EventGroupId>,
    ) -> Result<Vec<Guest>, GuestRepositoryError> {
        let guests = self.guests.lock().expect("guests lock");
        Ok(guests
            .iter()
            .filter(|guest| &guest.email == email)
            .filter(|guest| event_group_id.is_none_or(|group| guest.event_group_id == group))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, guest_id: GuestId) -> Result<Option<Guest>, GuestRepositoryError> {
        Ok(self.guest(guest_id))
    }

    async fn insert(&self, new_guest: &NewGuest) -> Result<Guest, GuestRepositoryError> {
        let guest = Guest {
            id: GuestId::new(self.next_guest_id.fetch_add(1, Ordering::SeqCst)),
            email: new_guest.email.clone(),
            name: new_guest.name.clone(),
            sponsored: false,
            executive: None,
            list_id: new_guest.list_id,
            event_group_id: GROUP,
            company: new_guest.company.clone(),
            guest_type: Some(new_guest.guest_type.clone()),
            webinar_email: None,
        };
        self.guests
            .lock()
            .expect("guests lock")
            .push(guest.clone());
        Ok(guest)
    }

    async fn update_webinar_email(
        &self,
        guest_id: GuestId,
        email: &EmailAddress,
    ) -> Result<(), GuestRepositoryError> {
        let mut guests = self.guests.lock().expect("guests lock");
        let guest = guests
            .iter_mut()
            .find(|guest| guest.id == guest_id)
            .ok_or_else(|| GuestRepositoryError::query("guest not found"))?;
        guest.webinar_email = Some(email.clone());
        Ok(())
    }
}

#[async_trait]
impl EventCatalogue for InMemoryStore {
    async fn events_for_guest(
        &self,
        guest: &Guest,
    ) -> Result<Vec<InvitedEvent>, EventCatalogueError> {
        let registrations = self.registrations.lock().expect("registrations lock");
        Ok(self
            .events
            .iter()
            .filter(|(list, _)| *list == guest.list_id)
            .map(|(_, event)| InvitedEvent {
                event: event.clone(),
                registered: registrations
                    .get(&(guest.id, event.id))
                    .is_some_and(|registration| registration.registered),
            })
            .collect())
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, EventCatalogueError> {
        Ok(self
            .events
            .iter()
            .map(|(_, event)| event)
            .find(|event| event.id == event_id)
            .cloned())
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryStore {
    async fn find(
        &self,
        guest_id: GuestId,
        event_id: EventId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        Ok(self.registration(guest_id, event_id))
    }

    async fn upsert(&self, registration: &Registration) -> Result<(), RegistrationRepositoryError> {
        let mut registrations = self.registrations.lock().expect("registrations lock");
        let entry = registrations
            .entry((registration.guest_id, registration.event_id))
            .or_insert_with(|| registration.clone());
        entry.registered = registration.registered;
        if registration.webinar_email.is_some() {
            entry.webinar_email = registration.webinar_email.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl SubstitutionRepository for InMemoryStore {
    async fn find_by_original(
        &self,
        event_group_id: EventGroupId,
        original_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError> {
        let substitutions = self.substitutions.lock().expect("substitutions lock");
        Ok(substitutions
            .iter()
            .find(|s| s.event_group_id == event_group_id && &s.original_email == original_email)
            .cloned())
    }

    async fn find_by_replacement(
        &self,
        event_group_id: EventGroupId,
        new_email: &EmailAddress,
    ) -> Result<Option<Substitution>, SubstitutionRepositoryError> {
        let substitutions = self.substitutions.lock().expect("substitutions lock");
        Ok(substitutions
            .iter()
            .find(|s| s.event_group_id == event_group_id && &s.new_email == new_email)
            .cloned())
    }

    async fn record(
        &self,
        substitution: &NewSubstitution,
    ) -> Result<Substitution, SubstitutionRepositoryError> {
        let mut substitutions = self.substitutions.lock().expect("substitutions lock");
        if substitutions.iter().any(|s| {
            s.event_group_id == substitution.event_group_id
                && s.original_email == substitution.original_email
        }) {
            return Err(SubstitutionRepositoryError::duplicate());
        }
        let recorded = Substitution::from(substitution.clone());
        substitutions.push(recorded.clone());
        Ok(recorded)
    }
}

/// Webinar provider that accepts every registrant.
#[derive(Default)]
pub struct RecordingWebinar {
    registrants: Mutex<Vec<(String, WebinarRegistrant)>>,
}

impl RecordingWebinar {
    pub fn registrants(&self) -> Vec<(String, WebinarRegistrant)> {
        self.registrants.lock().expect("registrants lock").clone()
    }
}

#[async_trait]
impl WebinarGateway for RecordingWebinar {
    async fn acquire_token(&self) -> Result<WebinarToken, WebinarGatewayError> {
        Ok(WebinarToken::new("token"))
    }

    async fn create_registrant(
        &self,
        _token: &WebinarToken,
        webinar_id: &str,
        registrant: &WebinarRegistrant,
    ) -> Result<WebinarSeat, WebinarGatewayError> {
        let mut registrants = self.registrants.lock().expect("registrants lock");
        registrants.push((webinar_id.to_owned(), registrant.clone()));
        Ok(WebinarSeat {
            registrant_id: format!("r-{}", registrants.len()),
            join_url: Some(format!("https://zoom.example/j/{webinar_id}")),
        })
    }
}

/// Mail provider that keeps every message.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ConfirmationEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<ConfirmationEmail> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl ConfirmationMailer for RecordingMailer {
    async fn send(&self, email: &ConfirmationEmail) -> Result<(), ConfirmationMailerError> {
        self.sent.lock().expect("sent lock").push(email.clone());
        Ok(())
    }
}
