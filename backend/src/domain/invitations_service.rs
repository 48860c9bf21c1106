//! Invitations read path: substitution redirect, guest resolution, event
//! aggregation.
//!
//! The read path never fails a request because of a data-store problem.
//! Missing guests produce an empty view and upstream failures produce a
//! degraded one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::event_aggregator::{ClosedEventPolicy, EventAggregator};
use super::guest_resolver::GuestResolver;
use super::substitution_service::SubstitutionTracker;
use crate::domain::ports::{
    EventCatalogue, GuestRepository, InvitationsQuery, InvitationsRequest, InvitationsView,
    SubstitutionRepository,
};
use crate::domain::{ActiveIdentity, EmailAddress, Error, ErrorCode, EventGroupId, ResolvedGuest};

/// Settings shaping the invitations view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationsSettings {
    /// Group used when a request names none.
    pub current_event_group: Option<EventGroupId>,
    pub closed_events: ClosedEventPolicy,
    /// Address quoted in the closed-registration notice.
    pub help_contact: String,
}

/// Builds [`InvitationsView`] values for the invitations page.
pub struct InvitationsService<G: ?Sized, S: ?Sized, C: ?Sized> {
    resolver: GuestResolver<G>,
    tracker: SubstitutionTracker<S>,
    aggregator: EventAggregator<C>,
    current_event_group: Option<EventGroupId>,
}

impl<G: ?Sized, S: ?Sized, C: ?Sized> InvitationsService<G, S, C> {
    /// Create the service from its three driven ports.
    pub fn new(
        guests: Arc<G>,
        substitutions: Arc<S>,
        catalogue: Arc<C>,
        settings: InvitationsSettings,
    ) -> Self {
        Self {
            resolver: GuestResolver::new(guests),
            tracker: SubstitutionTracker::new(substitutions),
            aggregator: EventAggregator::new(
                catalogue,
                settings.closed_events,
                settings.help_contact,
            ),
            current_event_group: settings.current_event_group,
        }
    }
}

/// Guest records to aggregate and the identity they were found under.
struct Resolution {
    identity: ActiveIdentity,
    guests: Vec<ResolvedGuest>,
}

fn found_or_empty(result: Result<Vec<ResolvedGuest>, Error>) -> Result<Vec<ResolvedGuest>, Error> {
    match result {
        Err(error) if error.code() == ErrorCode::NotFound => Ok(Vec::new()),
        other => other,
    }
}

impl<G, S, C> InvitationsService<G, S, C>
where
    G: GuestRepository + ?Sized,
    S: SubstitutionRepository + ?Sized,
    C: ?Sized,
{
    async fn resolve_in_group(
        &self,
        group: EventGroupId,
        email: &EmailAddress,
    ) -> Result<Resolution, Error> {
        let identity = self.tracker.resolve_active_identity(group, email).await?;
        let guests = found_or_empty(
            self.resolver
                .resolve_guests(&identity.effective_email, Some(group))
                .await,
        )?;
        Ok(Resolution { identity, guests })
    }

    /// Without a group, every group the email belongs to is redirected on
    /// its own. The view reports the first substitution found.
    async fn resolve_across_groups(&self, email: &EmailAddress) -> Result<Resolution, Error> {
        let found = found_or_empty(self.resolver.resolve_guests(email, None).await)?;
        let mut groups: Vec<EventGroupId> = Vec::new();
        for resolved in &found {
            if !groups.contains(&resolved.guest.event_group_id) {
                groups.push(resolved.guest.event_group_id);
            }
        }

        let mut identity = ActiveIdentity::original(email.clone());
        let mut guests = Vec::with_capacity(found.len());
        for group in groups {
            let group_identity = self.tracker.resolve_active_identity(group, email).await?;
            if group_identity.replaced {
                guests.extend(found_or_empty(
                    self.resolver
                        .resolve_guests(&group_identity.effective_email, Some(group))
                        .await,
                )?);
                if !identity.replaced {
                    identity = group_identity;
                }
            } else {
                guests.extend(
                    found
                        .iter()
                        .filter(|resolved| resolved.guest.event_group_id == group)
                        .cloned(),
                );
            }
        }
        Ok(Resolution { identity, guests })
    }
}

#[async_trait]
impl<G, S, C> InvitationsQuery for InvitationsService<G, S, C>
where
    G: GuestRepository + ?Sized,
    S: SubstitutionRepository + ?Sized,
    C: EventCatalogue + ?Sized,
{
    async fn invitations(&self, request: InvitationsRequest) -> Result<InvitationsView, Error> {
        let mut view = InvitationsView::empty(request.email.clone());

        let resolution = match request.event_group_id.or(self.current_event_group) {
            Some(group) => self.resolve_in_group(group, &request.email).await,
            None => self.resolve_across_groups(&request.email).await,
        };
        let Resolution { identity, guests } = match resolution {
            Ok(resolution) => resolution,
            Err(error) => {
                warn!(email = %request.email, error = %error, "invitations lookup failed");
                view.degraded = true;
                return Ok(view);
            }
        };
        view.effective_email = identity.effective_email;
        view.replaced = identity.replaced;
        view.replacement_name = identity.replacement_name.clone();
        if guests.is_empty() {
            return Ok(view);
        }

        view.guest_name = identity
            .replacement_name
            .or_else(|| guests.first().map(|resolved| resolved.display_name.clone()));

        let aggregated = self.aggregator.list_events(&guests).await;
        view.degraded = aggregated.degraded();
        view.events = aggregated.events;
        view.closed_events = aggregated.closed_events;
        view.help_notice = aggregated.help_notice;
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        GuestRepositoryError, InvitedEvent, MockEventCatalogue, MockGuestRepository,
        MockSubstitutionRepository, SubstitutionRepositoryError,
    };
    use crate::domain::{
        Event, EventId, Guest, GuestId, ListId, Modality, SanitizedHtml,
        Substitution,
    };
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    const GROUP: EventGroupId = EventGroupId::new(3);

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::parse(raw).expect("email")
    }

    fn guest(id: i64, raw_email: &str, name: &str) -> Guest {
        Guest {
            id: GuestId::new(id),
            email: email(raw_email),
            name: name.to_owned(),
            sponsored: false,
            executive: None,
            list_id: ListId::new(1),
            event_group_id: GROUP,
            company: None,
            guest_type: None,
            webinar_email: None,
        }
    }

    fn invited(id: i64) -> InvitedEvent {
        InvitedEvent {
            event: Event {
                id: EventId::new(id),
                name: "Foro".to_owned(),
                modality: Modality::Presencial,
                scheduled_at: Utc
                    .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
                    .single()
                    .expect("timestamp"),
                place: "Lima".to_owned(),
                description: SanitizedHtml::default(),
                webinar_id: None,
                register_open: true,
            },
            registered: false,
        }
    }

    #[fixture]
    fn settings() -> InvitationsSettings {
        InvitationsSettings {
            current_event_group: Some(GROUP),
            closed_events: ClosedEventPolicy::ReadOnly,
            help_contact: "help@x.com".to_owned(),
        }
    }

    fn request(raw: &str) -> InvitationsRequest {
        InvitationsRequest {
            email: email(raw),
            event_group_id: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn substitution_redirects_every_lookup(settings: InvitationsSettings) {
        let mut subs = MockSubstitutionRepository::new();
        subs.expect_find_by_original()
            .with(eq(GROUP), eq(email("a@x.com")))
            .return_once(|_, _| {
                Ok(Some(Substitution {
                    event_group_id: GROUP,
                    original_email: email("a@x.com"),
                    new_email: email("b@x.com"),
                    new_name: "Beto".to_owned(),
                }))
            });
        let mut guests = MockGuestRepository::new();
        guests
            .expect_find_by_email()
            .with(eq(email("b@x.com")), eq(Some(GROUP)))
            .return_once(|_, _| Ok(vec![guest(9, "b@x.com", "Beto Ruiz")]));
        let mut catalogue = MockEventCatalogue::new();
        catalogue
            .expect_events_for_guest()
            .withf(|guest| guest.id == GuestId::new(9))
            .return_once(|_| Ok(vec![invited(1)]));
        let service =
            InvitationsService::new(Arc::new(guests), Arc::new(subs), Arc::new(catalogue), settings);

        let view = service
            .invitations(request("a@x.com"))
            .await
            .expect("view builds");

        assert!(view.replaced);
        assert_eq!(view.email, email("a@x.com"));
        assert_eq!(view.effective_email, email("b@x.com"));
        assert_eq!(view.guest_name.as_deref(), Some("Beto"));
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.events[0].guest_id, GuestId::new(9));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_email_yields_empty_view(settings: InvitationsSettings) {
        let mut subs = MockSubstitutionRepository::new();
        subs.expect_find_by_original().return_once(|_, _| Ok(None));
        let mut guests = MockGuestRepository::new();
        guests.expect_find_by_email().return_once(|_, _| Ok(vec![]));
        let mut catalogue = MockEventCatalogue::new();
        catalogue.expect_events_for_guest().never();
        let service =
            InvitationsService::new(Arc::new(guests), Arc::new(subs), Arc::new(catalogue), settings);

        let view = service
            .invitations(request("z@x.com"))
            .await
            .expect("view builds");

        assert_eq!(view, InvitationsView::empty(email("z@x.com")));
    }

    #[rstest]
    #[tokio::test]
    async fn guest_lookup_failure_degrades_view(settings: InvitationsSettings) {
        let mut subs = MockSubstitutionRepository::new();
        subs.expect_find_by_original().return_once(|_, _| Ok(None));
        let mut guests = MockGuestRepository::new();
        guests
            .expect_find_by_email()
            .return_once(|_, _| Err(GuestRepositoryError::connection("down")));
        let service = InvitationsService::new(
            Arc::new(guests),
            Arc::new(subs),
            Arc::new(MockEventCatalogue::new()),
            settings,
        );

        let view = service
            .invitations(request("a@x.com"))
            .await
            .expect("view builds");

        assert!(view.degraded);
        assert!(view.events.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn substitution_lookup_failure_degrades_view(settings: InvitationsSettings) {
        let mut subs = MockSubstitutionRepository::new();
        subs.expect_find_by_original()
            .return_once(|_, _| Err(SubstitutionRepositoryError::query("bad")));
        let mut guests = MockGuestRepository::new();
        guests.expect_find_by_email().never();
        let service = InvitationsService::new(
            Arc::new(guests),
            Arc::new(subs),
            Arc::new(MockEventCatalogue::new()),
            settings,
        );

        let view = service
            .invitations(request("a@x.com"))
            .await
            .expect("view builds");

        assert!(view.degraded);
        assert!(!view.replaced);
    }

    #[rstest]
    #[tokio::test]
    async fn groupless_request_redirects_each_substituted_group(
        mut settings: InvitationsSettings,
    ) {
        const OTHER_GROUP: EventGroupId = EventGroupId::new(4);
        settings.current_event_group = None;
        let mut subs = MockSubstitutionRepository::new();
        subs.expect_find_by_original()
            .with(eq(GROUP), eq(email("a@x.com")))
            .return_once(|_, _| {
                Ok(Some(Substitution {
                    event_group_id: GROUP,
                    original_email: email("a@x.com"),
                    new_email: email("b@x.com"),
                    new_name: "Beto".to_owned(),
                }))
            });
        subs.expect_find_by_original()
            .with(eq(OTHER_GROUP), eq(email("a@x.com")))
            .return_once(|_, _| Ok(None));
        let mut guests = MockGuestRepository::new();
        guests
            .expect_find_by_email()
            .with(eq(email("a@x.com")), eq(None::<EventGroupId>))
            .return_once(|_, _| {
                let mut other = guest(2, "a@x.com", "Ana");
                other.event_group_id = OTHER_GROUP;
                Ok(vec![guest(1, "a@x.com", "Ana"), other])
            });
        guests
            .expect_find_by_email()
            .with(eq(email("b@x.com")), eq(Some(GROUP)))
            .return_once(|_, _| Ok(vec![guest(9, "b@x.com", "Beto Ruiz")]));
        let mut catalogue = MockEventCatalogue::new();
        catalogue
            .expect_events_for_guest()
            .withf(|guest| guest.id == GuestId::new(1))
            .never();
        catalogue
            .expect_events_for_guest()
            .withf(|guest| guest.id == GuestId::new(9))
            .return_once(|_| Ok(vec![invited(1)]));
        catalogue
            .expect_events_for_guest()
            .withf(|guest| guest.id == GuestId::new(2))
            .return_once(|_| Ok(vec![invited(2)]));
        let service =
            InvitationsService::new(Arc::new(guests), Arc::new(subs), Arc::new(catalogue), settings);

        let view = service
            .invitations(request("a@x.com"))
            .await
            .expect("view builds");

        assert!(view.replaced);
        assert!(!view.degraded);
        assert_eq!(view.effective_email, email("b@x.com"));
        assert_eq!(view.guest_name.as_deref(), Some("Beto"));
        let mut guest_ids: Vec<GuestId> = view.events.iter().map(|event| event.guest_id).collect();
        guest_ids.sort_by_key(|id| id.get());
        assert_eq!(guest_ids, vec![GuestId::new(2), GuestId::new(9)]);
    }

    #[rstest]
    #[tokio::test]
    async fn groupless_request_without_substitution_keeps_original(
        mut settings: InvitationsSettings,
    ) {
        settings.current_event_group = None;
        let mut subs = MockSubstitutionRepository::new();
        subs.expect_find_by_original()
            .with(eq(GROUP), eq(email("a@x.com")))
            .return_once(|_, _| Ok(None));
        let mut guests = MockGuestRepository::new();
        guests
            .expect_find_by_email()
            .with(eq(email("a@x.com")), eq(None::<EventGroupId>))
            .return_once(|_, _| Ok(vec![guest(1, "a@x.com", "Ana")]));
        let mut catalogue = MockEventCatalogue::new();
        catalogue
            .expect_events_for_guest()
            .return_once(|_| Ok(vec![invited(1)]));
        let service =
            InvitationsService::new(Arc::new(guests), Arc::new(subs), Arc::new(catalogue), settings);

        let view = service
            .invitations(request("a@x.com"))
            .await
            .expect("view builds");

        assert_eq!(view.guest_name.as_deref(), Some("Ana"));
        assert!(!view.replaced);
        assert!(!view.degraded);
        assert_eq!(view.events.len(), 1);
    }
}
