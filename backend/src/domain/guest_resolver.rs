//! Guest resolution by email.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{GuestRepository, GuestRepositoryError};
use crate::domain::{EmailAddress, Error, EventGroupId, ResolvedGuest};

pub(crate) fn map_guest_repository_error(error: GuestRepositoryError) -> Error {
    match error {
        GuestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("guest repository unavailable: {message}"))
        }
        GuestRepositoryError::Query { message } => {
            Error::internal(format!("guest repository error: {message}"))
        }
    }
}

/// Finds every guest record belonging to an email.
///
/// Records are never collapsed: a guest on two invitation lists yields two
/// [`ResolvedGuest`] values, each aggregated independently downstream.
#[derive(Clone)]
pub struct GuestResolver<R: ?Sized> {
    guests: Arc<R>,
}

impl<R: ?Sized> GuestResolver<R> {
    /// Create a resolver over the guest repository.
    pub fn new(guests: Arc<R>) -> Self {
        Self { guests }
    }
}

impl<R> GuestResolver<R>
where
    R: GuestRepository + ?Sized,
{
    /// Resolve guest records for `email`, optionally scoped to one group.
    ///
    /// Fails with [`crate::domain::ErrorCode::NotFound`] when nothing
    /// matches.
    pub async fn resolve_guests(
        &self,
        email: &EmailAddress,
        event_group_id: Option<EventGroupId>,
    ) -> Result<Vec<ResolvedGuest>, Error> {
        let guests = self
            .guests
            .find_by_email(email, event_group_id)
            .await
            .map_err(map_guest_repository_error)?;

        if guests.is_empty() {
            return Err(Error::not_found(format!("no guest found for {email}")));
        }

        let resolved: Vec<ResolvedGuest> = guests
            .into_iter()
            .filter(|guest| event_group_id.is_none_or(|group| guest.event_group_id == group))
            .map(ResolvedGuest::from)
            .collect();

        if resolved.is_empty() {
            return Err(Error::not_found(format!(
                "no guest found for {email} in the requested event group"
            )));
        }

        debug!(email = %email, records = resolved.len(), "resolved guest records");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockGuestRepository;
    use crate::domain::{ErrorCode, Executive, ExecutiveId, Guest, GuestId, ListId};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn email() -> EmailAddress {
        EmailAddress::parse("a@x.com").expect("email")
    }

    fn guest(id: i64, group: i64) -> Guest {
        Guest {
            id: GuestId::new(id),
            email: email(),
            name: format!("Guest {id}"),
            sponsored: false,
            executive: None,
            list_id: ListId::new(id * 10),
            event_group_id: EventGroupId::new(group),
            company: None,
            guest_type: None,
            webinar_email: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn keeps_every_record_for_the_email() {
        let mut repo = MockGuestRepository::new();
        repo.expect_find_by_email()
            .with(eq(email()), eq(None::<EventGroupId>))
            .times(1)
            .return_once(|_, _| Ok(vec![guest(1, 5), guest(2, 6)]));
        let resolver = GuestResolver::new(Arc::new(repo));

        let resolved = resolver
            .resolve_guests(&email(), None)
            .await
            .expect("guests resolve");

        let ids: Vec<_> = resolved.iter().map(|r| r.guest.id).collect();
        assert_eq!(ids, vec![GuestId::new(1), GuestId::new(2)]);
    }

    #[rstest]
    #[tokio::test]
    async fn filters_to_the_requested_group() {
        let mut repo = MockGuestRepository::new();
        repo.expect_find_by_email()
            .return_once(|_, _| Ok(vec![guest(1, 5), guest(2, 6)]));
        let resolver = GuestResolver::new(Arc::new(repo));

        let resolved = resolver
            .resolve_guests(&email(), Some(EventGroupId::new(6)))
            .await
            .expect("guests resolve");

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].guest.id, GuestId::new(2));
    }

    #[rstest]
    #[tokio::test]
    async fn sponsored_guests_take_the_executive_name() {
        let mut sponsored = guest(1, 5);
        sponsored.sponsored = true;
        sponsored.executive = Some(Executive {
            id: ExecutiveId::new(3),
            name: "Rosa".to_owned(),
            last_name: "Quispe".to_owned(),
            nickname: None,
            salutation: None,
        });
        let mut repo = MockGuestRepository::new();
        repo.expect_find_by_email()
            .return_once(move |_, _| Ok(vec![sponsored]));
        let resolver = GuestResolver::new(Arc::new(repo));

        let resolved = resolver
            .resolve_guests(&email(), None)
            .await
            .expect("guests resolve");

        assert_eq!(resolved[0].display_name, "Rosa Quispe");
    }

    #[rstest]
    #[case::no_records(vec![])]
    #[case::other_group(vec![guest(1, 9)])]
    #[tokio::test]
    async fn reports_not_found(#[case] records: Vec<Guest>) {
        let mut repo = MockGuestRepository::new();
        repo.expect_find_by_email()
            .return_once(move |_, _| Ok(records));
        let resolver = GuestResolver::new(Arc::new(repo));

        let error = resolver
            .resolve_guests(&email(), Some(EventGroupId::new(5)))
            .await
            .expect_err("nothing matches");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case::connection(GuestRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case::query(GuestRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn maps_repository_errors(
        #[case] failure: GuestRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockGuestRepository::new();
        repo.expect_find_by_email()
            .return_once(move |_, _| Err(failure));
        let resolver = GuestResolver::new(Arc::new(repo));

        let error = resolver
            .resolve_guests(&email(), None)
            .await
            .expect_err("repository fails");

        assert_eq!(error.code(), expected);
    }
}
