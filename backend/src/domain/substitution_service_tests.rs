//! Tests for substitution tracking and the substitution flow.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{GuestRepositoryError, MockGuestRepository, MockSubstitutionRepository};
use crate::domain::{ErrorCode, Guest, ListId};

const GROUP: EventGroupId = EventGroupId::new(7);

fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(raw).expect("email")
}

fn original_guest(id: i64, list: i64) -> Guest {
    Guest {
        id: GuestId::new(id),
        email: email("a@x.com"),
        name: "Ana".to_owned(),
        sponsored: false,
        executive: None,
        list_id: ListId::new(list),
        event_group_id: GROUP,
        company: Some("Apoyo".to_owned()),
        guest_type: None,
        webinar_email: None,
    }
}

fn stored_from(new_guest: &NewGuest, id: i64) -> Guest {
    Guest {
        id: GuestId::new(id),
        email: new_guest.email.clone(),
        name: new_guest.name.clone(),
        sponsored: false,
        executive: None,
        list_id: new_guest.list_id,
        event_group_id: GROUP,
        company: new_guest.company.clone(),
        guest_type: Some(new_guest.guest_type.clone()),
        webinar_email: None,
    }
}

fn mapping() -> Substitution {
    Substitution {
        event_group_id: GROUP,
        original_email: email("a@x.com"),
        new_email: email("b@x.com"),
        new_name: "Beto".to_owned(),
    }
}

#[fixture]
fn request() -> SubstitutionRequest {
    SubstitutionRequest {
        event_group_id: Some(GROUP),
        original_email: email("a@x.com"),
        new_email: email("b@x.com"),
        new_name: " Beto ".to_owned(),
    }
}

fn no_chain(subs: &mut MockSubstitutionRepository) {
    subs.expect_find_by_replacement()
        .return_once(|_, _| Ok(None));
}

fn no_onward_mapping(subs: &mut MockSubstitutionRepository) {
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("b@x.com")))
        .return_once(|_, _| Ok(None));
}

fn service(
    guests: MockGuestRepository,
    subs: MockSubstitutionRepository,
) -> SubstitutionService<MockGuestRepository, MockSubstitutionRepository> {
    SubstitutionService::new(Arc::new(guests), Arc::new(subs), None)
}

#[rstest]
#[tokio::test]
async fn tracker_redirects_to_replacement() {
    let mut subs = MockSubstitutionRepository::new();
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(Some(mapping())));
    let tracker = SubstitutionTracker::new(Arc::new(subs));

    let identity = tracker
        .resolve_active_identity(GROUP, &email("a@x.com"))
        .await
        .expect("lookup succeeds");

    assert!(identity.replaced);
    assert_eq!(identity.effective_email, email("b@x.com"));
    assert_eq!(identity.replacement_name.as_deref(), Some("Beto"));
}

#[rstest]
#[tokio::test]
async fn tracker_keeps_original_without_mapping() {
    let mut subs = MockSubstitutionRepository::new();
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(None));
    let tracker = SubstitutionTracker::new(Arc::new(subs));

    let identity = tracker
        .resolve_active_identity(GROUP, &email("a@x.com"))
        .await
        .expect("lookup succeeds");

    assert_eq!(identity, ActiveIdentity::original(email("a@x.com")));
}

#[rstest]
#[tokio::test]
async fn creates_one_replacement_per_membership(request: SubstitutionRequest) {
    let mut guests = MockGuestRepository::new();
    guests
        .expect_find_by_email()
        .with(eq(email("a@x.com")), eq(Some(GROUP)))
        .return_once(|_, _| Ok(vec![original_guest(1, 10), original_guest(2, 20)]));
    let mut next_id = 100;
    guests.expect_insert().times(2).returning(move |new_guest| {
        assert_eq!(new_guest.guest_type, "Reemplazo");
        assert_eq!(new_guest.name, "Beto");
        assert_eq!(new_guest.company.as_deref(), Some("Apoyo"));
        next_id += 1;
        Ok(stored_from(new_guest, next_id))
    });

    let mut subs = MockSubstitutionRepository::new();
    no_chain(&mut subs);
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(None));
    no_onward_mapping(&mut subs);
    subs.expect_record()
        .times(1)
        .returning(|new| Ok(new.clone().into()));

    let outcome = service(guests, subs)
        .substitute(request)
        .await
        .expect("substitution succeeds");

    assert!(outcome.created);
    assert_eq!(
        outcome.replacement_guest_ids,
        vec![GuestId::new(101), GuestId::new(102)]
    );
    assert_eq!(outcome.substitution.new_name, "Beto");
}

#[rstest]
#[tokio::test]
async fn second_substitution_returns_existing_mapping(request: SubstitutionRequest) {
    let mut guests = MockGuestRepository::new();
    guests
        .expect_find_by_email()
        .with(eq(email("b@x.com")), eq(Some(GROUP)))
        .return_once(|_, _| {
            let mut replacement = original_guest(55, 10);
            replacement.email = email("b@x.com");
            Ok(vec![replacement])
        });
    guests.expect_insert().never();

    let mut subs = MockSubstitutionRepository::new();
    no_chain(&mut subs);
    subs.expect_find_by_original()
        .return_once(|_, _| Ok(Some(mapping())));
    subs.expect_record().never();

    let mut second = request;
    second.new_email = email("c@x.com");
    let outcome = service(guests, subs)
        .substitute(second)
        .await
        .expect("existing mapping returned");

    assert!(!outcome.created);
    assert_eq!(outcome.substitution.new_email, email("b@x.com"));
    assert_eq!(outcome.replacement_guest_ids, vec![GuestId::new(55)]);
}

#[rstest]
#[tokio::test]
async fn chained_substitution_is_a_conflict(request: SubstitutionRequest) {
    let guests = MockGuestRepository::new();
    let mut subs = MockSubstitutionRepository::new();
    subs.expect_find_by_replacement()
        .return_once(|_, _| Ok(Some(mapping())));
    subs.expect_record().never();

    let error = service(guests, subs)
        .substitute(request)
        .await
        .expect_err("chained substitution rejected");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn replacement_already_delegated_is_a_conflict(request: SubstitutionRequest) {
    let mut guests = MockGuestRepository::new();
    guests.expect_find_by_email().never();
    guests.expect_insert().never();
    let mut subs = MockSubstitutionRepository::new();
    no_chain(&mut subs);
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(None));
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("b@x.com")))
        .return_once(|_, _| {
            Ok(Some(Substitution {
                event_group_id: GROUP,
                original_email: email("b@x.com"),
                new_email: email("c@x.com"),
                new_name: "Carla".to_owned(),
            }))
        });
    subs.expect_record().never();

    let error = service(guests, subs)
        .substitute(request)
        .await
        .expect_err("delegated replacement rejected");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().expect("details")["replacementEmail"],
        "c@x.com"
    );
}

#[rstest]
#[tokio::test]
async fn unknown_original_is_not_found(request: SubstitutionRequest) {
    let mut guests = MockGuestRepository::new();
    guests.expect_find_by_email().return_once(|_, _| Ok(vec![]));
    let mut subs = MockSubstitutionRepository::new();
    no_chain(&mut subs);
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(None));
    no_onward_mapping(&mut subs);
    subs.expect_record().never();

    let error = service(guests, subs)
        .substitute(request)
        .await
        .expect_err("no original guest");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn insert_failure_aborts_before_recording(request: SubstitutionRequest) {
    let mut guests = MockGuestRepository::new();
    guests
        .expect_find_by_email()
        .return_once(|_, _| Ok(vec![original_guest(1, 10), original_guest(2, 20)]));
    let mut calls = 0;
    guests.expect_insert().times(2).returning(move |new_guest| {
        calls += 1;
        if calls == 1 {
            Ok(stored_from(new_guest, 101))
        } else {
            Err(GuestRepositoryError::query("constraint"))
        }
    });
    let mut subs = MockSubstitutionRepository::new();
    no_chain(&mut subs);
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(None));
    no_onward_mapping(&mut subs);
    subs.expect_record().never();

    let error = service(guests, subs)
        .substitute(request)
        .await
        .expect_err("insert fails");

    assert_eq!(error.code(), ErrorCode::SubstitutionFailed);
    let details = error.details().expect("details");
    assert_eq!(details["step"], "create_guest");
    assert_eq!(details["created"], serde_json::json!([101]));
}

#[rstest]
#[tokio::test]
async fn record_failure_reports_created_guests(request: SubstitutionRequest) {
    let mut guests = MockGuestRepository::new();
    guests
        .expect_find_by_email()
        .return_once(|_, _| Ok(vec![original_guest(1, 10)]));
    guests
        .expect_insert()
        .returning(|new_guest| Ok(stored_from(new_guest, 101)));
    let mut subs = MockSubstitutionRepository::new();
    no_chain(&mut subs);
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(None));
    no_onward_mapping(&mut subs);
    subs.expect_record()
        .return_once(|_| Err(SubstitutionRepositoryError::connection("reset")));

    let error = service(guests, subs)
        .substitute(request)
        .await
        .expect_err("record fails");

    assert_eq!(error.code(), ErrorCode::SubstitutionFailed);
    assert_eq!(
        error.details().expect("details")["step"],
        "record_substitution"
    );
}

#[rstest]
#[tokio::test]
async fn racing_record_returns_winning_mapping(request: SubstitutionRequest) {
    let mut guests = MockGuestRepository::new();
    guests
        .expect_find_by_email()
        .with(eq(email("a@x.com")), eq(Some(GROUP)))
        .return_once(|_, _| Ok(vec![original_guest(1, 10)]));
    guests
        .expect_find_by_email()
        .with(eq(email("b@x.com")), eq(Some(GROUP)))
        .return_once(|_, _| Ok(vec![]));
    guests
        .expect_insert()
        .returning(|new_guest| Ok(stored_from(new_guest, 101)));
    let mut subs = MockSubstitutionRepository::new();
    no_chain(&mut subs);
    let mut lookups = 0;
    subs.expect_find_by_original()
        .with(eq(GROUP), eq(email("a@x.com")))
        .times(2)
        .returning(move |_, _| {
            lookups += 1;
            Ok((lookups > 1).then(mapping))
        });
    no_onward_mapping(&mut subs);
    subs.expect_record()
        .return_once(|_| Err(SubstitutionRepositoryError::duplicate()));

    let outcome = service(guests, subs)
        .substitute(request)
        .await
        .expect("race resolves to the recorded mapping");

    assert!(!outcome.created);
    assert_eq!(outcome.substitution, mapping());
}

#[rstest]
#[case::same_email("a@x.com", "Beto", Some(GROUP))]
#[case::blank_name("b@x.com", "  ", Some(GROUP))]
#[case::no_group("b@x.com", "Beto", None)]
#[tokio::test]
async fn rejects_invalid_requests(
    #[case] new_email: &str,
    #[case] new_name: &str,
    #[case] group: Option<EventGroupId>,
) {
    let request = SubstitutionRequest {
        event_group_id: group,
        original_email: email("a@x.com"),
        new_email: email(new_email),
        new_name: new_name.to_owned(),
    };

    let error = service(MockGuestRepository::new(), MockSubstitutionRepository::new())
        .substitute(request)
        .await
        .expect_err("invalid request");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn default_group_applies_when_request_omits_it(mut request: SubstitutionRequest) {
    request.event_group_id = None;
    let guests = MockGuestRepository::new();
    let mut subs = MockSubstitutionRepository::new();
    subs.expect_find_by_replacement()
        .with(eq(GROUP), eq(email("a@x.com")))
        .return_once(|_, _| Ok(Some(mapping())));
    let service = SubstitutionService::new(Arc::new(guests), Arc::new(subs), Some(GROUP));

    let error = service
        .substitute(request)
        .await
        .expect_err("chained substitution rejected");

    assert_eq!(error.code(), ErrorCode::Conflict);
}
