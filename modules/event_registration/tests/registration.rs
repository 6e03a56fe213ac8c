mod common;

use std::sync::Arc;

use chrono::Duration;
use event_registration::domain::error::DomainError;
use event_registration::domain::repo::RegistrationStore;
use event_registration::model::EventCategory::{Conference, Meetup, Workshop};
use event_registration::model::{RegistrationForm, TimeFilter};
use tokio::task::JoinHandle;
use uuid::Uuid;

use common::{form, new_event, Harness};

async fn join_all<T>(handles: Vec<JoinHandle<T>>) -> Vec<T> {
    let mut out = Vec::with_capacity(handles.len());
    for handle in handles {
        out.push(handle.await.expect("task panicked"));
    }
    out
}

#[tokio::test]
async fn last_seat_goes_to_exactly_one_of_two_concurrent_callers() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 1).await;
    let (a, b) = (h.attendee().await, h.attendee().await);

    let (ra, rb) = tokio::join!(
        h.service.register(Some(a), event.id, form()),
        h.service.register(Some(b), event.id, form()),
    );

    let outcomes = [ra, rb];
    let ok = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1, "outcomes: {outcomes:?}");
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(DomainError::EventFull { id }) if *id == event.id)));

    let details = h.service.get_event(event.id).await.unwrap();
    assert_eq!(details.registered_count, 1);
    assert_eq!(details.event.remaining_capacity, 0);
}

#[tokio::test]
async fn many_concurrent_callers_never_exceed_capacity() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event_id = h.event(org, 3).await.id;

    let mut users = Vec::new();
    for _ in 0..12 {
        users.push(h.attendee().await);
    }

    let handles = users
        .into_iter()
        .map(|u| {
            let svc = Arc::clone(&h.service);
            tokio::spawn(async move { svc.register(Some(u), event_id, form()).await })
        })
        .collect();
    let results = join_all(handles).await;

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    let full = results
        .iter()
        .filter(|r| matches!(r, Err(DomainError::EventFull { .. })))
        .count();
    assert_eq!(admitted, 3);
    assert_eq!(full, 9);
    assert_eq!(h.store.count_registrations(event_id).await.unwrap(), 3);
}

#[tokio::test]
async fn second_registration_by_same_user_is_rejected() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 10).await;
    let a = h.attendee().await;

    h.service.register(Some(a), event.id, form()).await.unwrap();
    let err = h.service.register(Some(a), event.id, form()).await.unwrap_err();
    assert_eq!(
        err,
        DomainError::AlreadyRegistered {
            event_id: event.id,
            user_id: a
        }
    );

    let details = h.service.get_event(event.id).await.unwrap();
    assert_eq!(details.registered_count, 1);
    assert_eq!(details.event.remaining_capacity, 9);
}

#[tokio::test]
async fn full_is_reported_before_duplicate() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 1).await;
    let a = h.attendee().await;

    h.service.register(Some(a), event.id, form()).await.unwrap();
    let err = h.service.register(Some(a), event.id, form()).await.unwrap_err();
    assert_eq!(err, DomainError::EventFull { id: event.id });

    let details = h.service.get_event(event.id).await.unwrap();
    assert_eq!(details.registered_count, 1);
    assert_eq!(details.event.remaining_capacity, 0);
}

#[tokio::test]
async fn duplicate_on_unlimited_event_is_already_registered() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 0).await;
    let a = h.attendee().await;

    h.service.register(Some(a), event.id, form()).await.unwrap();
    let err = h.service.register(Some(a), event.id, form()).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyRegistered { .. }));
}

#[tokio::test]
async fn register_cancel_register_restores_state() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 1).await;
    let a = h.attendee().await;

    let first = h.service.register(Some(a), event.id, form()).await.unwrap();
    h.service.cancel(Some(a), first.id).await.unwrap();

    let after_cancel = h.service.get_event(event.id).await.unwrap();
    assert_eq!(after_cancel.registered_count, 0);
    assert_eq!(after_cancel.event.remaining_capacity, 1);

    let again = h.service.register(Some(a), event.id, form()).await.unwrap();
    assert_ne!(again.id, first.id);
    let details = h.service.get_event(event.id).await.unwrap();
    assert_eq!(details.registered_count, 1);
    assert_eq!(details.event.remaining_capacity, 0);
}

#[tokio::test]
async fn past_event_rejects_registration_without_writing() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 5).await;
    let a = h.attendee().await;

    // Event was a week out; now it is three days behind us.
    h.clock.advance(Duration::days(10));

    let err = h.service.register(Some(a), event.id, form()).await.unwrap_err();
    assert_eq!(err, DomainError::EventEnded { id: event.id });
    assert_eq!(h.store.count_registrations(event.id).await.unwrap(), 0);
    let details = h.service.get_event(event.id).await.unwrap();
    assert_eq!(details.event.remaining_capacity, 5);
}

#[tokio::test]
async fn cancel_by_someone_else_is_not_owner() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 5).await;
    let (a, b) = (h.attendee().await, h.attendee().await);

    let reg = h.service.register(Some(a), event.id, form()).await.unwrap();
    let err = h.service.cancel(Some(b), reg.id).await.unwrap_err();
    assert_eq!(err, DomainError::NotOwner { id: reg.id });
    assert!(h.store.get_registration(reg.id).await.unwrap().is_some());
    assert_eq!(h.service.get_event(event.id).await.unwrap().event.remaining_capacity, 4);
}

#[tokio::test]
async fn cancel_after_event_is_rejected() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 5).await;
    let a = h.attendee().await;
    let reg = h.service.register(Some(a), event.id, form()).await.unwrap();

    h.clock.advance(Duration::days(8));
    let err = h.service.cancel(Some(a), reg.id).await.unwrap_err();
    assert_eq!(err, DomainError::EventAlreadyOccurred { id: event.id });
    assert!(h.store.get_registration(reg.id).await.unwrap().is_some());
}

#[tokio::test]
async fn cancel_twice_reports_missing_registration() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 2).await;
    let a = h.attendee().await;
    let reg = h.service.register(Some(a), event.id, form()).await.unwrap();

    h.service.cancel(Some(a), reg.id).await.unwrap();
    let err = h.service.cancel(Some(a), reg.id).await.unwrap_err();
    assert_eq!(err, DomainError::RegistrationNotFound { id: reg.id });
    assert_eq!(h.service.get_event(event.id).await.unwrap().event.remaining_capacity, 2);
}

#[tokio::test]
async fn churn_keeps_remaining_within_bounds() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 2).await;
    let users = [h.attendee().await, h.attendee().await, h.attendee().await];

    for round in 0..5 {
        let mut held = Vec::new();
        for u in users {
            match h.service.register(Some(u), event.id, form()).await {
                Ok(reg) => held.push((u, reg.id)),
                Err(DomainError::EventFull { .. }) => {}
                Err(other) => panic!("round {round}: unexpected {other:?}"),
            }
            let remaining = h.service.get_event(event.id).await.unwrap().event.remaining_capacity;
            assert!(remaining <= 2, "round {round}: remaining {remaining}");
        }
        assert_eq!(held.len(), 2);
        for (u, id) in held {
            h.service.cancel(Some(u), id).await.unwrap();
            let details = h.service.get_event(event.id).await.unwrap();
            assert!(details.event.remaining_capacity <= 2);
            assert_eq!(
                u64::from(2 - details.event.remaining_capacity),
                details.registered_count
            );
        }
    }
}

#[tokio::test]
async fn unlimited_events_admit_everyone() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 0).await;

    for _ in 0..5 {
        let u = h.attendee().await;
        h.service.register(Some(u), event.id, form()).await.unwrap();
    }
    let details = h.service.get_event(event.id).await.unwrap();
    assert_eq!(details.registered_count, 5);
    assert_eq!(details.event.remaining_capacity, 0);
    assert!(details.event.is_unlimited());
}

#[tokio::test]
async fn anonymous_and_unknown_callers_are_unauthenticated() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let event = h.event(org, 5).await;

    let err = h.service.register(None, event.id, form()).await.unwrap_err();
    assert_eq!(err, DomainError::Unauthenticated);
    let err = h
        .service
        .register(Some(Uuid::new_v4()), event.id, form())
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Unauthenticated);
}

#[tokio::test]
async fn unknown_event_and_bad_form() {
    let h = Harness::new().await;
    let a = h.attendee().await;
    let missing = Uuid::new_v4();

    let err = h.service.register(Some(a), missing, form()).await.unwrap_err();
    assert_eq!(err, DomainError::EventNotFound { id: missing });

    let bad = RegistrationForm {
        phone_number: "call me".into(),
        ..form()
    };
    let err = h.service.register(Some(a), missing, bad).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "phone_number"));
}

#[tokio::test]
async fn user_listing_partitions_by_time() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let a = h.attendee().await;
    let soon = h
        .event_with(org, new_event("Soon", Workshop, 10, 2))
        .await;
    let later = h
        .event_with(org, new_event("Later", Conference, 10, 20))
        .await;
    h.service.register(Some(a), later.id, form()).await.unwrap();
    h.service.register(Some(a), soon.id, form()).await.unwrap();

    let all = h.service.list_for_user(a, TimeFilter::All).await.unwrap();
    let names: Vec<_> = all.iter().map(|r| r.event.name.as_str()).collect();
    assert_eq!(names, ["Soon", "Later"]);

    h.clock.advance(Duration::days(5));
    let upcoming = h.service.list_for_user(a, TimeFilter::Upcoming).await.unwrap();
    let past = h.service.list_for_user(a, TimeFilter::Past).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].event.id, later.id);
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].event.id, soon.id);
}

#[tokio::test]
async fn attendee_list_is_for_the_managing_organizer_only() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let other_org = h.organizer().await;
    let event = h.event(org, 5).await;
    let a = h.attendee().await;
    h.service.register(Some(a), event.id, form()).await.unwrap();

    let list = h
        .service
        .list_registrations_for_event(Some(org), event.id)
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].user_id, a);
    assert_eq!(list[0].full_name, "Ada Lovelace");

    for caller in [other_org, a] {
        let err = h
            .service
            .list_registrations_for_event(Some(caller), event.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
    }
}

#[tokio::test]
async fn recommendations_follow_registered_categories() {
    let h = Harness::new().await;
    let org = h.organizer().await;
    let a = h.attendee().await;

    let attended = h.event_with(org, new_event("Rust meetup", Meetup, 10, 3)).await;
    let next_meetup = h.event_with(org, new_event("Go meetup", Meetup, 10, 4)).await;
    h.event_with(org, new_event("Big conf", Conference, 10, 5)).await;
    h.event_with(org, new_event("Hands-on", Workshop, 10, 6)).await;

    assert!(h.service.recommend_events(a).await.unwrap().is_empty());

    h.service.register(Some(a), attended.id, form()).await.unwrap();
    let recs = h.service.recommend_events(a).await.unwrap();
    let ids: Vec<_> = recs.iter().map(|e| e.id).collect();
    assert_eq!(ids, [next_meetup.id]);
}
