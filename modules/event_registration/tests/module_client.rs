mod common;

use db::{ConnectOpts, DbHandle};
use uuid::Uuid;

use common::{form, new_event};
use event_registration::model::{EventCategory, NewAccount, TimeFilter};
use event_registration::{EventRegistration, EventRegistrationConfig, EventRegistrationError};

async fn started_module() -> EventRegistration {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect");
    let module = EventRegistration::new();
    module.migrate(&db).await.expect("migrate");
    // Applying twice is a no-op
    module.migrate(&db).await.expect("migrate again");
    module.init(&EventRegistrationConfig::default(), &db);
    module
}

#[test]
fn uninitialized_module_reports_missing_service() {
    let module = EventRegistration::new();
    assert!(module.service().is_err());
    assert!(module.client().is_err());
    assert!(module.router().is_err());
}

#[tokio::test]
async fn local_client_exposes_contract_errors() {
    let module = started_module().await;
    let client = module.client().expect("client");

    let org = client
        .sign_up(NewAccount {
            email: "host@example.com".into(),
            full_name: "Grace Hopper".into(),
            is_organizer: true,
        })
        .await
        .unwrap();
    let user = client
        .sign_up(NewAccount {
            email: "guest@example.com".into(),
            full_name: "Alan Turing".into(),
            is_organizer: false,
        })
        .await
        .unwrap();
    let other = client
        .sign_up(NewAccount {
            email: "late@example.com".into(),
            full_name: "Edsger Dijkstra".into(),
            is_organizer: false,
        })
        .await
        .unwrap();

    let dup = client
        .sign_up(NewAccount {
            email: "HOST@example.com".into(),
            full_name: "Someone Else".into(),
            is_organizer: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(dup, EventRegistrationError::AccountExists { .. }));

    let event = client
        .create_event(Some(org.id), new_event("Compilers", EventCategory::Workshop, 1, 3))
        .await
        .unwrap();

    let reg = client.register(Some(user.id), event.id, form()).await.unwrap();
    let full = client
        .register(Some(other.id), event.id, form())
        .await
        .unwrap_err();
    assert_eq!(full, EventRegistrationError::EventFull { id: event.id });
    assert!(!full.is_retryable());

    let details = client.get_event(event.id).await.unwrap();
    assert_eq!(details.registered_count, 1);
    assert_eq!(client.list_for_event(event.id).await.unwrap().len(), 1);
    assert_eq!(
        client
            .list_for_user(user.id, TimeFilter::Upcoming)
            .await
            .unwrap()
            .len(),
        1
    );

    let not_owner = client.cancel(Some(other.id), reg.id).await.unwrap_err();
    assert_eq!(not_owner, EventRegistrationError::NotOwner { id: reg.id });
    client.cancel(Some(user.id), reg.id).await.unwrap();

    let missing = Uuid::new_v4();
    assert_eq!(
        client.get_event(missing).await.unwrap_err(),
        EventRegistrationError::NotFound {
            resource: "Event",
            id: missing
        }
    );
    assert_eq!(
        client.cancel(None, reg.id).await.unwrap_err(),
        EventRegistrationError::Unauthenticated
    );

    let identity = client.current_identity(Some(org.id)).await.unwrap().unwrap();
    assert!(identity.is_organizer);
    assert!(client.toggle_favorite(Some(user.id), event.id).await.unwrap());
    let comment = client
        .add_comment(Some(user.id), event.id, "  See you there  ".into())
        .await
        .unwrap();
    assert_eq!(comment.content, "See you there");

    client.delete_event(Some(org.id), event.id).await.unwrap();
    assert!(client.get_event(event.id).await.is_err());
}
