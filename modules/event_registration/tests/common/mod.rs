#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use db::{ConnectOpts, DbHandle};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use event_registration::domain::clock::Clock;
use event_registration::domain::retry::RetryPolicy;
use event_registration::domain::service::{Ports, Service, ServiceConfig};
use event_registration::infra::storage::{migrations::Migrator, SeaOrmStore};
use event_registration::model::{
    Event, EventCategory, NewAccount, NewEvent, RegistrationForm,
};

/// Clock the tests move by hand.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Mutex::new(at))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
}

pub fn fast_config() -> ServiceConfig {
    ServiceConfig {
        lock_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        },
        ..ServiceConfig::default()
    }
}

/// Fresh in-memory database with the schema applied.
pub async fn test_db() -> DbHandle {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db.sea(), None)
        .await
        .expect("Failed to run migrations");
    db
}

pub struct Harness {
    pub db: DbHandle,
    pub store: Arc<SeaOrmStore>,
    pub clock: Arc<TestClock>,
    pub service: Arc<Service>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_ports(|ports, _| ports, fast_config()).await
    }

    pub async fn with_config(config: ServiceConfig) -> Self {
        Self::with_ports(|ports, _| ports, config).await
    }

    /// Start from SeaORM-backed ports and let the test swap some of them.
    pub async fn with_ports(
        customize: impl FnOnce(Ports, Arc<SeaOrmStore>) -> Ports,
        config: ServiceConfig,
    ) -> Self {
        let db = test_db().await;
        let store = Arc::new(SeaOrmStore::new(db.sea()));
        let clock = Arc::new(TestClock::new(start_time()));
        let ports = customize(Ports::from_store(store.clone()), store.clone());
        let service = Arc::new(Service::new(ports, clock.clone(), config));
        Self {
            db,
            store,
            clock,
            service,
        }
    }

    async fn account(&self, organizer: bool) -> Uuid {
        let tag = Uuid::new_v4().simple().to_string();
        self.service
            .sign_up(NewAccount {
                email: format!("user-{tag}@example.com"),
                full_name: format!("User {}", &tag[..6]),
                is_organizer: organizer,
            })
            .await
            .expect("sign up")
            .id
    }

    pub async fn organizer(&self) -> Uuid {
        self.account(true).await
    }

    pub async fn attendee(&self) -> Uuid {
        self.account(false).await
    }

    pub async fn event(&self, organizer: Uuid, capacity: u32) -> Event {
        self.event_with(organizer, new_event("Rust meetup", EventCategory::Meetup, capacity, 7))
            .await
    }

    pub async fn event_with(&self, organizer: Uuid, new_event: NewEvent) -> Event {
        self.service
            .create_event(Some(organizer), new_event)
            .await
            .expect("create event")
    }
}

pub fn new_event(name: &str, category: EventCategory, capacity: u32, in_days: i64) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        description: format!("{name}: talks and hallway track"),
        category,
        capacity,
        scheduled_at: start_time() + chrono::Duration::days(in_days),
        is_featured: false,
        custom_question: None,
    }
}

pub fn form() -> RegistrationForm {
    RegistrationForm {
        full_name: "Ada Lovelace".into(),
        phone_number: "+14155550123".into(),
        custom_answer: None,
    }
}
