//! Ports for the domain layer: the persistence operations the service needs.
//! Object-safe and async-friendly via `async_trait`; failures are `anyhow`
//! and become `StoreUnavailable` in the service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{Account, Comment, Event, EventCategory, Registration};

/// Selection over the event catalog. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Keep events scheduled at or after this instant.
    pub scheduled_from: Option<DateTime<Utc>>,
    pub available_only: bool,
    pub categories: Vec<EventCategory>,
    pub organizer_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub name_contains: Option<String>,
    /// Restrict to these ids when set.
    pub ids: Option<Vec<Uuid>>,
    pub exclude_ids: Vec<Uuid>,
}

/// Offset/limit window, ordered by `scheduled_at` ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A unique key already holds this value.
    Duplicate,
}

/// Result of the atomic admission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The conditional decrement found no seat; nothing was written.
    CapacityExhausted,
    /// The `(event_id, user_id)` key is taken; nothing was written.
    Duplicate,
}

/// Result of an event update; only `Updated` wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    BelowRegistrations { registered: u64 },
    EventMissing,
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_account(&self, id: Uuid) -> anyhow::Result<Option<Account>>;
    /// Insert; a taken email yields `Duplicate`.
    async fn insert_account(&self, account: Account) -> anyhow::Result<InsertOutcome>;
}

#[async_trait]
pub trait EventCatalog: Send + Sync {
    async fn get_event(&self, id: Uuid) -> anyhow::Result<Option<Event>>;
    async fn query_events(&self, filter: &EventFilter, window: Window) -> anyhow::Result<Vec<Event>>;
    async fn insert_event(&self, event: Event) -> anyhow::Result<()>;
    /// Persist the descriptive fields of `event` and, when `capacity` is
    /// given, the new capacity with remaining seats recomputed from the live
    /// count. One transaction.
    async fn update_event(
        &self,
        event: &Event,
        capacity: Option<u32>,
    ) -> anyhow::Result<UpdateOutcome>;
    /// Remove the event with its registrations, comments and favorites.
    async fn delete_event(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn count_registrations(&self, event_id: Uuid) -> anyhow::Result<u64>;
    async fn find_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Registration>>;
    async fn get_registration(&self, id: Uuid) -> anyhow::Result<Option<Registration>>;
    /// Charge a seat (when `charge_capacity`) and insert the row as one atomic step.
    async fn commit_registration(
        &self,
        registration: Registration,
        charge_capacity: bool,
    ) -> anyhow::Result<CommitOutcome>;
    /// Delete the row and give its seat back, bounded by the event capacity.
    /// Returns false if the row was already gone.
    async fn release_registration(&self, registration: &Registration) -> anyhow::Result<bool>;
    async fn list_for_event(&self, event_id: Uuid) -> anyhow::Result<Vec<Registration>>;
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Registration>>;
}

#[async_trait]
pub trait EngagementStore: Send + Sync {
    async fn insert_comment(&self, comment: Comment) -> anyhow::Result<()>;
    /// Newest first.
    async fn list_comments(&self, event_id: Uuid) -> anyhow::Result<Vec<Comment>>;
    /// Flip the favorite mark; returns whether it is set afterwards.
    async fn toggle_favorite(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
    async fn is_favorite(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
    async fn favorite_event_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>>;
}
