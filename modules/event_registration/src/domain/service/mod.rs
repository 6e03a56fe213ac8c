//! Domain service: every use case of the module, written against the ports
//! in [`crate::domain::repo`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use db::{KeyedLockGuard, KeyedLocks, LockConfig};
use tracing::warn;
use uuid::Uuid;

use crate::config::EventRegistrationConfig;
use crate::contract::model::{Event, Identity};
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::repo::{AccountDirectory, EngagementStore, EventCatalog, RegistrationStore};
use crate::domain::retry::RetryPolicy;

mod accounts;
mod engagement;
mod events;
mod registrations;

const LOCK_NAMESPACE: &str = "event_registration";

/// Service-level knobs, derived from the module config.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_capacity: u32,
    pub featured_limit: u32,
    pub recommendation_limit: u32,
    pub lock_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&EventRegistrationConfig::default())
    }
}

impl From<&EventRegistrationConfig> for ServiceConfig {
    fn from(cfg: &EventRegistrationConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size.max(1),
            max_page_size: cfg.max_page_size.max(1),
            max_capacity: cfg.max_capacity,
            featured_limit: cfg.featured_limit,
            recommendation_limit: cfg.recommendation_limit,
            lock_timeout: cfg.lock_timeout,
            retry: RetryPolicy {
                max_attempts: cfg.retry_attempts.max(1),
                backoff: cfg.retry_backoff,
            },
        }
    }
}

/// The persistence ports the service is wired with.
#[derive(Clone)]
pub struct Ports {
    pub accounts: Arc<dyn AccountDirectory>,
    pub events: Arc<dyn EventCatalog>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub engagement: Arc<dyn EngagementStore>,
}

impl Ports {
    /// All four ports served by one store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AccountDirectory + EventCatalog + RegistrationStore + EngagementStore + 'static,
    {
        Self {
            accounts: store.clone(),
            events: store.clone(),
            registrations: store.clone(),
            engagement: store,
        }
    }
}

pub struct Service {
    accounts: Arc<dyn AccountDirectory>,
    events: Arc<dyn EventCatalog>,
    registrations: Arc<dyn RegistrationStore>,
    engagement: Arc<dyn EngagementStore>,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks<Uuid>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(ports: Ports, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self {
        let locks = KeyedLocks::new(
            LOCK_NAMESPACE,
            LockConfig {
                max_wait: Some(config.lock_timeout),
            },
        );
        Self {
            accounts: ports.accounts,
            events: ports.events,
            registrations: ports.registrations,
            engagement: ports.engagement,
            clock,
            locks,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Idempotent store read with bounded retry on failure.
    async fn read<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.config
            .retry
            .run(op, || {
                let fut = call();
                async move { fut.await.map_err(DomainError::store) }
            })
            .await
    }

    async fn load_event(&self, id: Uuid) -> Result<Event, DomainError> {
        self.read("get_event", move || self.events.get_event(id))
            .await?
            .ok_or_else(|| DomainError::event_not_found(id))
    }

    /// Resolve the caller or fail with `Unauthenticated`.
    pub async fn authenticate(&self, caller: Option<Uuid>) -> Result<Identity, DomainError> {
        self.current_identity(caller)
            .await?
            .ok_or(DomainError::Unauthenticated)
    }

    /// Serialize admission-affecting writes for one event.
    async fn lock_event(&self, event_id: Uuid) -> Result<KeyedLockGuard<Uuid>, DomainError> {
        self.locks.lock(event_id).await.map_err(|e| {
            warn!(%event_id, error = %e, "event lock not acquired");
            DomainError::store_unavailable(e.to_string())
        })
    }
}
