use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use axum::Router;
use db::DbHandle;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::api::rest::{openapi, routes};
use crate::config::EventRegistrationConfig;
use crate::contract::client::EventRegistrationApi;
use crate::domain::clock::SystemClock;
use crate::domain::service::{Ports, Service, ServiceConfig};
use crate::gateways::local::EventRegistrationLocalClient;
use crate::infra::storage::{migrations::Migrator, SeaOrmStore};

/// Module handle: owns the service once `init` has run.
#[derive(Default)]
pub struct EventRegistration {
    service: ArcSwapOption<Service>,
}

impl EventRegistration {
    pub const NAME: &'static str = "event_registration";

    pub fn new() -> Self {
        Self::default()
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self, db: &DbHandle) -> anyhow::Result<()> {
        info!("Running event_registration database migrations");
        let conn = db.sea();
        Migrator::up(&conn, None)
            .await
            .context("event_registration migrations failed")?;
        info!("event_registration database migrations completed successfully");
        Ok(())
    }

    /// Build the service on top of `db`.
    pub fn init(&self, cfg: &EventRegistrationConfig, db: &DbHandle) {
        info!(
            max_capacity = cfg.max_capacity,
            lock_timeout = ?cfg.lock_timeout,
            "Initializing event_registration module"
        );
        let store = Arc::new(SeaOrmStore::new(db.sea()));
        let service = Service::new(
            Ports::from_store(store),
            Arc::new(SystemClock),
            ServiceConfig::from(cfg),
        );
        self.service.store(Some(Arc::new(service)));
    }

    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .context("event_registration service not initialized")
    }

    /// In-process client for other modules.
    pub fn client(&self) -> anyhow::Result<Arc<dyn EventRegistrationApi>> {
        Ok(Arc::new(EventRegistrationLocalClient::new(self.service()?)))
    }

    pub fn router(&self) -> anyhow::Result<Router> {
        Ok(routes::router(self.service()?))
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        openapi::document()
    }
}
