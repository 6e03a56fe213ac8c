//! SeaORM adapter implementing every domain port on one connection.
//!
//! Multi-statement writes (seat charge + insert, delete + seat release,
//! resize, cascade delete) each run in a single transaction, and every
//! statement inside one goes through the transaction handle.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use db::is_unique_violation;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use sea_orm::ActiveValue::Set;
use uuid::Uuid;

use crate::contract::model::{Account, Comment, Event, Registration};
use crate::domain::repo::{
    AccountDirectory, CommitOutcome, EngagementStore, EventCatalog, EventFilter, InsertOutcome,
    RegistrationStore, UpdateOutcome, Window,
};
use crate::infra::storage::entity::{account, comment, event, favorite, registration};
use crate::infra::storage::mapper;

#[derive(Clone)]
pub struct SeaOrmStore {
    conn: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

/// `%`, `_` and the escape char itself match literally.
fn like_contains(needle: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn event_condition(filter: &EventFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(from) = filter.scheduled_from {
        cond = cond.add(event::Column::ScheduledAt.gte(from));
    }
    if filter.available_only {
        cond = cond.add(
            Condition::any()
                .add(event::Column::Capacity.eq(0))
                .add(event::Column::RemainingCapacity.gt(0)),
        );
    }
    if !filter.categories.is_empty() {
        cond = cond.add(
            event::Column::Category.is_in(filter.categories.iter().map(|c| c.as_str())),
        );
    }
    if let Some(organizer_id) = filter.organizer_id {
        cond = cond.add(event::Column::OrganizerId.eq(organizer_id));
    }
    if let Some(featured) = filter.featured {
        cond = cond.add(event::Column::IsFeatured.eq(featured));
    }
    if let Some(needle) = &filter.name_contains {
        cond = cond.add(Expr::expr(Func::lower(Expr::col(event::Column::Name))).like(like_contains(needle)));
    }
    if let Some(ids) = &filter.ids {
        cond = cond.add(event::Column::Id.is_in(ids.iter().copied()));
    }
    if !filter.exclude_ids.is_empty() {
        cond = cond.add(event::Column::Id.is_not_in(filter.exclude_ids.iter().copied()));
    }
    cond
}

#[async_trait]
impl AccountDirectory for SeaOrmStore {
    async fn find_account(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let row = account::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_account failed")?;
        Ok(row.map(mapper::account_from_row))
    }

    async fn insert_account(&self, a: Account) -> anyhow::Result<InsertOutcome> {
        match account::Entity::insert(mapper::account_to_row(a))
            .exec_without_returning(&self.conn)
            .await
        {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(anyhow::Error::new(e).context("insert_account failed")),
        }
    }
}

#[async_trait]
impl EventCatalog for SeaOrmStore {
    async fn get_event(&self, id: Uuid) -> anyhow::Result<Option<Event>> {
        event::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("get_event failed")?
            .map(mapper::event_from_row)
            .transpose()
    }

    async fn query_events(&self, filter: &EventFilter, window: Window) -> anyhow::Result<Vec<Event>> {
        let rows = event::Entity::find()
            .filter(event_condition(filter))
            .order_by_asc(event::Column::ScheduledAt)
            .order_by_asc(event::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.conn)
            .await
            .context("query_events failed")?;
        rows.into_iter().map(mapper::event_from_row).collect()
    }

    async fn insert_event(&self, e: Event) -> anyhow::Result<()> {
        event::Entity::insert(mapper::event_to_row(e))
            .exec_without_returning(&self.conn)
            .await
            .context("insert_event failed")?;
        Ok(())
    }

    async fn update_event(
        &self,
        e: &Event,
        capacity: Option<u32>,
    ) -> anyhow::Result<UpdateOutcome> {
        let txn = self.conn.begin().await.context("update_event: begin failed")?;

        let exists = event::Entity::find_by_id(e.id)
            .one(&txn)
            .await
            .context("update_event: load failed")?
            .is_some();
        if !exists {
            txn.rollback().await.context("update_event: rollback failed")?;
            return Ok(UpdateOutcome::EventMissing);
        }

        if let Some(capacity) = capacity {
            let registered = registration::Entity::find()
                .filter(registration::Column::EventId.eq(e.id))
                .count(&txn)
                .await
                .context("update_event: count failed")?;
            if capacity > 0 && u64::from(capacity) < registered {
                txn.rollback().await.context("update_event: rollback failed")?;
                return Ok(UpdateOutcome::BelowRegistrations { registered });
            }

            // Unlimited events do not track seats.
            let remaining = if capacity == 0 {
                0
            } else {
                capacity - registered as u32
            };
            event::Entity::update_many()
                .col_expr(event::Column::Capacity, Expr::value(mapper::count_to_db(capacity)))
                .col_expr(
                    event::Column::RemainingCapacity,
                    Expr::value(mapper::count_to_db(remaining)),
                )
                .filter(event::Column::Id.eq(e.id))
                .exec(&txn)
                .await
                .context("update_event: capacity update failed")?;
        }

        event::Entity::update_many()
            .set(mapper::event_details_to_row(e))
            .filter(event::Column::Id.eq(e.id))
            .exec(&txn)
            .await
            .context("update_event: details update failed")?;

        txn.commit().await.context("update_event: commit failed")?;
        Ok(UpdateOutcome::Updated)
    }

    async fn delete_event(&self, id: Uuid) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("delete_event: begin failed")?;

        favorite::Entity::delete_many()
            .filter(favorite::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .context("delete_event: favorites failed")?;
        comment::Entity::delete_many()
            .filter(comment::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .context("delete_event: comments failed")?;
        registration::Entity::delete_many()
            .filter(registration::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .context("delete_event: registrations failed")?;
        let res = event::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete_event: event failed")?;

        txn.commit().await.context("delete_event: commit failed")?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl RegistrationStore for SeaOrmStore {
    async fn count_registrations(&self, event_id: Uuid) -> anyhow::Result<u64> {
        registration::Entity::find()
            .filter(registration::Column::EventId.eq(event_id))
            .count(&self.conn)
            .await
            .context("count_registrations failed")
    }

    async fn find_registration(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Registration>> {
        registration::Entity::find()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("find_registration failed")?
            .map(mapper::registration_from_row)
            .transpose()
    }

    async fn get_registration(&self, id: Uuid) -> anyhow::Result<Option<Registration>> {
        registration::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("get_registration failed")?
            .map(mapper::registration_from_row)
            .transpose()
    }

    async fn commit_registration(
        &self,
        r: Registration,
        charge_capacity: bool,
    ) -> anyhow::Result<CommitOutcome> {
        let event_id = r.event_id;
        let txn = self
            .conn
            .begin()
            .await
            .context("commit_registration: begin failed")?;

        if charge_capacity {
            let charged = event::Entity::update_many()
                .col_expr(
                    event::Column::RemainingCapacity,
                    Expr::col(event::Column::RemainingCapacity).sub(1),
                )
                .filter(event::Column::Id.eq(event_id))
                .filter(event::Column::RemainingCapacity.gt(0))
                .exec(&txn)
                .await
                .context("commit_registration: charge failed")?;
            if charged.rows_affected == 0 {
                txn.rollback()
                    .await
                    .context("commit_registration: rollback failed")?;
                return Ok(CommitOutcome::CapacityExhausted);
            }
        }

        match registration::Entity::insert(mapper::registration_to_row(r))
            .exec_without_returning(&txn)
            .await
        {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                txn.rollback()
                    .await
                    .context("commit_registration: rollback failed")?;
                return Ok(CommitOutcome::Duplicate);
            }
            // Dropping the transaction rolls the charge back.
            Err(e) => return Err(anyhow::Error::new(e).context("commit_registration: insert failed")),
        }

        txn.commit()
            .await
            .context("commit_registration: commit failed")?;
        Ok(CommitOutcome::Committed)
    }

    async fn release_registration(&self, r: &Registration) -> anyhow::Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("release_registration: begin failed")?;

        let deleted = registration::Entity::delete_by_id(r.id)
            .exec(&txn)
            .await
            .context("release_registration: delete failed")?;
        if deleted.rows_affected == 0 {
            txn.rollback()
                .await
                .context("release_registration: rollback failed")?;
            return Ok(false);
        }

        // Never above the event's capacity; unlimited events are skipped.
        event::Entity::update_many()
            .col_expr(
                event::Column::RemainingCapacity,
                Expr::col(event::Column::RemainingCapacity).add(1),
            )
            .filter(event::Column::Id.eq(r.event_id))
            .filter(event::Column::Capacity.gt(0))
            .filter(Expr::col(event::Column::RemainingCapacity).lt(Expr::col(event::Column::Capacity)))
            .exec(&txn)
            .await
            .context("release_registration: release failed")?;

        txn.commit()
            .await
            .context("release_registration: commit failed")?;
        Ok(true)
    }

    async fn list_for_event(&self, event_id: Uuid) -> anyhow::Result<Vec<Registration>> {
        registration::Entity::find()
            .filter(registration::Column::EventId.eq(event_id))
            .order_by_asc(registration::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_for_event failed")?
            .into_iter()
            .map(mapper::registration_from_row)
            .collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Registration>> {
        registration::Entity::find()
            .filter(registration::Column::UserId.eq(user_id))
            .order_by_asc(registration::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_for_user failed")?
            .into_iter()
            .map(mapper::registration_from_row)
            .collect()
    }
}

#[async_trait]
impl EngagementStore for SeaOrmStore {
    async fn insert_comment(&self, c: Comment) -> anyhow::Result<()> {
        comment::Entity::insert(mapper::comment_to_row(c))
            .exec_without_returning(&self.conn)
            .await
            .context("insert_comment failed")?;
        Ok(())
    }

    async fn list_comments(&self, event_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let rows = comment::Entity::find()
            .filter(comment::Column::EventId.eq(event_id))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(&self.conn)
            .await
            .context("list_comments failed")?;
        Ok(rows.into_iter().map(mapper::comment_from_row).collect())
    }

    async fn toggle_favorite(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let removed = favorite::Entity::delete_many()
            .filter(favorite::Column::EventId.eq(event_id))
            .filter(favorite::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("toggle_favorite: delete failed")?;
        if removed.rows_affected > 0 {
            return Ok(false);
        }

        let row = favorite::ActiveModel {
            event_id: Set(event_id),
            user_id: Set(user_id),
            created_at: Set(at),
        };
        match favorite::Entity::insert(row)
            .exec_without_returning(&self.conn)
            .await
        {
            Ok(_) => Ok(true),
            // A concurrent toggle inserted it first.
            Err(e) if is_unique_violation(&e) => Ok(true),
            Err(e) => Err(anyhow::Error::new(e).context("toggle_favorite: insert failed")),
        }
    }

    async fn is_favorite(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let n = favorite::Entity::find()
            .filter(favorite::Column::EventId.eq(event_id))
            .filter(favorite::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("is_favorite failed")?;
        Ok(n > 0)
    }

    async fn favorite_event_ids(&self, user_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("favorite_event_ids failed")?;
        Ok(rows.into_iter().map(|f| f.event_id).collect())
    }
}
