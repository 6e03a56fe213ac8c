use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::Service;
use crate::contract::model::{Comment, Event};
use crate::domain::error::DomainError;
use crate::domain::validation;

impl Service {
    #[instrument(name = "event_registration.service.add_comment", skip(self, content), fields(event_id = %event_id))]
    pub async fn add_comment(
        &self,
        caller: Option<Uuid>,
        event_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        let identity = self.authenticate(caller).await?;
        validation::comment(&content)?;
        self.load_event(event_id).await?;

        let comment = Comment {
            id: Uuid::new_v4(),
            event_id,
            user_id: identity.id,
            content: content.trim().to_string(),
            created_at: self.now(),
        };
        self.engagement
            .insert_comment(comment.clone())
            .await
            .map_err(DomainError::store)?;

        info!(comment_id = %comment.id, "comment added");
        Ok(comment)
    }

    #[instrument(name = "event_registration.service.list_comments", skip(self), fields(event_id = %event_id))]
    pub async fn list_comments(&self, event_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        self.load_event(event_id).await?;
        let comments = self
            .read("list_comments", move || self.engagement.list_comments(event_id))
            .await?;
        debug!(count = comments.len(), "comments listed");
        Ok(comments)
    }

    /// Flip the caller's favorite mark; `true` means it is now a favorite.
    #[instrument(name = "event_registration.service.toggle_favorite", skip(self), fields(event_id = %event_id))]
    pub async fn toggle_favorite(&self, caller: Option<Uuid>, event_id: Uuid) -> Result<bool, DomainError> {
        let identity = self.authenticate(caller).await?;
        self.load_event(event_id).await?;

        let favorite = self
            .engagement
            .toggle_favorite(event_id, identity.id, self.now())
            .await
            .map_err(DomainError::store)?;
        info!(user_id = %identity.id, favorite, "favorite toggled");
        Ok(favorite)
    }

    #[instrument(name = "event_registration.service.is_favorite", skip(self), fields(event_id = %event_id))]
    pub async fn is_favorite(&self, caller: Option<Uuid>, event_id: Uuid) -> Result<bool, DomainError> {
        let identity = self.authenticate(caller).await?;
        let user_id = identity.id;
        self.read("is_favorite", move || {
            self.engagement.is_favorite(event_id, user_id)
        })
        .await
    }

    #[instrument(name = "event_registration.service.list_favorites", skip(self))]
    pub async fn list_favorites(&self, caller: Option<Uuid>) -> Result<Vec<Event>, DomainError> {
        let identity = self.authenticate(caller).await?;
        let user_id = identity.id;
        let ids = self
            .read("favorite_event_ids", move || {
                self.engagement.favorite_event_ids(user_id)
            })
            .await?;
        self.events_by_ids(ids).await
    }
}
