use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::EventRegistrationApi,
    error::EventRegistrationError,
    model::{
        Account, Comment, Event, EventDetails, EventPatch, EventQuery, Identity, NewAccount,
        NewEvent, Page, Registration, RegistrationForm, TimeFilter, UserRegistration,
    },
};
use crate::domain::service::Service;

type Result<T> = std::result::Result<T, EventRegistrationError>;

/// Local implementation of [`EventRegistrationApi`] that delegates to the domain service.
pub struct EventRegistrationLocalClient {
    service: Arc<Service>,
}

impl EventRegistrationLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventRegistrationApi for EventRegistrationLocalClient {
    async fn sign_up(&self, new_account: NewAccount) -> Result<Account> {
        Ok(self.service.sign_up(new_account).await?)
    }

    async fn get_account(&self, id: Uuid) -> Result<Account> {
        Ok(self.service.get_account(id).await?)
    }

    async fn current_identity(&self, caller: Option<Uuid>) -> Result<Option<Identity>> {
        Ok(self.service.current_identity(caller).await?)
    }

    async fn create_event(&self, caller: Option<Uuid>, new_event: NewEvent) -> Result<Event> {
        Ok(self.service.create_event(caller, new_event).await?)
    }

    async fn get_event(&self, id: Uuid) -> Result<EventDetails> {
        Ok(self.service.get_event(id).await?)
    }

    async fn list_events(&self, query: EventQuery) -> Result<Page<Event>> {
        Ok(self.service.list_events(query).await?)
    }

    async fn update_event(&self, caller: Option<Uuid>, id: Uuid, patch: EventPatch) -> Result<Event> {
        Ok(self.service.update_event(caller, id, patch).await?)
    }

    async fn delete_event(&self, caller: Option<Uuid>, id: Uuid) -> Result<()> {
        Ok(self.service.delete_event(caller, id).await?)
    }

    async fn register(
        &self,
        caller: Option<Uuid>,
        event_id: Uuid,
        form: RegistrationForm,
    ) -> Result<Registration> {
        Ok(self.service.register(caller, event_id, form).await?)
    }

    async fn cancel(&self, caller: Option<Uuid>, registration_id: Uuid) -> Result<()> {
        Ok(self.service.cancel(caller, registration_id).await?)
    }

    async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Registration>> {
        Ok(self.service.list_for_event(event_id).await?)
    }

    async fn list_for_user(&self, user_id: Uuid, filter: TimeFilter) -> Result<Vec<UserRegistration>> {
        Ok(self.service.list_for_user(user_id, filter).await?)
    }

    async fn add_comment(&self, caller: Option<Uuid>, event_id: Uuid, content: String) -> Result<Comment> {
        Ok(self.service.add_comment(caller, event_id, content).await?)
    }

    async fn toggle_favorite(&self, caller: Option<Uuid>, event_id: Uuid) -> Result<bool> {
        Ok(self.service.toggle_favorite(caller, event_id).await?)
    }
}
