use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::error::EventRegistrationError;
use crate::contract::model::{
    Account, Comment, Event, EventDetails, EventPatch, EventQuery, Identity, NewAccount,
    NewEvent, Page, Registration, RegistrationForm, TimeFilter, UserRegistration,
};

type Result<T> = std::result::Result<T, EventRegistrationError>;

/// Public API of the event_registration module for in-process consumers.
///
/// `caller` is the account id of whoever performs the call; `None` means
/// anonymous and is rejected by every mutating operation.
#[async_trait]
pub trait EventRegistrationApi: Send + Sync {
    async fn sign_up(&self, new_account: NewAccount) -> Result<Account>;

    async fn get_account(&self, id: Uuid) -> Result<Account>;

    async fn current_identity(&self, caller: Option<Uuid>) -> Result<Option<Identity>>;

    async fn create_event(&self, caller: Option<Uuid>, new_event: NewEvent) -> Result<Event>;

    async fn get_event(&self, id: Uuid) -> Result<EventDetails>;

    async fn list_events(&self, query: EventQuery) -> Result<Page<Event>>;

    async fn update_event(&self, caller: Option<Uuid>, id: Uuid, patch: EventPatch) -> Result<Event>;

    async fn delete_event(&self, caller: Option<Uuid>, id: Uuid) -> Result<()>;

    /// Register `caller` for the event, subject to capacity.
    async fn register(
        &self,
        caller: Option<Uuid>,
        event_id: Uuid,
        form: RegistrationForm,
    ) -> Result<Registration>;

    async fn cancel(&self, caller: Option<Uuid>, registration_id: Uuid) -> Result<()>;

    async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Registration>>;

    async fn list_for_user(&self, user_id: Uuid, filter: TimeFilter) -> Result<Vec<UserRegistration>>;

    async fn add_comment(&self, caller: Option<Uuid>, event_id: Uuid, content: String) -> Result<Comment>;

    async fn toggle_favorite(&self, caller: Option<Uuid>, event_id: Uuid) -> Result<bool>;
}
