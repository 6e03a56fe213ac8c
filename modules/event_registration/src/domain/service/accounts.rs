use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::Service;
use crate::contract::model::{Account, Identity, NewAccount};
use crate::domain::error::DomainError;
use crate::domain::repo::InsertOutcome;
use crate::domain::validation;

impl Service {
    #[instrument(name = "event_registration.service.sign_up", skip(self, new_account), fields(email = %new_account.email))]
    pub async fn sign_up(&self, new_account: NewAccount) -> Result<Account, DomainError> {
        validation::new_account(&new_account)?;

        let email = new_account.email.trim().to_lowercase();
        let account = Account {
            id: Uuid::new_v4(),
            email: email.clone(),
            full_name: new_account.full_name.trim().to_string(),
            is_organizer: new_account.is_organizer,
            created_at: self.now(),
        };

        match self
            .accounts
            .insert_account(account.clone())
            .await
            .map_err(DomainError::store)?
        {
            InsertOutcome::Inserted => {
                info!(account_id = %account.id, is_organizer = account.is_organizer, "account created");
                Ok(account)
            }
            InsertOutcome::Duplicate => Err(DomainError::AccountExists { email }),
        }
    }

    #[instrument(name = "event_registration.service.get_account", skip(self), fields(account_id = %id))]
    pub async fn get_account(&self, id: Uuid) -> Result<Account, DomainError> {
        debug!("loading account");
        self.read("find_account", move || self.accounts.find_account(id))
            .await?
            .ok_or_else(|| DomainError::account_not_found(id))
    }

    /// `None` when no caller was supplied or the id is not a known account.
    #[instrument(name = "event_registration.service.current_identity", skip(self))]
    pub async fn current_identity(&self, caller: Option<Uuid>) -> Result<Option<Identity>, DomainError> {
        let Some(id) = caller else {
            return Ok(None);
        };
        let account = self
            .read("find_account", move || self.accounts.find_account(id))
            .await?;
        Ok(account.map(|a| Identity {
            id: a.id,
            is_organizer: a.is_organizer,
        }))
    }
}
