use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not allowed to {action}")]
    Forbidden { action: String },

    #[error("Event not found: {id}")]
    EventNotFound { id: Uuid },

    #[error("Registration not found: {id}")]
    RegistrationNotFound { id: Uuid },

    #[error("Account not found: {id}")]
    AccountNotFound { id: Uuid },

    #[error("Event {id} has already ended")]
    EventEnded { id: Uuid },

    #[error("Event {id} is full")]
    EventFull { id: Uuid },

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: Uuid, user_id: Uuid },

    #[error("Registration {id} belongs to another user")]
    NotOwner { id: Uuid },

    #[error("Event {id} has already occurred")]
    EventAlreadyOccurred { id: Uuid },

    #[error("Capacity {requested} is below the {registered} current registrations")]
    CapacityBelowRegistrations { requested: u32, registered: u64 },

    #[error("Account with email '{email}' already exists")]
    AccountExists { email: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },
}

impl DomainError {
    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    pub fn event_not_found(id: Uuid) -> Self {
        Self::EventNotFound { id }
    }

    pub fn registration_not_found(id: Uuid) -> Self {
        Self::RegistrationNotFound { id }
    }

    pub fn account_not_found(id: Uuid) -> Self {
        Self::AccountNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Port failure. The full chain goes to the log; callers get a summary.
    pub fn store(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "store operation failed");
        Self::StoreUnavailable {
            message: err.to_string(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Only infrastructure failures may succeed on a second try.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}
