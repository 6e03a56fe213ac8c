use thiserror::Error;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Errors that are safe to expose to other modules.
///
/// Every rejection a caller can act on keeps its own variant; store
/// failures collapse into `Unavailable` without internal detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventRegistrationError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not allowed to {action}")]
    Forbidden { action: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    #[error("Event {id} has already ended")]
    EventEnded { id: Uuid },

    #[error("Event {id} is full")]
    EventFull { id: Uuid },

    #[error("Already registered for event {event_id}")]
    AlreadyRegistered { event_id: Uuid },

    #[error("Registration {id} belongs to another user")]
    NotOwner { id: Uuid },

    #[error("Event {id} has already occurred")]
    EventAlreadyOccurred { id: Uuid },

    #[error("Capacity {requested} is below the {registered} current registrations")]
    CapacityBelowRegistrations { requested: u32, registered: u64 },

    #[error("Account with email '{email}' already exists")]
    AccountExists { email: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Service temporarily unavailable")]
    Unavailable,
}

impl EventRegistrationError {
    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl From<DomainError> for EventRegistrationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Unauthenticated => Self::Unauthenticated,
            DomainError::Forbidden { action } => Self::Forbidden { action },
            DomainError::EventNotFound { id } => Self::NotFound {
                resource: "Event",
                id,
            },
            DomainError::RegistrationNotFound { id } => Self::NotFound {
                resource: "Registration",
                id,
            },
            DomainError::AccountNotFound { id } => Self::NotFound {
                resource: "Account",
                id,
            },
            DomainError::EventEnded { id } => Self::EventEnded { id },
            DomainError::EventFull { id } => Self::EventFull { id },
            DomainError::AlreadyRegistered { event_id, .. } => Self::AlreadyRegistered { event_id },
            DomainError::NotOwner { id } => Self::NotOwner { id },
            DomainError::EventAlreadyOccurred { id } => Self::EventAlreadyOccurred { id },
            DomainError::CapacityBelowRegistrations {
                requested,
                registered,
            } => Self::CapacityBelowRegistrations {
                requested,
                registered,
            },
            DomainError::AccountExists { email } => Self::AccountExists { email },
            DomainError::Validation { field, message } => Self::Validation { field, message },
            DomainError::StoreUnavailable { .. } => Self::Unavailable,
        }
    }
}
