use problem::{ProblemResponse, ValidationError};
use tracing::warn;

use crate::domain::error::DomainError;
use crate::errors;

/// Map a domain failure to its Problem response.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { field, message } => {
            let mut resp = errors::VALIDATION.respond(message.clone(), instance);
            resp.0 = resp.0.with_errors(vec![ValidationError {
                detail: message.clone(),
                pointer: format!("/{field}"),
            }]);
            resp
        }
        DomainError::Unauthenticated => errors::UNAUTHENTICATED.respond(e.to_string(), instance),
        DomainError::Forbidden { .. } => errors::FORBIDDEN.respond(e.to_string(), instance),
        DomainError::NotOwner { .. } => errors::NOT_OWNER.respond(e.to_string(), instance),
        DomainError::EventNotFound { .. } => errors::EVENT_NOT_FOUND.respond(e.to_string(), instance),
        DomainError::RegistrationNotFound { .. } => {
            errors::REGISTRATION_NOT_FOUND.respond(e.to_string(), instance)
        }
        DomainError::AccountNotFound { .. } => {
            errors::ACCOUNT_NOT_FOUND.respond(e.to_string(), instance)
        }
        DomainError::EventEnded { .. } => errors::EVENT_ENDED.respond(e.to_string(), instance),
        DomainError::EventFull { .. } => errors::EVENT_FULL.respond(e.to_string(), instance),
        DomainError::AlreadyRegistered { .. } => {
            errors::ALREADY_REGISTERED.respond("You are already registered for this event", instance)
        }
        DomainError::EventAlreadyOccurred { .. } => {
            errors::EVENT_ALREADY_OCCURRED.respond(e.to_string(), instance)
        }
        DomainError::CapacityBelowRegistrations { .. } => {
            errors::CAPACITY_BELOW_REGISTRATIONS.respond(e.to_string(), instance)
        }
        DomainError::AccountExists { .. } => errors::ACCOUNT_EXISTS.respond(e.to_string(), instance),
        DomainError::StoreUnavailable { message } => {
            // Store detail stays in the log.
            warn!(%instance, %message, "request failed on store");
            errors::STORE_UNAVAILABLE.respond("Please try again later", instance)
        }
    }
}
