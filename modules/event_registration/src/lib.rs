//! Event registration module: accounts, an event catalog, capacity-bounded
//! registration, and engagement (comments, favorites).
//!
//! Admission for one event is serialized by an in-process per-event lock,
//! and each seat charge commits in the same store transaction as the
//! registration row it pays for.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client::EventRegistrationApi, error::EventRegistrationError, model};

mod module;
pub use module::EventRegistration;

pub mod config;
pub use config::EventRegistrationConfig;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod errors;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
