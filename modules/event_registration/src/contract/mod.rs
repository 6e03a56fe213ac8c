pub mod client;
pub mod error;
pub mod model;

pub use client::EventRegistrationApi;
pub use error::EventRegistrationError;
pub use model::*;
