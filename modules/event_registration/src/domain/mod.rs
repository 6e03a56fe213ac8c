pub mod clock;
pub mod error;
pub mod policy;
pub mod repo;
pub mod retry;
pub mod service;
pub mod validation;
