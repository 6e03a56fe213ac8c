//! SeaORM entities. Counts are stored as `i32`, enums as their lowercase names.

pub mod account;
pub mod comment;
pub mod event;
pub mod favorite;
pub mod registration;
