//! RFC 9457 Problem Details shared by every REST surface of the server.
//!
//! Modules describe their failures once as static [`ErrDef`] entries and
//! render them per request with [`ErrDef::respond`].

mod catalog;
mod response;

pub use catalog::ErrDef;
pub use response::{
    bad_request, internal_error, not_found, Problem, ProblemResponse, ValidationError,
    APPLICATION_PROBLEM_JSON,
};
