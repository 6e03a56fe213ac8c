use axum::http::StatusCode;

use crate::{Problem, ProblemResponse};

/// Static error definition; modules keep a table of these per failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }

    /// Render as a response bound to the request path that failed.
    pub fn respond(&self, detail: impl Into<String>, instance: &str) -> ProblemResponse {
        ProblemResponse(self.to_problem(detail).with_instance(instance))
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: ErrDef = ErrDef {
        status: 409,
        title: "Event full",
        code: "TEST_EVENT_FULL",
        type_url: "https://errors.example.com/TEST_EVENT_FULL",
    };

    #[test]
    fn err_def_to_problem_works() {
        let problem = FULL.to_problem("No seats left");
        assert_eq!(problem.status, 409);
        assert_eq!(problem.title, "Event full");
        assert_eq!(problem.detail, "No seats left");
        assert_eq!(problem.code, "TEST_EVENT_FULL");
        assert_eq!(problem.type_url, "https://errors.example.com/TEST_EVENT_FULL");
    }

    #[test]
    fn respond_sets_instance() {
        let resp = FULL.respond("No seats left", "/events/42/registrations");
        assert_eq!(resp.0.instance, "/events/42/registrations");
        assert_eq!(FULL.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_status_falls_back_to_500() {
        let weird = ErrDef {
            status: 1000,
            ..FULL
        };
        assert_eq!(weird.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
