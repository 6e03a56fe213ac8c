//! Static Problem catalog for this module's REST surface.

use problem::ErrDef;

macro_rules! err_def {
    ($name:ident, $status:expr, $title:expr, $code:literal) => {
        pub const $name: ErrDef = ErrDef {
            status: $status,
            title: $title,
            code: $code,
            type_url: concat!("https://errors.eventreg.dev/", $code),
        };
    };
}

err_def!(BAD_REQUEST, 400, "Bad request", "EVENTREG_BAD_REQUEST");
err_def!(VALIDATION, 400, "Validation error", "EVENTREG_VALIDATION");
err_def!(UNAUTHENTICATED, 401, "Please sign in", "EVENTREG_UNAUTHENTICATED");
err_def!(FORBIDDEN, 403, "Forbidden", "EVENTREG_FORBIDDEN");
err_def!(NOT_OWNER, 403, "Not your registration", "EVENTREG_NOT_OWNER");
err_def!(EVENT_NOT_FOUND, 404, "Event not found", "EVENTREG_EVENT_NOT_FOUND");
err_def!(REGISTRATION_NOT_FOUND, 404, "Registration not found", "EVENTREG_REGISTRATION_NOT_FOUND");
err_def!(ACCOUNT_NOT_FOUND, 404, "Account not found", "EVENTREG_ACCOUNT_NOT_FOUND");
err_def!(EVENT_ENDED, 409, "This event has ended", "EVENTREG_EVENT_ENDED");
err_def!(EVENT_FULL, 409, "This event is full", "EVENTREG_EVENT_FULL");
err_def!(ALREADY_REGISTERED, 409, "Already registered", "EVENTREG_ALREADY_REGISTERED");
err_def!(EVENT_ALREADY_OCCURRED, 409, "Event already occurred", "EVENTREG_EVENT_ALREADY_OCCURRED");
err_def!(CAPACITY_BELOW_REGISTRATIONS, 409, "Capacity below registrations", "EVENTREG_CAPACITY_BELOW_REGISTRATIONS");
err_def!(ACCOUNT_EXISTS, 409, "Account already exists", "EVENTREG_ACCOUNT_EXISTS");
err_def!(STORE_UNAVAILABLE, 503, "Service unavailable", "EVENTREG_STORE_UNAVAILABLE");
