use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::sign_up,
        handlers::get_account,
        handlers::list_events,
        handlers::featured_events,
        handlers::create_event,
        handlers::get_event,
        handlers::update_event,
        handlers::delete_event,
        handlers::register,
        handlers::list_event_registrations,
        handlers::cancel_registration,
        handlers::my_registrations,
        handlers::my_recommendations,
        handlers::my_favorites,
        handlers::list_comments,
        handlers::add_comment,
        handlers::get_favorite,
        handlers::toggle_favorite,
    ),
    components(schemas(
        dto::AccountDto,
        dto::SignUpReq,
        dto::CategoryDto,
        dto::EventDto,
        dto::EventDetailsDto,
        dto::CreateEventReq,
        dto::UpdateEventReq,
        dto::EventPageDto,
        dto::RegisterReq,
        dto::RegistrationDto,
        dto::UserRegistrationDto,
        dto::CommentReq,
        dto::CommentDto,
        dto::FavoriteDto,
        problem::Problem,
        problem::ValidationError,
    )),
    tags(
        (name = "accounts", description = "Sign-up and account lookup"),
        (name = "events", description = "Event catalog"),
        (name = "registrations", description = "Capacity-bounded registration"),
        (name = "me", description = "Caller-scoped views"),
        (name = "engagement", description = "Comments and favorites"),
    )
)]
pub struct EventRegistrationDoc;

pub fn document() -> utoipa::openapi::OpenApi {
    EventRegistrationDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_registration_paths() {
        let doc = document();
        assert!(doc.paths.paths.contains_key("/events/{id}/registrations"));
        assert!(doc.paths.paths.contains_key("/registrations/{id}"));
        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("RegistrationDto"));
        assert!(schemas.contains_key("Problem"));
    }
}
