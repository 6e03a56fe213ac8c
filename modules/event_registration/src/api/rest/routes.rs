use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// All REST routes of the module, wired to `service`.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/accounts", post(handlers::sign_up))
        .route("/accounts/{id}", get(handlers::get_account))
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/events/featured", get(handlers::featured_events))
        .route(
            "/events/{id}",
            get(handlers::get_event)
                .patch(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route(
            "/events/{id}/registrations",
            post(handlers::register).get(handlers::list_event_registrations),
        )
        .route(
            "/events/{id}/comments",
            get(handlers::list_comments).post(handlers::add_comment),
        )
        .route(
            "/events/{id}/favorite",
            get(handlers::get_favorite).put(handlers::toggle_favorite),
        )
        .route("/registrations/{id}", delete(handlers::cancel_registration))
        .route("/me/registrations", get(handlers::my_registrations))
        .route("/me/recommendations", get(handlers::my_recommendations))
        .route("/me/favorites", get(handlers::my_favorites))
        .layer(Extension(service))
}
