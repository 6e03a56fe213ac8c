use std::sync::Arc;

use axum::{http::StatusCode, response::Json, Extension};
use problem::{Problem, ProblemResponse};
use uuid::Uuid;

use crate::api::rest::dto::{
    AccountDto, CommentDto, CommentReq, CreateEventReq, EventDetailsDto, EventDto, EventPageDto,
    FavoriteDto, ListEventsQuery, MyRegistrationsQuery, RegisterReq, RegistrationDto, SignUpReq,
    UpdateEventReq, UserRegistrationDto,
};
use crate::api::rest::extract::{Caller, JsonBody, PathId, QueryParams, RequestCtx};
use crate::domain::service::Service;

type ApiResult<T> = Result<T, ProblemResponse>;

/// Create an account
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "accounts",
    request_body = SignUpReq,
    responses(
        (status = 201, description = "Account created", body = AccountDto),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Email already used", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn sign_up(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    JsonBody(req): JsonBody<SignUpReq>,
) -> ApiResult<(StatusCode, Json<AccountDto>)> {
    let account = svc.sign_up(req.into()).await.map_err(|e| ctx.problem(&e))?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Get an account by id
#[utoipa::path(
    get,
    path = "/accounts/{id}",
    tag = "accounts",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account found", body = AccountDto),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_account(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    PathId(id): PathId,
) -> ApiResult<Json<AccountDto>> {
    let account = svc.get_account(id).await.map_err(|e| ctx.problem(&e))?;
    Ok(Json(account.into()))
}

/// List events
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "One page of events, soonest first", body = EventPageDto),
        (status = 400, description = "Bad query", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_events(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    QueryParams(query): QueryParams<ListEventsQuery>,
) -> ApiResult<Json<EventPageDto>> {
    let page = svc.list_events(query.into()).await.map_err(|e| ctx.problem(&e))?;
    Ok(Json(page.into()))
}

/// Featured upcoming events
#[utoipa::path(
    get,
    path = "/events/featured",
    tag = "events",
    responses((status = 200, description = "Featured events", body = Vec<EventDto>))
)]
pub async fn featured_events(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
) -> ApiResult<Json<Vec<EventDto>>> {
    let events = svc.featured_events().await.map_err(|e| ctx.problem(&e))?;
    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}

/// Create an event (organizers only)
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    params(("x-user-id" = Uuid, Header, description = "Caller account id")),
    request_body = CreateEventReq,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Not signed in", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Not an organizer", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_event(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<CreateEventReq>,
) -> ApiResult<(StatusCode, Json<EventDto>)> {
    let event = svc
        .create_event(caller, req.into())
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

/// Get an event with its registration count
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event found", body = EventDetailsDto),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_event(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    PathId(id): PathId,
) -> ApiResult<Json<EventDetailsDto>> {
    let details = svc.get_event(id).await.map_err(|e| ctx.problem(&e))?;
    Ok(Json(details.into()))
}

/// Update an event
#[utoipa::path(
    patch,
    path = "/events/{id}",
    tag = "events",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    request_body = UpdateEventReq,
    responses(
        (status = 200, description = "Updated event", body = EventDto),
        (status = 403, description = "Not the organizer", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Capacity below registrations", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_event(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(id): PathId,
    JsonBody(req): JsonBody<UpdateEventReq>,
) -> ApiResult<Json<EventDto>> {
    let event = svc
        .update_event(caller, id, req.into())
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(event.into()))
}

/// Delete an event with its registrations
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Not the organizer", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_event(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    svc.delete_event(caller, id).await.map_err(|e| ctx.problem(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register the caller for an event
#[utoipa::path(
    post,
    path = "/events/{id}/registrations",
    tag = "registrations",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Registered", body = RegistrationDto),
        (status = 400, description = "Invalid form", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Not signed in", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Event not found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Event full, ended, or already registered", body = Problem, content_type = "application/problem+json"),
        (status = 503, description = "Store unavailable, retry later", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(event_id): PathId,
    JsonBody(req): JsonBody<RegisterReq>,
) -> ApiResult<(StatusCode, Json<RegistrationDto>)> {
    let registration = svc
        .register(caller, event_id, req.into())
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok((StatusCode::CREATED, Json(registration.into())))
}

/// Attendees of an event (its organizer only)
#[utoipa::path(
    get,
    path = "/events/{id}/registrations",
    tag = "registrations",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    responses(
        (status = 200, description = "Registrations, oldest first", body = Vec<RegistrationDto>),
        (status = 403, description = "Not the organizer", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_event_registrations(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(event_id): PathId,
) -> ApiResult<Json<Vec<RegistrationDto>>> {
    let registrations = svc
        .list_registrations_for_event(caller, event_id)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(registrations.into_iter().map(RegistrationDto::from).collect()))
}

/// Cancel one of the caller's registrations
#[utoipa::path(
    delete,
    path = "/registrations/{id}",
    tag = "registrations",
    params(
        ("id" = Uuid, Path, description = "Registration id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    responses(
        (status = 204, description = "Cancelled"),
        (status = 403, description = "Registration belongs to someone else", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Event already occurred", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn cancel_registration(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(id): PathId,
) -> ApiResult<StatusCode> {
    svc.cancel(caller, id).await.map_err(|e| ctx.problem(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's registrations
#[utoipa::path(
    get,
    path = "/me/registrations",
    tag = "me",
    params(MyRegistrationsQuery, ("x-user-id" = Uuid, Header, description = "Caller account id")),
    responses(
        (status = 200, description = "Registrations with their events", body = Vec<UserRegistrationDto>),
        (status = 401, description = "Not signed in", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn my_registrations(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    QueryParams(query): QueryParams<MyRegistrationsQuery>,
) -> ApiResult<Json<Vec<UserRegistrationDto>>> {
    let me = svc.authenticate(caller).await.map_err(|e| ctx.problem(&e))?;
    let filter = query.filter.unwrap_or_default().into();
    let registrations = svc
        .list_for_user(me.id, filter)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(
        registrations.into_iter().map(UserRegistrationDto::from).collect(),
    ))
}

/// Suggested events for the caller
#[utoipa::path(
    get,
    path = "/me/recommendations",
    tag = "me",
    params(("x-user-id" = Uuid, Header, description = "Caller account id")),
    responses(
        (status = 200, description = "Recommended events", body = Vec<EventDto>),
        (status = 401, description = "Not signed in", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn my_recommendations(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
) -> ApiResult<Json<Vec<EventDto>>> {
    let me = svc.authenticate(caller).await.map_err(|e| ctx.problem(&e))?;
    let events = svc.recommend_events(me.id).await.map_err(|e| ctx.problem(&e))?;
    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}

/// The caller's favorite events
#[utoipa::path(
    get,
    path = "/me/favorites",
    tag = "me",
    params(("x-user-id" = Uuid, Header, description = "Caller account id")),
    responses(
        (status = 200, description = "Favorite events", body = Vec<EventDto>),
        (status = 401, description = "Not signed in", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn my_favorites(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
) -> ApiResult<Json<Vec<EventDto>>> {
    let events = svc.list_favorites(caller).await.map_err(|e| ctx.problem(&e))?;
    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}

/// Comments on an event, newest first
#[utoipa::path(
    get,
    path = "/events/{id}/comments",
    tag = "engagement",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Comments", body = Vec<CommentDto>),
        (status = 404, description = "Event not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_comments(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    PathId(event_id): PathId,
) -> ApiResult<Json<Vec<CommentDto>>> {
    let comments = svc.list_comments(event_id).await.map_err(|e| ctx.problem(&e))?;
    Ok(Json(comments.into_iter().map(CommentDto::from).collect()))
}

/// Comment on an event
#[utoipa::path(
    post,
    path = "/events/{id}/comments",
    tag = "engagement",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    request_body = CommentReq,
    responses(
        (status = 201, description = "Comment added", body = CommentDto),
        (status = 400, description = "Empty or too long", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Not signed in", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn add_comment(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(event_id): PathId,
    JsonBody(req): JsonBody<CommentReq>,
) -> ApiResult<(StatusCode, Json<CommentDto>)> {
    let comment = svc
        .add_comment(caller, event_id, req.content)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// Whether the caller marked the event as favorite
#[utoipa::path(
    get,
    path = "/events/{id}/favorite",
    tag = "engagement",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    responses((status = 200, description = "Favorite state", body = FavoriteDto))
)]
pub async fn get_favorite(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(event_id): PathId,
) -> ApiResult<Json<FavoriteDto>> {
    let favorite = svc
        .is_favorite(caller, event_id)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(FavoriteDto { event_id, favorite }))
}

/// Toggle the caller's favorite mark
#[utoipa::path(
    put,
    path = "/events/{id}/favorite",
    tag = "engagement",
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("x-user-id" = Uuid, Header, description = "Caller account id"),
    ),
    responses(
        (status = 200, description = "Favorite state after the toggle", body = FavoriteDto),
        (status = 404, description = "Event not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn toggle_favorite(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestCtx,
    Caller(caller): Caller,
    PathId(event_id): PathId,
) -> ApiResult<Json<FavoriteDto>> {
    let favorite = svc
        .toggle_favorite(caller, event_id)
        .await
        .map_err(|e| ctx.problem(&e))?;
    Ok(Json(FavoriteDto { event_id, favorite }))
}

