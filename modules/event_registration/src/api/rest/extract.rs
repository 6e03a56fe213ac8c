//! Request extractors that fail with Problem responses instead of axum's
//! plain-text rejections.

use std::convert::Infallible;

use axum::extract::{FromRequest, FromRequestParts, OriginalUri, Path, Query, Request};
use axum::http::{request::Parts, HeaderMap, StatusCode};
use axum::Json;
use problem::ProblemResponse;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::api::rest::error::map_domain_error;
use crate::domain::error::DomainError;
use crate::errors;

/// Header carrying the authenticated account id.
pub const USER_ID_HEADER: &str = "x-user-id";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Caller account id from `x-user-id`; absent or malformed means anonymous.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Option<Uuid>);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok());
        Ok(Self(id))
    }
}

/// Where the request came from, for Problem `instance` and `request_id`.
#[derive(Debug, Clone)]
pub struct RequestCtx {
    pub instance: String,
    pub request_id: Option<String>,
}

impl RequestCtx {
    fn from_parts(uri_path: &str, original: Option<&OriginalUri>, headers: &HeaderMap) -> Self {
        Self {
            instance: original
                .map(|o| o.0.path().to_string())
                .unwrap_or_else(|| uri_path.to_string()),
            request_id: headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    pub fn problem(&self, e: &DomainError) -> ProblemResponse {
        self.finish(map_domain_error(e, &self.instance))
    }

    fn rejected(&self, status: StatusCode, detail: String) -> ProblemResponse {
        let mut p = errors::BAD_REQUEST
            .to_problem(detail)
            .with_instance(self.instance.clone());
        p.status = status.as_u16();
        self.finish(ProblemResponse(p))
    }

    fn finish(&self, mut resp: ProblemResponse) -> ProblemResponse {
        if let Some(rid) = &self.request_id {
            resp.0 = resp.0.with_request_id(rid.clone());
        }
        resp
    }
}

impl<S> FromRequestParts<S> for RequestCtx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(
            parts.uri.path(),
            parts.extensions.get::<OriginalUri>(),
            &parts.headers,
        ))
    }
}

/// JSON body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestCtx::from_parts(
            req.uri().path(),
            req.extensions().get::<OriginalUri>(),
            req.headers(),
        );
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rej) => Err(ctx.rejected(rej.status(), rej.body_text())),
        }
    }
}

/// Query string.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rej) => {
                let ctx = RequestCtx::from_parts(
                    parts.uri.path(),
                    parts.extensions.get::<OriginalUri>(),
                    &parts.headers,
                );
                Err(ctx.rejected(rej.status(), rej.body_text()))
            }
        }
    }
}

/// Single `{id}` path segment.
pub struct PathId(pub Uuid);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rej) => {
                let ctx = RequestCtx::from_parts(
                    parts.uri.path(),
                    parts.extensions.get::<OriginalUri>(),
                    &parts.headers,
                );
                Err(ctx.rejected(rej.status(), rej.body_text()))
            }
        }
    }
}
