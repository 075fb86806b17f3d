use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, State},
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
    Json,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::records::Role;

use crate::jwt::validate_token;
use crate::state::AppState;

/// Pull the bearer token out of an `Authorization` header value.
pub fn bearer_token(header_value: Option<&str>) -> Result<&str, AppError> {
    let auth_value =
        header_value.ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

// Verifies the session token and stores the caller's `User` in request extensions
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?,
        ),
        None => None,
    };

    let token = bearer_token(header_value)?;

    let user = validate_token(token, &state.config.session_jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// JSON body extractor whose rejections render as a 400 `{"error": ...}`.
///
/// Malformed JSON, a wrong content type and wrongly typed fields all surface
/// as `AppError::ValidationError` instead of axum's plain-text rejection.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;
        Ok(Self(value))
    }
}

pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role '{}' is not allowed to perform this action",
            user.role
        )))
    }
}
