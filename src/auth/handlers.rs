//! Sign-in routes
//!
//! - `POST /auth/login`  `{ email, password }` → `{ token, expires_at, profile }`
//! - `POST /auth/logout` ends the caller's session
//! - `GET  /auth/me`     the caller's profile

use super::extract::Auth;
use super::session::SessionHook;
use crate::core::auth::AuthPolicy;
use crate::core::error::{
    AuthError, BackofficeError, BackofficeResult, FieldValidationError, ValidationError,
};
use crate::entities::User;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "enter a valid e-mail address"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "enter your password"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: User,
}

fn field_errors(errors: validator::ValidationErrors) -> BackofficeError {
    let mut fields: Vec<FieldValidationError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            let field = field.to_string();
            errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldValidationError::new(field.clone(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    ValidationError::FieldErrors(fields).into()
}

pub async fn login(
    State(sessions): State<SessionHook>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> BackofficeResult<Json<LoginResponse>> {
    let Json(request) = payload.map_err(|e| ValidationError::InvalidJson {
        message: e.body_text(),
    })?;
    request.validate().map_err(field_errors)?;

    let session = sessions
        .identity()
        .sign_in(&request.email, &request.password)
        .await?;

    // Accounts without an active profile may not hold a session
    let profile = match sessions.resolve(&session.token).await {
        Ok(profile) => profile,
        Err(e) => {
            sessions.identity().sign_out(&session.token).await?;
            return Err(e);
        }
    };

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        profile,
    }))
}

pub async fn logout(
    State(sessions): State<SessionHook>,
    auth: Auth,
) -> BackofficeResult<StatusCode> {
    let Some(token) = auth.token.as_deref() else {
        return Err(AuthError::unauthorized("sign in first").into());
    };
    sessions.identity().sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(State(sessions): State<SessionHook>, auth: Auth) -> BackofficeResult<Json<User>> {
    auth.require(&AuthPolicy::Authenticated, "view your profile")?;
    let token = auth.token.as_deref().unwrap_or_default();
    Ok(Json(sessions.resolve(token).await?))
}

pub fn routes(sessions: SessionHook) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .with_state(sessions)
}
