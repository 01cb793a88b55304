//! Request authentication extractor

use super::session::SessionHook;
use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::error::{AuthError, BackofficeError};
use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Bearer token of a request
///
/// Read from `Authorization: Bearer <token>`, falling back to `?token=` for
/// websocket upgrades, which cannot carry headers from a browser.
pub fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|token| !token.is_empty())
    })
}

/// The caller of a request, signed in or anonymous
///
/// Rejects requests carrying an invalid token or an inactive profile.
pub struct Auth {
    pub context: AuthContext,
    pub token: Option<String>,
}

impl Auth {
    /// Fail with 401 (anonymous) or 403 (signed in) unless `policy` allows the caller
    pub fn require(&self, policy: &AuthPolicy, action: &str) -> Result<(), BackofficeError> {
        if policy.check(&self.context) {
            return Ok(());
        }
        let err = match self.context {
            AuthContext::Anonymous => AuthError::unauthorized(format!("sign in to {action}")),
            AuthContext::User { .. } => {
                AuthError::forbidden(format!("you are not allowed to {action}"))
            }
        };
        Err(err.into())
    }

    /// E-mail of the caller, used as event actor
    pub fn actor(&self) -> Option<String> {
        self.context.email().map(str::to_string)
    }
}

impl<S> FromRequestParts<S> for Auth
where
    SessionHook: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BackofficeError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts);
        let hook = SessionHook::from_ref(state);
        let context = hook.authenticate(token.as_deref()).await?;
        Ok(Self { context, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_from_header() {
        let p = parts(Request::builder().uri("/clients").header(AUTHORIZATION, "Bearer abc123"));
        assert_eq!(bearer_token(&p).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_bearer_from_query() {
        let p = parts(Request::builder().uri("/clients/live?token=xyz"));
        assert_eq!(bearer_token(&p).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_no_token() {
        let p = parts(Request::builder().uri("/clients?page=2"));
        assert_eq!(bearer_token(&p), None);

        let p = parts(Request::builder().uri("/clients").header(AUTHORIZATION, "Basic abc"));
        assert_eq!(bearer_token(&p), None);
    }

    #[test]
    fn test_require_distinguishes_401_and_403() {
        let anon = Auth {
            context: AuthContext::Anonymous,
            token: None,
        };
        let err = anon.require(&AuthPolicy::Authenticated, "list clients").unwrap_err();
        assert_eq!(err.error_code(), "UNAUTHORIZED");

        let viewer = Auth {
            context: AuthContext::User {
                user_id: uuid::Uuid::new_v4(),
                email: "v@empresa.com".into(),
                name: "V".into(),
                role: "viewer".into(),
            },
            token: Some("t".into()),
        };
        let err = viewer.require(&AuthPolicy::AdminOnly, "delete users").unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(viewer.require(&AuthPolicy::Authenticated, "list").is_ok());
        assert_eq!(viewer.actor().as_deref(), Some("v@empresa.com"));
    }
}
