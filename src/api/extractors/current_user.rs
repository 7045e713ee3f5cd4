use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::api::handlers::auth::SESSION_COOKIE;
use crate::domain::models::user::User;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

/// The request's resolved identity. Every handler that cares about who is
/// calling takes this; anonymous requests carry None rather than failing,
/// since the listing page is public.
pub struct CurrentUser(pub Option<User>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // CookieManagerLayer always inserts this; absence is a wiring bug.
        let Some(cookies) = parts.extensions.get::<Cookies>() else {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        };

        let token = match cookies.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(CurrentUser(None)),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        // A stale or forged token resolves to anonymous, not an error.
        let user = app_state
            .auth_service
            .resolve_session(&token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        if let Some(user) = &user {
            Span::current().record("user_id", user.id);
        }

        Ok(CurrentUser(user))
    }
}

/// Gate for the protected handlers: yields the signed-in user, or sends
/// anonymous callers to the login form.
pub fn require_login(identity: CurrentUser) -> Result<User, AppError> {
    identity.0.ok_or(AppError::LoginRequired)
}
