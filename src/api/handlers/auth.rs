use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use crate::api::dtos::requests::{LoginForm, RegisterForm};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use tracing::info;

pub const SESSION_COOKIE: &str = "session";

pub async fn register_form(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    render_form(&state, "auth/register.html", None)
}

pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match state.auth_service.register(&form.username, &form.password).await {
        Ok(_) => Ok(Redirect::to("/auth/login").into_response()),
        // Form-level failures re-display the form with the message inline.
        Err(AppError::Validation(e)) => render_form(&state, "auth/register.html", Some(e.to_string())),
        Err(e) => Err(e),
    }
}

pub async fn login_form(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    render_form(&state, "auth/login.html", None)
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let prior = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string());

    match state
        .auth_service
        .login(&form.username, &form.password, prior.as_deref())
        .await
    {
        Ok(token) => {
            set_session_cookie(&cookies, token);
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::InvalidCredentials) => {
            // One message for both unknown user and wrong password, so the
            // form does not reveal which usernames exist.
            render_form(&state, "auth/login.html", Some(AppError::InvalidCredentials.to_string()))
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Response, AppError> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.auth_service.logout(cookie.value()).await?;
    }

    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());

    info!("User logged out");

    Ok(Redirect::to("/").into_response())
}

fn set_session_cookie(cookies: &Cookies, token: String) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookies.add(cookie);
}

fn render_form(state: &AppState, template: &str, error: Option<String>) -> Result<Response, AppError> {
    let mut ctx = tera::Context::new();
    ctx.insert("error", &error);

    let body = state
        .templates
        .render(template, &ctx)
        .map_err(|e| AppError::InternalWithMsg(format!("Template render failed: {e}")))?;

    Ok(Html(body).into_response())
}
