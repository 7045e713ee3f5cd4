use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use crate::api::dtos::requests::TodoForm;
use crate::api::extractors::current_user::{require_login, CurrentUser};
use crate::domain::models::todo::TodoView;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

/// The shared listing. Anonymous visitors see every todo; signed-in users
/// additionally get edit links on their own rows, which the template
/// decides by comparing ids.
pub async fn index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, AppError> {
    let todos = state.todo_service.list_all().await?;

    let mut ctx = tera::Context::new();
    ctx.insert("todos", &todos);
    ctx.insert("user", &user);

    let body = state
        .templates
        .render("index.html", &ctx)
        .map_err(|e| AppError::InternalWithMsg(format!("Template render failed: {e}")))?;

    Ok(Html(body).into_response())
}

pub async fn create_form(
    State(state): State<Arc<AppState>>,
    identity: CurrentUser,
) -> Result<Response, AppError> {
    require_login(identity)?;
    render_create(&state, None)
}

pub async fn create_submit(
    State(state): State<Arc<AppState>>,
    identity: CurrentUser,
    Form(form): Form<TodoForm>,
) -> Result<Response, AppError> {
    let user = require_login(identity)?;

    match state
        .todo_service
        .create(&user, &form.task, &form.description)
        .await
    {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Validation(e)) => render_create(&state, Some(e.to_string())),
        Err(e) => Err(e),
    }
}

pub async fn update_form(
    State(state): State<Arc<AppState>>,
    identity: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let user = require_login(identity)?;
    let todo = state.todo_service.get_by_id(id, true, Some(&user)).await?;
    render_update(&state, &todo, None)
}

pub async fn update_submit(
    State(state): State<Arc<AppState>>,
    identity: CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<TodoForm>,
) -> Result<Response, AppError> {
    let user = require_login(identity)?;

    // Fetched up front so a validation failure can re-display the page.
    // Missing or foreign todos fail here before any field is looked at.
    let todo = state.todo_service.get_by_id(id, true, Some(&user)).await?;

    match state
        .todo_service
        .update(id, &user, &form.task, &form.description, form.is_completed())
        .await
    {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Validation(e)) => render_update(&state, &todo, Some(e.to_string())),
        Err(e) => Err(e),
    }
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    identity: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let user = require_login(identity)?;
    state.todo_service.delete(id, &user).await?;
    Ok(Redirect::to("/").into_response())
}

fn render_create(state: &AppState, error: Option<String>) -> Result<Response, AppError> {
    let mut ctx = tera::Context::new();
    ctx.insert("error", &error);

    let body = state
        .templates
        .render("todo/create.html", &ctx)
        .map_err(|e| AppError::InternalWithMsg(format!("Template render failed: {e}")))?;

    Ok(Html(body).into_response())
}

fn render_update(state: &AppState, todo: &TodoView, error: Option<String>) -> Result<Response, AppError> {
    let mut ctx = tera::Context::new();
    ctx.insert("todo", todo);
    ctx.insert("error", &error);

    let body = state
        .templates
        .render("todo/update.html", &ctx)
        .map_err(|e| AppError::InternalWithMsg(format!("Template render failed: {e}")))?;

    Ok(Html(body).into_response())
}
