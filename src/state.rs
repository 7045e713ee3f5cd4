use std::sync::Arc;
use crate::domain::services::{auth_service::AuthService, todo_service::TodoService};
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub todo_service: Arc<TodoService>,
    pub templates: Arc<Tera>,
}
