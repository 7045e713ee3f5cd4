use crate::domain::models::{
    session::SessionRecord,
    todo::{NewTodo, TodoView},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn insert(&self, todo: &NewTodo) -> Result<i64, AppError>;
    async fn list_with_creators(&self) -> Result<Vec<TodoView>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<TodoView>, AppError>;
    /// Writes only the row both matching `id` and owned by `owner_id`;
    /// returns the number of rows touched so callers can spot lost races.
    async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        task: &str,
        description: &str,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<u64, AppError>;
    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<u64, AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &SessionRecord) -> Result<(), AppError>;
    async fn find(&self, token_hash: &str) -> Result<Option<SessionRecord>, AppError>;
    async fn delete(&self, token_hash: &str) -> Result<(), AppError>;
}
