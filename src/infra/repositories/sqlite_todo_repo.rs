use crate::domain::{
    models::todo::{NewTodo, TodoView},
    ports::TodoRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteTodoRepo {
    pool: SqlitePool,
}

impl SqliteTodoRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// Every read joins the creator so pages can show "by <username>".
const SELECT_VIEW: &str = "SELECT todo.id, todo.task, todo.description, todo.created_by, \
     user.username, todo.created_at, todo.completed, todo.completed_at \
     FROM todo JOIN user ON todo.created_by = user.id";

#[async_trait]
impl TodoRepository for SqliteTodoRepo {
    async fn insert(&self, todo: &NewTodo) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO todo (task, description, created_by, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&todo.task)
        .bind(&todo.description)
        .bind(todo.created_by)
        .bind(todo.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_with_creators(&self) -> Result<Vec<TodoView>, AppError> {
        sqlx::query_as::<_, TodoView>(&format!("{SELECT_VIEW} ORDER BY todo.created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TodoView>, AppError> {
        sqlx::query_as::<_, TodoView>(&format!("{SELECT_VIEW} WHERE todo.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_owned(
        &self,
        id: i64,
        owner_id: i64,
        task: &str,
        description: &str,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE todo SET task = ?, description = ?, completed = ?, completed_at = ? \
             WHERE id = ? AND created_by = ?",
        )
        .bind(task)
        .bind(description)
        .bind(completed)
        .bind(completed_at)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn delete_owned(&self, id: i64, owner_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM todo WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}
