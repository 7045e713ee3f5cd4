use crate::domain::{
    models::todo::{NewTodo, TodoView},
    ports::TodoRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresTodoRepo {
    pool: PgPool,
}

impl PostgresTodoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_VIEW: &str = "SELECT todo.id, todo.task, todo.description, todo.created_by, \
     \"user\".username, todo.created_at, todo.completed, todo.completed_at \
     FROM todo JOIN \"user\" ON todo.created_by = \"user\".id";

#[async_trait]
impl TodoRepository for PostgresTodoRepo {
    async fn insert(&self, todo: &NewTodo) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO todo (task, description, created_by, created_at) VALUES ($1, $2, $3, $4) RETURNING id",
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
        sqlx::query_as::<_, TodoView>(&format!("{SELECT_VIEW} WHERE todo.id = $1"))
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
            "UPDATE todo SET task = $1, description = $2, completed = $3, completed_at = $4 \
             WHERE id = $5 AND created_by = $6",
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
        let result = sqlx::query("DELETE FROM todo WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}
