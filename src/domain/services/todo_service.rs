use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::{
    models::{
        todo::{NewTodo, TodoView},
        user::User,
    },
    ports::TodoRepository,
};
use crate::error::{AppError, ValidationError};

pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoRepository>) -> Self {
        Self { todos }
    }

    /// Every todo joined with its creator's username, newest first.
    /// The listing is shared: anonymous callers see it too.
    pub async fn list_all(&self) -> Result<Vec<TodoView>, AppError> {
        self.todos.list_with_creators().await
    }

    pub async fn create(
        &self,
        user: &User,
        task: &str,
        description: &str,
    ) -> Result<i64, AppError> {
        if task.is_empty() {
            return Err(ValidationError::TaskRequired.into());
        }

        let todo = NewTodo::new(task.to_string(), description.to_string(), user.id);
        let id = self.todos.insert(&todo).await?;

        info!("User {} created todo {}", user.id, id);
        Ok(id)
    }

    /// Fetches one todo, optionally enforcing that the requester owns it.
    /// A missing row is NotFound; a row owned by someone else is Forbidden.
    /// The existence check runs first, so those never trade places.
    pub async fn get_by_id(
        &self,
        id: i64,
        enforce_owner: bool,
        requester: Option<&User>,
    ) -> Result<TodoView, AppError> {
        let todo = self
            .todos
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Todo identified with {id} does not exist.")))?;

        if enforce_owner && requester.map(|u| u.id) != Some(todo.created_by) {
            return Err(AppError::Forbidden);
        }

        Ok(todo)
    }

    /// Replaces a todo's fields. `completed_at` follows the flag: stamped
    /// now when completing, cleared when reopening.
    pub async fn update(
        &self,
        id: i64,
        user: &User,
        task: &str,
        description: &str,
        completed: bool,
    ) -> Result<(), AppError> {
        self.get_by_id(id, true, Some(user)).await?;

        if task.is_empty() {
            return Err(ValidationError::TaskRequired.into());
        }

        let completed_at = completed.then(Utc::now);
        let rows = self
            .todos
            .update_owned(id, user.id, task, description, completed, completed_at)
            .await?;

        // The write is scoped to the owner, so zero rows means the row
        // vanished or changed hands between the check and the write.
        if rows == 0 {
            return Err(AppError::Conflict(format!("Todo {id} changed concurrently.")));
        }

        info!("User {} updated todo {}", user.id, id);
        Ok(())
    }

    pub async fn delete(&self, id: i64, user: &User) -> Result<(), AppError> {
        self.get_by_id(id, true, Some(user)).await?;

        let rows = self.todos.delete_owned(id, user.id).await?;
        if rows == 0 {
            return Err(AppError::Conflict(format!("Todo {id} changed concurrently.")));
        }

        info!("User {} deleted todo {}", user.id, id);
        Ok(())
    }
}
