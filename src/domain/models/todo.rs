use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Fields the caller supplies when creating a todo. The store assigns the id.
pub struct NewTodo {
    pub task: String,
    pub description: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl NewTodo {
    pub fn new(task: String, description: String, created_by: i64) -> Self {
        Self {
            task,
            description,
            created_by,
            created_at: Utc::now(),
        }
    }
}

/// A todo joined with its creator's username, the shape every page renders.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct TodoView {
    pub id: i64,
    pub task: String,
    pub description: String,
    pub created_by: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}
