pub mod sqlite_session_repo;
pub mod sqlite_todo_repo;
pub mod sqlite_user_repo;

pub mod postgres_session_repo;
pub mod postgres_todo_repo;
pub mod postgres_user_repo;
