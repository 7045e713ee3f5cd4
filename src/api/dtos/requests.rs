use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Shared by the create and update forms. The update page adds a checkbox,
/// which browsers submit as "on" or omit entirely.
#[derive(Deserialize)]
pub struct TodoForm {
    pub task: String,
    pub description: String,
    pub completed: Option<String>,
}

impl TodoForm {
    pub fn is_completed(&self) -> bool {
        self.completed.as_deref() == Some("on")
    }
}
