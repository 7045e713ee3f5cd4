use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    // Hidden from template contexts; the column keeps its legacy name.
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String,
}
