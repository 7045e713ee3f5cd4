use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Server-side record of a login session. Only the SHA-256 hash of the
/// cookie token is stored, so a leaked table cannot impersonate anyone.
#[derive(Debug, FromRow, Clone)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(token_hash: String, user_id: i64) -> Self {
        Self {
            token_hash,
            user_id,
            created_at: Utc::now(),
        }
    }
}
