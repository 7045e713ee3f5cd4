use todoer::{
    api::router::create_router,
    domain::{
        models::{
            todo::{NewTodo, TodoView},
            user::User,
        },
        ports::{TodoRepository, UserRepository},
        services::{auth_service::AuthService, todo_service::TodoService},
    },
    error::AppError,
    infra::factory::load_templates,
    infra::repositories::{
        sqlite_session_repo::SqliteSessionRepo,
        sqlite_todo_repo::SqliteTodoRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    state::AppState,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

/// TodoRepository whose reads resolve normally but whose owner-scoped
/// writes match nothing, as when the row disappears between the ownership
/// check and the write.
#[allow(dead_code)]
pub struct MockRacedTodoRepo {
    pub row: TodoView,
}

#[async_trait]
impl TodoRepository for MockRacedTodoRepo {
    async fn insert(&self, _todo: &NewTodo) -> Result<i64, AppError> {
        Ok(self.row.id)
    }

    async fn list_with_creators(&self) -> Result<Vec<TodoView>, AppError> {
        Ok(vec![self.row.clone()])
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<TodoView>, AppError> {
        Ok(Some(self.row.clone()))
    }

    async fn update_owned(
        &self,
        _id: i64,
        _owner_id: i64,
        _task: &str,
        _description: &str,
        _completed: bool,
        _completed_at: Option<DateTime<Utc>>,
    ) -> Result<u64, AppError> {
        Ok(0)
    }

    async fn delete_owned(&self, _id: i64, _owner_id: i64) -> Result<u64, AppError> {
        Ok(0)
    }
}

/// UserRepository whose username lookups always miss while writes reach
/// the real store, as when a concurrent registration lands between the
/// service's pre-check and its insert.
#[allow(dead_code)]
pub struct MockRacedUserRepo {
    pub inner: SqliteUserRepo,
}

#[async_trait]
impl UserRepository for MockRacedUserRepo {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        self.inner.create(username, password_hash).await
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, AppError> {
        Ok(None)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.inner.find_by_id(id).await
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
        let todo_repo = Arc::new(SqliteTodoRepo::new(pool.clone()));
        let session_repo = Arc::new(SqliteSessionRepo::new(pool.clone()));

        let state = Arc::new(AppState {
            auth_service: Arc::new(AuthService::new(user_repo, session_repo)),
            todo_service: Arc::new(TodoService::new(todo_repo)),
            templates: Arc::new(load_templates()),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = session {
            builder = builder.header(header::COOKIE, format!("session={token}"));
        }

        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(
        &self,
        uri: &str,
        session: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response {
        let body = serde_urlencoded::to_string(fields).unwrap();

        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = session {
            builder = builder.header(header::COOKIE, format!("session={token}"));
        }

        self.router
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap()
    }

    pub async fn register(&self, username: &str, password: &str) -> Response {
        self.post_form(
            "/auth/register",
            None,
            &[("username", username), ("password", password)],
        )
        .await
    }

    /// Logs in and returns the raw session token from the Set-Cookie header.
    /// Panics if the credentials are rejected, so tests fail loudly.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/auth/login",
                None,
                &[("username", username), ("password", password)],
            )
            .await;

        if response.status() != StatusCode::SEE_OTHER {
            panic!("Login failed in test helper: status {}", response.status());
        }

        extract_session_cookie(&response).expect("No session cookie returned")
    }

    pub async fn create_todo(&self, session: &str, task: &str, description: &str) -> Response {
        self.post_form(
            "/create",
            Some(session),
            &[("task", task), ("description", description)],
        )
        .await
    }
}

#[allow(dead_code)]
pub fn extract_session_cookie(response: &Response) -> Option<String> {
    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .collect();

    let session_cookie = cookies.iter().find(|c| c.contains("session="))?;

    let start = session_cookie.find("session=").unwrap() + 8;
    let end = session_cookie[start..]
        .find(';')
        .unwrap_or(session_cookie.len() - start);
    Some(session_cookie[start..start + end].to_string())
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
