use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::services::{auth_service::AuthService, todo_service::TodoService};
use crate::infra::repositories::{
    postgres_session_repo::PostgresSessionRepo, postgres_todo_repo::PostgresTodoRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_session_repo::SqliteSessionRepo, sqlite_todo_repo::SqliteTodoRepo,
    sqlite_user_repo::SqliteUserRepo,
};

/// All pages ship compiled into the binary; nothing is read from disk at
/// render time. Shared with the test harness so it renders the real pages.
pub fn load_templates() -> Tera {
    let mut tera = Tera::default();
    tera.add_raw_template("index.html", include_str!("../templates/index.html"))
        .expect("Failed to load index template");
    tera.add_raw_template("auth/register.html", include_str!("../templates/auth/register.html"))
        .expect("Failed to load register template");
    tera.add_raw_template("auth/login.html", include_str!("../templates/auth/login.html"))
        .expect("Failed to load login template");
    tera.add_raw_template("todo/create.html", include_str!("../templates/todo/create.html"))
        .expect("Failed to load create template");
    tera.add_raw_template("todo/update.html", include_str!("../templates/todo/update.html"))
        .expect("Failed to load update template");
    tera
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let templates = Arc::new(load_templates());

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let user_repo = Arc::new(PostgresUserRepo::new(pool.clone()));
        let todo_repo = Arc::new(PostgresTodoRepo::new(pool.clone()));
        let session_repo = Arc::new(PostgresSessionRepo::new(pool.clone()));

        AppState {
            auth_service: Arc::new(AuthService::new(user_repo, session_repo)),
            todo_service: Arc::new(TodoService::new(todo_repo)),
            templates,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // SQLite leaves referential integrity off unless asked.
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
        let todo_repo = Arc::new(SqliteTodoRepo::new(pool.clone()));
        let session_repo = Arc::new(SqliteSessionRepo::new(pool.clone()));

        AppState {
            auth_service: Arc::new(AuthService::new(user_repo, session_repo)),
            todo_service: Arc::new(TodoService::new(todo_repo)),
            templates,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
