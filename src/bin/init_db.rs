//! Administrative command that brings the configured database up to the
//! current schema. Safe to run repeatedly; already-applied migrations are
//! skipped. The server also migrates on boot, so this exists for operators
//! who want the schema ready before first start.

use std::str::FromStr;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use todoer::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    let url = &config.database_url;

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .expect("Failed to connect to Postgres");

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .expect("Failed to run Postgres migrations");
    } else {
        let opts = SqliteConnectOptions::from_str(url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to run SQLite migrations");
    }

    println!("Initialized the database.");
}
