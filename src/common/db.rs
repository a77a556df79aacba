// src/common/db.rs
//! SQLite pool construction

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use super::migrations::run_migrations;

/// Opens the pool for `database_url` and runs migrations.
///
/// File databases get their parent directory created. In-memory databases
/// are pinned to a single connection that is never recycled, since every
/// SQLite connection to `:memory:` is its own database.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    if !in_memory {
        if let Some(path_part) = database_url.strip_prefix("sqlite://") {
            let path_without_params = path_part.split('?').next().unwrap_or("");
            if !path_without_params.is_empty() {
                let db_path = PathBuf::from(path_without_params);
                if let Some(parent) = db_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    let pool = pool_options.connect_with(connect_options).await?;
    run_migrations(&pool).await?;
    info!(in_memory, "Database ready");

    Ok(pool)
}
