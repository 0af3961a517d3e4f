//! Embedded `SQLite` migrations.
//!
//! Migrations are compiled into the binary and tracked in the
//! `_sessiongate_migrations` table, so `run` is safe to call on every start.
//!
//! # Example
//!
//! ```rust,ignore
//! use sessiongate::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250102000001_create_accounts_table",
        include_str!("../../migrations_sqlite/20250102000001_create_accounts_table.sql"),
    ),
    (
        "20250102000002_create_issued_tokens_table",
        include_str!("../../migrations_sqlite/20250102000002_create_issued_tokens_table.sql"),
    ),
];

/// Applies any migrations not yet recorded in the tracking table.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _sessiongate_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _sessiongate_migrations WHERE name = ?)",
        )
        .bind(*name)
        .fetch_one(pool)
        .await?;

        if !applied {
            // SQLite executes one statement at a time, so split on semicolons.
            // None of the bundled migrations contain a semicolon inside a
            // string literal.
            for statement in sql.split(';') {
                let trimmed = statement.trim();
                if !trimmed.is_empty() {
                    pool.execute(trimmed).await?;
                }
            }

            sqlx::query("INSERT INTO _sessiongate_migrations (name) VALUES (?)")
                .bind(*name)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}
