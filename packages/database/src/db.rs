//! Database connection and schema management.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Default path for the `SQLite` database, relative to the working
/// directory.
pub const DEFAULT_DB_PATH: &str = "data/quote_vision.db";

/// Opens (or creates) the `SQLite` database at `path` and ensures the
/// schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the parent directory cannot be created, the
/// database cannot be opened, or schema creation fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;
    log::debug!("Opened database at {}", path.display());

    Ok(db)
}

/// Creates all tables and indexes if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS quotes (
            id              TEXT PRIMARY KEY,
            contractor_name TEXT NOT NULL,
            company         TEXT NOT NULL,
            roof_size       REAL NOT NULL,
            roof_type       TEXT NOT NULL,
            project_city    TEXT NOT NULL,
            project_state   TEXT NOT NULL,
            project_date    TEXT NOT NULL,
            submitted_at    TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS projects (
            id                    TEXT PRIMARY KEY,
            contractor_name       TEXT NOT NULL,
            company               TEXT NOT NULL,
            roof_size             REAL NOT NULL,
            roof_type             TEXT NOT NULL,
            project_city          TEXT NOT NULL,
            project_state         TEXT NOT NULL,
            project_date          TEXT NOT NULL,
            completed             INTEGER NOT NULL DEFAULT 0,
            energy_savings        REAL NOT NULL,
            cost_savings          REAL NOT NULL,
            temperature_reduction REAL NOT NULL,
            installation_date     TEXT,
            created_at            TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_quotes_state_type
         ON quotes (project_state, roof_type)",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_quotes_submitted
         ON quotes (submitted_at)",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_projects_state_type
         ON projects (project_state, roof_type)",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_projects_date
         ON projects (project_date)",
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_support::TempDb;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let temp = TempDb::new().await;
        super::ensure_schema(temp.db.as_ref()).await.unwrap();

        let rows = temp
            .db
            .query_raw_params(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
