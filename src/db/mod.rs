pub mod queries;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::ai::AiClient;
use crate::config::Config;
use crate::error::Result;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub ai: AiClient,
}

/// Open the SQLite-backed license store and ensure the schema exists.
///
/// WAL + busy timeout so concurrent handlers queue on the single writer
/// instead of failing; per-key upsert atomicity rides on that writer lock
/// (see `queries::upsert_license`).
pub fn init_pool(path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
    });
    let pool = Pool::new(manager)?;

    let conn = pool.get()?;
    conn.execute_batch(SCHEMA)?;
    Ok(pool)
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS licenses (
    user_id       TEXT PRIMARY KEY,
    plan          TEXT NOT NULL DEFAULT 'free',
    is_active     INTEGER NOT NULL DEFAULT 0,
    source        TEXT NOT NULL DEFAULT 'none',
    ls_status     TEXT,
    ls_variant_id TEXT,
    updated_at    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_events (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL,
    event_type  TEXT NOT NULL,
    event_name  TEXT NOT NULL,
    user_id     TEXT,
    email       TEXT,
    variant_id  TEXT,
    test_mode   INTEGER NOT NULL DEFAULT 0,
    received_at INTEGER NOT NULL
);
";
