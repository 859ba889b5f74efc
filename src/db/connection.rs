// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

const APP_DIR_NAME: &str = "linkage";
const DATABASE_FILE_NAME: &str = "linkage.db";

/// Where the record store lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreLocation {
    /// `{APP_DATA}/linkage/linkage.db`
    DataDir,
    /// Explicit database file
    File { path: PathBuf },
    /// Private in-memory database, lives as long as the pool
    Memory,
}

/// Record store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub location: StoreLocation,

    /// Pool size for file-backed stores. In-memory stores always use one connection.
    pub max_connections: u32,

    /// SQLite busy timeout
    pub busy_timeout_ms: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: StoreLocation::DataDir,
            max_connections: 15,
            busy_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            ..Self::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File { path: path.into() },
            ..Self::default()
        }
    }

    /// Parse a JSON config document; omitted keys take their defaults
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Default database file path
///
/// Path structure: {APP_DATA}/linkage/linkage.db
pub fn default_database_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?;

    Ok(app_data_dir.join(APP_DIR_NAME).join(DATABASE_FILE_NAME))
}

/// Resolve the database file for a config, `None` for in-memory stores.
/// Creates the parent directory of file-backed stores.
pub fn get_database_path(config: &StoreConfig) -> AppResult<Option<PathBuf>> {
    let path = match &config.location {
        StoreLocation::Memory => return Ok(None),
        StoreLocation::DataDir => default_database_path()?,
        StoreLocation::File { path } => path.clone(),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(Some(path))
}

/// Create a connection pool
///
/// File-backed pools:
/// - WAL mode, foreign keys on, busy timeout from config
/// - `max_connections` connections
///
/// In-memory pools hold exactly one connection that is never evicted,
/// since each SQLite memory connection is its own database.
pub fn create_connection_pool(config: &StoreConfig) -> AppResult<ConnectionPool> {
    let busy_timeout_ms = config.busy_timeout_ms;

    let pool = match get_database_path(config)? {
        Some(db_path) => {
            log::info!("Opening record store at {}", db_path.display());

            let manager = SqliteConnectionManager::file(&db_path).with_init(move |conn| {
                conn.execute_batch(&format!(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = {};",
                    busy_timeout_ms
                ))
            });

            Pool::builder()
                .max_size(config.max_connections.max(1))
                .build(manager)
        }
        None => {
            log::info!("Opening in-memory record store");

            let manager = SqliteConnectionManager::memory()
                .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

            Pool::builder()
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
                .build(manager)
        }
    };

    pool.map_err(|e| AppError::Other(format!("Failed to create connection pool: {}", e)))
}

/// Get a connection from the pool
///
/// This is a convenience wrapper that provides better error messages.
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

/// Create a standalone connection (for testing)
///
/// This creates an in-memory database, useful for unit tests.
pub fn create_test_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory().map_err(AppError::Database)?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(AppError::Database)?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path() {
        let path = default_database_path().unwrap();
        assert!(path.ends_with("linkage/linkage.db"));
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config = StoreConfig::from_json_str(r#"{ "location": { "kind": "memory" } }"#).unwrap();
        assert_eq!(config.location, StoreLocation::Memory);
        assert_eq!(config.max_connections, 15);
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_config_from_bad_json_fails() {
        assert!(matches!(
            StoreConfig::from_json_str("{ not json"),
            Err(AppError::Serialization(_))
        ));
    }

    #[test]
    fn test_memory_pool_keeps_data_between_checkouts() {
        let pool = create_connection_pool(&StoreConfig::in_memory()).unwrap();

        {
            let conn = get_connection(&pool).unwrap();
            conn.execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (7);")
                .unwrap();
        }

        let conn = get_connection(&pool).unwrap();
        let v: i64 = conn.query_row("SELECT v FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn test_file_pool_enables_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::file(dir.path().join("nested").join("store.db"));

        let pool = create_connection_pool(&config).unwrap();
        let conn = get_connection(&pool).unwrap();

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
        assert!(dir.path().join("nested").join("store.db").exists());
    }

    #[test]
    fn test_test_connection() {
        let conn = create_test_connection().unwrap();

        let result: i32 = conn
            .query_row("SELECT 1 + 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(result, 2);
    }
}
