/*!
 * SQLite connection management.
 *
 * Wraps a single rusqlite connection behind a mutex and runs statements on
 * tokio's blocking pool so async callers never block the runtime.
 */

use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;
use super::store::TableNames;
use crate::errors::DataAccessError;

/// Database connection wrapper with thread-safe access
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open (or create) a database file and make sure the catalog tables exist
    pub fn open<P: AsRef<Path>>(db_path: P, tables: &TableNames) -> Result<Self, DataAccessError> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DataAccessError::Connection(format!("Failed to create database directory {:?}: {}", parent, e))
            })?;
        }

        info!("Opening catalog database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .map_err(|e| DataAccessError::Connection(format!("Failed to open {:?}: {}", db_path, e)))?;

        schema::initialize_schema(&conn, tables)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing and dry experiments)
    pub fn open_in_memory(tables: &TableNames) -> Result<Self, DataAccessError> {
        debug!("Creating in-memory catalog database");

        let conn = Connection::open_in_memory()
            .map_err(|e| DataAccessError::Connection(format!("Failed to create in-memory database: {}", e)))?;

        schema::initialize_schema(&conn, tables)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation with the connection
    pub fn execute<F, T>(&self, f: F) -> Result<T, DataAccessError>
    where
        F: FnOnce(&Connection) -> Result<T, DataAccessError>,
    {
        let conn = self.connection.lock();
        f(&conn)
    }

    /// Execute a database operation on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T, DataAccessError>
    where
        F: FnOnce(&Connection) -> Result<T, DataAccessError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await
        .map_err(|e| DataAccessError::Connection(format!("Database task panicked: {}", e)))?
    }
}
