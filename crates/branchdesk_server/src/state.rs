//! Shared handler state.

use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// One SQLite connection shared by all requests.
///
/// Access is serialized by the mutex and runs on the blocking pool so SQL
/// never stalls the async workers.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    base_url: Arc<str>,
}

impl AppState {
    pub fn new(conn: Connection, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            db: Arc::new(Mutex::new(conn)),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs `f` with exclusive access to the connection.
    pub async fn with_conn<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| AppError::internal("database lock poisoned"))?;
            f(&conn)
        })
        .await
        .map_err(|err| AppError::internal(format!("database task failed: {err}")))?
    }
}
