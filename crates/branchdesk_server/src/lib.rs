//! HTTP surface for branch management.
//!
//! # Responsibility
//! - Serve the AJAX endpoints used by the branches admin page.
//! - Render the admin page itself from core page state.
//!
//! # Invariants
//! - Handlers never touch SQL; they go through core services.
//! - Every error leaves as a JSON envelope or a re-rendered page, never a panic.

pub mod admin;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use errors::{AppError, AppResult};
pub use routes::create_app;
pub use state::AppState;

use branchdesk_core::db::{open_db, DbError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to start or run the HTTP server.
#[derive(Debug)]
pub enum ServeError {
    Db(DbError),
    Io(std::io::Error),
}

impl Display for ServeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database unavailable: {err}"),
            Self::Io(err) => write!(f, "server i/o failed: {err}"),
        }
    }
}

impl Error for ServeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServeError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ServeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Opens the configured database and serves until Ctrl-C.
pub async fn serve(config: &ServerConfig) -> Result<(), ServeError> {
    let conn = open_db(&config.db_path)?;
    let state = AppState::new(conn, config.base_url());
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .inspect_err(|err| {
            error!(
                "event=server_bind module=server status=error addr={} error={err}",
                config.bind_addr
            );
        })?;
    info!(
        "event=server_start module=server status=ok addr={} db_path={}",
        config.bind_addr,
        config.db_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_signal module=server status=error error={err}");
    }
}
