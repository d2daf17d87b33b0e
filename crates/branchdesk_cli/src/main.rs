//! `branchdesk` command line entry point.
//!
//! # Responsibility
//! - Run the HTTP server with configuration from flags or environment.
//! - Offer direct store commands (`filter`, `add`, `delete`) for local checks.
//! - Keep output deterministic: records are printed as JSON lines.

use branchdesk_core::db::{open_db, DbError};
use branchdesk_core::{
    BranchDraft, BranchId, BranchService, BranchServiceError, CategoryId, RepoError,
    SqliteBranchRepository,
};
use branchdesk_server::config::{
    ENV_BASE_URL, ENV_BIND_ADDR, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL,
};
use branchdesk_server::{serve, ServeError, ServerConfig};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "branchdesk", version, about = "Branch management service", long_about = None)]
struct Args {
    /// SQLite database file
    #[arg(long, global = true, env = ENV_DB_PATH)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = ENV_LOG_LEVEL)]
    log_level: Option<String>,

    /// Directory for rotating log files; logs go to stderr when unset
    #[arg(long, global = true, env = ENV_LOG_DIR)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the admin page and AJAX endpoints
    Serve {
        /// Socket address to listen on
        #[arg(long, env = ENV_BIND_ADDR)]
        bind: Option<String>,
        /// Public URL prefix used in record links
        #[arg(long, env = ENV_BASE_URL)]
        base_url: Option<String>,
    },
    /// Print branches whose name or location contains KEY
    Filter {
        #[arg(default_value = "")]
        key: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Insert a branch, or update it when --id is given
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        category: Option<CategoryId>,
        #[arg(long)]
        id: Option<BranchId>,
    },
    /// Delete a branch by id
    Delete { id: BranchId },
    /// Check core linkage
    Ping,
}

#[derive(Debug)]
enum CliError {
    Config(String),
    Logging(String),
    Db(DbError),
    Repo(RepoError),
    Service(BranchServiceError),
    Serve(ServeError),
    Output(serde_json::Error),
    NotFound(BranchId),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Serve(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "cannot encode output: {err}"),
            Self::NotFound(id) => write!(f, "branch not found: {id}"),
        }
    }
}

impl Error for CliError {}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<BranchServiceError> for CliError {
    fn from(value: BranchServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<ServeError> for CliError {
    fn from(value: ServeError) -> Self {
        Self::Serve(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Args::parse()).await {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    if let Command::Ping = args.command {
        println!("branchdesk_core ping={}", branchdesk_core::ping());
        println!("branchdesk_core version={}", branchdesk_core::core_version());
        return Ok(());
    }

    let config = server_config(&args)?;
    init_logging(&config)?;

    match args.command {
        Command::Serve { .. } => {
            serve(&config).await?;
        }
        Command::Filter { key, limit } => {
            let conn = open_db(&config.db_path)?;
            let service = BranchService::new(SqliteBranchRepository::try_new(&conn)?);
            let result = service.filter_branches(&key, limit)?;
            for branch in &result.items {
                println!("{}", serde_json::to_string(branch)?);
            }
        }
        Command::Add {
            name,
            location,
            category,
            id,
        } => {
            let conn = open_db(&config.db_path)?;
            let service = BranchService::new(SqliteBranchRepository::try_new(&conn)?);
            let mut draft = BranchDraft::new(name, location);
            draft.id = id;
            draft.category_id = category;
            let saved = service.save_branch(&draft)?;
            println!("{}", serde_json::to_string(&saved)?);
        }
        Command::Delete { id } => {
            let conn = open_db(&config.db_path)?;
            let service = BranchService::new(SqliteBranchRepository::try_new(&conn)?);
            if !service.delete_branch(id)? {
                return Err(CliError::NotFound(id));
            }
            info!("event=cli_delete module=cli status=ok branch_id={id}");
        }
        Command::Ping => {}
    }
    Ok(())
}

/// Resolves flags (already merged with env by clap) into a server config.
fn server_config(args: &Args) -> Result<ServerConfig, CliError> {
    let (bind, base_url) = match &args.command {
        Command::Serve { bind, base_url } => (bind.clone(), base_url.clone()),
        _ => (None, None),
    };
    let db = args.db.as_ref().map(|path| path.display().to_string());
    let log_dir = args.log_dir.as_ref().map(|path| path.display().to_string());

    ServerConfig::from_lookup(|key| match key {
        ENV_BIND_ADDR => bind.clone(),
        ENV_BASE_URL => base_url.clone(),
        ENV_DB_PATH => db.clone(),
        ENV_LOG_LEVEL => args.log_level.clone(),
        ENV_LOG_DIR => log_dir.clone(),
        _ => None,
    })
    .map_err(CliError::Config)
}

fn init_logging(config: &ServerConfig) -> Result<(), CliError> {
    let result = match &config.log_dir {
        Some(dir) => {
            branchdesk_core::init_logging(&config.log_level, &dir.display().to_string())
        }
        None => branchdesk_core::init_stderr_logging(&config.log_level),
    };
    result.map_err(CliError::Logging)
}

#[cfg(test)]
mod tests {
    use super::{server_config, Args, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn serve_flags_override_defaults() {
        let args = Args::try_parse_from([
            "branchdesk",
            "--db",
            "/tmp/custom.sqlite3",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--base-url",
            "https://example.test/",
        ])
        .unwrap();
        let config = server_config(&args).unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.db_path, PathBuf::from("/tmp/custom.sqlite3"));
        assert_eq!(config.base_url(), "https://example.test");
    }

    #[test]
    fn invalid_bind_address_is_a_config_error() {
        let args = Args::try_parse_from(["branchdesk", "serve", "--bind", "nowhere"]).unwrap();
        assert!(server_config(&args).is_err());
    }

    #[test]
    fn filter_key_defaults_to_empty() {
        let args = Args::try_parse_from(["branchdesk", "filter", "--limit", "5"]).unwrap();
        match args.command {
            Command::Filter { key, limit } => {
                assert_eq!(key, "");
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_requires_name_and_location() {
        assert!(Args::try_parse_from(["branchdesk", "add", "--name", "Harbor"]).is_err());
        assert!(Args::try_parse_from([
            "branchdesk",
            "add",
            "--name",
            "Harbor",
            "--location",
            "Pier 4",
            "--category",
            "2",
        ])
        .is_ok());
    }
}
