//! Repository layer over the branch store.
//!
//! # Responsibility
//! - Define data access contracts for branches, categories and services.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Repositories are only constructed over connections whose schema has
//!   the tables and columns they query.
//! - Repository APIs return semantic errors (`NotFound`, `Validation`) in
//!   addition to DB transport errors.

pub mod branch_repo;
pub mod category_repo;
pub mod service_repo;

use branch_repo::{RepoError, RepoResult};
use rusqlite::Connection;

/// Fails unless every `(table, columns)` pair exists in `conn`.
pub(crate) fn ensure_tables_ready(
    conn: &Connection,
    tables: &[(&'static str, &'static [&'static str])],
) -> RepoResult<()> {
    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

/// Builds a `LIKE ... ESCAPE '\'` pattern matching `key` as a literal substring.
pub(crate) fn like_contains_pattern(key: &str) -> String {
    let mut pattern = String::with_capacity(key.len() + 2);
    pattern.push('%');
    for ch in key.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
