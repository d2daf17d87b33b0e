//! Service category lookups used by branch validation and the admin page.

use crate::model::branch::CategoryId;
use crate::repo::branch_repo::{RepoError, RepoResult};
use crate::repo::ensure_tables_ready;
use rusqlite::{params, Connection};
use serde::Serialize;

/// Service category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// Repository interface for service categories.
pub trait CategoryRepository {
    fn create_category(&self, name: &str, description: Option<&str>) -> RepoResult<CategoryId>;
    /// All categories sorted by name.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn category_exists(&self, id: CategoryId) -> RepoResult<bool>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(conn, &[("service_categories", &["id", "name", "description"])])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, name: &str, description: Option<&str>) -> RepoResult<CategoryId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepoError::InvalidData(
                "service category name cannot be empty".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT INTO service_categories (name, description) VALUES (?1, ?2);",
            params![name, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description
             FROM service_categories
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(Category {
                id: row.get("id")?,
                name: row.get("name")?,
                description: row.get("description")?,
            });
        }
        Ok(categories)
    }

    fn category_exists(&self, id: CategoryId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM service_categories WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
