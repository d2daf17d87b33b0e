//! Branch repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Validate and persist branch rows (`add` = insert or update).
//! - Serve lookups, batch reads and the name-ordered filter query.
//!
//! # Invariants
//! - Every write path runs [`BranchRepository::validate`] first.
//! - Category references are checked before insert/update, not left to the
//!   foreign key to reject.
//! - Read paths reject persisted rows that break model invariants.

use crate::db::{DbError, UNICODE_LOWER_FN};
use crate::model::branch::{Branch, BranchDraft, BranchId, BranchValidationError, CategoryId};
use crate::repo::{ensure_tables_ready, like_contains_pattern};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BRANCH_SELECT_SQL: &str = "SELECT
    id,
    name,
    location,
    id_service_categories
FROM branches";

/// Columns readable through [`BranchRepository::get_value`].
pub const BRANCH_COLUMNS: &[&str] = &["id", "name", "location", "id_service_categories"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for branch persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BranchValidationError),
    Db(DbError),
    NotFound(BranchId),
    NoMatchingRecord { name: String, location: String },
    UnknownField(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "branch not found: {id}"),
            Self::NoMatchingRecord { name, location } => write!(
                f,
                "no branch record named `{name}` at location `{location}`"
            ),
            Self::UnknownField(field) => write!(f, "unknown branch field `{field}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted branch data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BranchValidationError> for RepoError {
    fn from(value: BranchValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sort order for batch reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchOrder {
    #[default]
    IdAsc,
    NameAsc,
    NameDesc,
}

impl BranchOrder {
    fn sql(self) -> &'static str {
        match self {
            Self::IdAsc => " ORDER BY id ASC",
            Self::NameAsc => " ORDER BY name COLLATE NOCASE ASC, id ASC",
            Self::NameDesc => " ORDER BY name COLLATE NOCASE DESC, id ASC",
        }
    }
}

/// Conjunctive row filter for batch reads. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchFilter {
    pub id: Option<BranchId>,
    /// Exact name match.
    pub name: Option<String>,
    /// Exact location match.
    pub location: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring matched against name or location.
    pub key: Option<String>,
}

/// Options for [`BranchRepository::get_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchBatchQuery {
    pub filter: BranchFilter,
    pub limit: Option<u32>,
    pub offset: u32,
    pub order: BranchOrder,
}

/// Typed value of one branch column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchValue {
    Integer(i64),
    Text(String),
    Null,
}

/// Branch that offers at least one service, with its first linked service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableBranch {
    pub branch: Branch,
    pub service_id: i64,
    pub service_name: String,
}

/// Repository interface for branch records.
pub trait BranchRepository {
    /// Validates then inserts (no id) or updates (id) and returns the row id.
    fn add(&self, draft: &BranchDraft) -> RepoResult<BranchId>;
    /// Checks id existence, category existence and required fields.
    fn validate(&self, draft: &BranchDraft) -> RepoResult<()>;
    /// Whether a row with exactly this name and location exists.
    fn exists(&self, name: &str, location: &str) -> RepoResult<bool>;
    /// Id of the row with exactly this name and location.
    fn find_record_id(&self, name: &str, location: &str) -> RepoResult<BranchId>;
    /// Deletes one row. Returns `false` when it did not exist.
    fn delete(&self, id: BranchId) -> RepoResult<bool>;
    fn get_row(&self, id: BranchId) -> RepoResult<Option<Branch>>;
    /// Reads one column of one row by column name.
    fn get_value(&self, field: &str, id: BranchId) -> RepoResult<BranchValue>;
    fn get_batch(&self, query: &BranchBatchQuery) -> RepoResult<Vec<Branch>>;
    /// Branches linked to at least one service, ordered by name.
    fn get_available_branches(&self) -> RepoResult<Vec<AvailableBranch>>;
    /// Name-ordered substring search over name and location.
    fn filter(&self, key: &str, limit: u32) -> RepoResult<Vec<Branch>>;
}

/// SQLite-backed branch repository.
pub struct SqliteBranchRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBranchRepository<'conn> {
    /// Constructs a repository over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(
            conn,
            &[
                ("branches", BRANCH_COLUMNS),
                ("service_categories", &["id", "name"]),
                ("services_branches", &["id_services", "id_branches"]),
            ],
        )?;
        Ok(Self { conn })
    }

    fn insert(&self, draft: &BranchDraft) -> RepoResult<BranchId> {
        self.conn.execute(
            "INSERT INTO branches (name, location, id_service_categories)
             VALUES (?1, ?2, ?3);",
            params![
                draft.name.as_str(),
                draft.location.as_str(),
                draft.effective_category(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: BranchId, draft: &BranchDraft) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE branches
             SET
                name = ?1,
                location = ?2,
                id_service_categories = ?3
             WHERE id = ?4;",
            params![
                draft.name.as_str(),
                draft.location.as_str(),
                draft.effective_category(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn row_exists(&self, table: &'static str, id: i64) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl BranchRepository for SqliteBranchRepository<'_> {
    fn add(&self, draft: &BranchDraft) -> RepoResult<BranchId> {
        self.validate(draft)?;

        match draft.id {
            None => self.insert(draft),
            Some(id) => {
                self.update(id, draft)?;
                Ok(id)
            }
        }
    }

    fn validate(&self, draft: &BranchDraft) -> RepoResult<()> {
        if let Some(id) = draft.id {
            if !self.row_exists("branches", id)? {
                return Err(RepoError::NotFound(id));
            }
        }

        if let Some(category_id) = draft.effective_category() {
            if !self.row_exists("service_categories", category_id)? {
                return Err(BranchValidationError::UnknownCategory(category_id).into());
            }
        }

        draft.validate_fields()?;
        Ok(())
    }

    fn exists(&self, name: &str, location: &str) -> RepoResult<bool> {
        require_lookup_fields(name, location)?;
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM branches WHERE name = ?1 AND location = ?2
            );",
            params![name, location],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_record_id(&self, name: &str, location: &str) -> RepoResult<BranchId> {
        require_lookup_fields(name, location)?;
        self.conn
            .query_row(
                "SELECT id FROM branches
                 WHERE name = ?1 AND location = ?2
                 ORDER BY id ASC
                 LIMIT 1;",
                params![name, location],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::NoMatchingRecord {
                name: name.to_string(),
                location: location.to_string(),
            })
    }

    fn delete(&self, id: BranchId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM branches WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get_row(&self, id: BranchId) -> RepoResult<Option<Branch>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BRANCH_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_branch_row(row)?));
        }
        Ok(None)
    }

    fn get_value(&self, field: &str, id: BranchId) -> RepoResult<BranchValue> {
        let column = BRANCH_COLUMNS
            .iter()
            .find(|column| **column == field)
            .ok_or_else(|| RepoError::UnknownField(field.to_string()))?;

        let value: Option<Value> = self
            .conn
            .query_row(
                &format!("SELECT {column} FROM branches WHERE id = ?1;"),
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            None => Err(RepoError::NotFound(id)),
            Some(Value::Integer(value)) => Ok(BranchValue::Integer(value)),
            Some(Value::Text(value)) => Ok(BranchValue::Text(value)),
            Some(Value::Null) => Ok(BranchValue::Null),
            Some(other) => Err(RepoError::InvalidData(format!(
                "unexpected value type {:?} in branches.{column}",
                other.data_type()
            ))),
        }
    }

    fn get_batch(&self, query: &BranchBatchQuery) -> RepoResult<Vec<Branch>> {
        let mut sql = format!("{BRANCH_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        let filter = &query.filter;

        if let Some(id) = filter.id {
            sql.push_str(" AND id = ?");
            bind_values.push(Value::Integer(id));
        }
        if let Some(name) = filter.name.as_ref() {
            sql.push_str(" AND name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(location) = filter.location.as_ref() {
            sql.push_str(" AND location = ?");
            bind_values.push(Value::Text(location.clone()));
        }
        if let Some(category_id) = filter.category_id {
            sql.push_str(" AND id_service_categories = ?");
            bind_values.push(Value::Integer(category_id));
        }
        if let Some(key) = filter.key.as_deref().filter(|key| !key.is_empty()) {
            let pattern = like_contains_pattern(&key.to_lowercase());
            sql.push_str(&format!(
                " AND ({UNICODE_LOWER_FN}(name) LIKE ? ESCAPE '\\' \
                 OR {UNICODE_LOWER_FN}(location) LIKE ? ESCAPE '\\')"
            ));
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        sql.push_str(query.order.sql());

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut branches = Vec::new();
        while let Some(row) = rows.next()? {
            branches.push(parse_branch_row(row)?);
        }
        Ok(branches)
    }

    fn get_available_branches(&self) -> RepoResult<Vec<AvailableBranch>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                b.id,
                b.name,
                b.location,
                b.id_service_categories,
                s.id AS service_id,
                s.name AS service_name
             FROM branches b
             INNER JOIN services s ON s.id = (
                SELECT MIN(sb.id_services)
                FROM services_branches sb
                WHERE sb.id_branches = b.id
             )
             ORDER BY b.name COLLATE NOCASE ASC, b.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut available = Vec::new();
        while let Some(row) = rows.next()? {
            available.push(AvailableBranch {
                branch: parse_branch_row(row)?,
                service_id: row.get("service_id")?,
                service_name: row.get("service_name")?,
            });
        }
        Ok(available)
    }

    fn filter(&self, key: &str, limit: u32) -> RepoResult<Vec<Branch>> {
        self.get_batch(&BranchBatchQuery {
            filter: BranchFilter {
                key: Some(key.to_string()),
                ..BranchFilter::default()
            },
            limit: Some(limit),
            offset: 0,
            order: BranchOrder::NameAsc,
        })
    }
}

fn require_lookup_fields(name: &str, location: &str) -> RepoResult<()> {
    if name.is_empty() {
        return Err(BranchValidationError::MissingName.into());
    }
    if location.is_empty() {
        return Err(BranchValidationError::MissingLocation.into());
    }
    Ok(())
}

fn parse_branch_row(row: &Row<'_>) -> RepoResult<Branch> {
    let id: BranchId = row.get("id")?;
    let branch = Branch {
        id,
        name: row.get("name")?,
        location: row.get("location")?,
        category_id: row.get("id_service_categories")?,
    };

    if branch.name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty branches.name for id {id}"
        )));
    }
    if branch.location.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty branches.location for id {id}"
        )));
    }
    Ok(branch)
}
