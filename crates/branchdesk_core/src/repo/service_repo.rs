//! Minimal service records and service-to-branch links.
//!
//! Only what the available-branches query needs: services are created and
//! linked here, everything else about them belongs to the parent application.

use crate::model::branch::BranchId;
use crate::repo::branch_repo::{RepoError, RepoResult};
use crate::repo::ensure_tables_ready;
use rusqlite::{params, Connection};

pub type ServiceId = i64;

/// SQLite-backed service link repository.
pub struct SqliteServiceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteServiceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(
            conn,
            &[
                ("services", &["id", "name", "duration", "price"]),
                ("services_branches", &["id_services", "id_branches"]),
            ],
        )?;
        Ok(Self { conn })
    }

    /// Inserts a service and returns its id.
    pub fn create_service(
        &self,
        name: &str,
        duration_minutes: Option<u32>,
        price: Option<f64>,
    ) -> RepoResult<ServiceId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepoError::InvalidData(
                "service name cannot be empty".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT INTO services (name, duration, price) VALUES (?1, ?2, ?3);",
            params![name, duration_minutes, price],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Offers `service_id` at `branch_id`. Linking twice is a no-op.
    pub fn link_service(&self, service_id: ServiceId, branch_id: BranchId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO services_branches (id_services, id_branches)
             VALUES (?1, ?2);",
            params![service_id, branch_id],
        )?;
        Ok(())
    }
}
