use async_trait::async_trait;

use crate::error::StorageError;
use crate::row::{ContainerRow, RecordRow, VersionRow};

/// The storage trait for casework persistence backends.
///
/// ## Write-once entries
///
/// Containers and form versions are immutable values: `put_container`
/// and `put_version` reject an identifier that is already stored
/// (`StorageError::AlreadyStored`). Editing a form always produces a new
/// container and a new version, so records created against prior
/// versions stay interpretable.
///
/// ## OCC conflict detection
///
/// `update_record` performs an optimistic concurrency check, conditional
/// on `revision = expected_revision`. When the stored revision differs,
/// the method returns `Err(StorageError::ConcurrentConflict { ... })`
/// and the caller re-reads the record, recomputes the transition, and
/// retries.
///
/// ## Thread safety
///
/// Implementations must be `Send + Sync + 'static` so they can be shared
/// as application state across async task boundaries.
#[async_trait]
pub trait CaseworkStorage: Send + Sync + 'static {
    // ── Containers (write-once) ───────────────────────────────────────

    /// Store a container. Fails with `AlreadyStored` if the identifier
    /// is taken.
    async fn put_container(&self, row: ContainerRow) -> Result<(), StorageError>;

    /// Read a container by identifier.
    async fn get_container(&self, container_id: &str) -> Result<ContainerRow, StorageError>;

    // ── Form versions (write-once) ────────────────────────────────────

    /// Store a form version. Fails with `AlreadyStored` if the
    /// identifier is taken.
    async fn put_version(&self, row: VersionRow) -> Result<(), StorageError>;

    /// Read a form version by identifier.
    async fn get_version(&self, version_id: &str) -> Result<VersionRow, StorageError>;

    // ── Records ───────────────────────────────────────────────────────

    /// Insert a freshly opened record at revision 0.
    async fn insert_record(&self, row: RecordRow) -> Result<(), StorageError>;

    /// Read a record by identifier.
    async fn get_record(&self, record_id: &str) -> Result<RecordRow, StorageError>;

    /// Apply a revision-validated update to a record's status (OCC).
    ///
    /// The update is conditional on `revision = expected_revision` and
    /// writes the new status, status kind, revision, and timestamp in
    /// one step. Returns the new revision on success.
    async fn update_record(
        &self,
        record_id: &str,
        expected_revision: i64,
        status: serde_json::Value,
        status_kind: &str,
        updated_at: &str,
    ) -> Result<i64, StorageError>;

    /// List records with optional filters.
    ///
    /// - `version_id`: restrict to one form version
    /// - `status_kind`: restrict to one status kind (`pending`, ...)
    /// - `limit`: maximum number of results (0 = no limit)
    async fn list_records(
        &self,
        version_id: Option<&str>,
        status_kind: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RecordRow>, StorageError>;
}
