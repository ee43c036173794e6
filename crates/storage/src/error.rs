/// All errors that can be returned by a CaseworkStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Optimistic concurrency control conflict: another transition
    /// committed concurrently and the expected revision was not found.
    #[error("concurrent conflict on record {record_id}: expected revision {expected_revision}")]
    ConcurrentConflict {
        record_id: String,
        expected_revision: i64,
    },

    /// No container stored under this identifier.
    #[error("container not found: {container_id}")]
    ContainerNotFound { container_id: String },

    /// No form version stored under this identifier.
    #[error("form version not found: {version_id}")]
    VersionNotFound { version_id: String },

    /// No record stored under this identifier.
    #[error("record not found: {record_id}")]
    RecordNotFound { record_id: String },

    /// Write-once violation: an entry with this identifier already exists.
    #[error("already stored: {id}")]
    AlreadyStored { id: String },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
