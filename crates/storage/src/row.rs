use serde::{Deserialize, Serialize};

/// A stored field container. Write-once: the engine never edits a
/// container in place, it publishes a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerRow {
    pub container_id: String,
    /// Canonical JSON form of the container (schema tree included).
    pub schema: serde_json::Value,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub stored_at: String,
}

/// A stored form version. Write-once, like containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRow {
    pub version_id: String,
    pub title: String,
    /// Canonical JSON form of the version (schema and review steps).
    pub payload: serde_json::Value,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
}

/// A stored record: one submission under review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRow {
    pub record_id: String,
    pub version_id: String,
    /// Canonical JSON form of the validated submission's answer map.
    pub submission: serde_json::Value,
    /// Canonical JSON form of the record status.
    pub status: serde_json::Value,
    /// Lowercase status kind (`pending`, `accepted`, `refused`), kept as
    /// its own column so listings can filter without parsing `status`.
    pub status_kind: String,
    /// Revision counter for optimistic concurrency control.
    pub revision: i64,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
}
