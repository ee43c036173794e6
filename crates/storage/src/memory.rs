//! In-process reference backend.
//!
//! Backs the trait with plain maps behind a mutex. Suitable for tests
//! and single-process deployments; the lock is held only for the
//! duration of each map operation, never across an await point.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::row::{ContainerRow, RecordRow, VersionRow};
use crate::traits::CaseworkStorage;

#[derive(Default)]
struct State {
    containers: BTreeMap<String, ContainerRow>,
    versions: BTreeMap<String, VersionRow>,
    records: BTreeMap<String, RecordRow>,
}

/// A `CaseworkStorage` backed by in-process maps.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Backend("storage mutex poisoned".to_string()))
    }
}

#[async_trait]
impl CaseworkStorage for MemoryStorage {
    async fn put_container(&self, row: ContainerRow) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.containers.contains_key(&row.container_id) {
            return Err(StorageError::AlreadyStored {
                id: row.container_id,
            });
        }
        state.containers.insert(row.container_id.clone(), row);
        Ok(())
    }

    async fn get_container(&self, container_id: &str) -> Result<ContainerRow, StorageError> {
        self.lock()?
            .containers
            .get(container_id)
            .cloned()
            .ok_or_else(|| StorageError::ContainerNotFound {
                container_id: container_id.to_string(),
            })
    }

    async fn put_version(&self, row: VersionRow) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.versions.contains_key(&row.version_id) {
            return Err(StorageError::AlreadyStored { id: row.version_id });
        }
        state.versions.insert(row.version_id.clone(), row);
        Ok(())
    }

    async fn get_version(&self, version_id: &str) -> Result<VersionRow, StorageError> {
        self.lock()?
            .versions
            .get(version_id)
            .cloned()
            .ok_or_else(|| StorageError::VersionNotFound {
                version_id: version_id.to_string(),
            })
    }

    async fn insert_record(&self, row: RecordRow) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        if state.records.contains_key(&row.record_id) {
            return Err(StorageError::AlreadyStored { id: row.record_id });
        }
        state.records.insert(row.record_id.clone(), row);
        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> Result<RecordRow, StorageError> {
        self.lock()?
            .records
            .get(record_id)
            .cloned()
            .ok_or_else(|| StorageError::RecordNotFound {
                record_id: record_id.to_string(),
            })
    }

    async fn update_record(
        &self,
        record_id: &str,
        expected_revision: i64,
        status: serde_json::Value,
        status_kind: &str,
        updated_at: &str,
    ) -> Result<i64, StorageError> {
        let mut state = self.lock()?;
        let row = state
            .records
            .get_mut(record_id)
            .ok_or_else(|| StorageError::RecordNotFound {
                record_id: record_id.to_string(),
            })?;
        if row.revision != expected_revision {
            return Err(StorageError::ConcurrentConflict {
                record_id: record_id.to_string(),
                expected_revision,
            });
        }
        row.status = status;
        row.status_kind = status_kind.to_string();
        row.revision = expected_revision + 1;
        row.updated_at = updated_at.to_string();
        Ok(row.revision)
    }

    async fn list_records(
        &self,
        version_id: Option<&str>,
        status_kind: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RecordRow>, StorageError> {
        let state = self.lock()?;
        let mut rows: Vec<RecordRow> = state
            .records
            .values()
            .filter(|r| version_id.is_none_or(|v| r.version_id == v))
            .filter(|r| status_kind.is_none_or(|k| r.status_kind == k))
            .cloned()
            .collect();
        if limit > 0 {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn container_row(id: &str) -> ContainerRow {
        ContainerRow {
            container_id: id.to_string(),
            schema: serde_json::json!({"id": id, "root": {"id": "note", "label": "Note", "mandatory": false, "kind": "Label"}}),
            stored_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    fn version_row(id: &str) -> VersionRow {
        VersionRow {
            version_id: id.to_string(),
            title: "Permit".to_string(),
            payload: serde_json::json!({"id": id, "steps": []}),
            created_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    fn record_row(id: &str, version_id: &str, status_kind: &str) -> RecordRow {
        RecordRow {
            record_id: id.to_string(),
            version_id: version_id.to_string(),
            submission: serde_json::json!({}),
            status: serde_json::json!({"Pending": {"step_index": 0}}),
            status_kind: status_kind.to_string(),
            revision: 0,
            updated_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn containers_are_write_once() {
        let storage = MemoryStorage::new();
        storage.put_container(container_row("c1")).await.unwrap();
        assert!(matches!(
            storage.put_container(container_row("c1")).await,
            Err(StorageError::AlreadyStored { .. })
        ));
        let row = storage.get_container("c1").await.unwrap();
        assert_eq!(row.container_id, "c1");
        assert!(matches!(
            storage.get_container("missing").await,
            Err(StorageError::ContainerNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn versions_are_write_once() {
        let storage = MemoryStorage::new();
        storage.put_version(version_row("v1")).await.unwrap();
        assert!(matches!(
            storage.put_version(version_row("v1")).await,
            Err(StorageError::AlreadyStored { .. })
        ));
        let row = storage.get_version("v1").await.unwrap();
        assert_eq!(row.version_id, "v1");
        assert_eq!(row.title, "Permit");
        assert!(matches!(
            storage.get_version("missing").await,
            Err(StorageError::VersionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn record_update_is_occ_guarded() {
        let storage = MemoryStorage::new();
        storage
            .insert_record(record_row("r1", "v1", "pending"))
            .await
            .unwrap();

        let new_status = serde_json::json!("Accepted");
        let revision = storage
            .update_record("r1", 0, new_status.clone(), "accepted", "2024-05-02T09:00:00Z")
            .await
            .unwrap();
        assert_eq!(revision, 1);

        // A writer still holding the old revision loses the race.
        assert!(matches!(
            storage
                .update_record("r1", 0, new_status, "accepted", "2024-05-02T09:00:01Z")
                .await,
            Err(StorageError::ConcurrentConflict {
                expected_revision: 0,
                ..
            })
        ));
        let row = storage.get_record("r1").await.unwrap();
        assert_eq!(row.revision, 1);
        assert_eq!(row.status_kind, "accepted");
    }

    #[tokio::test]
    async fn listing_filters_by_version_and_status() {
        let storage = MemoryStorage::new();
        storage
            .insert_record(record_row("r1", "v1", "pending"))
            .await
            .unwrap();
        storage
            .insert_record(record_row("r2", "v1", "accepted"))
            .await
            .unwrap();
        storage
            .insert_record(record_row("r3", "v2", "pending"))
            .await
            .unwrap();

        let v1 = storage.list_records(Some("v1"), None, 0).await.unwrap();
        assert_eq!(v1.len(), 2);
        let pending_v1 = storage
            .list_records(Some("v1"), Some("pending"), 0)
            .await
            .unwrap();
        assert_eq!(pending_v1.len(), 1);
        assert_eq!(pending_v1[0].record_id, "r1");
        let limited = storage.list_records(None, None, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }
}
