//! Record store adapter: single-key reads and writes against the notes table.
//!
//! Each call touches exactly one record, except `scan_all`. A scan racing
//! with writes may or may not observe them; there is no snapshot isolation.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::models::{Attributes, Note},
    infrastructure::config::StoreConfig,
};

mod attributes;
mod dynamo;

pub use dynamo::DynamoStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no note with id {0}")]
    NotFound(String),
    #[error("note {0} already exists")]
    AlreadyExists(String),
    #[error("store rejected request: {0}")]
    Rejected(String),
    #[error("note store misconfigured: {0}")]
    Misconfigured(String),
    #[error("transient store failure: {0}")]
    Transient(String),
    #[error("stored record violates note invariants: {0}")]
    Integrity(String),
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Note, StoreError>;
    /// Stores a new note under a freshly issued id. Never overwrites.
    async fn put(&self, attributes: Attributes) -> Result<Note, StoreError>;
    /// Applies `patch` to an existing note in a single write.
    async fn update(&self, id: &str, patch: &Attributes) -> Result<Note, StoreError>;
    /// Removes a note and returns what was stored.
    async fn delete(&self, id: &str) -> Result<Note, StoreError>;
    async fn scan_all(&self) -> Result<Vec<Note>, StoreError>;
}

pub async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn NoteStore>> {
    match config.provider.as_str() {
        "dynamodb" => Ok(Arc::new(DynamoStore::connect(config).await?)),
        "memory" => Ok(Arc::new(MemoryStore::default())),
        other => anyhow::bail!("unsupported store provider: {other}"),
    }
}

pub fn issue_id() -> String {
    Uuid::new_v4().to_string()
}

/// In-process store used for tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    notes: RwLock<HashMap<String, Note>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.notes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.read().is_empty()
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Note, StoreError> {
        self.notes
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn put(&self, attributes: Attributes) -> Result<Note, StoreError> {
        let note = Note::new(issue_id(), attributes);
        let mut notes = self.notes.write();
        if notes.contains_key(&note.id) {
            return Err(StoreError::AlreadyExists(note.id));
        }
        notes.insert(note.id.clone(), note.clone());
        Ok(note)
    }

    async fn update(&self, id: &str, patch: &Attributes) -> Result<Note, StoreError> {
        let mut notes = self.notes.write();
        let note = notes
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        note.apply_patch(patch);
        Ok(note.clone())
    }

    async fn delete(&self, id: &str) -> Result<Note, StoreError> {
        self.notes
            .write()
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn scan_all(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.notes.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn put_issues_distinct_ids() {
        let store = MemoryStore::default();

        let first = store.put(attributes(json!({ "name": "a" }))).await.unwrap();
        let second = store.put(attributes(json!({ "name": "a" }))).await.unwrap();

        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let store = MemoryStore::default();

        let update = store.update("missing", &Attributes::new()).await;
        let delete = store.delete("missing").await;

        assert_eq!(update, Err(StoreError::NotFound("missing".into())));
        assert_eq!(delete, Err(StoreError::NotFound("missing".into())));
    }

    #[tokio::test]
    async fn delete_returns_removed_note() {
        let store = MemoryStore::default();
        let note = store.put(attributes(json!({ "name": "a" }))).await.unwrap();

        let removed = store.delete(&note.id).await.unwrap();

        assert_eq!(removed, note);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn build_store_rejects_unknown_provider() {
        let config = StoreConfig {
            provider: "postgres".into(),
            ..StoreConfig::default()
        };

        let err = build_store(&config).await.err().expect("expected failure");

        assert_eq!(err.to_string(), "unsupported store provider: postgres");
    }
}
