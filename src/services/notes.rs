//! CRUD behaviors behind the five note fields.
//!
//! Each method performs at most one store call and holds no state between
//! invocations, so concurrent invocations only meet at the table.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    domain::models::{Attributes, Note},
    infrastructure::state::AppState,
};

use super::errors::ResolverError;

pub struct NoteService {
    pub state: Arc<AppState>,
}

impl NoteService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn get_note(&self, id: &str) -> Result<Note, ResolverError> {
        Ok(self.state.store.get(id).await?)
    }

    /// Order is whatever the store yields and may differ between calls.
    pub async fn list_notes(&self) -> Result<Vec<Note>, ResolverError> {
        let notes = self.state.store.scan_all().await?;
        debug!(count = notes.len(), "listed notes");
        Ok(notes)
    }

    pub async fn create_note(&self, attributes: Attributes) -> Result<Note, ResolverError> {
        let note = self.state.store.put(attributes).await?;
        info!(id = %note.id, "note created");
        Ok(note)
    }

    /// Partial update: attributes absent from `patch` are left as stored.
    /// An empty patch reads the note back without writing.
    pub async fn update_note(&self, id: &str, patch: Attributes) -> Result<Note, ResolverError> {
        if patch.is_empty() {
            return self.get_note(id).await;
        }
        let note = self.state.store.update(id, &patch).await?;
        info!(id = %note.id, fields = patch.len(), "note updated");
        Ok(note)
    }

    /// Deleting an id that is not stored is a `NotFound` error.
    pub async fn delete_note(&self, id: &str) -> Result<String, ResolverError> {
        let removed = self.state.store.delete(id).await?;
        info!(id = %removed.id, "note deleted");
        Ok(removed.id)
    }
}
