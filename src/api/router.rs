//! Typed commands and their dispatch onto [`NoteService`].
//!
//! Both matches below are exhaustive over [`Operation`] / [`Command`]; there
//! is no fallback branch.

use serde_json::Value;

use crate::{
    api::appsync::{create_fields, update_fields, NoteIdArgs},
    domain::{
        models::{Attributes, Note},
        operation::Operation,
    },
    services::{errors::ResolverError, notes::NoteService},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetNoteById { id: String },
    ListNotes,
    CreateNote { attributes: Attributes },
    UpdateNote { id: String, patch: Attributes },
    DeleteNote { id: String },
}

impl Command {
    pub fn parse(operation: Operation, arguments: Value) -> Result<Self, ResolverError> {
        let command = match operation {
            Operation::GetNoteById => Command::GetNoteById {
                id: NoteIdArgs::parse(arguments)?.id,
            },
            Operation::ListNotes => Command::ListNotes,
            Operation::CreateNote => Command::CreateNote {
                attributes: create_fields(arguments)?,
            },
            Operation::UpdateNote => {
                let (id, patch) = update_fields(arguments)?;
                Command::UpdateNote { id, patch }
            }
            Operation::DeleteNote => Command::DeleteNote {
                id: NoteIdArgs::parse(arguments)?.id,
            },
        };
        Ok(command)
    }

    pub fn operation(&self) -> Operation {
        match self {
            Command::GetNoteById { .. } => Operation::GetNoteById,
            Command::ListNotes => Operation::ListNotes,
            Command::CreateNote { .. } => Operation::CreateNote,
            Command::UpdateNote { .. } => Operation::UpdateNote,
            Command::DeleteNote { .. } => Operation::DeleteNote,
        }
    }
}

pub async fn dispatch(service: &NoteService, command: Command) -> Result<Value, ResolverError> {
    match command {
        Command::GetNoteById { id } => note_value(service.get_note(&id).await?),
        Command::ListNotes => {
            let notes = service.list_notes().await?;
            let values = notes
                .into_iter()
                .map(note_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
        Command::CreateNote { attributes } => note_value(service.create_note(attributes).await?),
        Command::UpdateNote { id, patch } => note_value(service.update_note(&id, patch).await?),
        Command::DeleteNote { id } => Ok(Value::String(service.delete_note(&id).await?)),
    }
}

fn note_value(note: Note) -> Result<Value, ResolverError> {
    serde_json::to_value(&note)
        .map_err(|err| ResolverError::Integrity(format!("note {} is not serializable: {err}", note.id)))
}
