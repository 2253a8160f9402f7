//! The closed set of GraphQL fields served by the resolver.
//!
//! Every field wired to the Lambda data source has exactly one variant here.
//! Call sites match on [`Operation`] without wildcard arms, so a new field
//! cannot be added without handling it everywhere.

use std::fmt;

use crate::services::errors::ResolverError;

pub const QUERY: &str = "Query";
pub const MUTATION: &str = "Mutation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetNoteById,
    ListNotes,
    CreateNote,
    UpdateNote,
    DeleteNote,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::GetNoteById,
        Operation::ListNotes,
        Operation::CreateNote,
        Operation::UpdateNote,
        Operation::DeleteNote,
    ];

    pub fn type_name(&self) -> &'static str {
        if self.is_mutation() {
            MUTATION
        } else {
            QUERY
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            Operation::GetNoteById => "getNoteById",
            Operation::ListNotes => "listNotes",
            Operation::CreateNote => "createNote",
            Operation::UpdateNote => "updateNote",
            Operation::DeleteNote => "deleteNote",
        }
    }

    pub fn is_mutation(&self) -> bool {
        match self {
            Operation::GetNoteById | Operation::ListNotes => false,
            Operation::CreateNote | Operation::UpdateNote | Operation::DeleteNote => true,
        }
    }

    /// Maps a `(typeName, fieldName)` pair to its operation. Matching is
    /// exact and case-sensitive.
    pub fn resolve(type_name: &str, field_name: &str) -> Result<Self, ResolverError> {
        Operation::ALL
            .into_iter()
            .find(|op| op.type_name() == type_name && op.field_name() == field_name)
            .ok_or_else(|| ResolverError::UnsupportedOperation {
                type_name: type_name.to_string(),
                field_name: field_name.to_string(),
            })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name(), self.field_name())
    }
}
