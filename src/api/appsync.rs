//! Invocation envelope sent by AppSync to a direct Lambda resolver.

use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    domain::{
        models::{Attributes, ID_FIELD},
        operation::Operation,
    },
    services::errors::ResolverError,
    validation::rules::{check, check_attribute_names, not_blank},
};

/// Accepts both `{typeName, fieldName, arguments}` and the full AppSync
/// context, where the coordinates sit under `info`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default)]
    pub info: Option<InvocationInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationInfo {
    #[serde(default)]
    pub parent_type_name: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
}

impl Invocation {
    pub fn from_payload(payload: Value) -> Result<Self, ResolverError> {
        if !payload.is_object() {
            return Err(ResolverError::Validation(
                "invocation payload must be a JSON object".into(),
            ));
        }
        serde_json::from_value(payload)
            .map_err(|err| ResolverError::Validation(format!("malformed invocation: {err}")))
    }

    pub fn type_name(&self) -> &str {
        self.type_name
            .as_deref()
            .or_else(|| self.info.as_ref()?.parent_type_name.as_deref())
            .unwrap_or_default()
    }

    pub fn field_name(&self) -> &str {
        self.field_name
            .as_deref()
            .or_else(|| self.info.as_ref()?.field_name.as_deref())
            .unwrap_or_default()
    }

    pub fn operation(&self) -> Result<Operation, ResolverError> {
        Operation::resolve(self.type_name(), self.field_name())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NoteIdArgs {
    #[serde(alias = "noteId")]
    #[validate(custom = "not_blank")]
    pub id: String,
}

impl NoteIdArgs {
    pub fn parse(arguments: Value) -> Result<Self, ResolverError> {
        let args: NoteIdArgs = serde_json::from_value(arguments)
            .map_err(|err| ResolverError::Validation(format!("invalid note id argument: {err}")))?;
        check(&args)?;
        Ok(args)
    }
}

/// Fields of a `createNote` call. Ids are always issued by the store, and a
/// note must carry at least one attribute besides its id.
pub fn create_fields(arguments: Value) -> Result<Attributes, ResolverError> {
    let attributes = note_fields(arguments)?;
    if attributes.is_empty() {
        return Err(ResolverError::Validation(
            "createNote requires at least one attribute".into(),
        ));
    }
    if attributes.contains_key(ID_FIELD) {
        return Err(ResolverError::Validation(
            "createNote does not accept an id".into(),
        ));
    }
    check_attribute_names(&attributes)?;
    Ok(attributes)
}

/// Splits an `updateNote` call into the target id and the partial patch.
pub fn update_fields(arguments: Value) -> Result<(String, Attributes), ResolverError> {
    let mut patch = note_fields(arguments)?;
    let id = match patch.remove(ID_FIELD) {
        Some(Value::String(id)) => id,
        Some(_) => return Err(ResolverError::Validation("note id must be a string".into())),
        None => return Err(ResolverError::Validation("updateNote requires an id".into())),
    };
    not_blank(&id).map_err(|_| ResolverError::Validation("note id must not be blank".into()))?;
    check_attribute_names(&patch)?;
    Ok((id, patch))
}

/// Note input either flat in `arguments` or wrapped as `{ "note": { … } }`.
fn note_fields(arguments: Value) -> Result<Map<String, Value>, ResolverError> {
    let mut fields = match arguments {
        Value::Object(fields) => fields,
        Value::Null => Map::new(),
        _ => {
            return Err(ResolverError::Validation(
                "arguments must be a JSON object".into(),
            ))
        }
    };
    if fields.len() == 1 && fields.get("note").is_some_and(Value::is_object) {
        if let Some(Value::Object(inner)) = fields.remove("note") {
            return Ok(inner);
        }
    }
    Ok(fields)
}
