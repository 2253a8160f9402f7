use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::ReturnValue,
    Client,
};
use std::collections::HashMap;
use tracing::{debug, error, info};

use super::{
    attributes::{key, to_attribute, to_item, to_note, Item},
    issue_id, NoteStore, StoreError,
};
use crate::{
    domain::models::{Attributes, Note, ID_FIELD},
    infrastructure::config::StoreConfig,
};

const ID_EXISTS: &str = "attribute_exists(#id)";
const ID_ABSENT: &str = "attribute_not_exists(#id)";

const TRANSIENT_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "ThrottlingException",
    "InternalServerError",
    "ServiceUnavailable",
    "TransactionConflictException",
];

/// Faults of the deployment rather than the request; retrying cannot help.
const CONFIGURATION_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "AccessDeniedException",
    "UnrecognizedClientException",
    "MissingAuthenticationTokenException",
];

/// Notes table in DynamoDB, keyed by the string attribute `id`.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub async fn connect(config: &StoreConfig) -> anyhow::Result<Self> {
        if config.table_name.trim().is_empty() {
            anyhow::bail!("dynamodb store requires a table name");
        }
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        info!(table = %config.table_name, endpoint = ?config.endpoint_url, "using dynamodb note store");
        Ok(Self::new(
            Client::from_conf(builder.build()),
            config.table_name.clone(),
        ))
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl NoteStore for DynamoStore {
    async fn get(&self, id: &str) -> Result<Note, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key(id)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|err| classify(err, StoreError::NotFound(id.to_string())))?;
        match output.item() {
            Some(item) => to_note(item),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn put(&self, attributes: Attributes) -> Result<Note, StoreError> {
        let note = Note::new(issue_id(), attributes);
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(&note)))
            .condition_expression(ID_ABSENT)
            .expression_attribute_names("#id", ID_FIELD)
            .send()
            .await
            .map_err(|err| classify(err, StoreError::AlreadyExists(note.id.clone())))?;
        debug!(id = %note.id, "note written");
        Ok(note)
    }

    async fn update(&self, id: &str, patch: &Attributes) -> Result<Note, StoreError> {
        let expression = UpdateExpression::from_patch(patch);
        if expression.is_empty() {
            return self.get(id).await;
        }
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key(id)))
            .update_expression(expression.render())
            .condition_expression(ID_EXISTS)
            .set_expression_attribute_names(Some(expression.names))
            .set_expression_attribute_values(expression.values)
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|err| classify(err, StoreError::NotFound(id.to_string())))?;
        match output.attributes() {
            Some(item) => to_note(item),
            None => Err(StoreError::Integrity(format!(
                "update of note {id} returned no attributes"
            ))),
        }
    }

    async fn delete(&self, id: &str) -> Result<Note, StoreError> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key(id)))
            .condition_expression(ID_EXISTS)
            .expression_attribute_names("#id", ID_FIELD)
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|err| classify(err, StoreError::NotFound(id.to_string())))?;
        match output.attributes() {
            Some(item) => to_note(item),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn scan_all(&self) -> Result<Vec<Note>, StoreError> {
        let mut notes = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| classify(err, StoreError::Transient("scan rejected".into())))?;
            for item in output.items() {
                notes.push(to_note(item)?);
            }
            match output.last_evaluated_key() {
                Some(last) if !last.is_empty() => start_key = Some(last.clone()),
                _ => break,
            }
        }
        Ok(notes)
    }
}

/// `SET`/`REMOVE` clauses for a partial update, with placeholder names so
/// reserved words like `name` are safe to use as attributes.
#[derive(Debug, Default)]
struct UpdateExpression {
    set: Vec<String>,
    remove: Vec<String>,
    names: HashMap<String, String>,
    values: Option<Item>,
}

impl UpdateExpression {
    fn from_patch(patch: &Attributes) -> Self {
        let mut expression = UpdateExpression::default();
        for (index, (name, value)) in patch
            .iter()
            .filter(|(name, _)| name.as_str() != ID_FIELD)
            .enumerate()
        {
            let placeholder = format!("#a{index}");
            if value.is_null() {
                expression.remove.push(placeholder.clone());
            } else {
                let value_ref = format!(":v{index}");
                expression.set.push(format!("{placeholder} = {value_ref}"));
                expression
                    .values
                    .get_or_insert_with(HashMap::new)
                    .insert(value_ref, to_attribute(value));
            }
            expression.names.insert(placeholder, name.clone());
        }
        if !expression.is_empty() {
            expression
                .names
                .insert("#id".to_string(), ID_FIELD.to_string());
        }
        expression
    }

    fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    fn render(&self) -> String {
        let mut clauses = Vec::with_capacity(2);
        if !self.set.is_empty() {
            clauses.push(format!("SET {}", self.set.join(", ")));
        }
        if !self.remove.is_empty() {
            clauses.push(format!("REMOVE {}", self.remove.join(", ")));
        }
        clauses.join(" ")
    }
}

/// Maps an SDK failure onto the store taxonomy. `on_condition_failed` is what
/// a failed condition expression means for the calling operation.
fn classify<E, R>(err: SdkError<E, R>, on_condition_failed: StoreError) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    let SdkError::ServiceError(_) = &err else {
        return StoreError::Transient(message);
    };
    classify_service_code(err.code(), message, on_condition_failed)
}

fn classify_service_code(
    code: Option<&str>,
    message: String,
    on_condition_failed: StoreError,
) -> StoreError {
    match code {
        Some("ConditionalCheckFailedException") => on_condition_failed,
        Some("ValidationException") => StoreError::Rejected(message),
        Some(code) if TRANSIENT_CODES.contains(&code) => StoreError::Transient(message),
        Some(code) if CONFIGURATION_CODES.contains(&code) => {
            error!(code, error = %message, "note store misconfigured");
            StoreError::Misconfigured(message)
        }
        _ => StoreError::Transient(format!("unexpected store error: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::{operation::put_item::PutItemError, types::AttributeValue};
    use serde_json::json;

    fn service_code(code: &str) -> StoreError {
        classify_service_code(
            Some(code),
            code.to_string(),
            StoreError::NotFound("n-1".into()),
        )
    }

    #[test]
    fn failed_condition_means_what_the_caller_says() {
        let for_put = classify_service_code(
            Some("ConditionalCheckFailedException"),
            "conditional request failed".into(),
            StoreError::AlreadyExists("n-1".into()),
        );

        assert_eq!(for_put, StoreError::AlreadyExists("n-1".into()));
        assert_eq!(
            service_code("ConditionalCheckFailedException"),
            StoreError::NotFound("n-1".into())
        );
    }

    #[test]
    fn rejected_requests_are_not_retryable() {
        assert_eq!(
            service_code("ValidationException"),
            StoreError::Rejected("ValidationException".into())
        );
    }

    #[test]
    fn throttling_and_server_faults_are_transient() {
        for code in TRANSIENT_CODES {
            assert_eq!(service_code(code), StoreError::Transient(code.to_string()));
        }
    }

    #[test]
    fn missing_table_is_a_configuration_fault() {
        assert_eq!(
            service_code("ResourceNotFoundException"),
            StoreError::Misconfigured("ResourceNotFoundException".into())
        );
        assert_eq!(
            service_code("AccessDeniedException"),
            StoreError::Misconfigured("AccessDeniedException".into())
        );
    }

    #[test]
    fn unknown_or_missing_codes_fall_back_to_transient() {
        assert!(matches!(
            service_code("SomethingNewException"),
            StoreError::Transient(message) if message.starts_with("unexpected store error")
        ));
        assert!(matches!(
            classify_service_code(None, "no code".into(), StoreError::NotFound("n-1".into())),
            StoreError::Transient(_)
        ));
    }

    #[test]
    fn timeouts_are_transient_even_for_conditional_writes() {
        let err = SdkError::<PutItemError, ()>::timeout_error("request timed out");

        let mapped = classify(err, StoreError::AlreadyExists("n-1".into()));

        assert!(matches!(mapped, StoreError::Transient(_)));
    }

    fn patch(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn update_expression_sets_and_removes() {
        let expression = UpdateExpression::from_patch(&patch(json!({
            "completed": true,
            "name": "y",
            "tag": null
        })));

        assert_eq!(expression.render(), "SET #a0 = :v0, #a1 = :v1 REMOVE #a2");
        assert_eq!(expression.names.get("#a1").map(String::as_str), Some("name"));
        assert_eq!(expression.names.get("#id").map(String::as_str), Some("id"));
        let values = expression.values.expect("expected values");
        assert_eq!(values.get(":v0"), Some(&AttributeValue::Bool(true)));
        assert_eq!(values.get(":v1"), Some(&AttributeValue::S("y".into())));
    }

    #[test]
    fn update_expression_ignores_id() {
        let expression = UpdateExpression::from_patch(&patch(json!({ "id": "other" })));

        assert!(expression.is_empty());
        assert!(expression.names.is_empty());
        assert!(expression.values.is_none());
    }

    #[test]
    fn remove_only_patch_has_no_values() {
        let expression = UpdateExpression::from_patch(&patch(json!({ "tag": null })));

        assert_eq!(expression.render(), "REMOVE #a0");
        assert!(expression.values.is_none());
    }
}
