use std::sync::Arc;

use anyhow::Result;
use notes_resolver::{
    api,
    domain::operation::Operation,
    infrastructure::store::{NoteStore, StoreError},
    services::errors::ResolverError,
};
use serde_json::json;


use test_harness::{invoke, memory_state, note_id, state_with, FailingStore, RecordingStore};

#[tokio::test]
async fn each_operation_reaches_exactly_its_store_call() -> Result<()> {
    let store = Arc::new(RecordingStore::default());
    let state = state_with(Arc::clone(&store) as Arc<dyn NoteStore>);
    let created = invoke(&state, "Mutation", "createNote", json!({ "name": "seed" })).await?;
    let id = note_id(&created);

    let expectations = [
        (Operation::GetNoteById, json!({ "id": id }), "get"),
        (Operation::ListNotes, json!({}), "scan_all"),
        (Operation::CreateNote, json!({ "name": "x" }), "put"),
        (
            Operation::UpdateNote,
            json!({ "id": id, "completed": true }),
            "update",
        ),
        (Operation::DeleteNote, json!({ "id": id }), "delete"),
    ];
    assert_eq!(expectations.len(), Operation::ALL.len());

    for (op, arguments, call) in expectations {
        store.reset();
        invoke(&state, op.type_name(), op.field_name(), arguments).await?;
        assert_eq!(store.calls(), vec![call], "{op} dispatched to the wrong behavior");
    }

    Ok(())
}

#[tokio::test]
async fn unknown_pairs_are_unsupported_and_touch_no_store() -> Result<()> {
    let store = Arc::new(RecordingStore::default());
    let state = state_with(Arc::clone(&store) as Arc<dyn NoteStore>);

    let pairs = [
        ("Query", "listTodos"),
        ("Mutation", "getNoteById"),
        ("Query", "createNote"),
        ("query", "listNotes"),
        ("Query", "ListNotes"),
        ("Subscription", "onCreateNote"),
        ("", ""),
    ];

    for (type_name, field_name) in pairs {
        let err = invoke(&state, type_name, field_name, json!({ "id": "n-1" }))
            .await
            .expect_err("expected unsupported operation");
        assert!(
            matches!(err, ResolverError::UnsupportedOperation { .. }),
            "{type_name}.{field_name} gave {err:?}"
        );
    }
    assert!(store.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn appsync_context_payload_is_dispatched() -> Result<()> {
    let state = memory_state();
    let created = invoke(&state, "Mutation", "createNote", json!({ "note": { "name": "x" } })).await?;

    let fetched = api::resolve(
        Arc::clone(&state),
        json!({
            "arguments": { "noteId": note_id(&created) },
            "identity": null,
            "source": null,
            "request": { "headers": {} },
            "prev": null,
            "info": {
                "parentTypeName": "Query",
                "fieldName": "getNoteById",
                "variables": {},
                "selectionSetList": ["id", "name"]
            },
            "stash": {}
        }),
    )
    .await?;

    assert_eq!(fetched, created);
    Ok(())
}

#[tokio::test]
async fn validation_errors_precede_store_access() -> Result<()> {
    let store = Arc::new(RecordingStore::default());
    let state = state_with(Arc::clone(&store) as Arc<dyn NoteStore>);

    let cases = [
        ("Query", "getNoteById", json!({})),
        ("Query", "getNoteById", json!({ "id": "" })),
        ("Mutation", "deleteNote", json!({ "id": null })),
        ("Mutation", "updateNote", json!({ "name": "y" })),
        ("Mutation", "createNote", json!({ "id": "mine", "name": "x" })),
        ("Mutation", "createNote", json!([1, 2])),
        ("Mutation", "createNote", json!(null)),
        ("Mutation", "createNote", json!({})),
        ("Mutation", "createNote", json!({ "note": {} })),
    ];

    for (type_name, field_name, arguments) in cases {
        let err = invoke(&state, type_name, field_name, arguments)
            .await
            .expect_err("expected validation failure");
        assert_eq!(err.error_type(), "ValidationError");
    }
    assert!(store.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn store_failures_surface_with_their_category() -> Result<()> {
    let transient = state_with(Arc::new(FailingStore(StoreError::Transient(
        "timed out".into(),
    ))));
    let corrupt = state_with(Arc::new(FailingStore(StoreError::Integrity(
        "stored note has no id".into(),
    ))));

    let err = invoke(&transient, "Query", "listNotes", json!({}))
        .await
        .expect_err("expected transient failure");
    assert_eq!(err.error_type(), "TransientStoreError");
    assert!(err.is_retryable());

    let err = invoke(&corrupt, "Query", "getNoteById", json!({ "id": "n-1" }))
        .await
        .expect_err("expected integrity failure");
    assert_eq!(err.error_type(), "IntegrityError");
    assert!(!err.is_retryable());

    Ok(())
}
