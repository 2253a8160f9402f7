use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open attribute map of a note. Its shape is owned by the GraphQL schema.
pub type Attributes = Map<String, Value>;

pub const ID_FIELD: &str = "id";

/// The single record served by the notes API.
///
/// Serialized flat, so `{"id": "…", "name": "…", "completed": false}` on the
/// wire. `attributes` never carries an `id` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Note {
    pub fn new(id: impl Into<String>, mut attributes: Attributes) -> Self {
        attributes.remove(ID_FIELD);
        Self {
            id: id.into(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Merges `patch` into the note. `null` removes an attribute, any other
    /// value replaces it. The id is never touched.
    pub fn apply_patch(&mut self, patch: &Attributes) {
        for (name, value) in patch {
            if name == ID_FIELD {
                continue;
            }
            if value.is_null() {
                self.attributes.remove(name);
            } else {
                self.attributes.insert(name.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn new_drops_id_from_attributes() {
        let note = Note::new("n-1", attributes(json!({ "id": "other", "name": "x" })));

        assert_eq!(note.id, "n-1");
        assert_eq!(note.attribute("id"), None);
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            json!({ "id": "n-1", "name": "x" })
        );
    }

    #[test]
    fn apply_patch_keeps_untouched_attributes() {
        let mut note = Note::new(
            "n-1",
            attributes(json!({ "name": "x", "completed": false, "tag": "home" })),
        );

        note.apply_patch(&attributes(json!({ "id": "n-2", "name": "y", "tag": null })));

        assert_eq!(note.id, "n-1");
        assert_eq!(note.attribute("name"), Some(&json!("y")));
        assert_eq!(note.attribute("completed"), Some(&json!(false)));
        assert_eq!(note.attribute("tag"), None);
    }
}
