//! JSON:API envelope. The backend speaks `{"data": {"type", "id", "attributes"}}`
//! for single resources and `{"data": [...]}` for collections.
//!
//! Entities keep their `id` inline; these helpers move it in and out of the
//! envelope so use cases never hand-build wire JSON.

use crate::domain::DomainError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    /// The backend emits string ids; ApiLogicServer sometimes emits integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub attributes: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Document {
    pub data: Resource,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentList {
    pub data: Vec<Resource>,
}

/// Envelope for creating a resource. The attributes are the serialized value
/// minus any `id` key (the backend assigns ids).
pub fn wrap_new<T: Serialize>(kind: &str, value: &T) -> Result<Value, DomainError> {
    let attributes = attributes_of(value)?;
    Ok(serde_json::json!({
        "data": { "type": kind, "attributes": attributes }
    }))
}

/// Envelope for updating an existing resource.
pub fn wrap_update<T: Serialize>(kind: &str, id: &str, value: &T) -> Result<Value, DomainError> {
    let attributes = attributes_of(value)?;
    Ok(serde_json::json!({
        "data": { "type": kind, "id": id, "attributes": attributes }
    }))
}

/// Parse a single-resource document into an entity.
pub fn unwrap_one<T: DeserializeOwned>(body: &str) -> Result<T, DomainError> {
    let doc: Document =
        serde_json::from_str(body).map_err(|e| DomainError::Parse(e.to_string()))?;
    resource_to_entity(doc.data)
}

/// Parse a collection document into entities. A single malformed resource
/// fails the whole call; missing attributes inside a resource do not
/// (entities default them).
pub fn unwrap_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, DomainError> {
    let doc: DocumentList =
        serde_json::from_str(body).map_err(|e| DomainError::Parse(e.to_string()))?;
    doc.data.into_iter().map(resource_to_entity).collect()
}

fn resource_to_entity<T: DeserializeOwned>(resource: Resource) -> Result<T, DomainError> {
    let mut attributes = match resource.attributes {
        Value::Object(map) => Value::Object(map),
        // Resource without attributes: still give the entity its id.
        Value::Null => Value::Object(serde_json::Map::new()),
        other => {
            return Err(DomainError::Parse(format!(
                "attributes is not an object: {other}"
            )));
        }
    };
    if let (Value::Object(map), Some(id)) = (&mut attributes, resource.id) {
        map.insert("id".to_string(), Value::String(id_to_string(id)));
    }
    serde_json::from_value(attributes).map_err(|e| DomainError::Parse(e.to_string()))
}

fn attributes_of<T: Serialize>(value: &T) -> Result<Value, DomainError> {
    let mut attributes =
        serde_json::to_value(value).map_err(|e| DomainError::Parse(e.to_string()))?;
    if let Value::Object(map) = &mut attributes {
        map.remove("id");
    }
    Ok(attributes)
}

fn id_to_string(id: Value) -> String {
    match id {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Curriculum, NewStudent, Student};

    #[test]
    fn test_wrap_new_strips_id_and_sets_type() {
        let student = Student {
            id: "99".into(),
            email: "a@b.c".into(),
            ..Default::default()
        };
        let body = wrap_new("Student", &student).unwrap();
        assert_eq!(body["data"]["type"], "Student");
        assert!(body["data"]["attributes"].get("id").is_none());
        assert_eq!(body["data"]["attributes"]["email"], "a@b.c");
        assert!(body["data"].get("id").is_none());
    }

    #[test]
    fn test_wrap_update_carries_id() {
        let body = wrap_update("Curriculum", "12", &serde_json::json!({"active": false})).unwrap();
        assert_eq!(body["data"]["id"], "12");
        assert_eq!(body["data"]["attributes"]["active"], false);
    }

    #[test]
    fn test_unwrap_one_merges_numeric_id() {
        let body = r#"{"data": {"type": "Student", "id": 42,
            "attributes": {"first_name": "Ada", "email": "ada@example.org"}}}"#;
        let student: Student = unwrap_one(body).unwrap();
        assert_eq!(student.id, "42");
        assert_eq!(student.first_name, "Ada");
    }

    #[test]
    fn test_unwrap_list_defaults_missing_attributes() {
        let body = r#"{"data": [
            {"type": "Curriculum", "id": "1", "attributes": {"name": "Welding"}},
            {"type": "Curriculum", "id": "2"}
        ]}"#;
        let list: Vec<Curriculum> = unwrap_list(body).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Welding");
        assert_eq!(list[1].id, "2");
        assert!(list[1].required_forms.is_empty());
    }

    #[test]
    fn test_unwrap_rejects_non_document_body() {
        let err = unwrap_one::<Student>("not json").unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }

    #[test]
    fn test_new_payload_round_trip() {
        let new = NewStudent {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.org".into(),
            phone: None,
            curriculum_id: Some("3".into()),
        };
        let body = wrap_new("Student", &new).unwrap();
        // None fields are omitted entirely, not serialized as null.
        assert!(body["data"]["attributes"].get("phone").is_none());
        assert_eq!(body["data"]["attributes"]["curriculum_id"], "3");
    }
}
