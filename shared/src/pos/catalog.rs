//! POS catalog object model and batch endpoints
//!
//! The POS service exposes three batch calls: upsert, retrieve, delete.
//! New objects are sent with a temporary client id (`#<uuid>`); the upsert
//! response returns the id mapping alongside the stored objects. A response
//! carrying `errors` fails the whole batch — the service never applies
//! partial batches.

use serde::{Deserialize, Serialize};

/// A catalog object as stored by the POS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogObject {
    /// POS object id, or `#`-prefixed temporary client id for new objects
    pub id: String,
    /// Optimistic-concurrency version; 0 for new objects
    #[serde(default)]
    pub version: i64,
    #[serde(flatten)]
    pub data: CatalogObjectData,
}

/// Type-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogObjectData {
    Item {
        name: String,
        ordinal: i32,
        present_at_pos: bool,
        present_online: bool,
        modifier_list_ids: Vec<String>,
    },
    ItemVariation {
        item_id: String,
        name: String,
        ordinal: i32,
        price_cents: i64,
        sku: Option<String>,
    },
    ModifierList {
        name: String,
        ordinal: i32,
        selection_min: i32,
        selection_max: Option<i32>,
    },
    Modifier {
        modifier_list_id: String,
        name: String,
        ordinal: i32,
        price_cents: i64,
    },
}

impl CatalogObject {
    pub fn is_new(&self) -> bool {
        self.id.starts_with('#')
    }
}

/// `POST /catalog/batch-upsert`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpsertRequest {
    pub idempotency_key: String,
    pub objects: Vec<CatalogObject>,
}

/// Temporary client id → assigned POS object id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogIdMapping {
    pub client_object_id: String,
    pub object_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUpsertResponse {
    pub objects: Vec<CatalogObject>,
    #[serde(default)]
    pub id_mappings: Vec<CatalogIdMapping>,
}

/// `POST /catalog/batch-retrieve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRetrieveRequest {
    pub object_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRetrieveResponse {
    pub objects: Vec<CatalogObject>,
    #[serde(default)]
    pub related_objects: Vec<CatalogObject>,
}

/// `POST /catalog/batch-delete`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteRequest {
    pub object_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteResponse {
    #[serde(default)]
    pub deleted_object_ids: Vec<String>,
    pub deleted_at: Option<String>,
}

/// Error detail from a failed POS call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogApiError {
    pub category: String,
    pub code: String,
    pub detail: Option<String>,
}

/// Error-shaped response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogErrorResponse {
    #[serde(default)]
    pub errors: Vec<CatalogApiError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_object_serialization() {
        let obj = CatalogObject {
            id: "#new-item".to_string(),
            version: 0,
            data: CatalogObjectData::Item {
                name: "Gyoza".to_string(),
                ordinal: 2,
                present_at_pos: true,
                present_online: false,
                modifier_list_ids: vec!["ML1".to_string()],
            },
        };
        let json = serde_json::to_string(&obj).unwrap();
        assert!(json.contains("\"type\":\"ITEM\""));
        let back: CatalogObject = serde_json::from_str(&json).unwrap();
        assert_eq!(obj, back);
        assert!(back.is_new());
    }

    #[test]
    fn test_upsert_response_deserialization() {
        let json = r##"{
            "objects": [
                {"id": "OBJ1", "version": 3, "type": "ITEM_VARIATION",
                 "item_id": "OBJ0", "name": "Regular", "ordinal": 0,
                 "price_cents": 950, "sku": null}
            ],
            "id_mappings": [
                {"client_object_id": "#v1", "object_id": "OBJ1"}
            ]
        }"##;
        let resp: BatchUpsertResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.objects.len(), 1);
        assert_eq!(resp.id_mappings[0].object_id, "OBJ1");
        assert_eq!(resp.objects[0].version, 3);
    }

    #[test]
    fn test_error_response_deserialization() {
        let json = r#"{"errors": [{"category": "INVALID_REQUEST", "code": "MISSING_FIELD", "detail": "name"}]}"#;
        let resp: CatalogErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.errors.len(), 1);
        assert_eq!(resp.errors[0].code, "MISSING_FIELD");
    }
}
