use std::path::Path;

use serde_json::Value;

/// Failure loading the tag definitions.
#[derive(Debug, thiserror::Error)]
pub enum TagCatalogError {
    #[error("cannot read tag definitions: {0}")]
    Io(#[from] std::io::Error),

    #[error("tag definitions are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tag definitions must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Read-only tag definitions, loaded once at startup and served verbatim.
///
/// The catalog is an opaque JSON object: the service never interprets the
/// definitions, it only hands them to clients. Listings may reference tags
/// that do not resolve here; that is preserved, not rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct TagCatalog {
    definitions: Value,
}

impl TagCatalog {
    /// Build a catalog from an already-parsed JSON value.
    pub fn from_value(definitions: Value) -> Result<Self, TagCatalogError> {
        if !definitions.is_object() {
            return Err(TagCatalogError::NotAnObject(json_type_name(&definitions)));
        }
        Ok(Self { definitions })
    }

    /// Parse a catalog from raw JSON text.
    pub fn parse(text: &str) -> Result<Self, TagCatalogError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Load a catalog from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TagCatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// An empty catalog (no tag definitions).
    pub fn empty() -> Self {
        Self {
            definitions: Value::Object(serde_json::Map::new()),
        }
    }

    /// The definitions object, as loaded.
    pub fn definitions(&self) -> &Value {
        &self.definitions
    }

    /// Whether a tag identifier resolves to a definition.
    pub fn contains(&self, tag: &str) -> bool {
        self.definitions
            .as_object()
            .is_some_and(|map| map.contains_key(tag))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_accepts_object() {
        let catalog = TagCatalog::from_value(json!({
            "may-lanh": {"label": "Máy lạnh", "icon": "❄️"},
            "gac-lung": {"label": "Gác lửng"}
        }))
        .unwrap();
        assert!(catalog.contains("may-lanh"));
        assert!(!catalog.contains("wifi"));
    }

    #[test]
    fn from_value_rejects_non_object() {
        let err = TagCatalog::from_value(json!(["a", "b"])).unwrap_err();
        assert!(matches!(err, TagCatalogError::NotAnObject("array")));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = TagCatalog::parse("{not json").unwrap_err();
        assert!(matches!(err, TagCatalogError::Parse(_)));
    }

    #[test]
    fn definitions_served_verbatim() {
        let value = json!({"wifi": {"label": "Wifi"}});
        let catalog = TagCatalog::from_value(value.clone()).unwrap();
        assert_eq!(catalog.definitions(), &value);
    }

    #[test]
    fn empty_catalog() {
        let catalog = TagCatalog::empty();
        assert!(!catalog.contains("anything"));
        assert_eq!(catalog.definitions(), &json!({}));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = TagCatalog::load("/nonexistent/tag-definitions.json").unwrap_err();
        assert!(matches!(err, TagCatalogError::Io(_)));
    }
}
