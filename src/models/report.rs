use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ModelError;

/// Code-compliance verdict produced by the validation stage.
///
/// The object is kept exactly as the model wrote it and serializes back
/// unchanged. Only `valid` is required; the lists are read through lenient
/// typed views that skip entries they cannot decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    fields: Map<String, Value>,
}

/// An issue or a positive observation. `location` is relayed as given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Finding {
    pub description: String,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    pub description: String,
    #[serde(default)]
    pub move_door: Option<MoveDoor>,
    #[serde(default)]
    pub remove_wall: Option<RemoveWall>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `from: None` means "add a new door at `to`".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoveDoor {
    #[serde(default)]
    pub from: Option<Value>,
    #[serde(default)]
    pub to: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoveWall {
    pub position: Value,
}

impl ValidationReport {
    /// Accept any object carrying a boolean `valid`.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let Value::Object(fields) = value else {
            return Err(ModelError::Shape("validation report must be a JSON object".into()));
        };
        match fields.get("valid") {
            Some(Value::Bool(_)) => Ok(Self { fields }),
            Some(other) => Err(ModelError::Shape(format!(
                "field `valid` must be a boolean, found {other}"
            ))),
            None => Err(ModelError::Shape("missing field `valid`".into())),
        }
    }

    pub fn valid(&self) -> bool {
        matches!(self.fields.get("valid"), Some(Value::Bool(true)))
    }

    pub fn issues(&self) -> Vec<Finding> {
        decode_entries(self.entries("issues"))
    }

    pub fn good(&self) -> Vec<Finding> {
        decode_entries(self.entries("good"))
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        decode_entries(self.entries("suggestions"))
    }

    /// Raw `issues` entries, including any the typed view skips.
    pub fn issue_count(&self) -> usize {
        self.entries("issues").len()
    }

    /// `valid` must agree with the issue list.
    pub fn is_consistent(&self) -> bool {
        self.valid() == (self.issue_count() == 0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    fn entries(&self, key: &str) -> &[Value] {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn decode_entries<T: serde::de::DeserializeOwned>(entries: &[Value]) -> Vec<T> {
    entries
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}
