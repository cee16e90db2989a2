use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding a record's integer id.
pub const ID_FIELD: &str = "id";

/// Field holding a stage's free-form status.
pub const STATUS_FIELD: &str = "status";

/// A stored record: an ordered map of caller-supplied fields.
///
/// Only `id` (and `status` for stages) is interpreted. Every other field is
/// kept verbatim and in the order it was received, so a load/save cycle never
/// reshuffles what the client wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Raw `id` value, whatever its JSON type.
    pub fn id_value(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// `id` as an integer, if it is one.
    pub fn id(&self) -> Option<i64> {
        self.id_value().and_then(Value::as_i64)
    }

    /// Sets `id`, keeping its position when the field already exists.
    pub fn set_id(&mut self, id: i64) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts or replaces a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Removes a field, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// All fields in stored order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Entry of the project listing.
///
/// Both fields are copied from the project's own stage file. A field the file
/// does not carry is left out of the serialized summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Project id as written in the stage file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Value>,
    /// Human readable project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<Value>,
}

impl ProjectSummary {
    /// Extracts the summary from a parsed stage file.
    ///
    /// An object document is read directly. For an array, the first element
    /// carrying `projectId` or `projectName` wins.
    pub fn from_document(doc: &Value) -> Self {
        match doc {
            Value::Object(fields) => Self::from_fields(fields),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_object)
                .find(|fields| fields.contains_key("projectId") || fields.contains_key("projectName"))
                .map(Self::from_fields)
                .unwrap_or_default(),
            _ => Self::default(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            project_id: fields.get("projectId").cloned(),
            project_name: fields.get("projectName").cloned(),
        }
    }
}
