use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One remote record as held transiently by the dashboard.
///
/// The remote store assigns `id`; `isDeleted` is always a string on both
/// sides of the wire, whatever type the store handed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedRecord {
    #[serde(deserialize_with = "string_from_scalar")]
    pub id: String,

    #[serde(
        rename = "isDeleted",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_string_from_scalar"
    )]
    pub is_deleted: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ManagedRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        let mut record = Self {
            id: id.into(),
            is_deleted: None,
            fields: Map::new(),
        };
        record.merge(fields);
        record
    }

    /// Field value by wire name; `id` and `isDeleted` included
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "isDeleted" => self.is_deleted.clone().map(Value::String),
            _ => self.fields.get(name).cloned(),
        }
    }

    /// Overwrite fields, routing `id`/`isDeleted` to their typed slots
    pub fn merge(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            match key.as_str() {
                "id" => {
                    if let Some(id) = scalar_to_string(&value) {
                        self.id = id;
                    }
                }
                "isDeleted" => self.is_deleted = scalar_to_string(&value),
                _ => {
                    self.fields.insert(key, value);
                }
            }
        }
    }
}

pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn string_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value).ok_or_else(|| serde::de::Error::custom("record id is null"))
}

fn optional_string_from_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}
