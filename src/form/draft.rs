use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::FormError;
use crate::resource::record::scalar_to_string;
use crate::resource::ManagedRecord;
use crate::schema::{EntityKind, EntitySchema};

/// In-progress, unsaved edits for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDraft {
    #[serde(skip)]
    kind: EntityKind,
    pub field_values: BTreeMap<String, String>,
    pub validation_errors: BTreeMap<String, String>,
}

impl FormDraft {
    pub fn empty(kind: EntityKind) -> Self {
        let field_values = kind
            .schema()
            .fields
            .iter()
            .map(|f| (f.name.to_string(), String::new()))
            .collect();

        Self {
            kind,
            field_values,
            validation_errors: BTreeMap::new(),
        }
    }

    pub fn from_record(kind: EntityKind, record: &ManagedRecord) -> Self {
        let field_values = kind
            .schema()
            .fields
            .iter()
            .map(|f| {
                let value = record.get(f.name).map(|v| f.decode(&v)).unwrap_or_default();
                (f.name.to_string(), value)
            })
            .collect();

        Self {
            kind,
            field_values,
            validation_errors: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    fn schema(&self) -> &'static EntitySchema {
        self.kind.schema()
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.field_values.get(field).map(String::as_str)
    }

    /// Keystroke update; clears any stale error on that field
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        match self.field_values.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                self.validation_errors.remove(field);
                Ok(())
            }
            None => Err(FormError::UnknownField {
                kind: self.kind,
                field: field.to_string(),
            }),
        }
    }

    /// Run every field rule; true when the draft may be sent
    pub fn validate(&mut self) -> bool {
        let schema = self.schema();
        self.validation_errors = schema
            .fields
            .iter()
            .filter_map(|spec| {
                let raw = self.field_values.get(spec.name).map(String::as_str).unwrap_or_default();
                spec.validate(raw).err().map(|msg| (spec.name.to_string(), msg))
            })
            .collect();

        self.validation_errors.is_empty()
    }

    /// JSON body for create/update; blank optional fields are left out
    pub fn payload(&self) -> Map<String, Value> {
        self.schema()
            .fields
            .iter()
            .filter_map(|spec| {
                let raw = self.field_values.get(spec.name)?;
                if raw.trim().is_empty() && !spec.required {
                    return None;
                }
                Some((spec.name.to_string(), spec.encode(raw)))
            })
            .collect()
    }
}

/// Form text for a JSON value handed in by an API or CLI caller
pub fn form_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_string(other).unwrap_or_default(),
    }
}

/// Keys the table and form views add to a row
const VIEW_KEYS: [&str; 2] = ["id", "route"];

/// Posted values to apply to a draft of `kind`.
///
/// A row read back from a table view carries store-assigned keys such as
/// `createdAt` next to the schema fields. Non-schema keys are dropped when
/// they are view keys or present on the loaded record; any other unknown key
/// is kept so [`FormDraft::set`] rejects it.
pub fn posted_fields<'a>(
    kind: EntityKind,
    loaded: Option<&'a ManagedRecord>,
    values: &'a Map<String, Value>,
) -> impl Iterator<Item = (&'a str, String)> + 'a {
    let schema = kind.schema();
    values
        .iter()
        .filter(move |(name, _)| {
            let name = name.as_str();
            schema.field(name).is_some()
                || !(VIEW_KEYS.contains(&name) || loaded.map_or(false, |record| record.get(name).is_some()))
        })
        .map(|(name, value)| (name.as_str(), form_text(value)))
}
