use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::Value;

/// Semantic type of a form field, which fixes its validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    /// Digits only, e.g. a citizen id
    Numeric,
    PositiveNumber,
    Date,
    /// Soft-delete flag, always carried as a string
    Status,
    /// Comma separated in the form, a JSON array on the wire
    Tags,
    /// Image URL produced by the external upload widget
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            max_len: None,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            max_len: None,
        }
    }

    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    /// Check a raw form value, returning the message shown next to the field
    pub fn validate(&self, raw: &str) -> Result<(), String> {
        let value = raw.trim();

        if value.is_empty() {
            return if self.required {
                Err(format!("{} is required.", self.label))
            } else {
                Ok(())
            };
        }

        if let Some(max) = self.max_len {
            if value.chars().count() > max {
                return Err(format!("{} must be between 1-{} characters.", self.label, max));
            }
        }

        match self.kind {
            FieldKind::Text | FieldKind::Phone | FieldKind::Image => Ok(()),
            FieldKind::Email => {
                let mut parts = value.split('@');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
                    _ => Err(format!("{} must be a valid email address.", self.label)),
                }
            }
            FieldKind::Numeric => {
                if value.chars().all(|c| c.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err(format!("{} must contain digits only.", self.label))
                }
            }
            FieldKind::PositiveNumber => match value.parse::<f64>() {
                Ok(n) if n.is_finite() && n > 0.0 => Ok(()),
                _ => Err(format!("{} must be greater than 0.", self.label)),
            },
            FieldKind::Date => parse_date(value)
                .map(|_| ())
                .ok_or_else(|| format!("{} must be a valid date.", self.label)),
            FieldKind::Status => match value {
                "0" | "1" | "true" | "false" => Ok(()),
                _ => Err(format!("{} must be 0 (active) or 1 (inactive).", self.label)),
            },
            FieldKind::Tags => {
                if split_tags(value).is_empty() {
                    Err(format!("{} needs at least one tag.", self.label))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Wire representation of a validated form value
    pub fn encode(&self, raw: &str) -> Value {
        match self.kind {
            FieldKind::Tags => Value::Array(split_tags(raw).into_iter().map(Value::String).collect()),
            _ => Value::String(raw.trim().to_string()),
        }
    }

    /// Form representation of a value held by the remote store
    pub fn decode(&self, value: &Value) -> String {
        match (self.kind, value) {
            (_, Value::Null) => String::new(),
            (FieldKind::Date, Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => dt.date_naive().format("%Y-%m-%d").to_string(),
                Err(_) => s.clone(),
            },
            (_, Value::String(s)) => s.clone(),
            (_, Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            (_, other) => other.to_string(),
        }
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
