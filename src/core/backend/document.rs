//! Document values exchanged with the document store

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Collection holding one profile per account
pub const USERS_COLLECTION: &str = "Users";
/// Collection holding vendor business records
pub const VENDORS_COLLECTION: &str = "Vendors";

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Timestamp(DateTime<Utc>),
    /// Resolved to the write time by the store
    ServerTimestamp,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

/// Field name to value, ordered for stable encoding
pub type Document = BTreeMap<String, FieldValue>;

/// The "set at write time" marker
pub fn server_timestamp() -> FieldValue {
    FieldValue::ServerTimestamp
}

/// Replace every [`FieldValue::ServerTimestamp`] with `now`
pub fn resolve_server_timestamps(document: &mut Document, now: DateTime<Utc>) {
    for value in document.values_mut() {
        if *value == FieldValue::ServerTimestamp {
            *value = FieldValue::Timestamp(now);
        }
    }
}
