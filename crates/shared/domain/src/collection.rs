//! Key-value collection entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value stored under a key, with an optional requested expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueCollection<T> {
    key: String,
    value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<DateTime<Utc>>,
}

impl<T> KeyValueCollection<T> {
    /// Create a collection holding only a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            expiration: None,
        }
    }

    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }
}
