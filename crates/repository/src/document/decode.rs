//! Decoding of MongoDB driver failures into [`StoreFailure`] values.

use mongodb::error::{Error, ErrorKind, WriteFailure};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use common::RepositoryError;
use domain::details::lower_camel_case;
use domain::{ErrorFactory, StoreFailure};

/// Server code of a duplicate key write error.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

static DUP_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"dup key: \{(.*)\}").expect("valid dup key regex"));

/// Classify a driver error raised against `collection`.
pub fn store_failure(err: &Error, collection: &str) -> StoreFailure {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            StoreFailure::UniqueConstraint {
                model: lower_camel_case(collection),
                fields: duplicate_key_fields(&write_error.message),
            }
        }
        _ => StoreFailure::Other {
            name: "MongoError".to_string(),
            message: err.to_string(),
        },
    }
}

/// Field names listed in the `dup key: { ... }` section of an E11000 message.
pub fn duplicate_key_fields(message: &str) -> Vec<String> {
    match DUP_KEY_RE.captures(message) {
        Some(caps) => top_level_keys(&caps[1]),
        None => Vec::new(),
    }
}

/// Keys of a relaxed-JSON object body, skipping nested values and strings.
fn top_level_keys(body: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut key = String::new();
    let mut in_key = true;
    let mut in_string = false;
    let mut escaped = false;
    let mut depth = 0usize;

    for ch in body.chars() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        if in_key {
            match ch {
                ':' => {
                    let name = key.trim().trim_matches('"');
                    if !name.is_empty() {
                        keys.push(name.to_string());
                    }
                    key.clear();
                    in_key = false;
                }
                _ => key.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => in_key = true,
            _ => {}
        }
    }
    keys
}

/// Route a driver error through the error factory.
pub fn translate(err: Error, collection: &str) -> RepositoryError {
    let failure = store_failure(&err, collection);
    match ErrorFactory::from_store_failure(&failure) {
        Ok(domain) => {
            debug!(collection = %collection, code = domain.code(), "Translated store failure");
            domain.into()
        }
        Err(_) => {
            debug!(collection = %collection, failure = failure.name(), "Store failure left untranslated");
            err.into()
        }
    }
}
