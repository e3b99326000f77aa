//! Field-level error details.
//!
//! A raw field identifier has the shape `<dotted.field.path>_<RAWCODE>`,
//! e.g. `user.email_UNIQUE`. Translation turns it into a [`Detail`] with a
//! machine-readable id (`user.email.unique`) and a default message.

use serde::{Deserialize, Serialize};

/// Structured descriptor of one failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub id: String,
    pub message: String,
}

impl Detail {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Fixed vocabulary of detail types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailType {
    Unique,
    /// Raw code `REGEXP`, also the fallback for any unknown code.
    Invalid,
    Required,
    NotFound,
    HasAssociation,
}

impl DetailType {
    /// Map a raw code to its type. Unknown codes fall back to [`DetailType::Invalid`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "UNIQUE" => DetailType::Unique,
            "REQUIRED" => DetailType::Required,
            "NOTFOUND" => DetailType::NotFound,
            "HASASSOCIATION" => DetailType::HasAssociation,
            _ => DetailType::Invalid,
        }
    }

    /// Raw code used when building a field identifier.
    pub fn code(&self) -> &'static str {
        match self {
            DetailType::Unique => "UNIQUE",
            DetailType::Invalid => "REGEXP",
            DetailType::Required => "REQUIRED",
            DetailType::NotFound => "NOTFOUND",
            DetailType::HasAssociation => "HASASSOCIATION",
        }
    }

    /// Label that ends up in the detail id.
    pub fn label(&self) -> &'static str {
        match self {
            DetailType::Unique => "UNIQUE",
            DetailType::Invalid => "INVALID",
            DetailType::Required => "REQUIRED",
            DetailType::NotFound => "NOTFOUND",
            DetailType::HasAssociation => "HASASSOCIATION",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            DetailType::Unique => "Field $field must be unique.",
            DetailType::Invalid => "Field $field is invalid.",
            DetailType::Required => "Field $field is required.",
            DetailType::NotFound => "Field $field is not found.",
            DetailType::HasAssociation => "Field $field has a association.",
        }
    }

    /// Build a raw field identifier, the inverse of [`translate_detail`].
    pub fn field(&self, path: &str) -> String {
        format!("{}_{}", path, self.code())
    }
}

/// Translate one raw field identifier.
pub fn translate_detail(field: &str) -> Detail {
    // A field without `_` is its own code, which is never a known one.
    let (path, code) = field.rsplit_once('_').unwrap_or((field, field));
    let detail_type = DetailType::from_code(code);

    let path = path
        .split('.')
        .map(lower_camel_case)
        .collect::<Vec<_>>()
        .join(".");

    Detail {
        id: format!("{}.{}", path, lower_camel_case(detail_type.label())),
        message: detail_type.template().replace("$field", &path),
    }
}

/// Translate raw field identifiers, preserving order.
pub fn translate_details<I, S>(fields: I) -> Vec<Detail>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|field| translate_detail(field.as_ref()))
        .collect()
}

/// Normalize an identifier to lowerCamelCase.
///
/// Words are split on `_`, `-`, spaces and lower-to-upper boundaries. A run
/// of capitals is one word, except that its last capital starts the next word
/// when a lowercase letter follows (`XMLHttp` is `xml` + `http`).
pub fn lower_camel_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    let mut previous_upper = false;

    for (index, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            previous_upper = false;
            continue;
        }
        let next_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
        let boundary = ch.is_uppercase() && (previous_lower || (previous_upper && next_lower));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        previous_upper = ch.is_uppercase();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut output = String::with_capacity(input.len());
    for (index, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            output.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                output.extend(first.to_uppercase());
                output.push_str(chars.as_str());
            }
        }
    }
    output
}
