//! Domain-level errors.
//!
//! Every domain error reduces to `{ code, message, details }`. Errors are
//! immutable values: build them once through [`DomainError::builder`] or one
//! of the kind constructors.

use serde::Serialize;
use thiserror::Error;

use crate::details::Detail;

/// Error taxonomy shared by every repository backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Authentication data is missing or wrong
    InvalidUserAuthenticationData,
    /// Authenticated caller may not perform the action
    NotAllowed,
    /// Entity not found
    DataNotFound,
    /// Entity already exists (conflict)
    AlreadyExists,
    /// Validation failed for one or more fields
    InvalidData,
    /// A key pattern matched more than one record
    ManyRecordsFound,
}

impl ErrorKind {
    /// Name of the kind, as used for the derived default code.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUserAuthenticationData => "InvalidUserAuthenticationData",
            ErrorKind::NotAllowed => "NotAllowed",
            ErrorKind::DataNotFound => "DataNotFound",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::InvalidData => "InvalidData",
            ErrorKind::ManyRecordsFound => "ManyRecordsFound",
        }
    }

    /// Code used when none is set: the kind name with a lowercase first letter.
    pub fn default_code(&self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUserAuthenticationData => "Invalid user authentication data",
            ErrorKind::NotAllowed => "You are not allowed to it.",
            ErrorKind::DataNotFound => "Item not found.",
            ErrorKind::AlreadyExists => "An entity with the data already exists.",
            ErrorKind::InvalidData => "Invalid data.",
            ErrorKind::ManyRecordsFound => "Many records found, try to filter more specifically.",
        }
    }

    /// HTTP-adjacent status class for the surfacing boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidUserAuthenticationData => 401,
            ErrorKind::NotAllowed => 403,
            ErrorKind::DataNotFound => 404,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::InvalidData => 422,
            ErrorKind::ManyRecordsFound => 400,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Domain error carrying a code and field-level details.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct DomainError {
    #[serde(skip)]
    kind: ErrorKind,
    code: String,
    message: String,
    details: Vec<Detail>,
}

impl DomainError {
    /// Create an error of the given kind with its default code and message.
    pub fn new(kind: ErrorKind) -> Self {
        Self::builder(kind).build()
    }

    pub fn builder(kind: ErrorKind) -> DomainErrorBuilder {
        DomainErrorBuilder {
            kind,
            code: None,
            message: None,
            details: Vec::new(),
        }
    }

    pub fn invalid_user_authentication_data() -> Self {
        Self::new(ErrorKind::InvalidUserAuthenticationData)
    }

    pub fn not_allowed() -> Self {
        Self::new(ErrorKind::NotAllowed)
    }

    pub fn data_not_found() -> Self {
        Self::new(ErrorKind::DataNotFound)
    }

    pub fn already_exists() -> Self {
        Self::new(ErrorKind::AlreadyExists)
    }

    pub fn invalid_data() -> Self {
        Self::new(ErrorKind::InvalidData)
    }

    /// Create an ambiguity error naming the pattern that matched too much.
    pub fn many_records_found(filter: &str) -> Self {
        Self::builder(ErrorKind::ManyRecordsFound)
            .message(format!(
                "Many records found with filter {}, try to filter more specifically.",
                filter
            ))
            .build()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[Detail] {
        &self.details
    }

    /// Check the error kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

/// Builder for [`DomainError`].
#[derive(Debug, Clone)]
pub struct DomainErrorBuilder {
    kind: ErrorKind,
    code: Option<String>,
    message: Option<String>,
    details: Vec<Detail>,
}

impl DomainErrorBuilder {
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn detail(mut self, detail: Detail) -> Self {
        self.details.push(detail);
        self
    }

    pub fn details(mut self, details: impl IntoIterator<Item = Detail>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn build(self) -> DomainError {
        DomainError {
            kind: self.kind,
            code: self.code.unwrap_or_else(|| self.kind.default_code()),
            message: self
                .message
                .unwrap_or_else(|| self.kind.default_message().to_string()),
            details: self.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_code_derives_from_kind() {
        assert_eq!(DomainError::data_not_found().code(), "dataNotFound");
        assert_eq!(
            DomainError::invalid_user_authentication_data().code(),
            "invalidUserAuthenticationData"
        );
        assert_eq!(DomainError::not_allowed().message(), "You are not allowed to it.");
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let err = DomainError::builder(ErrorKind::AlreadyExists)
            .code("001")
            .detail(Detail::new("email.unique", "Field email must be unique."))
            .build();

        assert_eq!(err.code(), "001");
        assert_eq!(err.message(), "An entity with the data already exists.");
        assert_eq!(err.details().len(), 1);
        assert_eq!(err.status_code(), 409);
        assert!(err.is(ErrorKind::AlreadyExists));
    }

    #[test]
    fn test_many_records_found_names_filter() {
        let err = DomainError::many_records_found("*abc*");
        assert_eq!(
            err.to_string(),
            "Many records found with filter *abc*, try to filter more specifically."
        );
        assert_eq!(err.code(), "manyRecordsFound");
    }

    #[test]
    fn test_serializes_to_transport_shape() {
        let err = DomainError::builder(ErrorKind::InvalidData)
            .code("001")
            .detail(Detail::new("name.required", "Field name is required."))
            .build();
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "001");
        assert_eq!(json["message"], "Invalid data.");
        assert_eq!(json["details"][0]["id"], "name.required");
        assert!(json.get("kind").is_none());
    }
}
