//! Translation of decoded store failures into domain errors.

use thiserror::Error;

use crate::constants::{ER_ROW_IS_REFERENCED, TRANSLATED_ERROR_CODE};
use crate::details::{translate_details, DetailType};
use crate::error::{DomainError, ErrorKind};

/// Raw failure shape decoded from a storage driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFailure {
    /// A unique index rejected the write
    UniqueConstraint { model: String, fields: Vec<String> },
    /// A foreign key rejected the write or delete
    ForeignKeyConstraint {
        table: String,
        fields: Vec<String>,
        code: String,
    },
    /// Anything the decoders do not recognize
    Other { name: String, message: String },
}

impl StoreFailure {
    pub fn name(&self) -> &str {
        match self {
            StoreFailure::UniqueConstraint { .. } => "UniqueConstraintError",
            StoreFailure::ForeignKeyConstraint { .. } => "ForeignKeyConstraintError",
            StoreFailure::Other { name, .. } => name,
        }
    }
}

/// The factory was handed a failure it has no translation for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error name is not implemented: {name}")]
pub struct UnrecognizedFailure {
    pub name: String,
}

/// Builds domain errors from store and validation failures.
pub struct ErrorFactory;

impl ErrorFactory {
    /// Translate a decoded store failure.
    ///
    /// Unique violations become `AlreadyExists`; foreign-key violations become
    /// `InvalidData` when a child row still references the record and
    /// `DataNotFound` otherwise. Anything else is rejected.
    pub fn from_store_failure(failure: &StoreFailure) -> Result<DomainError, UnrecognizedFailure> {
        match failure {
            StoreFailure::UniqueConstraint { model, fields } => {
                let fields = fields
                    .iter()
                    .map(|field| DetailType::Unique.field(&format!("{}.{}", model, field)));

                Ok(DomainError::builder(ErrorKind::AlreadyExists)
                    .code(TRANSLATED_ERROR_CODE)
                    .message("An entity with the data already exists.")
                    .details(translate_details(fields))
                    .build())
            }
            StoreFailure::ForeignKeyConstraint {
                table,
                fields,
                code,
            } => {
                let detail_type = if code == ER_ROW_IS_REFERENCED {
                    DetailType::HasAssociation
                } else {
                    DetailType::NotFound
                };
                let details = translate_details(
                    fields
                        .iter()
                        .map(|field| detail_type.field(&format!("{}.{}", table, field))),
                );

                let error = if detail_type == DetailType::HasAssociation {
                    DomainError::builder(ErrorKind::InvalidData).message("Invalid data.")
                } else {
                    DomainError::builder(ErrorKind::DataNotFound).message("Item not found.")
                };
                Ok(error.code(TRANSLATED_ERROR_CODE).details(details).build())
            }
            StoreFailure::Other { name, .. } => Err(UnrecognizedFailure { name: name.clone() }),
        }
    }

    /// Translate `(field, kind)` pairs from a schema validator into `InvalidData`.
    pub fn from_field_kinds<I, F, K>(fields: I) -> DomainError
    where
        I: IntoIterator<Item = (F, K)>,
        F: AsRef<str>,
        K: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|(field, kind)| format!("{}_{}", field.as_ref(), kind.as_ref().to_uppercase()));

        DomainError::builder(ErrorKind::InvalidData)
            .code(TRANSLATED_ERROR_CODE)
            .message("Invalid data.")
            .details(translate_details(fields))
            .build()
    }

    /// Translate `validator` errors into `InvalidData`, one detail per failed rule.
    #[cfg(feature = "validation")]
    pub fn from_validation_errors(errors: &validator::ValidationErrors) -> DomainError {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(move |e| (field.to_string(), e.code.to_string()))
            })
            .collect();
        fields.sort();

        Self::from_field_kinds(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ER_NO_REFERENCED_ROW;

    #[test]
    fn test_unique_violation_becomes_already_exists() {
        let failure = StoreFailure::UniqueConstraint {
            model: "userAccount".into(),
            fields: vec!["email".into(), "nick_name".into()],
        };
        let err = ErrorFactory::from_store_failure(&failure).unwrap();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.code(), "001");
        assert_eq!(err.details()[0].id, "userAccount.email.unique");
        assert_eq!(
            err.details()[1].message,
            "Field userAccount.nickName must be unique."
        );
    }

    #[test]
    fn test_referenced_row_becomes_invalid_data() {
        let failure = StoreFailure::ForeignKeyConstraint {
            table: "users".into(),
            fields: vec!["id".into()],
            code: ER_ROW_IS_REFERENCED.into(),
        };
        let err = ErrorFactory::from_store_failure(&failure).unwrap();

        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(err.message(), "Invalid data.");
        assert_eq!(err.details()[0].id, "users.id.hasassociation");
        assert_eq!(err.details()[0].message, "Field users.id has a association.");
    }

    #[test]
    fn test_missing_parent_becomes_data_not_found() {
        let failure = StoreFailure::ForeignKeyConstraint {
            table: "users".into(),
            fields: vec!["user_id".into()],
            code: ER_NO_REFERENCED_ROW.into(),
        };
        let err = ErrorFactory::from_store_failure(&failure).unwrap();

        assert_eq!(err.kind(), ErrorKind::DataNotFound);
        assert_eq!(err.code(), "001");
        assert_eq!(err.details()[0].id, "users.userId.notfound");
    }

    #[test]
    fn test_other_failure_is_unrecognized() {
        let failure = StoreFailure::Other {
            name: "ConnectionAcquire".into(),
            message: "pool timed out".into(),
        };
        let err = ErrorFactory::from_store_failure(&failure).unwrap_err();
        assert_eq!(err.name, "ConnectionAcquire");
    }

    #[test]
    fn test_field_kinds_are_uppercased() {
        let err = ErrorFactory::from_field_kinds([("name", "required"), ("email", "regexp")]);

        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(err.details()[0].id, "name.required");
        assert_eq!(err.details()[1].message, "Field email is invalid.");
    }

    #[cfg(feature = "validation")]
    #[test]
    fn test_validation_errors() {
        use validator::Validate;

        #[derive(Validate)]
        struct SignUp {
            #[validate(email)]
            email: String,
            #[validate(length(min = 1, code = "required"))]
            name: String,
        }

        let errors = SignUp {
            email: "nope".into(),
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        let err = ErrorFactory::from_validation_errors(&errors);

        assert_eq!(err.code(), "001");
        let ids: Vec<_> = err.details().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["email.invalid", "name.required"]);
    }
}
