//! End-to-end translation of validation and store failures into domain errors.

use validator::Validate;

use domain::{
    DomainError, ErrorFactory, ErrorKind, Filter, StoreFailure, ER_NO_REFERENCED_ROW,
    ER_ROW_IS_REFERENCED,
};

#[derive(Debug, Validate)]
struct SignUp {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, code = "required"))]
    first_name: String,
}

#[test]
fn test_validation_failure_serializes_for_clients() {
    let form = SignUp {
        email: "not-an-email".to_string(),
        first_name: String::new(),
    };
    let errors = form.validate().unwrap_err();

    let err = ErrorFactory::from_validation_errors(&errors);
    let json = serde_json::to_value(&err).unwrap();

    assert_eq!(err.status_code(), 422);
    assert_eq!(json["code"], "001");
    assert_eq!(json["message"], "Invalid data.");
    assert_eq!(json["details"][0]["id"], "email.invalid");
    assert_eq!(json["details"][1]["id"], "firstName.required");
    assert_eq!(json["details"][1]["message"], "Field firstName is required.");
}

#[test]
fn test_unique_violation_maps_to_conflict() {
    let failure = StoreFailure::UniqueConstraint {
        model: "users".to_string(),
        fields: vec!["email".to_string()],
    };

    let err = ErrorFactory::from_store_failure(&failure).unwrap();

    assert_eq!(err.status_code(), 409);
    assert_eq!(err.details()[0].id, "users.email.unique");
    assert_eq!(err.details()[0].message, "Field users.email must be unique.");
}

#[test]
fn test_foreign_key_codes_pick_the_kind() {
    let referenced = StoreFailure::ForeignKeyConstraint {
        table: "users".to_string(),
        fields: vec!["user_id".to_string()],
        code: ER_ROW_IS_REFERENCED.to_string(),
    };
    let dangling = StoreFailure::ForeignKeyConstraint {
        table: "users".to_string(),
        fields: vec!["user_id".to_string()],
        code: ER_NO_REFERENCED_ROW.to_string(),
    };

    let referenced = ErrorFactory::from_store_failure(&referenced).unwrap();
    let dangling = ErrorFactory::from_store_failure(&dangling).unwrap();

    assert!(referenced.is(ErrorKind::InvalidData));
    assert_eq!(referenced.details()[0].id, "users.userId.hasassociation");
    assert!(dangling.is(ErrorKind::DataNotFound));
    assert_eq!(dangling.details()[0].id, "users.userId.notfound");
}

#[test]
fn test_unrecognized_failure_is_rejected() {
    let failure = StoreFailure::Other {
        name: "ConnectionRefused".to_string(),
        message: "refused".to_string(),
    };

    let err = ErrorFactory::from_store_failure(&failure).unwrap_err();
    assert_eq!(err.to_string(), "Error name is not implemented: ConnectionRefused");
}

#[test]
fn test_filter_from_query_string() {
    let filter = Filter::from_params(Some("0"), Some("abc"), Some("  rust "));
    assert_eq!(filter.page(), 1);
    assert_eq!(filter.size(), 15);

    let window = Filter::from_params(Some("3"), Some("500"), None).window();
    assert_eq!((window.offset, window.limit), (200, 100));
}

#[test]
fn test_default_errors_are_distinct_per_kind() {
    let kinds = [
        DomainError::invalid_user_authentication_data(),
        DomainError::not_allowed(),
        DomainError::data_not_found(),
        DomainError::already_exists(),
        DomainError::invalid_data(),
    ];
    let statuses: Vec<u16> = kinds.iter().map(DomainError::status_code).collect();
    assert_eq!(statuses, vec![401, 403, 404, 409, 422]);
}
