//! Domain layer - data-access value types and error translation.
//!
//! This crate contains pure logic with no storage dependencies:
//! the pagination filter, list results, the entity data mapper contract,
//! the domain error taxonomy and the translators that build field-level
//! error details.

pub mod collection;
pub mod constants;
pub mod details;
pub mod error;
pub mod factory;
pub mod filter;
pub mod mapper;

pub use collection::KeyValueCollection;
pub use constants::*;
pub use details::{translate_detail, translate_details, Detail, DetailType};
pub use error::{DomainError, DomainErrorBuilder, ErrorKind};
pub use factory::{ErrorFactory, StoreFailure, UnrecognizedFailure};
pub use filter::{Filter, ItemList, PageWindow};
pub use mapper::{ConvertMapper, EntityDataMapper, IdentityMapper};
