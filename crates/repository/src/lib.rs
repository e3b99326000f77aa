//! Generic repositories over relational, document and key-value stores.
//!
//! Every backend implements [`Repository`] for one entity type, converting
//! between domain and store entities with an
//! [`EntityDataMapper`](domain::EntityDataMapper) and translating store
//! failures into domain errors.

pub mod compose;
pub mod contract;
pub mod document;
pub mod key_value;
pub mod relational;

pub use contract::{Criteria, Repository, UpdateOutcome};
pub use document::{DocumentCollection, DocumentRepository};
pub use key_value::{KeyValueRepository, KeyValueStore};
pub use relational::{RelationalRepository, SearchOperator};
