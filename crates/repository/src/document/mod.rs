//! Document backend over MongoDB.

mod collection;
pub mod decode;
mod query;
mod repository;

pub use collection::DocumentCollection;
#[cfg(any(test, feature = "test-utils"))]
pub use collection::MockDocumentCollection;
pub use query::{criteria_document, DocumentComposer};
pub use repository::DocumentRepository;
