//! Key-value backend over Redis.

mod repository;
mod store;

pub use repository::KeyValueRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use store::MockKeyValueStore;
pub use store::KeyValueStore;
