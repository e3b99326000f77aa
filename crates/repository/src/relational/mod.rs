//! Relational backend over SeaORM.

pub mod decode;
pub mod query;
mod repository;

pub use query::{column_expr, like_pattern, PrimaryKeyValue, SearchOperator, SqlComposer};
pub use repository::RelationalRepository;
