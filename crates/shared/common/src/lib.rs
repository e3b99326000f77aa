//! Common utilities shared across all repository backends.
//!
//! This crate provides:
//! - Unified error handling for store failures
//! - Store configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{OptionExt, RepoResult, RepositoryError};
