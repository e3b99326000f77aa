//! Domain-level constants.
//!
//! These constants define pagination rules, cache lifetimes and the
//! error codes shared by every storage backend.

// =============================================================================
// Pagination
// =============================================================================

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 15;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

// =============================================================================
// Key-Value Store
// =============================================================================

/// Seconds per hour (for expiration calculation)
pub const SECONDS_PER_HOUR: u64 = 3600;

/// Hard ceiling on the lifetime of a key-value entry (6 hours)
pub const DEFAULT_KEY_EXPIRATION_SECONDS: u64 = 6 * SECONDS_PER_HOUR;

/// Separator between a key prefix and the caller's key
pub const KEY_PREFIX_SEPARATOR: &str = ".";

// =============================================================================
// Error Codes
// =============================================================================

/// Code carried by errors produced from a decoded store failure
pub const TRANSLATED_ERROR_CODE: &str = "001";

/// Driver code of a delete blocked because a child row still references the parent
pub const ER_ROW_IS_REFERENCED: &str = "ER_ROW_IS_REFERENCED_2";

/// Driver code of a write that references a parent row that does not exist
pub const ER_NO_REFERENCED_ROW: &str = "ER_NO_REFERENCED_ROW_2";
