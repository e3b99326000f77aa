//! Pagination and search input for list operations.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Normalized pagination + free-text search input.
///
/// `page` is always >= 1 and `size` always in `[1, MAX_PAGE_SIZE]`,
/// whatever the caller sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFilter")]
pub struct Filter {
    page: u64,
    size: u64,
    query: Option<String>,
}

impl Filter {
    /// Build a filter from already-parsed values.
    pub fn new(page: Option<i64>, size: Option<i64>, query: Option<String>) -> Self {
        Self {
            page: normalize_page(page),
            size: normalize_size(size),
            query: normalize_query(query),
        }
    }

    /// Build a filter from raw query-string values.
    pub fn from_params(page: Option<&str>, size: Option<&str>, query: Option<&str>) -> Self {
        Self::new(
            page.and_then(parse_param),
            size.and_then(parse_param),
            query.map(str::to_string),
        )
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = normalize_page(Some(page));
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = normalize_size(Some(size));
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = normalize_query(Some(query.into()));
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Search term, if any. Never empty.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Offset/limit window for the current page
    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: (self.page - 1).saturating_mul(self.size),
            limit: self.size,
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
            query: None,
        }
    }
}

/// Offset/limit pair derived from a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Apply the window to an in-memory sequence.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.iter().skip(start).take(limit).cloned().collect()
    }
}

/// One page of results plus the total number of matches across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemList<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ItemList<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Convert every item, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ItemList<U> {
        ItemList {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Parse a base-10 query-string value. Anything else is treated as absent.
pub fn parse_param(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn normalize_page(page: Option<i64>) -> u64 {
    match page {
        Some(page) if page > 0 => page as u64,
        _ => DEFAULT_PAGE_NUMBER,
    }
}

fn normalize_size(size: Option<i64>) -> u64 {
    match size {
        Some(size) if size > 0 => (size as u64).min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

fn normalize_query(query: Option<String>) -> Option<String> {
    query.filter(|q| !q.trim().is_empty())
}

/// Wire shape accepted from callers before normalization.
#[derive(Debug, Default, Deserialize)]
struct RawFilter {
    #[serde(default)]
    page: Option<RawNumber>,
    #[serde(default)]
    size: Option<RawNumber>,
    #[serde(default)]
    query: Option<String>,
}

/// A number, its string form, or anything else (treated as absent).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl RawNumber {
    fn value(&self) -> Option<i64> {
        match self {
            RawNumber::Int(n) => Some(*n),
            RawNumber::Text(s) => parse_param(s),
            RawNumber::Other(_) => None,
        }
    }
}

impl From<RawFilter> for Filter {
    fn from(raw: RawFilter) -> Self {
        Filter::new(
            raw.page.as_ref().and_then(RawNumber::value),
            raw.size.as_ref().and_then(RawNumber::value),
            raw.query,
        )
    }
}
