//! Decoding of relational driver failures into [`StoreFailure`] values.

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DbErr, SqlErr};

use domain::details::lower_camel_case;
use domain::{StoreFailure, ER_NO_REFERENCED_ROW, ER_ROW_IS_REFERENCED};

static SQLITE_UNIQUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"UNIQUE constraint failed: (.+)$").expect("valid sqlite unique regex")
});

static MYSQL_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"for key '([^']+)'").expect("valid mysql key regex"));

static PG_CONSTRAINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"constraint "([^"]+)""#).expect("valid constraint regex"));

static PG_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"on table "([^"]+)""#).expect("valid table regex"));

static MYSQL_FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"FOREIGN KEY \(([^)]+)\) REFERENCES (\S+)").expect("valid foreign key regex")
});

/// Classify a driver error raised against `table`.
pub fn store_failure(err: &DbErr, table: &str) -> StoreFailure {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => StoreFailure::UniqueConstraint {
            model: lower_camel_case(table),
            fields: unique_fields(&message, table),
        },
        Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
            let (table, fields) = foreign_key_target(&message, table);
            StoreFailure::ForeignKeyConstraint {
                table,
                fields,
                code: foreign_key_code(&message).to_string(),
            }
        }
        _ => StoreFailure::Other {
            name: error_name(err),
            message: err.to_string(),
        },
    }
}

/// Columns named by a unique violation message.
pub fn unique_fields(message: &str, table: &str) -> Vec<String> {
    if let Some(caps) = SQLITE_UNIQUE_RE.captures(message) {
        return caps[1]
            .split(',')
            .map(|column| last_segment(column.trim()).to_string())
            .collect();
    }

    // MySQL names the index, PostgreSQL the constraint
    let index = MYSQL_KEY_RE
        .captures(message)
        .or_else(|| PG_CONSTRAINT_RE.captures(message))
        .map(|caps| caps[1].to_string());

    match index {
        Some(index) => vec![strip_index_affixes(last_segment(&index), table)],
        None => Vec::new(),
    }
}

/// Table and columns named by a foreign-key violation message.
pub fn foreign_key_target(message: &str, table: &str) -> (String, Vec<String>) {
    if let Some(caps) = MYSQL_FOREIGN_KEY_RE.captures(message) {
        let fields = caps[1]
            .split(',')
            .map(|column| unquote(column).to_string())
            .collect();
        let referenced = caps[2].split('(').next().unwrap_or_default();
        return (last_segment(unquote(referenced)).to_string(), fields);
    }

    let tables: Vec<&str> = PG_TABLE_RE
        .captures_iter(message)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    match (tables.first(), PG_CONSTRAINT_RE.captures(message)) {
        (Some(first), Some(caps)) => {
            // The constraint belongs to the child table, which is named last
            let child = tables.last().copied().unwrap_or(first);
            let field = strip_index_affixes(&caps[1], child);
            (first.to_string(), vec![field])
        }
        _ => (table.to_string(), Vec::new()),
    }
}

/// Distinguish a blocked parent delete from a dangling child reference.
pub fn foreign_key_code(message: &str) -> &'static str {
    let referenced = message.contains("Cannot delete or update a parent row")
        || message.contains("is still referenced")
        || message.contains("update or delete on table");

    if referenced {
        ER_ROW_IS_REFERENCED
    } else {
        ER_NO_REFERENCED_ROW
    }
}

fn error_name(err: &DbErr) -> String {
    let debug = format!("{err:?}");
    debug
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_string()
}

fn strip_index_affixes(index: &str, table: &str) -> String {
    let prefix = format!("{table}_");
    let name = index.strip_prefix(prefix.as_str()).unwrap_or(index);

    for suffix in ["_key", "_fkey", "_unique", "_foreign"] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    name.to_string()
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn unquote(identifier: &str) -> &str {
    identifier.trim().trim_matches(|c| c == '`' || c == '"')
}
