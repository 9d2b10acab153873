//! Canonical, backend-independent report model.
//!
//! Introspection folds every backend's catalog and row data into the types
//! here. A [`Report`] is built once per invocation, read-only afterwards, and
//! handed to the exporters; only its serialized forms are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GlanceError, Result};

/// Default report name used when no override is supplied.
pub const DEFAULT_REPORT_NAME: &str = "dbglance report";

/// Default maximum number of rows sampled per table.
pub const DEFAULT_ROW_CAP: u32 = 10;

/// Supported backend kinds.
///
/// MySQL is recognized by the selector grammar but has no driver; the
/// factory rejects it explicitly rather than silently doing nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Client/server relational engine (PostgreSQL)
    Postgres,
    /// File-based embedded engine (SQLite)
    Sqlite,
    /// Recognized but intentionally unimplemented
    MySql,
}

impl BackendKind {
    /// Selector strings accepted on the command line.
    pub const SELECTORS: &'static [&'static str] = &["-psql", "-sqlite", "-mysql"];

    /// Maps a CLI selector to a backend kind.
    ///
    /// # Errors
    /// Returns `UnsupportedBackend` for anything outside [`Self::SELECTORS`].
    pub fn from_selector(selector: &str) -> Result<Self> {
        match selector {
            "-psql" => Ok(Self::Postgres),
            "-sqlite" => Ok(Self::Sqlite),
            "-mysql" => Ok(Self::MySql),
            other => Err(GlanceError::UnsupportedBackend {
                selector: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Postgres => write!(f, "PostgreSQL"),
            BackendKind::Sqlite => write!(f, "SQLite"),
            BackendKind::MySql => write!(f, "MySQL"),
        }
    }
}

/// One column of a table, in the backend's native column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name as reported by the backend catalog
    pub name: String,
    /// Whether the column is part of the primary key
    pub primary: bool,
    /// Whether the column admits NULL values
    pub nullable: bool,
}

/// A row sampled from a table: text-encoded cells, one per column, in
/// column order.
pub type RowSnapshot = Vec<String>;

/// A table with its ordered columns and a bounded window of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Table name as listed by the backend catalog
    pub name: String,
    /// Ordered column descriptors
    pub header: Vec<ColumnDescriptor>,
    /// Sampled rows, at most the configured cap
    pub rows: Vec<RowSnapshot>,
}

impl TableSnapshot {
    /// Checks the length invariant: every row has exactly one cell per column.
    pub fn is_consistent(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.header.len())
    }
}

/// The canonical document produced by one introspection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Report title
    pub name: String,
    /// Timestamp captured at model-assembly time (serialized as RFC 3339)
    pub generated: DateTime<Utc>,
    /// Table snapshots in the order the backend listed them
    pub content: Vec<TableSnapshot>,
}
