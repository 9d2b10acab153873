//! SQLite backend driver.
//!
//! SQLite is the embedded-file backend: the connection string is a bare
//! filesystem path. Table names come from `sqlite_master`, column metadata
//! from `PRAGMA table_info`, and rows from an unqualified scan capped with
//! `LIMIT`. The database is opened read-only.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool};

use super::{BackendDriver, NULL_CELL};
use crate::error::{GlanceError, Result};
use crate::models::{BackendKind, ColumnDescriptor, RowSnapshot};

/// Driver for file-based SQLite databases.
pub struct SqliteDriver {
    pool: SqlitePool,
    path: String,
}

impl std::fmt::Debug for SqliteDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDriver")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteDriver {
    /// Opens the database file at `path` read-only.
    ///
    /// # Errors
    /// Returns `ConnectionUnavailable` when the path does not exist or the
    /// engine rejects the file as not a valid database.
    pub async fn connect(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(GlanceError::connection_unavailable(format!(
                "database file '{path}' does not exist"
            )));
        }

        let options = SqliteConnectOptions::new().filename(path).read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                GlanceError::connection_failed(format!("failed to open '{path}'"), e)
            })?;

        // SQLite validates the file lazily; probe the catalog so an invalid
        // file fails at construction rather than mid-introspection.
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sqlite_master")
            .fetch_one(&pool)
            .await
            .map_err(|e| {
                GlanceError::connection_failed(
                    format!("'{path}' is not a valid SQLite database"),
                    e,
                )
            })?;

        tracing::debug!("opened SQLite database '{}'", path);

        Ok(Self {
            pool,
            path: path.to_string(),
        })
    }

    /// Reads the ordered column descriptors for one table from the catalog.
    async fn table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let query = format!("PRAGMA table_info('{}')", table.replace('\'', "''"));

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                GlanceError::introspection_failed(
                    format!("failed to read columns for table '{table}'"),
                    e,
                )
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("name").map_err(|e| {
                GlanceError::introspection_failed(
                    format!("failed to parse column name for table '{table}'"),
                    e,
                )
            })?;
            let notnull: i32 = row.try_get("notnull").unwrap_or(0);
            let pk: i32 = row.try_get("pk").unwrap_or(0);

            // PRIMARY KEY columns are implicitly NOT NULL in SQLite even when
            // PRAGMA reports notnull = 0.
            columns.push(ColumnDescriptor {
                name,
                primary: pk > 0,
                nullable: notnull == 0 && pk == 0,
            });
        }

        Ok(columns)
    }
}

#[async_trait]
impl BackendDriver for SqliteDriver {
    async fn list_tables(&self) -> Result<Vec<String>> {
        // sqlite_% entries are the engine's own metadata; catalog order is
        // preserved as-is.
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GlanceError::introspection_failed("failed to enumerate tables", e))?;

        Ok(rows)
    }

    async fn fetch_table(
        &self,
        table: &str,
        row_cap: u32,
    ) -> Result<(Vec<ColumnDescriptor>, Vec<RowSnapshot>)> {
        let header = self.table_columns(table).await?;
        if header.is_empty() {
            return Ok((header, Vec::new()));
        }

        let query = format!(
            "SELECT * FROM \"{}\" LIMIT ?",
            table.replace('"', "\"\"")
        );

        let rows = sqlx::query(&query)
            .bind(i64::from(row_cap))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                GlanceError::introspection_failed(
                    format!("failed to read rows from table '{table}'"),
                    e,
                )
            })?;

        let snapshots = rows.iter().map(row_to_cells).collect();
        Ok((header, snapshots))
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Converts one result row into text cells, preserving column order.
fn row_to_cells(row: &SqliteRow) -> RowSnapshot {
    row.columns()
        .iter()
        .map(|column| decode_cell(row, column.ordinal()))
        .collect()
}

/// Decodes a single cell to text with explicit fallbacks.
///
/// SQLite is dynamically typed, so decoding is attempted per storage class.
/// BLOBs become `base64:<payload>`; NULL and undecodable values become the
/// NULL placeholder instead of aborting the run.
fn decode_cell(row: &SqliteRow, index: usize) -> String {
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.unwrap_or_else(|| NULL_CELL.to_string());
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or_else(|| NULL_CELL.to_string(), |n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or_else(|| NULL_CELL.to_string(), |n| n.to_string());
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or_else(|| NULL_CELL.to_string(), |b| b.to_string());
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or_else(
            || NULL_CELL.to_string(),
            |bytes| {
                use base64::Engine;
                format!(
                    "base64:{}",
                    base64::engine::general_purpose::STANDARD.encode(bytes)
                )
            },
        );
    }

    NULL_CELL.to_string()
}
