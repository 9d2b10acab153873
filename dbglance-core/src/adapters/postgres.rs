//! PostgreSQL backend driver.
//!
//! PostgreSQL is the client/server backend: the connection string is a URI
//! parsed into (host, database, user, credential) before an engine-native
//! connect. Table names come from `pg_tables` with engine-reserved prefixes
//! excluded; column metadata comes from `information_schema`.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};

use super::{BackendDriver, NULL_CELL};
use crate::error::{GlanceError, Result};
use crate::models::{BackendKind, ColumnDescriptor, RowSnapshot};

/// Ordered column descriptors for one table, with the primary-key flag
/// resolved through the table's PRIMARY KEY constraint.
const COLUMNS_QUERY: &str = r"
    SELECT
        c.column_name,
        c.is_nullable,
        CASE WHEN pk.column_name IS NOT NULL THEN true ELSE false END AS is_primary_key
    FROM information_schema.columns c
    LEFT JOIN (
        SELECT kcu.column_name, kcu.table_name, kcu.table_schema
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY'
    ) pk ON pk.column_name = c.column_name
        AND pk.table_name = c.table_name
        AND pk.table_schema = c.table_schema
    WHERE c.table_name = $1
    ORDER BY c.ordinal_position
";

/// `pg_%` and `sql_%` names are reserved by the engine for its own metadata.
/// Catalog order is preserved as-is.
const LIST_TABLES_QUERY: &str = r"
    SELECT tablename FROM pg_tables
    WHERE tablename NOT LIKE 'pg_%' AND tablename NOT LIKE 'sql_%'
";

/// Driver for client/server PostgreSQL databases.
pub struct PostgresDriver {
    pool: PgPool,
    database: String,
}

impl std::fmt::Debug for PostgresDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDriver")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl PostgresDriver {
    /// Parses the connection URI and connects.
    ///
    /// # Errors
    /// Returns `MalformedConnectionString` when required URI fields are
    /// absent and `ConnectionUnavailable` on any connect-time failure (bad
    /// credentials, unreachable host, unknown database).
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let parts = crate::uri::parse_client_server_uri(connection_string)?;

        let mut options = PgConnectOptions::new()
            .host(&parts.host)
            .database(&parts.database);
        if let Some(port) = parts.port {
            options = options.port(port);
        }
        if let Some(user) = &parts.user {
            options = options.username(user);
        }
        if let Some(credential) = &parts.credential {
            options = options.password(credential);
        }

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| {
                GlanceError::connection_failed(
                    format!(
                        "failed to connect to database '{}' on '{}'",
                        parts.database, parts.host
                    ),
                    e,
                )
            })?;

        tracing::debug!(
            "connected to PostgreSQL database '{}' on '{}'",
            parts.database,
            parts.host
        );

        Ok(Self {
            pool,
            database: parts.database,
        })
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(table)
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
            let name: String = row.try_get("column_name").map_err(|e| {
                GlanceError::introspection_failed(
                    format!("failed to parse column name for table '{table}'"),
                    e,
                )
            })?;
            let is_nullable: String = row.try_get("is_nullable").unwrap_or_default();
            let primary: bool = row.try_get("is_primary_key").unwrap_or(false);

            columns.push(ColumnDescriptor {
                name,
                primary,
                nullable: is_nullable.eq_ignore_ascii_case("YES"),
            });
        }

        Ok(columns)
    }
}

#[async_trait]
impl BackendDriver for PostgresDriver {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GlanceError::introspection_failed("failed to enumerate tables", e))?;

        Ok(tables)
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

        // Text coercion is delegated to the engine: every PostgreSQL type
        // casts to text, which keeps cell decoding uniform across the
        // strictly typed wire format.
        let select_list = header
            .iter()
            .map(|column| format!("\"{}\"::text", column.name.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT {} FROM \"{}\" LIMIT $1",
            select_list,
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

        let snapshots = rows
            .iter()
            .map(|row| {
                (0..header.len())
                    .map(|index| {
                        row.try_get::<Option<String>, _>(index)
                            .ok()
                            .flatten()
                            .unwrap_or_else(|| NULL_CELL.to_string())
                    })
                    .collect()
            })
            .collect();

        Ok((header, snapshots))
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Postgres
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
