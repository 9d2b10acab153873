//! Report builder: orchestrates a driver into the canonical model.
//!
//! One table at a time, sequentially, over the driver's single connection.
//! Any driver failure aborts the whole build; a partially built report is
//! discarded, never returned.

use chrono::Utc;

use crate::adapters::BackendDriver;
use crate::error::Result;
use crate::models::{Report, TableSnapshot};

/// Builds a [`Report`] by enumerating tables and snapshotting each one.
///
/// Tables appear in the order the backend listed them. At most `row_cap`
/// rows are sampled per table. The generation timestamp is captured at
/// model-assembly time.
///
/// # Errors
/// Propagates the first driver failure; no retries, no partial output.
pub async fn build_report(
    driver: &dyn BackendDriver,
    report_name: &str,
    row_cap: u32,
) -> Result<Report> {
    tracing::info!("starting introspection via {} backend", driver.backend_kind());

    let tables = driver.list_tables().await?;
    tracing::info!("found {} tables", tables.len());

    let mut content = Vec::with_capacity(tables.len());
    for table in &tables {
        tracing::debug!("snapshotting table '{}'", table);
        let (header, rows) = driver.fetch_table(table, row_cap).await?;
        debug_assert!(rows.iter().all(|row| row.len() == header.len()));

        content.push(TableSnapshot {
            name: table.clone(),
            header,
            rows,
        });
    }

    tracing::info!("introspection complete: {} table snapshots", content.len());

    Ok(Report {
        name: report_name.to_string(),
        generated: Utc::now(),
        content,
    })
}
