//! Report exporters: pure functions of a finished report.
//!
//! Both exporters receive a fully built [`Report`] and write one file each;
//! neither mutates the model or reaches back into the database.

use askama::Template;
use dbglance_core::{GlanceError, Report, Result};
use std::path::Path;

/// HTML rendering of a report. The template receives the report under a
/// single `report` binding and enumerates its tables, headers, and rows
/// itself.
#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    report: &'a Report,
}

/// Serializes the report to pretty-printed JSON.
pub(crate) async fn write_json(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(|e| GlanceError::Serialization {
        context: "failed to serialize report".to_string(),
        source: e,
    })?;

    tokio::fs::write(path, json)
        .await
        .map_err(|e| GlanceError::Io {
            context: format!("failed to write {}", path.display()),
            source: e,
        })?;

    Ok(())
}

/// Renders the report through the HTML template.
pub(crate) async fn write_html(report: &Report, path: &Path) -> Result<()> {
    let rendered = ReportTemplate { report }
        .render()
        .map_err(|e| GlanceError::render_failed("failed to render report template", e))?;

    tokio::fs::write(path, rendered)
        .await
        .map_err(|e| GlanceError::Io {
            context: format!("failed to write {}", path.display()),
            source: e,
        })?;

    Ok(())
}
