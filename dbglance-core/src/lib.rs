//! Core introspection pipeline for dbglance.
//!
//! This crate turns heterogeneous database backends into one canonical
//! [`Report`] model: a driver per backend kind behind one capability trait,
//! a factory performing explicit kind-to-driver mapping, and a builder that
//! folds catalog listings and sampled rows into the backend-independent
//! document the exporters consume.
//!
//! # Pipeline
//! `BackendKind` selector → [`adapters::create_driver`] →
//! [`report::build_report`] → [`Report`] → exporters (JSON / HTML, in the
//! `dbglance` binary).
//!
//! # Resource model
//! Single-threaded and sequential: one connection per driver, one table at a
//! time, owned exclusively by the report builder during a build. Drivers are
//! released with `close()` on every exit path; drop reclaims the connection
//! if a build aborts.

pub mod adapters;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod uri;

// Re-export commonly used types
pub use adapters::{BackendDriver, connection_hint, create_driver};
pub use error::{GlanceError, Result, redact_database_url};
pub use logging::init_logging;
pub use models::{
    BackendKind, ColumnDescriptor, DEFAULT_REPORT_NAME, DEFAULT_ROW_CAP, Report, RowSnapshot,
    TableSnapshot,
};
pub use report::build_report;
pub use uri::{ConnectionParts, parse_client_server_uri};
