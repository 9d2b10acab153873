//! End-to-end introspection tests against on-disk SQLite fixtures.

#![cfg(feature = "sqlite")]

use std::path::Path;

use dbglance_core::adapters::sqlite::SqliteDriver;
use dbglance_core::{BackendDriver, BackendKind, GlanceError, build_report, create_driver};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Creates a database file and runs the given statements against it.
async fn seed_database(path: &Path, statements: &[&str]) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("failed to create fixture database");

    for statement in statements {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("failed to seed fixture database");
    }
    pool.close().await;
}

async fn seed_users_db(path: &Path) {
    seed_database(
        path,
        &[
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
            "INSERT INTO users (name) VALUES ('alice'), ('bob'), ('carol')",
        ],
    )
    .await;
}

#[tokio::test]
async fn test_users_table_within_cap() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("fixture.db");
    seed_users_db(&db_path).await;

    let driver = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap();
    let report = build_report(&driver, "test report", 10).await.unwrap();
    driver.close().await;

    assert_eq!(report.content.len(), 1);
    let users = &report.content[0];
    assert_eq!(users.name, "users");
    assert_eq!(users.header.len(), 2);
    assert_eq!(users.rows.len(), 3);
    assert!(users.rows.iter().all(|row| row.len() == 2));

    // Column metadata comes from the real catalog, not hardcoded flags.
    assert_eq!(users.header[0].name, "id");
    assert!(users.header[0].primary);
    assert!(!users.header[0].nullable);
    assert_eq!(users.header[1].name, "name");
    assert!(!users.header[1].primary);
    assert!(users.header[1].nullable);
}

#[tokio::test]
async fn test_row_cap_truncates_from_the_start() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("fixture.db");
    seed_users_db(&db_path).await;

    let driver = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap();
    let report = build_report(&driver, "test report", 2).await.unwrap();
    driver.close().await;

    let users = &report.content[0];
    assert_eq!(users.rows.len(), 2);
    assert_eq!(users.rows[0], vec!["1".to_string(), "alice".to_string()]);
    assert_eq!(users.rows[1], vec!["2".to_string(), "bob".to_string()]);
}

#[tokio::test]
async fn test_missing_file_is_connection_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("does-not-exist.db");

    let err = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, GlanceError::ConnectionUnavailable { .. }));
}

#[tokio::test]
async fn test_invalid_file_is_connection_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("not-a-database.db");
    std::fs::write(&db_path, "this is plain text, not a SQLite database file").unwrap();

    let err = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, GlanceError::ConnectionUnavailable { .. }));
}

#[tokio::test]
async fn test_factory_builds_sqlite_driver_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("fixture.db");
    seed_users_db(&db_path).await;

    let driver = create_driver(BackendKind::Sqlite, db_path.to_str().unwrap())
        .await
        .unwrap();
    assert_eq!(driver.backend_kind(), BackendKind::Sqlite);

    let tables = driver.list_tables().await.unwrap();
    assert_eq!(tables, vec!["users".to_string()]);
    driver.close().await;
}

#[tokio::test]
async fn test_null_and_blob_cells_use_explicit_fallbacks() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("fixture.db");
    seed_database(
        &db_path,
        &[
            "CREATE TABLE attachments (id INTEGER PRIMARY KEY, label TEXT, payload BLOB)",
            "INSERT INTO attachments (label, payload) VALUES (NULL, x'DEADBEEF')",
        ],
    )
    .await;

    let driver = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap();
    let (header, rows) = driver.fetch_table("attachments", 10).await.unwrap();
    driver.close().await;

    assert_eq!(header.len(), 3);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "NULL");
    assert_eq!(rows[0][2], "base64:3q2+7w==");
}

#[tokio::test]
async fn test_engine_metadata_tables_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("fixture.db");
    // AUTOINCREMENT forces the engine to create sqlite_sequence.
    seed_database(
        &db_path,
        &[
            "CREATE TABLE events (id INTEGER PRIMARY KEY AUTOINCREMENT, kind TEXT)",
            "INSERT INTO events (kind) VALUES ('started')",
        ],
    )
    .await;

    let driver = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap();
    let tables = driver.list_tables().await.unwrap();
    driver.close().await;

    assert_eq!(tables, vec!["events".to_string()]);
}

#[tokio::test]
async fn test_table_order_follows_the_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("fixture.db");
    seed_database(
        &db_path,
        &[
            "CREATE TABLE zebras (id INTEGER PRIMARY KEY)",
            "CREATE TABLE apples (id INTEGER PRIMARY KEY)",
        ],
    )
    .await;

    let driver = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap();
    let tables = driver.list_tables().await.unwrap();
    driver.close().await;

    // sqlite_master lists tables in creation order, not alphabetically.
    assert_eq!(tables, vec!["zebras".to_string(), "apples".to_string()]);
}

#[tokio::test]
async fn test_rebuilding_yields_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("fixture.db");
    seed_users_db(&db_path).await;

    let driver = SqliteDriver::connect(db_path.to_str().unwrap())
        .await
        .unwrap();
    let first = build_report(&driver, "r", 10).await.unwrap();
    let second = build_report(&driver, "r", 10).await.unwrap();
    driver.close().await;

    assert_eq!(first.content, second.content);
}
