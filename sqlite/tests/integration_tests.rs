//! Integration tests for the schema-sync-sqlite crate.

use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rusqlite::Connection;
use schema_sync_core::{ObjectKind, without_timestamp};
use schema_sync_sqlite::{ClearReport, SchemaStore, SeedReport, StoreError};

const APP_SCHEMA: &str = include_str!("../../db/schema.sql");

fn fresh_store() -> SchemaStore {
    SchemaStore::new(Connection::open_in_memory().unwrap()).unwrap()
}

/// Helper to set up a store with the bundled application schema applied.
fn setup_store() -> SchemaStore {
    let mut store = fresh_store();
    store.apply(APP_SCHEMA).unwrap();
    store
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn count(store: &SchemaStore, sql: &str) -> i64 {
    store
        .connection()
        .query_row(sql, [], |row| row.get(0))
        .unwrap()
}

fn object_names(store: &SchemaStore) -> Vec<(ObjectKind, String)> {
    store
        .objects()
        .unwrap()
        .into_iter()
        .map(|o| (o.kind, o.name))
        .collect()
}

// =============================================================================
// Apply
// =============================================================================

#[test]
fn test_apply_twice_keeps_single_table() {
    let mut store = fresh_store();
    let sql = "CREATE TABLE users (id INTEGER PRIMARY KEY);";

    store.apply(sql).unwrap();
    store.apply(sql).unwrap();

    assert_eq!(
        count(
            &store,
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'"
        ),
        1
    );
}

#[test]
fn test_apply_app_schema_is_idempotent() {
    let mut store = setup_store();
    let before = object_names(&store);

    let report = store.apply(APP_SCHEMA).unwrap();
    assert!(report.statements_executed > 0);
    assert_eq!(object_names(&store), before);
}

#[test]
fn test_apply_app_schema_creates_every_kind() {
    let store = setup_store();
    let names = object_names(&store);

    for expected in [
        (ObjectKind::Table, "users"),
        (ObjectKind::Table, "kbju_cache"),
        (ObjectKind::Table, "photos"),
        (ObjectKind::Table, "photo_tasks"),
        (ObjectKind::Index, "idx_photo_tasks_photo"),
        (ObjectKind::Trigger, "photo_tasks_touch_updated_at"),
        (ObjectKind::View, "pending_photo_tasks"),
    ] {
        assert!(
            names.contains(&(expected.0, expected.1.to_string())),
            "missing {expected:?}"
        );
    }
    // sqlite_sequence and auto-indexes are engine internals.
    assert!(names.iter().all(|(_, name)| !name.starts_with("sqlite_")));
}

#[test]
fn test_apply_failure_leaves_no_partial_objects() {
    let mut store = fresh_store();
    let err = store
        .apply("CREATE TABLE first (id INTEGER);\nCREATE TABLE second (id INTEGER,);")
        .unwrap_err();

    match &err {
        StoreError::StatementExecutionError { statement, .. } => {
            assert_eq!(statement, "CREATE TABLE IF NOT EXISTS second (id INTEGER,)");
        }
        other => panic!("expected StatementExecutionError, got {other}"),
    }
    assert!(err.to_string().contains("second"));
    assert!(store.objects().unwrap().is_empty());
}

#[test]
fn test_apply_file_missing_source() {
    let mut store = fresh_store();
    let err = store.apply_file("/nonexistent/dir/schema.sql").unwrap_err();
    assert!(matches!(err, StoreError::SchemaLoadError { .. }));
}

#[test]
fn test_apply_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("schema.sql");
    std::fs::write(&schema_path, APP_SCHEMA).unwrap();

    let mut store = SchemaStore::open(dir.path().join("data/app.db")).unwrap();
    store.apply_file(&schema_path).unwrap();
    store.apply_file(&schema_path).unwrap();

    assert!(dir.path().join("data/app.db").exists());
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM sqlite_master WHERE name = 'users'"),
        1
    );
}

#[test]
fn test_trigger_from_applied_schema_fires() {
    let mut store = setup_store();
    store.seed(&mut StdRng::seed_from_u64(1), fixed_now()).unwrap();

    store
        .connection()
        .execute(
            "UPDATE photo_tasks SET status = 'failed' WHERE id = (SELECT MIN(id) FROM photo_tasks)",
            [],
        )
        .unwrap();
    let updated_at: String = store
        .connection()
        .query_row(
            "SELECT updated_at FROM photo_tasks WHERE status = 'failed'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_ne!(updated_at, "2024-05-01T12:00:00.000000Z");
}

// =============================================================================
// Extract
// =============================================================================

#[test]
fn test_extract_orders_by_kind_then_name() {
    let mut store = fresh_store();
    store
        .apply(
            "CREATE VIEW zz_view AS SELECT 1 AS one;
             CREATE TABLE b_table (id INTEGER);
             CREATE INDEX a_index ON b_table(id);
             CREATE TABLE a_table (id INTEGER);
             CREATE TRIGGER a_trigger AFTER INSERT ON a_table BEGIN DELETE FROM b_table; END;
             CREATE VIEW a_view AS SELECT id FROM a_table;",
        )
        .unwrap();

    let schema = store.extract().unwrap();
    assert_eq!(
        schema.statements(),
        [
            "CREATE TABLE IF NOT EXISTS a_table (id INTEGER);",
            "CREATE TABLE IF NOT EXISTS b_table (id INTEGER);",
            "CREATE INDEX IF NOT EXISTS a_index ON b_table(id);",
            "CREATE TRIGGER IF NOT EXISTS a_trigger AFTER INSERT ON a_table BEGIN DELETE FROM b_table; END;",
            "CREATE VIEW IF NOT EXISTS a_view AS SELECT id FROM a_table;",
            "CREATE VIEW IF NOT EXISTS zz_view AS SELECT 1 AS one;",
        ]
    );
}

#[test]
fn test_extract_is_deterministic() {
    let store = setup_store();
    let first = store.extract().unwrap();
    let second = store.extract().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.render(fixed_now()), second.render(fixed_now()));
}

#[test]
fn test_extract_skips_internal_and_implicit_objects() {
    let store = setup_store();
    let schema = store.extract().unwrap();
    assert!(
        schema
            .statements()
            .iter()
            .all(|s| !s.contains("sqlite_sequence") && !s.contains("sqlite_autoindex"))
    );
    assert!(
        schema
            .statements()
            .contains(&"CREATE UNIQUE INDEX IF NOT EXISTS idx_photo_tasks_photo ON photo_tasks(photo_id);".to_string())
    );
}

#[test]
fn test_round_trip_is_stable() {
    let store = setup_store();
    let first = store.extract().unwrap();
    let first_text = first.render(fixed_now());

    let mut replica = fresh_store();
    replica.apply(&first_text).unwrap();
    let second_text = replica
        .extract()
        .unwrap()
        .render(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());

    assert_eq!(without_timestamp(&first_text), without_timestamp(&second_text));
    assert_eq!(object_names(&store), object_names(&replica));

    // The extracted document also re-applies cleanly on top of itself.
    replica.apply(&second_text).unwrap();
    assert_eq!(object_names(&store), object_names(&replica));
}

#[test]
fn test_extract_to_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out/schema.sql");
    let store = setup_store();

    let schema = store.extract_to(&out, fixed_now()).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();

    assert_eq!(written, schema.render(fixed_now()));
    assert!(written.starts_with("-- schema.sql (auto-saved)\n-- saved at: 2024-05-01T12:00:00.000000Z\n"));
    assert!(written.ends_with(";\n\n"));
}

#[test]
fn test_extract_from_non_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("garbage.db");
    let out = dir.path().join("out/schema.sql");
    std::fs::write(&db, vec![b'x'; 4096]).unwrap();

    let store = SchemaStore::open(&db).unwrap();
    let err = store.extract().unwrap_err();
    assert!(matches!(err, StoreError::SchemaReadError(_)));

    let err = store.extract_to(&out, fixed_now()).unwrap_err();
    assert!(matches!(err, StoreError::SchemaReadError(_)));
    assert!(!out.exists());
}

#[test]
fn test_virtual_table_is_not_reappliable() {
    let mut store = fresh_store();
    store
        .apply("CREATE VIRTUAL TABLE docs USING fts5(body);")
        .unwrap();

    let schema = store.extract().unwrap();
    assert!(schema
        .statements()
        .iter()
        .any(|s| s.starts_with("CREATE VIRTUAL TABLE docs")));
    assert!(schema
        .statements()
        .iter()
        .any(|s| s.contains("docs_data")));

    let err = store.apply(&schema.render(fixed_now())).unwrap_err();
    assert!(matches!(err, StoreError::StatementExecutionError { .. }));
}

#[test]
fn test_extract_to_unwritable_destination() {
    let dir = tempfile::tempdir().unwrap();
    let store = setup_store();
    // A directory cannot be overwritten as a file.
    let err = store.extract_to(dir.path(), fixed_now()).unwrap_err();
    assert!(matches!(err, StoreError::SchemaWriteError { .. }));
}

// =============================================================================
// Seed / clear
// =============================================================================

#[test]
fn test_seed_inserts_fixture_rows() {
    let mut store = setup_store();
    let report = store.seed(&mut StdRng::seed_from_u64(42), fixed_now()).unwrap();

    assert_eq!(report.users, 3);
    assert_eq!(report.products, 4);
    assert_eq!(report.photos, 6);
    assert_eq!(report.tasks, 6);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM photo_tasks"), 6);
}

#[test]
fn test_seed_is_insert_if_absent() {
    let mut store = setup_store();
    store.seed(&mut StdRng::seed_from_u64(42), fixed_now()).unwrap();
    let again = store.seed(&mut StdRng::seed_from_u64(7), fixed_now()).unwrap();

    assert_eq!(again, SeedReport::default());
    assert_eq!(count(&store, "SELECT COUNT(*) FROM users"), 3);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM kbju_cache"), 4);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM photos"), 6);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM photo_tasks"), 6);
}

#[test]
fn test_seed_task_fields_follow_status() {
    let mut store = setup_store();
    store.seed(&mut StdRng::seed_from_u64(5), fixed_now()).unwrap();

    assert_eq!(
        count(
            &store,
            "SELECT COUNT(*) FROM photo_tasks
             WHERE status = 'done' AND (next_run_at IS NOT NULL OR result_json IS NOT '{\"sample\":\"ok\"}')"
        ),
        0
    );
    assert_eq!(
        count(
            &store,
            "SELECT COUNT(*) FROM photo_tasks
             WHERE status != 'done' AND (next_run_at IS NULL OR result_json IS NOT NULL
                                         OR next_run_at <= '2024-05-01T12:00:00.000000Z')"
        ),
        0
    );
    assert_eq!(
        count(
            &store,
            "SELECT COUNT(*) FROM photo_tasks WHERE status NOT IN ('queued', 'running', 'done')"
        ),
        0
    );
}

#[test]
fn test_seed_is_deterministic_for_rng_seed() {
    fn seeded_tasks(seed: u64) -> Vec<(String, String, Option<String>)> {
        let mut store = setup_store();
        store.seed(&mut StdRng::seed_from_u64(seed), fixed_now()).unwrap();
        let mut stmt = store
            .connection()
            .prepare(
                "SELECT p.tg_file_unique_id, t.status, t.next_run_at
                 FROM photo_tasks t JOIN photos p ON p.id = t.photo_id
                 ORDER BY p.tg_file_unique_id",
            )
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        rows
    }

    assert_eq!(seeded_tasks(99), seeded_tasks(99));
}

#[test]
fn test_clear_removes_seeded_user_and_dependents() {
    let mut store = setup_store();
    store.seed(&mut StdRng::seed_from_u64(42), fixed_now()).unwrap();

    let report = store.clear().unwrap();
    assert_eq!(report.users, 3);
    assert_eq!(report.products, 4);

    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM users WHERE tg_user_id = '1001'"),
        0
    );
    assert_eq!(
        count(&store, "SELECT COUNT(*) FROM photos WHERE tg_file_unique_id LIKE 'uniq_1001_%'"),
        0
    );
    assert_eq!(count(&store, "SELECT COUNT(*) FROM photos"), 0);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM photo_tasks"), 0);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM kbju_cache"), 0);
}

#[test]
fn test_clear_twice_is_safe() {
    let mut store = setup_store();
    store.seed(&mut StdRng::seed_from_u64(42), fixed_now()).unwrap();

    store.clear().unwrap();
    let second = store.clear().unwrap();
    assert_eq!(second, ClearReport::default());
}

#[test]
fn test_clear_keeps_unrelated_rows() {
    let mut store = setup_store();
    store
        .connection()
        .execute(
            "INSERT INTO users (tg_user_id, username) VALUES ('9999', 'outsider')",
            [],
        )
        .unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO kbju_cache (normalized_name, source) VALUES ('apple', 'manual')",
            [],
        )
        .unwrap();

    store.seed(&mut StdRng::seed_from_u64(42), fixed_now()).unwrap();
    store.clear().unwrap();

    assert_eq!(count(&store, "SELECT COUNT(*) FROM users"), 1);
    assert_eq!(count(&store, "SELECT COUNT(*) FROM kbju_cache"), 1);
    // Seed only attaches photos to seeded users.
    assert_eq!(count(&store, "SELECT COUNT(*) FROM photos"), 0);
}

#[test]
fn test_clear_without_schema_is_seed_error() {
    let mut store = fresh_store();
    let err = store.clear().unwrap_err();
    assert!(matches!(err, StoreError::SeedError(_)));
}
