use calendarBot::db::migrations::latest_version;
use calendarBot::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn fresh_database_reaches_the_latest_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert!(column_exists(&conn, "events", "people"));
    assert!(column_exists(&conn, "events", "prompt"));
}

#[test]
fn reopening_the_same_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calendar.db");

    let first = open_db(&path).unwrap();
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
    assert!(column_exists(&second, "events", "prompt"));
}

#[test]
fn version_one_database_gains_the_prompt_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.db");

    // A database as migration 1 left it, before the audit column existed.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE events (
             id TEXT PRIMARY KEY,
             start_time TEXT NOT NULL,
             end_time TEXT NOT NULL,
             text TEXT NOT NULL,
             people TEXT NOT NULL DEFAULT ''
         );
         INSERT INTO events (id, start_time, end_time, text, people)
         VALUES ('a', '2024-01-20', '2024-01-20', 'old event', '');
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let upgraded = open_db(&path).unwrap();
    assert_eq!(schema_version(&upgraded), latest_version());
    assert!(column_exists(&upgraded, "events", "prompt"));

    // Existing rows survive with a null prompt.
    let prompt: Option<String> = upgraded
        .query_row("SELECT prompt FROM events WHERE id = 'a'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(prompt, None);
}

#[test]
fn newer_schema_than_the_binary_supports_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let names: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .map(|name| name.unwrap())
        .collect();
    names.iter().any(|name| name == column)
}
