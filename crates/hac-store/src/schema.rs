use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.pragma_update(None, "wal_autocheckpoint", 100)?;

    // Fold any stale WAL into the main file. In-memory and fresh
    // databases legitimately fail this.
    if conn
        .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
        .is_ok()
    {
        tracing::info!("startup WAL checkpoint complete");
    }

    // Coordinates are stored as little-endian f64 blobs.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vectors (
            ordinal INTEGER PRIMARY KEY,
            coords  BLOB NOT NULL,
            omega   REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS compositions (
            position  INTEGER PRIMARY KEY,
            v1_coords BLOB NOT NULL,
            v1_omega  REAL NOT NULL,
            v2_coords BLOB NOT NULL,
            v2_omega  REAL NOT NULL,
            v3_coords BLOB,
            v3_omega  REAL,
            timestamp REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS trajectory (
            position INTEGER PRIMARY KEY,
            coords   BLOB NOT NULL,
            omega    REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS basins (
            id     INTEGER PRIMARY KEY,
            coords BLOB NOT NULL,
            omega  REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS basin_members (
            basin_id INTEGER NOT NULL REFERENCES basins(id),
            position INTEGER NOT NULL,
            coords   BLOB NOT NULL,
            omega    REAL NOT NULL,
            PRIMARY KEY (basin_id, position)
        );

        CREATE TABLE IF NOT EXISTS state (
            position INTEGER PRIMARY KEY,
            value    REAL NOT NULL
        );
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}
