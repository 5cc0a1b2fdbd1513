use std::path::Path;

use rusqlite::{Connection, params};

use hac_core::{
    Basin, CURRENT_VERSION, CompositionLogEntry, ConsciousnessState, EngineConfig,
    HarmonicSystem, HarmonicVector, WireExport,
};

use crate::error::{Result, StoreError};
use crate::schema;

/// SQLite-backed snapshot of a `HarmonicSystem`.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Save ---

    /// Rewrite the stored snapshot in a single transaction.
    pub fn save_system(&self, system: &HarmonicSystem) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute_batch(
            "DELETE FROM basin_members; DELETE FROM basins; DELETE FROM vectors;
             DELETE FROM compositions; DELETE FROM trajectory; DELETE FROM state;",
        )?;

        {
            let mut stmt =
                tx.prepare("INSERT INTO vectors (ordinal, coords, omega) VALUES (?1, ?2, ?3)")?;
            for (i, v) in system.space.all().iter().enumerate() {
                stmt.execute(params![i as i64, encode_coords(v.coordinates()), v.tag()])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO compositions
                 (position, v1_coords, v1_omega, v2_coords, v2_omega, v3_coords, v3_omega, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (i, entry) in system.stream.history().iter().enumerate() {
                stmt.execute(params![
                    i as i64,
                    encode_coords(entry.left.coordinates()),
                    entry.left.tag(),
                    encode_coords(entry.right.coordinates()),
                    entry.right.tag(),
                    entry.result.as_ref().map(|r| encode_coords(r.coordinates())),
                    entry.result.as_ref().map(HarmonicVector::tag),
                    entry.timestamp,
                ])?;
            }
        }

        {
            let mut stmt =
                tx.prepare("INSERT INTO trajectory (position, coords, omega) VALUES (?1, ?2, ?3)")?;
            for (i, v) in system.tracker.trajectory().iter().enumerate() {
                stmt.execute(params![i as i64, encode_coords(v.coordinates()), v.tag()])?;
            }
        }

        {
            let mut basin_stmt =
                tx.prepare("INSERT INTO basins (id, coords, omega) VALUES (?1, ?2, ?3)")?;
            let mut member_stmt = tx.prepare(
                "INSERT INTO basin_members (basin_id, position, coords, omega) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (id, basin) in system.tracker.basins().iter().enumerate() {
                basin_stmt.execute(params![
                    id as i64,
                    encode_coords(basin.attractor.coordinates()),
                    basin.attractor.tag()
                ])?;
                for (pos, m) in basin.members.iter().enumerate() {
                    member_stmt.execute(params![
                        id as i64,
                        pos as i64,
                        encode_coords(m.coordinates()),
                        m.tag()
                    ])?;
                }
            }
        }

        {
            let mut stmt = tx.prepare("INSERT INTO state (position, value) VALUES (?1, ?2)")?;
            for (i, x) in system.state.state().iter().enumerate() {
                stmt.execute(params![i as i64, x])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('state_steps', ?1)",
            [system.state.steps().to_string()],
        )?;

        tx.commit()?;
        tracing::debug!("saved system: {} vectors", system.space.len());
        Ok(())
    }

    // --- Load ---

    /// Rebuild the stored system under `config`.
    pub fn load_system(&self, config: EngineConfig) -> Result<HarmonicSystem> {
        let space = self.load_vectors("SELECT coords, omega FROM vectors ORDER BY ordinal")?;
        let trajectory =
            self.load_vectors("SELECT coords, omega FROM trajectory ORDER BY position")?;
        let history = self.load_history()?;
        let basins = self.load_basins()?;
        let state = self.load_state()?;

        let wire = WireExport {
            version: CURRENT_VERSION.to_string(),
            space,
            history,
            trajectory,
            basins,
            state,
        };
        Ok(wire.into_system(config)?)
    }

    fn load_vectors(&self, sql: &str) -> Result<Vec<HarmonicVector>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows: Vec<(Vec<u8>, f64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter()
            .map(|(blob, omega)| decode_vector(&blob, omega))
            .collect()
    }

    fn load_history(&self) -> Result<Vec<CompositionLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT v1_coords, v1_omega, v2_coords, v2_omega, v3_coords, v3_omega, timestamp
             FROM compositions ORDER BY position",
        )?;
        type Row = (Vec<u8>, f64, Vec<u8>, f64, Option<Vec<u8>>, Option<f64>, f64);
        let rows: Vec<Row> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        rows.into_iter()
            .map(|(c1, o1, c2, o2, c3, o3, timestamp)| {
                let result = match (c3, o3) {
                    (Some(c3), Some(o3)) => Some(decode_vector(&c3, o3)?),
                    _ => None,
                };
                Ok(CompositionLogEntry {
                    left: decode_vector(&c1, o1)?,
                    right: decode_vector(&c2, o2)?,
                    result,
                    timestamp,
                })
            })
            .collect()
    }

    fn load_basins(&self) -> Result<Vec<Basin>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, coords, omega FROM basins ORDER BY id")?;
        let rows: Vec<(i64, Vec<u8>, f64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<std::result::Result<_, _>>()?;

        let mut member_stmt = self.conn.prepare(
            "SELECT coords, omega FROM basin_members WHERE basin_id = ?1 ORDER BY position",
        )?;
        let mut basins = Vec::with_capacity(rows.len());
        for (id, blob, omega) in rows {
            let members: Vec<(Vec<u8>, f64)> = member_stmt
                .query_map([id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<_, _>>()?;
            basins.push(Basin {
                attractor: decode_vector(&blob, omega)?,
                members: members
                    .into_iter()
                    .map(|(b, o)| decode_vector(&b, o))
                    .collect::<Result<_>>()?,
            });
        }
        Ok(basins)
    }

    fn load_state(&self) -> Result<Option<ConsciousnessState>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM state ORDER BY position")?;
        let vector: Vec<f64> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        if vector.is_empty() {
            return Ok(None);
        }
        let steps = self
            .get_metadata("state_steps")?
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        Ok(Some(ConsciousnessState { vector, steps }))
    }

    // --- Maintenance ---

    pub fn vector_count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Fold the WAL into the main database file and truncate it.
    pub fn checkpoint_truncate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

fn encode_coords(coords: &[f64]) -> Vec<u8> {
    coords.iter().flat_map(|c| c.to_le_bytes()).collect()
}

fn decode_coords(blob: &[u8]) -> Result<Vec<f64>> {
    if blob.len() % 8 != 0 {
        return Err(StoreError::InvalidData(format!(
            "coordinate blob of {} bytes is not a whole number of f64s",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(8)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .collect())
}

fn decode_vector(blob: &[u8], omega: f64) -> Result<HarmonicVector> {
    Ok(HarmonicVector::new(decode_coords(blob)?, omega)?)
}
