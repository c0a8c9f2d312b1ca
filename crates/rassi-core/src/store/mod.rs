pub mod queries;

use crate::domain::{RassiError, StoreResult};
use crate::modules::output::ParsedFileRecord;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::{debug, warn};

const CREATE_CALCULATIONS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS calculations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    distance REAL NOT NULL,
    state_num INTEGER NOT NULL,
    energy REAL NOT NULL,
    abs_m REAL,
    jobiph TEXT,
    root INTEGER,
    irrep INTEGER,
    multiplicity INTEGER,
    order_index INTEGER,
    irrep_index INTEGER
)";

/// Outcome of a full ranking pass over the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingSummary {
    pub reference_distance: f64,
    pub energy_ranked: usize,
    pub symmetry_ranked: usize,
}

/// Single-writer SQLite store for flattened calculation rows.
pub struct CalculationStore {
    conn: Connection,
}

impl CalculationStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|source| {
            RassiError::persistence(
                "DB.OPEN",
                format!("failed to open store '{}': {}", path.display(), source),
            )
        })?;
        Self::bootstrap(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|source| {
            RassiError::persistence(
                "DB.OPEN",
                format!("failed to open in-memory store: {}", source),
            )
        })?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> StoreResult<Self> {
        conn.execute(CREATE_CALCULATIONS_TABLE, [])
            .map_err(|source| persistence_error("DB.SCHEMA", source))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flattens one parsed record into rows, one per (state, mapping)
    /// pair. A mapping whose job-file reference has no block in this
    /// record still yields a row with NULL irrep/multiplicity. A mapped
    /// state without a parsed energy is skipped; energy is NOT NULL.
    pub fn insert_record(&mut self, record: &ParsedFileRecord) -> StoreResult<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|source| persistence_error("DB.INSERT", source))?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO calculations \
                     (distance, state_num, energy, abs_m, jobiph, root, irrep, multiplicity) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(|source| persistence_error("DB.INSERT", source))?;

            for (state, mappings) in &record.state_root_mappings {
                let Some(energy) = record.energies.get(state) else {
                    warn!(
                        state,
                        distance = record.distance,
                        "state has mappings but no parsed energy; skipping"
                    );
                    continue;
                };
                let abs_m = record.angular_momentum.get(state);

                for mapping in mappings {
                    let block = record.block_for_label(&mapping.jobiph_reference);
                    stmt.execute(params![
                        record.distance,
                        state,
                        energy,
                        abs_m,
                        mapping.jobiph_reference,
                        mapping.root_index,
                        block.and_then(|block| block.irrep),
                        block.and_then(|block| block.multiplicity),
                    ])
                    .map_err(|source| persistence_error("DB.INSERT", source))?;
                    inserted += 1;
                }
            }
        }
        tx.commit()
            .map_err(|source| persistence_error("DB.INSERT", source))?;
        debug!(inserted, distance = record.distance, "stored calculation rows");
        Ok(inserted)
    }

    /// The distance whose minimum-over-states energy is globally smallest.
    /// Ties resolve to the smaller distance, keeping reruns stable.
    pub fn find_reference_distance(&self) -> StoreResult<Option<f64>> {
        self.conn
            .query_row(
                "SELECT distance FROM calculations \
                 GROUP BY distance \
                 ORDER BY MIN(energy) ASC, distance ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| persistence_error("DB.REFERENCE_DISTANCE", source))
    }

    /// Ranks states at the reference distance by ascending energy and
    /// writes `order_index` back to every row of each ranked state at
    /// every distance. Energy ties resolve by state number, so reruns
    /// reproduce the same assignment. Returns the number of ranked states.
    pub fn compute_energy_ranking(&mut self, reference_distance: f64) -> StoreResult<usize> {
        let mut ranked: Vec<(u32, f64)> = {
            let mut stmt = self
                .conn
                .prepare(
                    "SELECT state_num, MIN(energy) FROM calculations \
                     WHERE distance = ?1 GROUP BY state_num",
                )
                .map_err(|source| persistence_error("DB.ENERGY_RANK", source))?;
            let rows = stmt
                .query_map(params![reference_distance], |row| {
                    Ok((row.get::<_, u32>(0)?, row.get::<_, f64>(1)?))
                })
                .map_err(|source| persistence_error("DB.ENERGY_RANK", source))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|source| persistence_error("DB.ENERGY_RANK", source))?
        };
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let tx = self
            .conn
            .transaction()
            .map_err(|source| persistence_error("DB.ENERGY_RANK", source))?;
        {
            let mut update = tx
                .prepare_cached("UPDATE calculations SET order_index = ?1 WHERE state_num = ?2")
                .map_err(|source| persistence_error("DB.ENERGY_RANK", source))?;
            for (rank, (state, _)) in ranked.iter().enumerate() {
                update
                    .execute(params![(rank + 1) as i64, state])
                    .map_err(|source| persistence_error("DB.ENERGY_RANK", source))?;
            }
        }
        tx.commit()
            .map_err(|source| persistence_error("DB.ENERGY_RANK", source))?;
        Ok(ranked.len())
    }

    /// Ranks the member states of every observed (distance, irrep,
    /// multiplicity, abs_m) combination by ascending energy and writes
    /// `irrep_index` back, matched by (state, distance). Rows with a NULL
    /// symmetry key are left untouched. Returns the number of updates.
    pub fn compute_symmetry_ranking(&mut self) -> StoreResult<usize> {
        struct SymmetryMember {
            distance: f64,
            irrep: i64,
            multiplicity: i64,
            abs_m: f64,
            state_num: u32,
            energy: f64,
        }

        let mut members: Vec<SymmetryMember> = {
            let mut stmt = self
                .conn
                .prepare(
                    "SELECT distance, irrep, multiplicity, abs_m, state_num, MIN(energy) \
                     FROM calculations \
                     WHERE irrep IS NOT NULL AND multiplicity IS NOT NULL AND abs_m IS NOT NULL \
                     GROUP BY distance, irrep, multiplicity, abs_m, state_num",
                )
                .map_err(|source| persistence_error("DB.SYMMETRY_RANK", source))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(SymmetryMember {
                        distance: row.get(0)?,
                        irrep: row.get(1)?,
                        multiplicity: row.get(2)?,
                        abs_m: row.get(3)?,
                        state_num: row.get(4)?,
                        energy: row.get(5)?,
                    })
                })
                .map_err(|source| persistence_error("DB.SYMMETRY_RANK", source))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|source| persistence_error("DB.SYMMETRY_RANK", source))?
        };

        members.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.irrep.cmp(&b.irrep))
                .then_with(|| a.multiplicity.cmp(&b.multiplicity))
                .then_with(|| a.abs_m.total_cmp(&b.abs_m))
                .then_with(|| a.energy.total_cmp(&b.energy))
                .then_with(|| a.state_num.cmp(&b.state_num))
        });

        let tx = self
            .conn
            .transaction()
            .map_err(|source| persistence_error("DB.SYMMETRY_RANK", source))?;
        let mut updated = 0usize;
        {
            let mut update = tx
                .prepare_cached(
                    "UPDATE calculations SET irrep_index = ?1 \
                     WHERE state_num = ?2 AND distance = ?3",
                )
                .map_err(|source| persistence_error("DB.SYMMETRY_RANK", source))?;

            // floats compare bitwise here; the values come straight from
            // the stored rows
            let mut previous_key: Option<(u64, i64, i64, u64)> = None;
            let mut rank = 0i64;
            for member in &members {
                let key = (
                    member.distance.to_bits(),
                    member.irrep,
                    member.multiplicity,
                    member.abs_m.to_bits(),
                );
                if previous_key != Some(key) {
                    previous_key = Some(key);
                    rank = 0;
                }
                rank += 1;
                update
                    .execute(params![rank, member.state_num, member.distance])
                    .map_err(|source| persistence_error("DB.SYMMETRY_RANK", source))?;
                updated += 1;
            }
        }
        tx.commit()
            .map_err(|source| persistence_error("DB.SYMMETRY_RANK", source))?;
        Ok(updated)
    }

    /// Reference-distance discovery plus both write-back passes. Returns
    /// `None` when the store holds no rows.
    pub fn rank_all(&mut self) -> StoreResult<Option<RankingSummary>> {
        let Some(reference_distance) = self.find_reference_distance()? else {
            return Ok(None);
        };
        let energy_ranked = self.compute_energy_ranking(reference_distance)?;
        let symmetry_ranked = self.compute_symmetry_ranking()?;
        Ok(Some(RankingSummary {
            reference_distance,
            energy_ranked,
            symmetry_ranked,
        }))
    }
}

pub(crate) fn persistence_error(code: &'static str, source: rusqlite::Error) -> RassiError {
    RassiError::persistence(code, format!("sqlite failure: {}", source))
}
