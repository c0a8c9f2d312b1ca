//! Read-side contract over the `calculations` table, consumed by curve
//! reporting and export.

use super::persistence_error;
use crate::domain::StoreResult;
use rusqlite::{Connection, Row, params};
use serde::Serialize;

/// One persisted calculation row. `order_index` and `irrep_index` stay
/// NULL until the matching ranking pass has run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRow {
    pub distance: f64,
    pub state_num: u32,
    pub energy: f64,
    pub abs_m: Option<f64>,
    pub jobiph: Option<String>,
    pub root: Option<u32>,
    pub irrep: Option<i32>,
    pub multiplicity: Option<i32>,
    pub order_index: Option<i64>,
    pub irrep_index: Option<i64>,
}

/// Non-NULL symmetry block key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymmetryKey {
    pub irrep: i32,
    pub multiplicity: i32,
    pub abs_m: f64,
}

const ROW_COLUMNS: &str = "distance, state_num, energy, abs_m, jobiph, root, \
                           irrep, multiplicity, order_index, irrep_index";

/// All rows for one state across distances, ascending by distance.
pub fn rows_for_state(conn: &Connection, state_num: u32) -> StoreResult<Vec<CalculationRow>> {
    let sql = format!(
        "SELECT {ROW_COLUMNS} FROM calculations \
         WHERE state_num = ?1 ORDER BY distance ASC, id ASC"
    );
    collect_rows(conn, &sql, params![state_num])
}

/// All rows at one distance, ascending by state number.
pub fn rows_at_distance(conn: &Connection, distance: f64) -> StoreResult<Vec<CalculationRow>> {
    let sql = format!(
        "SELECT {ROW_COLUMNS} FROM calculations \
         WHERE distance = ?1 ORDER BY state_num ASC, id ASC"
    );
    collect_rows(conn, &sql, params![distance])
}

pub fn distinct_distances(conn: &Connection) -> StoreResult<Vec<f64>> {
    let mut stmt = conn
        .prepare_cached("SELECT DISTINCT distance FROM calculations ORDER BY distance ASC")
        .map_err(|source| persistence_error("DB.QUERY", source))?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(|source| persistence_error("DB.QUERY", source))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|source| persistence_error("DB.QUERY", source))
}

/// Distinct non-NULL symmetry block keys observed anywhere in the store.
pub fn symmetry_blocks(conn: &Connection) -> StoreResult<Vec<SymmetryKey>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT DISTINCT irrep, multiplicity, abs_m FROM calculations \
             WHERE irrep IS NOT NULL AND multiplicity IS NOT NULL AND abs_m IS NOT NULL \
             ORDER BY irrep ASC, multiplicity ASC, abs_m ASC",
        )
        .map_err(|source| persistence_error("DB.QUERY", source))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SymmetryKey {
                irrep: row.get(0)?,
                multiplicity: row.get(1)?,
                abs_m: row.get(2)?,
            })
        })
        .map_err(|source| persistence_error("DB.QUERY", source))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|source| persistence_error("DB.QUERY", source))
}

/// Member rows of one symmetry block across distances.
pub fn rows_for_symmetry_block(
    conn: &Connection,
    key: SymmetryKey,
) -> StoreResult<Vec<CalculationRow>> {
    let sql = format!(
        "SELECT {ROW_COLUMNS} FROM calculations \
         WHERE irrep = ?1 AND multiplicity = ?2 AND abs_m = ?3 \
         ORDER BY distance ASC, energy ASC, state_num ASC"
    );
    collect_rows(conn, &sql, params![key.irrep, key.multiplicity, key.abs_m])
}

pub fn count_rows(conn: &Connection) -> StoreResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM calculations", [], |row| row.get(0))
        .map_err(|source| persistence_error("DB.QUERY", source))
}

fn collect_rows(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> StoreResult<Vec<CalculationRow>> {
    let mut stmt = conn
        .prepare_cached(sql)
        .map_err(|source| persistence_error("DB.QUERY", source))?;
    let rows = stmt
        .query_map(params, map_row)
        .map_err(|source| persistence_error("DB.QUERY", source))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|source| persistence_error("DB.QUERY", source))
}

fn map_row(row: &Row) -> rusqlite::Result<CalculationRow> {
    Ok(CalculationRow {
        distance: row.get(0)?,
        state_num: row.get(1)?,
        energy: row.get(2)?,
        abs_m: row.get(3)?,
        jobiph: row.get(4)?,
        root: row.get(5)?,
        irrep: row.get(6)?,
        multiplicity: row.get(7)?,
        order_index: row.get(8)?,
        irrep_index: row.get(9)?,
    })
}
