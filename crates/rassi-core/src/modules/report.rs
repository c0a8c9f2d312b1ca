//! Plain-text summaries and export artifacts over parsed records and
//! stored rows. Plot rendering itself is a downstream consumer; the JSON
//! artifact and the store table are the hand-off contract.

use crate::domain::{RassiError, RassiResult};
use crate::modules::output::ParsedFileRecord;
use crate::store::queries::CalculationRow;
use std::fs;
use std::path::Path;

/// File names encode half the internuclear separation; reports show the
/// full distance.
pub const DISPLAY_DISTANCE_FACTOR: f64 = 2.0;

pub fn render_file_summary(source_name: &str, record: &ParsedFileRecord) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{:=^60}", " RASSI FILE ANALYSIS "));
    lines.push(format!("{:<16} {}", "Source:", source_name));
    lines.push(format!(
        "{:<16} {:.4} A",
        "Distance R:",
        record.distance * DISPLAY_DISTANCE_FACTOR
    ));
    lines.push(format!("{:<16} {}", "Declared states:", record.num_states));
    lines.push(String::new());

    lines.push(format!("{:-^60}", " JOBIPH DATA "));
    for block in &record.jobiph_blocks {
        lines.push(format!(
            "{}:   IRREP = {}   MULTIPLICITY = {}",
            block.source_label,
            optional_int(block.irrep),
            optional_int(block.multiplicity)
        ));
    }

    if record.state_root_mappings.is_empty() {
        lines.push(String::new());
        lines.push("No state mapping data found".to_string());
    } else {
        lines.push(String::new());
        lines.push(format!("{:-^60}", " STATE MAPPING "));
        lines.push(format!(
            "{:<6} | {:<8} | {:<4} | {:<16} | {:<6}",
            "State", "JobIph", "Root", "Energy (Hartree)", "Abs_M"
        ));
        lines.push("-".repeat(60));
        for (state, mappings) in &record.state_root_mappings {
            let energy = record.energies.get(state).copied();
            let abs_m = record.angular_momentum.get(state).copied();
            for mapping in mappings {
                lines.push(format!(
                    "{:<6} | {:<8} | {:<4} | {} | {}",
                    state,
                    mapping.jobiph_reference,
                    mapping.root_index,
                    optional_fixed(energy, 16, 6),
                    optional_fixed(abs_m, 6, 1)
                ));
            }
        }
    }

    lines.push(String::new());
    match record.ground_state_energy() {
        Some(minimum) => {
            lines.push(format!("Ground state energy: {:.12} Hartree", minimum));
        }
        None => lines.push("No energy data found".to_string()),
    }

    lines.join("\n")
}

/// Distance/energy table for one state's stored curve.
pub fn render_curve_table(state_num: u32, rows: &[CalculationRow]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("State {} energy curve", state_num));
    lines.push(format!("{:>10} | {:>16}", "Distance", "Energy"));
    lines.push("-".repeat(29));
    for row in rows {
        lines.push(format!(
            "{} | {}",
            format_fixed_f64(row.distance, 10, 4),
            format_fixed_f64(row.energy, 16, 8)
        ));
    }
    lines.join("\n")
}

pub fn curve_rows_json(rows: &[CalculationRow]) -> RassiResult<String> {
    serde_json::to_string_pretty(rows).map_err(|source| {
        RassiError::internal(
            "SYS.REPORT_JSON",
            format!("failed to encode curve rows: {}", source),
        )
    })
}

/// Writes newline-normalized text so repeated exports are byte-identical.
pub fn write_text_artifact(path: &Path, content: &str) -> RassiResult<()> {
    fs::write(path, normalize_text_artifact(content)).map_err(|source| {
        RassiError::io_system(
            "IO.REPORT_WRITE",
            format!("failed to write artifact '{}': {}", path.display(), source),
        )
    })
}

fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

fn optional_fixed(value: Option<f64>, width: usize, precision: usize) -> String {
    match value {
        Some(value) => format_fixed_f64(value, width, precision),
        None => format!("{:>width$}", "-", width = width),
    }
}

fn optional_int(value: Option<i32>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}
