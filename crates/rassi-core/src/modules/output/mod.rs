mod filename;
mod model;
mod parser;

pub use filename::{distance_from_name, distance_from_path};
pub use model::{JOBIPH_BASE_LABEL, JobiphBlock, ParsedFileRecord, RootMapping};

use crate::domain::{RassiError, RassiResult};
use parser::{AbsMScanner, EnergyScanner, JobiphScanner, MappingScanner};
use std::fs;
use std::path::Path;

/// One-line state-count declaration; the last token is the count.
const NUM_STATES_MARKER: &str = "Nr of states:";

/// Decodes the distance from the file name, reads the whole file into
/// memory, and runs the single-pass parse.
pub fn parse_output_file(path: &Path) -> RassiResult<ParsedFileRecord> {
    let distance = distance_from_path(path)?;
    let source = fs::read_to_string(path).map_err(|source| {
        RassiError::io_system(
            "IO.OUTPUT_READ",
            format!("failed to read RASSI output '{}': {}", path.display(), source),
        )
    })?;
    Ok(parse_output_source(distance, &source))
}

/// Single forward pass over the file's lines, no backtracking. Every line
/// is offered to each scanner independently; the scanners own all parsing
/// state and are rebuilt per file. Malformed optional sections leave their
/// fields absent instead of failing the file.
pub fn parse_output_source(distance: f64, source: &str) -> ParsedFileRecord {
    let mut record = ParsedFileRecord::new(distance);
    let mut jobiph = JobiphScanner::default();
    let mut mapping = MappingScanner::default();
    let mut energy = EnergyScanner::default();
    let mut abs_m = AbsMScanner::default();

    for line in source.lines() {
        if line.contains(NUM_STATES_MARKER) {
            if let Some(count) = parser::last_token_u32(line) {
                record.num_states = count;
            }
        }
        jobiph.offer(line);
        mapping.offer(line);
        energy.offer(line);
        abs_m.offer(line);
    }

    record.jobiph_blocks = jobiph.finish();
    record.state_root_mappings = mapping.finish();
    record.energies = energy.finish();
    record.angular_momentum = abs_m.finish();
    record
}
