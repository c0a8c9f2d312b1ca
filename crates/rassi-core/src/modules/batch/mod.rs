use crate::domain::{RassiError, RassiResult};
use crate::modules::output::{self, ParsedFileRecord};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Fixed suffix convention for one calculation's RASSI output file.
pub const OUTPUT_SUFFIX: &str = ".rassi.output";

/// Non-recursive scan for output files, lexicographic name order. Callers
/// wanting distance order sort the parsed records themselves.
pub fn collect_output_files(directory: &Path) -> RassiResult<Vec<PathBuf>> {
    let matcher = output_suffix_matcher()?;
    let entries = fs::read_dir(directory).map_err(|source| {
        RassiError::io_system(
            "IO.BATCH_DIRECTORY",
            format!(
                "failed to scan results directory '{}': {}",
                directory.display(),
                source
            ),
        )
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| {
            RassiError::io_system(
                "IO.BATCH_DIRECTORY",
                format!(
                    "failed to read entry of results directory '{}': {}",
                    directory.display(),
                    source
                ),
            )
        })?;
        let path = entry.path();
        if path.is_file() && matcher.is_match(entry.file_name()) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Parses every matching file in the directory. A file that fails to
/// decode, read, or parse is logged with its identity and excluded; the
/// rest of the batch continues.
pub fn parse_directory(directory: &Path) -> RassiResult<Vec<ParsedFileRecord>> {
    let files = collect_output_files(directory)?;
    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        match output::parse_output_file(path) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping unparsable RASSI output");
            }
        }
    }
    Ok(records)
}

fn output_suffix_matcher() -> RassiResult<GlobMatcher> {
    Glob::new(&format!("*{OUTPUT_SUFFIX}"))
        .map(|glob| glob.compile_matcher())
        .map_err(|source| {
            RassiError::internal(
                "SYS.BATCH_GLOB",
                format!("invalid output suffix pattern: {}", source),
            )
        })
}
