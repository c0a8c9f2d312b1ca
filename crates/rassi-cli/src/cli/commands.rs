use super::CliError;
use rassi_core::domain::RassiError;
use rassi_core::modules::{batch, output, report};
use rassi_core::store::{CalculationStore, queries};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_STORE_PATH: &str = "molcas_results.db";

#[derive(clap::Args)]
pub(super) struct ShowArgs {
    /// RASSI output file to analyze
    file: PathBuf,
}

pub(super) fn run_show_command(args: ShowArgs) -> Result<i32, CliError> {
    let record = output::parse_output_file(&args.file)?;
    let source_name = args.file.display().to_string();
    println!("{}", report::render_file_summary(&source_name, &record));
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct IngestArgs {
    /// Directory scanned (non-recursively) for `.rassi.output` files
    directory: PathBuf,

    /// SQLite store path
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    db: PathBuf,
}

pub(super) fn run_ingest_command(args: IngestArgs) -> Result<i32, CliError> {
    let records = batch::parse_directory(&args.directory)?;
    let mut store = CalculationStore::open(&args.db)?;

    let mut rows = 0usize;
    for record in &records {
        rows += store.insert_record(record)?;
    }

    info!(
        files = records.len(),
        rows,
        db = %args.db.display(),
        "ingest complete"
    );
    println!(
        "Ingested {} files ({} rows) into {}",
        records.len(),
        rows,
        args.db.display()
    );
    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct RankArgs {
    /// SQLite store path
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    db: PathBuf,
}

pub(super) fn run_rank_command(args: RankArgs) -> Result<i32, CliError> {
    let mut store = CalculationStore::open(&args.db)?;
    match store.rank_all()? {
        Some(summary) => {
            println!("Reference distance: {:.4}", summary.reference_distance);
            println!("Energy-ranked states: {}", summary.energy_ranked);
            println!("Symmetry-ranked rows: {}", summary.symmetry_ranked);
            Ok(0)
        }
        None => Err(CliError::Compute(RassiError::persistence(
            "DB.RANK_EMPTY",
            format!(
                "store '{}' has no calculation rows to rank",
                args.db.display()
            ),
        ))),
    }
}

#[derive(clap::Args)]
pub(super) struct ExportArgs {
    /// State numbers to export; repeatable
    #[arg(long = "state", required = true)]
    states: Vec<u32>,

    /// SQLite store path
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    db: PathBuf,

    /// Output JSON path (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

pub(super) fn run_export_command(args: ExportArgs) -> Result<i32, CliError> {
    let store = CalculationStore::open(&args.db)?;

    let mut rows = Vec::new();
    for state in &args.states {
        rows.extend(queries::rows_for_state(store.connection(), *state)?);
    }

    let artifact = report::curve_rows_json(&rows)?;
    match &args.out {
        Some(path) => {
            report::write_text_artifact(path, &artifact)?;
            println!(
                "Wrote {} rows for {} states to {}",
                rows.len(),
                args.states.len(),
                path.display()
            );
        }
        None => println!("{}", artifact),
    }
    Ok(0)
}
