mod commands;

use clap::Parser;
use rassi_core::domain::RassiError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_rassi_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            if let Some(summary_line) = diagnostic.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            diagnostic.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "rassi-rs", about = "RASSI state-interaction results toolkit")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Analyze one RASSI output file and print its summary
    Show(commands::ShowArgs),
    /// Parse a results directory and store every calculation row
    Ingest(commands::IngestArgs),
    /// Derive the reference distance and write back both rankings
    Rank(commands::RankArgs),
    /// Export stored energy curves for selected states as JSON
    Export(commands::ExportArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Show(args) => commands::run_show_command(args),
        CliCommand::Ingest(args) => commands::run_ingest_command(args),
        CliCommand::Rank(args) => commands::run_rank_command(args),
        CliCommand::Export(args) => commands::run_export_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(RassiError),
}

impl From<RassiError> for CliError {
    fn from(error: RassiError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_rassi_error(&self) -> RassiError {
        match self {
            Self::Usage(message) => RassiError::format("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
        }
    }
}
