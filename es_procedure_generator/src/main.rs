pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod procedures;
pub(crate) mod sector_file;

use std::{fs, path::PathBuf};

use clap::Parser;
use config::GeneratorConfig;
use error::ApplicationResult;
use sector_procedures::store::ProcedureStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_unwrap::ResultExt;

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    #[clap(long, short)]
    /// Resets the config file (but keeps the folder settings)
    clean_config: bool,
    #[clap(long)]
    /// Folder with the exported CSV tables
    data_folder: Option<PathBuf>,
    #[clap(long)]
    /// Folder with Navaids.txt and waypoints.txt
    navdata_folder: Option<PathBuf>,
    #[clap(long)]
    /// Folder the generated files are written to
    output_folder: Option<PathBuf>,
    #[clap(long, short)]
    /// Only write the combined procedures, skip the sector sections
    procedures_only: bool,
}

fn run() -> ApplicationResult<()> {
    let cli = Cli::parse();
    let config = GeneratorConfig::load(&cli)?;
    info!(config = %config.config_file_path().display(), "Loaded configuration");
    fs::create_dir_all(config.output_folder())?;

    let store = ProcedureStore::load(config.procedure_table_path(), config.runway_table_path())?;
    let summary = procedures::generate_procedures(&config, &store)?;
    if !summary.failed_rules.is_empty() {
        warn!(
            failed = summary.failed_rules.len(),
            "Some combiner rules were skipped"
        );
    }

    if cli.procedures_only {
        info!("Skipping sector sections");
    } else {
        sector_file::write_sector_sections(&config, &store)?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    run().unwrap_or_log();
}
