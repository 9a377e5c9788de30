use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use supplies_cli::cli::Cli;
use supplies_cli::commands;
use supplies_inventory::{InventoryRepository, JsonFileStore};
use supplies_observability::{LogConfig, LogFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    supplies_observability::init(&LogConfig::new(LogFormat::from_env(), cli.verbose));

    let Some(command) = cli.command else {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
        println!();
        return ExitCode::SUCCESS;
    };

    let store = JsonFileStore::new(&cli.data_file);
    let data_file = store.path().display().to_string();
    let (mut repository, report) = InventoryRepository::open(store);
    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }
    tracing::debug!(
        %data_file,
        items = repository.len(),
        "inventory ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match commands::run_command(command, &mut repository, cli.format, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
