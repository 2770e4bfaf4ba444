use clap::Parser;
use kube_requests::cli::Cli;
use kube_requests::{config, run_command};
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> kube_requests::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let project_dir = cli.command.project_dir();
    let config = config::load_config(cli.config.as_deref(), project_dir.as_deref())?;

    run_command(cli.command, &config)
}
