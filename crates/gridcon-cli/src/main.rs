use anyhow::Result;
use clap::Parser;
use gridcon_cli::{Cli, Commands};
use std::io;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{err:?}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Size(args) => commands::size::handle(args),
        Commands::Epc {
            capex,
            years,
            lifetime,
            wacc,
            decline,
            operating_cost,
        } => commands::epc::handle(*capex, *years, *lifetime, *wacc, *decline, *operating_cost),
        Commands::Config { command } => commands::config::handle(command),
    }
}
