use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid connection and storage sizing", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Size the grid connection and storage for a set of profiles
    Size(SizeArgs),
    /// Equivalent periodic cost of a repeated investment
    Epc {
        /// Specific investment cost per unit of capacity
        #[arg(long)]
        capex: f64,
        /// Financial horizon in years
        #[arg(long)]
        years: f64,
        /// Technical lifetime of one investment in years
        #[arg(long)]
        lifetime: f64,
        /// Weighted average cost of capital (fraction)
        #[arg(long)]
        wacc: f64,
        /// Annual decline of the investment cost (fraction)
        #[arg(long, default_value_t = 0.0)]
        decline: f64,
        /// Fixed annual operating cost per unit of capacity
        #[arg(long, default_value_t = 0.0)]
        operating_cost: f64,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug)]
pub struct SizeArgs {
    /// Profile file (CSV) with pv, demand and machine load columns
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub profiles: PathBuf,
    /// Configuration file (TOML); defaults apply when omitted
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Override the number of timesteps
    #[arg(long)]
    pub timesteps: Option<usize>,
    /// Use the leading rows of a profile file longer than the horizon
    #[arg(long)]
    pub truncate_profiles: bool,
    /// Override the LP solver (clarabel, highs)
    #[arg(long)]
    pub solver: Option<String>,
    /// Write the lv bus balance to this CSV file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub bus_balance: Option<PathBuf>,
    /// Write sizes, coefficients and cost breakdown as JSON
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
    /// Print energy and peak power of every flow
    #[arg(long)]
    pub flows: bool,
    /// Fail when itemized costs and objective disagree
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the default configuration as TOML
    Default {
        /// Write to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Parse and validate a configuration file
    Check {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
