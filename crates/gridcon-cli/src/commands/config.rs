//! `gridcon config`: print or check sizing configurations.

use anyhow::{Context, Result};
use gridcon_algo::costs::CostCoefficients;
use gridcon_algo::sizing::SizingConfig;
use gridcon_cli::ConfigCommands;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn handle(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Default { out } => handle_default(out.as_deref()),
        ConfigCommands::Check { path } => handle_check(path),
    }
}

fn handle_default(out: Option<&Path>) -> Result<()> {
    let text = SizingConfig::default()
        .to_toml_string()
        .context("serializing default configuration")?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote default configuration to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn handle_check(path: &Path) -> Result<()> {
    let config = SizingConfig::load_from(path)
        .with_context(|| format!("loading configuration {}", path.display()))?;
    config.validate().context("validating configuration")?;
    let costs = CostCoefficients::derive(&config).context("deriving cost coefficients")?;
    println!(
        "{}: ok ({} timesteps of {} h, kN {:.4} €/kW, kS_netto {:.4} €/kWh)",
        path.display(),
        config.horizon.timesteps,
        config.horizon.timestep_hours,
        costs.sepc_grid,
        costs.net_storage
    );
    Ok(())
}
