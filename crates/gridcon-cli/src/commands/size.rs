//! `gridcon size`: load profiles, solve the sizing LP and report.

use anyhow::{Context, Result};
use gridcon_algo::costs::CostCoefficients;
use gridcon_algo::sizing::{run, CostBreakdown, Profiles, SizingConfig, SizingOutcome};
use gridcon_algo::Diagnostics;
use gridcon_cli::SizeArgs;
use gridcon_ts::{
    bus_balance_columns, load_columns_with, write_bus_balance, RowPolicy, TimeIndex,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::{debug, info, warn};

/// JSON result written by `--out`
#[derive(Debug, Serialize)]
struct SizingOutput<'a> {
    generated_at: String,
    solver: &'a str,
    timesteps: usize,
    timestep_hours: f64,
    objective: f64,
    solve_time_ms: u64,
    grid_capacity_kw: f64,
    storage_capacity_kwh: f64,
    coefficients: CostCoefficients,
    breakdown: &'a CostBreakdown,
    diagnostics: &'a Diagnostics,
}

pub fn handle(args: &SizeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SizingConfig::load_from(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => SizingConfig::default(),
    };
    if let Some(timesteps) = args.timesteps {
        config.horizon.timesteps = timesteps;
    }
    if let Some(solver) = &args.solver {
        config.solver.name = solver.clone();
    }

    let timesteps = config.horizon.timesteps;
    let columns = &config.profiles;
    let rows = if args.truncate_profiles {
        RowPolicy::Leading
    } else {
        RowPolicy::Exact
    };
    let loaded = load_columns_with(
        &args.profiles,
        &[
            columns.pv.as_str(),
            columns.demand.as_str(),
            columns.machine_load.as_str(),
        ],
        timesteps,
        rows,
    )
    .with_context(|| format!("loading profiles from {}", args.profiles.display()))?;
    let [pv, demand, machine_load]: [_; 3] = loaded
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected three profile columns"))?;
    let profiles = Profiles::new(pv, demand, machine_load);

    info!(
        "Sizing {} timesteps of {} h with {}",
        timesteps, config.horizon.timestep_hours, config.solver.name
    );
    let outcome = run(&config, &profiles).context("sizing grid connection and storage")?;

    if let Err(err) = outcome
        .breakdown
        .check_accordance(config.solver.accordance_tolerance)
    {
        if args.strict {
            return Err(err).context("checking cost accordance");
        }
        warn!("{err}");
    }
    if outcome.diagnostics.has_issues() {
        warn!("sizing diagnostics: {}", outcome.diagnostics.summary());
        debug!("{}", outcome.diagnostics);
    }

    print!("{}", outcome.breakdown.render());
    if args.flows {
        print_flow_table(&outcome)?;
    }

    if let Some(path) = &args.bus_balance {
        let index = TimeIndex::parse(
            &config.horizon.start,
            config.horizon.timestep_hours,
            timesteps,
        )?;
        let network = &outcome.model.network;
        let columns =
            bus_balance_columns(network, outcome.model.handles.lv_bus, &outcome.solution.flows);
        write_bus_balance(path, &index, &columns)
            .with_context(|| format!("writing bus balance {}", path.display()))?;
        info!("Wrote lv bus balance to {}", path.display());
    }

    if let Some(path) = &args.out {
        write_json(path, &config, &outcome)?;
        info!("Wrote sizing result to {}", path.display());
    }
    Ok(())
}

fn print_flow_table(outcome: &SizingOutcome) -> Result<()> {
    let network = &outcome.model.network;
    let solution = &outcome.solution;
    print!("\n{}", solution.summary());
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "\nFLOW\tENERGY (kWh)\tPEAK (kW)\tCAPACITY (kW)")?;
    for id in network.flow_ids() {
        let capacity = solution
            .capacity(id)
            .map(|kw| format!("{:.3}", kw.value()))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            writer,
            "{}\t{:.3}\t{:.3}\t{}",
            network.flow_label(id),
            solution.energy(id).value(),
            solution.peak(id).value(),
            capacity
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, config: &SizingConfig, outcome: &SizingOutcome) -> Result<()> {
    let solution = &outcome.solution;
    let output = SizingOutput {
        generated_at: chrono::Utc::now().to_rfc3339(),
        solver: &solution.solver,
        timesteps: solution.timesteps,
        timestep_hours: config.horizon.timestep_hours,
        objective: solution.objective,
        solve_time_ms: solution.solve_time.as_millis() as u64,
        grid_capacity_kw: outcome.breakdown.grid_supply_capacity,
        storage_capacity_kwh: outcome.breakdown.storage_capacity,
        coefficients: outcome.model.costs,
        breakdown: &outcome.breakdown,
        diagnostics: &outcome.diagnostics,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &output).context("serializing sizing result")?;
    Ok(())
}
