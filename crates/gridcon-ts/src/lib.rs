//! Time-series I/O for sizing runs.
//!
//! Profiles are read from delimited files with polars; after a solve the
//! flows around one bus can be written back as a timestamped balance table.

use std::{
    fs::{self, File},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDateTime};
use gridcon_core::{GridconError, GridconResult, Network, NodeIndex, TimeSeries};
use polars::prelude::*;
#[cfg(feature = "parquet")]
use polars::prelude::ParquetReader;
use tracing::{debug, info};

/// Timestamp layout accepted for the horizon start and written to exports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// How the row count of a profile file must relate to the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// The file has exactly one row per timestep
    #[default]
    Exact,
    /// Longer files are cut to their leading rows
    Leading,
}

/// Read `columns` from a CSV (or Parquet) file with exactly one row per
/// timestep.
///
/// # Errors
///
/// [`GridconError::DataShapeMismatch`] when a column is absent, the file
/// does not have `timesteps` rows or a column contains missing values.
pub fn load_columns(
    path: &Path,
    columns: &[&str],
    timesteps: usize,
) -> GridconResult<Vec<TimeSeries>> {
    load_columns_with(path, columns, timesteps, RowPolicy::Exact)
}

/// Like [`load_columns`], with `rows` deciding whether a file longer than
/// the horizon is an error or gets truncated.
pub fn load_columns_with(
    path: &Path,
    columns: &[&str],
    timesteps: usize,
    rows: RowPolicy,
) -> GridconResult<Vec<TimeSeries>> {
    let mut file = File::open(path)?;
    let df = read_frame(&mut file, path).map_err(parse_error)?;

    let available = df.get_column_names();
    if let Some(missing) = columns.iter().find(|c| !available.contains(*c)) {
        return Err(GridconError::DataShapeMismatch(format!(
            "column '{}' not found in {} (available: {})",
            missing,
            path.display(),
            available.join(", ")
        )));
    }
    let height = df.height();
    let fits = match rows {
        RowPolicy::Exact => height == timesteps,
        RowPolicy::Leading => height >= timesteps,
    };
    if !fits {
        return Err(GridconError::DataShapeMismatch(format!(
            "{} has {} rows, horizon has {} timesteps",
            path.display(),
            height,
            timesteps
        )));
    }
    if height > timesteps {
        debug!(rows = height, timesteps, "using leading rows of profile file");
    }

    let mut profiles = Vec::with_capacity(columns.len());
    for &name in columns {
        let values = column_values(&df, name, timesteps)
            .map_err(parse_error)?
            .ok_or_else(|| {
                GridconError::DataShapeMismatch(format!(
                    "column '{}' has missing values within the first {} rows",
                    name, timesteps
                ))
            })?;
        profiles.push(TimeSeries::new(values));
    }

    info!(
        path = %path.display(),
        rows = height,
        timesteps,
        "loaded {} profile columns",
        columns.len()
    );
    Ok(profiles)
}

fn read_frame(file: &mut File, path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        #[cfg(feature = "parquet")]
        "parquet" => ParquetReader::new(file)
            .finish()
            .context("reading Parquet file"),
        #[cfg(not(feature = "parquet"))]
        "parquet" => Err(anyhow!(
            "parquet support is disabled; rebuild with the 'parquet' feature"
        )),
        "csv" | "txt" => CsvReader::new(file)
            .has_header(true)
            .finish()
            .context("reading CSV file"),
        _ => Err(anyhow!(
            "unsupported file extension '{}'; use .csv or .parquet",
            extension
        )),
    }
}

/// First `len` values of a numeric column, or `None` if any is null.
fn column_values(df: &DataFrame, name: &str, len: usize) -> Result<Option<Vec<f64>>> {
    let series = df
        .column(name)?
        .cast(&DataType::Float64)
        .with_context(|| format!("casting column '{name}' to Float64"))?;
    let values = series.f64()?;
    Ok(values.into_iter().take(len).collect())
}

fn parse_error(err: anyhow::Error) -> GridconError {
    GridconError::Parse(format!("{err:#}"))
}

/// Evenly spaced timestamps of the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeIndex {
    pub start: NaiveDateTime,
    pub step: Duration,
    pub len: usize,
}

impl TimeIndex {
    /// Index starting at `start` (see [`TIMESTAMP_FORMAT`]) with `len` steps
    /// of `timestep_hours`.
    pub fn parse(start: &str, timestep_hours: f64, len: usize) -> GridconResult<Self> {
        let start = NaiveDateTime::parse_from_str(start, TIMESTAMP_FORMAT).map_err(|e| {
            GridconError::Config(format!("invalid horizon start '{start}': {e}"))
        })?;
        if !(timestep_hours > 0.0 && timestep_hours.is_finite()) {
            return Err(GridconError::Config(format!(
                "timestep duration must be positive, got {timestep_hours} h"
            )));
        }
        let step = Duration::milliseconds((timestep_hours * 3_600_000.0).round() as i64);
        Ok(Self { start, step, len })
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        (0..self.len)
            .map(|t| self.start + self.step * t as i32)
            .collect()
    }

    fn formatted(&self) -> Vec<String> {
        self.timestamps()
            .iter()
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .collect()
    }
}

/// One column of a bus balance table.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceColumn {
    pub name: String,
    /// Flow values (kW), positive in the named direction
    pub values: Vec<f64>,
}

/// Every flow into and out of `bus`, named `from->to` after its endpoints.
///
/// `flows` holds the solved values indexed by flow, then timestep. Inflows
/// come first, each group in flow order.
pub fn bus_balance_columns(
    network: &Network,
    bus: NodeIndex,
    flows: &[Vec<f64>],
) -> Vec<BalanceColumn> {
    network
        .inflows(bus)
        .into_iter()
        .chain(network.outflows(bus))
        .map(|id| {
            let name = match network.endpoints(id) {
                Some((from, to)) => {
                    format!("{}->{}", node_label(network, from), node_label(network, to))
                }
                None => network.flow_label(id).to_string(),
            };
            BalanceColumn {
                name,
                values: flows.get(id.index()).cloned().unwrap_or_default(),
            }
        })
        .collect()
}

fn node_label(network: &Network, node: NodeIndex) -> &str {
    network.node(node).map(|n| n.label()).unwrap_or("?")
}

/// Write a balance table with a leading `timestamp` column as CSV.
pub fn write_bus_balance(
    path: &Path,
    index: &TimeIndex,
    columns: &[BalanceColumn],
) -> GridconResult<()> {
    if let Some(bad) = columns.iter().find(|c| c.values.len() != index.len) {
        return Err(GridconError::DataShapeMismatch(format!(
            "balance column '{}' has {} values, index has {}",
            bad.name,
            bad.values.len(),
            index.len
        )));
    }

    let mut series = Vec::with_capacity(columns.len() + 1);
    series.push(Series::new("timestamp", index.formatted()));
    for column in columns {
        series.push(Series::new(column.name.as_str(), column.values.as_slice()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    write_csv(&mut file, series).map_err(parse_error)?;

    debug!(path = %path.display(), columns = columns.len(), "wrote bus balance");
    Ok(())
}

fn write_csv(file: &mut File, series: Vec<Series>) -> Result<()> {
    let mut df = DataFrame::new(series).context("assembling balance table")?;
    CsvWriter::new(file)
        .finish(&mut df)
        .context("writing CSV file")
}
