//! Configuration of a sizing run.
//!
//! [`SizingConfig`] is read from TOML. Every section and field has a default,
//! so partial files are valid and an empty file reproduces the reference
//! study: a 50 year financial horizon, one year of 15-minute steps, a 500 €/kW
//! grid connection and a 300 €/kWh lithium-ion storage earning primary
//! reserve income for 13 weeks a year.

use std::path::Path;

use gridcon_core::{GridconError, GridconResult, SocBoundary};
use serde::{Deserialize, Serialize};

/// Complete configuration of a sizing run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub horizon: HorizonConfig,
    pub grid: GridConfig,
    pub storage: StorageConfig,
    pub energy: EnergyConfig,
    pub primary_reserve: PrimaryReserveConfig,
    pub profiles: ProfileColumns,
    pub solver: SolverConfig,
}

/// Time resolution and financial horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    /// Number of timesteps `T`
    pub timesteps: usize,
    /// Duration of one timestep in hours
    pub timestep_hours: f64,
    /// Financial horizon `n` in years
    pub financial_years: f64,
    /// Timestamp of the first step, only used for exports
    pub start: String,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            timesteps: 35136,
            timestep_hours: 0.25,
            financial_years: 50.0,
            start: "2016-01-01T00:00:00".to_string(),
        }
    }
}

/// Grid connection economics and upstream losses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// €/kW of active power provision capacity
    pub capex: f64,
    pub lifetime_years: f64,
    pub wacc: f64,
    /// Annual operating cost as a fraction of capex
    pub operating_cost_rate: f64,
    pub cost_decline_rate: f64,
    /// Share of energy lost in the upstream grid
    pub loss_rate: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            capex: 500.0,
            lifetime_years: 50.0,
            wacc: 0.05,
            operating_cost_rate: 0.02,
            cost_decline_rate: 0.0,
            loss_rate: 0.0685,
        }
    }
}

/// Storage economics and technical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// €/kWh of nominal capacity
    pub capex: f64,
    pub lifetime_years: f64,
    pub wacc: f64,
    pub operating_cost_rate: f64,
    pub cost_decline_rate: f64,
    pub charge_efficiency: f64,
    pub discharge_efficiency: f64,
    /// Fraction of stored energy lost per timestep
    pub self_discharge: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    /// kW of charge power per kWh of capacity
    pub charge_power_ratio: f64,
    /// kW of discharge power per kWh of capacity
    pub discharge_power_ratio: f64,
    pub initial_soc: SocBoundary,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capex: 300.0,
            lifetime_years: 5.0,
            wacc: 0.05,
            operating_cost_rate: 0.02,
            cost_decline_rate: 0.1,
            charge_efficiency: 0.95,
            discharge_efficiency: 0.95,
            self_discharge: 0.0000025,
            min_soc: 0.1,
            max_soc: 0.9,
            charge_power_ratio: 1.0,
            discharge_power_ratio: 1.0,
            initial_soc: SocBoundary::Free,
        }
    }
}

/// Value of energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// €/kWh paid for energy that is lost or curtailed
    pub lost_energy_cost: f64,
    /// €/kWh of the slack source that keeps the lv bus feasible
    pub slack_cost: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            lost_energy_cost: 0.065,
            slack_cost: 1e8,
        }
    }
}

/// Participation of the storage in the primary reserve market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryReserveConfig {
    pub enabled: bool,
    /// Committed weeks per year
    pub weeks: f64,
    /// €/kWh of nominal capacity and week
    pub income_per_kwh_week: f64,
}

impl Default for PrimaryReserveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weeks: 13.0,
            income_per_kwh_week: 2.4,
        }
    }
}

/// Column names of the profile file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileColumns {
    pub pv: String,
    pub demand: String,
    pub machine_load: String,
}

impl Default for ProfileColumns {
    fn default() -> Self {
        Self {
            pv: "pv".to_string(),
            demand: "demand_el".to_string(),
            machine_load: "machine_load".to_string(),
        }
    }
}

/// LP backend and result checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub name: String,
    /// Largest accepted relative gap between itemized costs and objective
    pub accordance_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            name: "clarabel".to_string(),
            accordance_tolerance: 1e-3,
        }
    }
}

impl SizingConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> GridconResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> GridconResult<Self> {
        toml::from_str(contents).map_err(|e| GridconError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> GridconResult<String> {
        toml::to_string_pretty(self).map_err(|e| GridconError::Config(e.to_string()))
    }

    /// Check the technical parameters.
    ///
    /// Economic parameters are checked when the cost coefficients are derived.
    pub fn validate(&self) -> GridconResult<()> {
        let invalid = |msg: String| Err(GridconError::InvalidParameter(msg));

        if self.horizon.timesteps == 0 {
            return invalid("horizon must contain at least one timestep".into());
        }
        if !(self.horizon.timestep_hours > 0.0 && self.horizon.timestep_hours.is_finite()) {
            return invalid(format!(
                "timestep duration must be positive, got {} h",
                self.horizon.timestep_hours
            ));
        }
        if !(0.0..1.0).contains(&self.grid.loss_rate) {
            return invalid(format!(
                "grid loss rate {} must lie in [0, 1)",
                self.grid.loss_rate
            ));
        }

        let s = &self.storage;
        for (name, value) in [
            ("charge efficiency", s.charge_efficiency),
            ("discharge efficiency", s.discharge_efficiency),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return invalid(format!("storage {name} {value} must lie in (0, 1]"));
            }
        }
        if !(0.0..1.0).contains(&s.self_discharge) {
            return invalid(format!(
                "storage self-discharge {} must lie in [0, 1)",
                s.self_discharge
            ));
        }
        if !(0.0 <= s.min_soc && s.min_soc <= s.max_soc && s.max_soc <= 1.0) {
            return invalid(format!(
                "storage SoC limits [{}, {}] must satisfy 0 <= min <= max <= 1",
                s.min_soc, s.max_soc
            ));
        }
        if let SocBoundary::Fixed(f) = s.initial_soc {
            if f < s.min_soc || f > s.max_soc {
                return invalid(format!(
                    "initial SoC {f} outside [{}, {}]",
                    s.min_soc, s.max_soc
                ));
            }
        }
        if s.charge_power_ratio < 0.0 || s.discharge_power_ratio < 0.0 {
            return invalid("storage power ratios must be non-negative".into());
        }
        if self.energy.lost_energy_cost < 0.0 || self.energy.slack_cost < 0.0 {
            return invalid("energy costs must be non-negative".into());
        }
        if !(self.solver.accordance_tolerance > 0.0) {
            return invalid("accordance tolerance must be positive".into());
        }
        Ok(())
    }
}
