//! Annualized cost coefficients derived from the sizing configuration.
//!
//! Every coefficient that ends up in the objective is computed here by a pure
//! function of the configuration; the network builder only copies them onto
//! flows and investments.

use gridcon_core::GridconResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::economics::CostParameters;
use crate::sizing::config::{PrimaryReserveConfig, SizingConfig};

/// Annualized specific costs of the two sized assets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostCoefficients {
    /// Annualized grid connection cost `kN` (€/kW/a)
    pub sepc_grid: f64,
    /// Annualized storage cost `kS` before reserve income (€/kWh/a)
    pub sepc_storage: f64,
    /// Primary reserve income per kWh of storage capacity and year
    pub primary_reserve_income: f64,
    /// `kS_netto = kS − reserve income`, negative when the storage earns money
    pub net_storage: f64,
}

impl CostCoefficients {
    /// Derive the coefficients from the economic sections of `config`.
    pub fn derive(config: &SizingConfig) -> GridconResult<Self> {
        let n = config.horizon.financial_years;
        let grid = CostParameters {
            capex: config.grid.capex,
            lifetime_years: config.grid.lifetime_years,
            horizon_years: n,
            wacc: config.grid.wacc,
            cost_decline_rate: config.grid.cost_decline_rate,
            fixed_operating_cost: config.grid.operating_cost_rate * config.grid.capex,
        };
        let storage = CostParameters {
            capex: config.storage.capex,
            lifetime_years: config.storage.lifetime_years,
            horizon_years: n,
            wacc: config.storage.wacc,
            cost_decline_rate: config.storage.cost_decline_rate,
            fixed_operating_cost: config.storage.operating_cost_rate * config.storage.capex,
        };

        let sepc_grid = grid.epc()?;
        let sepc_storage = storage.epc()?;
        let primary_reserve_income = primary_reserve_income(&config.primary_reserve);

        let coefficients = Self {
            sepc_grid,
            sepc_storage,
            primary_reserve_income,
            net_storage: sepc_storage - primary_reserve_income,
        };
        debug!(
            sepc_grid,
            sepc_storage,
            primary_reserve_income,
            net_storage = coefficients.net_storage,
            "derived cost coefficients"
        );
        Ok(coefficients)
    }
}

/// Income from primary reserve power per kWh of storage capacity and year.
pub fn primary_reserve_income(reserve: &PrimaryReserveConfig) -> f64 {
    if reserve.enabled {
        reserve.income_per_kwh_week * reserve.weeks
    } else {
        0.0
    }
}

/// Per-kWh costs of energy lost in the grid connection and the storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossCosts {
    /// Cost on energy entering the supplying direction (mv → lv)
    pub supply_input: f64,
    /// Cost on energy leaving the collecting direction (lv → mv)
    pub collect_output: f64,
    /// Cost on energy charged into the storage
    pub storage_input: f64,
}

impl LossCosts {
    /// Loss costs for a grid with `loss_rate` and a storage with the given
    /// efficiencies, valuing lost energy at `lost_energy_cost`.
    ///
    /// The collecting direction books its losses on the output, which is
    /// `1 − loss_rate` times smaller than the input, hence the division.
    /// Self-discharge is not part of the storage loss cost.
    pub fn new(
        loss_rate: f64,
        charge_efficiency: f64,
        discharge_efficiency: f64,
        lost_energy_cost: f64,
    ) -> Self {
        let grid_efficiency = 1.0 - loss_rate;
        Self {
            supply_input: loss_rate * lost_energy_cost,
            collect_output: loss_rate * lost_energy_cost / grid_efficiency,
            storage_input: lost_energy_cost * (1.0 - charge_efficiency * discharge_efficiency),
        }
    }

    pub fn from_config(config: &SizingConfig) -> Self {
        Self::new(
            config.grid.loss_rate,
            config.storage.charge_efficiency,
            config.storage.discharge_efficiency,
            config.energy.lost_energy_cost,
        )
    }
}
