//! `gridcon epc`: equivalent periodic cost of a single asset.

use anyhow::{Context, Result};
use gridcon_algo::economics::CostParameters;
use tracing::debug;

pub fn handle(
    capex: f64,
    years: f64,
    lifetime: f64,
    wacc: f64,
    decline: f64,
    operating_cost: f64,
) -> Result<()> {
    let params = CostParameters {
        capex,
        lifetime_years: lifetime,
        horizon_years: years,
        wacc,
        cost_decline_rate: decline,
        fixed_operating_cost: operating_cost,
    };
    debug!(?params, "computing equivalent periodic cost");
    let epc = params.epc().context("computing equivalent periodic cost")?;
    println!("{epc:.6}");
    Ok(())
}
