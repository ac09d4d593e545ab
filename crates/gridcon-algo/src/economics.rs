//! Equivalent periodic cost (EPC) of an investment.
//!
//! Converts a one-time capital expenditure into a constant annual payment
//! over a financial horizon of `n` years, including repeated reinvestment
//! every `u` years at a capex that declines by `cost_decline_rate` per year.
//!
//! ```text
//! A          = wacc·(1+wacc)^n / ((1+wacc)^n − 1)          annuity factor
//! q          = (1 − cost_decline_rate) / (1 + wacc)
//! multiplier = (1 − q^n) / (1 − q^u)                        repeated investments
//! epc        = A · capex · multiplier + fixed_operating_cost
//! ```
//!
//! With `n == u` the multiplier is exactly 1 and the EPC reduces to the
//! classic annuity of a single investment.

use gridcon_core::{GridconError, GridconResult};
use serde::{Deserialize, Serialize};

/// Capital recovery factor for `years` annual payments at rate `wacc`.
///
/// Converts a present value into equal annual payments.
pub fn annuity_factor(wacc: f64, years: f64) -> GridconResult<f64> {
    check_rate(wacc)?;
    check_years("years", years)?;
    let growth = (1.0 + wacc).powf(years);
    Ok(wacc * growth / (growth - 1.0))
}

/// Economic parameters of one asset class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    /// Capital expenditure per functional unit (€/kW or €/kWh)
    pub capex: f64,
    /// Technical lifetime of a single investment `u`
    pub lifetime_years: f64,
    /// Financial horizon `n`, an integer multiple of `u` for clean reinvestment cycles
    pub horizon_years: f64,
    pub wacc: f64,
    /// Annual decline of capex for repeated investments, in `[0, 1)`
    pub cost_decline_rate: f64,
    /// Fixed operating cost per functional unit and year; negative values are net income
    pub fixed_operating_cost: f64,
}

impl CostParameters {
    pub fn epc(&self) -> GridconResult<f64> {
        epc(
            self.capex,
            self.horizon_years,
            self.lifetime_years,
            self.wacc,
            self.cost_decline_rate,
            self.fixed_operating_cost,
        )
    }
}

/// Equivalent periodic cost per functional unit and year.
///
/// # Errors
///
/// Returns [`GridconError::InvalidParameter`] when `wacc <= 0`, `n` or `u`
/// are not positive, `n < u`, `cost_decline_rate` lies outside `[0, 1)`, or
/// any input is not finite.
///
/// # Example
///
/// ```
/// use gridcon_algo::economics::epc;
///
/// let value = epc(500.0, 50.0, 50.0, 0.05, 0.0, 10.0).unwrap();
/// assert!((value - 37.3884).abs() < 1e-4);
/// ```
pub fn epc(
    capex: f64,
    n: f64,
    u: f64,
    wacc: f64,
    cost_decline_rate: f64,
    fixed_operating_cost: f64,
) -> GridconResult<f64> {
    check_rate(wacc)?;
    check_years("horizon n", n)?;
    check_years("lifetime u", u)?;
    if n < u {
        return Err(GridconError::InvalidParameter(format!(
            "horizon n = {n} is shorter than lifetime u = {u}"
        )));
    }
    if !(0.0..1.0).contains(&cost_decline_rate) {
        return Err(GridconError::InvalidParameter(format!(
            "cost decline rate {cost_decline_rate} must lie in [0, 1)"
        )));
    }
    if !capex.is_finite() || !fixed_operating_cost.is_finite() {
        return Err(GridconError::InvalidParameter(format!(
            "capex {capex} and operating cost {fixed_operating_cost} must be finite"
        )));
    }

    let annuity = annuity_factor(wacc, n)?;
    let q = (1.0 - cost_decline_rate) / (1.0 + wacc);
    let multiplier = (1.0 - q.powf(n)) / (1.0 - q.powf(u));

    Ok(annuity * capex * multiplier + fixed_operating_cost)
}

fn check_rate(wacc: f64) -> GridconResult<()> {
    if !(wacc.is_finite() && wacc > 0.0) {
        return Err(GridconError::InvalidParameter(format!(
            "wacc must be positive, got {wacc}"
        )));
    }
    Ok(())
}

fn check_years(name: &str, years: f64) -> GridconResult<()> {
    if !(years.is_finite() && years > 0.0) {
        return Err(GridconError::InvalidParameter(format!(
            "{name} must be positive, got {years}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_grid_connection() {
        let value = epc(500.0, 50.0, 50.0, 0.05, 0.0, 10.0).unwrap();
        assert!((value - 37.388_367_742_868).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn test_single_investment_is_annuity() {
        for &(capex, u, wacc) in &[(500.0, 50.0, 0.05), (300.0, 5.0, 0.08), (1.0, 20.0, 0.15)] {
            let value = epc(capex, u, u, wacc, 0.0, 0.0).unwrap();
            let expected = annuity_factor(wacc, u).unwrap() * capex;
            assert!((value - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_repeated_investment_with_decline() {
        // ten cycles of five years at 10 % annual price decline
        let value = epc(300.0, 50.0, 5.0, 0.05, 0.1, 6.0).unwrap();
        assert!((value - 36.568_669_079_940).abs() < 1e-9, "got {value}");

        // without decline, whole reinvestment cycles annualize to the single-cycle annuity
        let single = epc(300.0, 5.0, 5.0, 0.05, 0.0, 0.0).unwrap();
        let repeated = epc(300.0, 50.0, 5.0, 0.05, 0.0, 0.0).unwrap();
        assert!((single - repeated).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_in_capex_and_wacc() {
        let mut last = f64::NEG_INFINITY;
        for capex in [100.0, 200.0, 400.0, 800.0] {
            let value = epc(capex, 50.0, 5.0, 0.05, 0.1, 0.0).unwrap();
            assert!(value > last);
            last = value;
        }

        let mut last = f64::NEG_INFINITY;
        for wacc in [0.01, 0.03, 0.05, 0.1, 0.19] {
            let value = epc(500.0, 50.0, 25.0, wacc, 0.02, 0.0).unwrap();
            assert!(value > last);
            last = value;
        }
    }

    #[test]
    fn test_negative_operating_cost_allowed() {
        let value = epc(10.0, 10.0, 10.0, 0.05, 0.0, -100.0).unwrap();
        assert!(value < 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let invalid = [
            epc(500.0, 50.0, 50.0, 0.0, 0.0, 0.0),
            epc(500.0, 50.0, 50.0, -0.05, 0.0, 0.0),
            epc(500.0, 50.0, 0.0, 0.05, 0.0, 0.0),
            epc(500.0, 0.0, 0.0, 0.05, 0.0, 0.0),
            epc(500.0, 5.0, 10.0, 0.05, 0.0, 0.0),
            epc(500.0, 50.0, 50.0, 0.05, 1.0, 0.0),
            epc(500.0, 50.0, 50.0, 0.05, -0.1, 0.0),
            epc(f64::NAN, 50.0, 50.0, 0.05, 0.0, 0.0),
        ];
        for result in invalid {
            assert!(matches!(result, Err(GridconError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_cost_parameters_forward_to_epc() {
        let params = CostParameters {
            capex: 500.0,
            lifetime_years: 50.0,
            horizon_years: 50.0,
            wacc: 0.05,
            cost_decline_rate: 0.0,
            fixed_operating_cost: 10.0,
        };
        assert_eq!(params.epc().unwrap(), epc(500.0, 50.0, 50.0, 0.05, 0.0, 10.0).unwrap());
    }
}
