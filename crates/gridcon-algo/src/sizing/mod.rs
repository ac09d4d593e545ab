//! Grid Connection and Storage Sizing
//!
//! This module sizes the bidirectional transformer of a grid connection and a
//! battery storage for a small low-voltage network with PV generation, a
//! base load and an electrified agricultural machine.
//!
//! ## Problem Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GRID CONNECTION AND STORAGE SIZING                                      │
//! │  ──────────────────────────────────                                      │
//! │                                                                          │
//! │  Given:                                                                  │
//! │    • PV, base load and machine load profiles for one year               │
//! │    • Annualized costs of transformer and storage capacity (EPC)         │
//! │    • Loss rates, storage efficiencies and SoC limits                    │
//! │                                                                          │
//! │  Decide:                                                                 │
//! │    • Transformer capacity (one value for both directions)               │
//! │    • Storage capacity                                                   │
//! │    • Every flow in every timestep                                       │
//! │                                                                          │
//! │  Minimize:                                                               │
//! │    Annual cost = capacity costs + loss, curtailment and slack costs     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## LP Formulation
//!
//! ```text
//! minimize    Σ_k c_k · cap_k + Σ_t Σ_e v_e · f_e(t) · Δt
//!             └─────────────┘   └────────────────────────┘
//!             capacity cost     variable cost
//!
//! subject to:
//!   Σ_in f(t) = Σ_out f(t)                              Bus balance
//!   f_out(t) = η · f_in(t)                              Transformer conversion
//!   f_e(t) = p_e(t)                                     Fixed profiles
//!   f_e(t) ≤ cap_e                                      Sized flows
//!   cap_forward = cap_reverse                           Capacity link
//!   s(t) = s(t−1)·(1−δ) + Δt·(η_c·f_c(t) − f_d(t)/η_d)  Storage balance, s(−1) = s₀
//!   soc_min·cap_S ≤ s(t) ≤ soc_max·cap_S                SoC bounds
//!   f_c(t) ≤ r_c·cap_S,  f_d(t) ≤ r_d·cap_S             Storage power
//!   f, cap, s ≥ 0
//! ```
//!
//! The starting level `s₀` is free within the SoC bounds unless the storage
//! is configured cyclic (`s(T−1) = s₀`) or fixed (`s₀ = f·cap_S`). The
//! balance also holds at `t = 0`, where `s₀` stands in for `s(−1)`.
//!
//! Flows are powers and levels are energies, hence the `Δt` in the storage
//! balance. With Δt = 1 h this reduces to the usual per-step form
//! `s(t) = s(t−1)·(1−δ) + η_c·f_c(t) − f_d(t)/η_d`.
//!
//! ## Pipeline
//!
//! [`CostCoefficients::derive`] → [`build_network`] → [`assemble`] →
//! [`solve`] → [`CostBreakdown::from_solution`]; [`run`] chains all five.

pub mod assembler;
pub mod builder;
pub mod config;
pub mod report;
pub mod solution;
pub mod solver;

pub use assembler::{assemble, SizingProblem, StorageVariables};
pub use builder::{build_network, ModelHandles, Profiles, SizingModel};
pub use config::SizingConfig;
pub use report::{slack_diagnostics, Accordance, CostBreakdown};
pub use solution::{SizingSolution, StorageResult};
pub use solver::{solve, LpSolverKind};

use gridcon_core::{Diagnostics, GridconResult};
use tracing::info;

use crate::costs::CostCoefficients;

/// Everything a sizing run produces.
#[derive(Debug)]
pub struct SizingOutcome {
    pub model: SizingModel,
    pub solution: SizingSolution,
    pub breakdown: CostBreakdown,
    /// Build warnings followed by per-timestep solution warnings
    pub diagnostics: Diagnostics,
}

/// Run the whole pipeline for `config` and `profiles` with the solver named
/// in the configuration.
///
/// The accordance check is left to the caller via
/// [`CostBreakdown::check_accordance`].
pub fn run(config: &SizingConfig, profiles: &Profiles) -> GridconResult<SizingOutcome> {
    let solver = LpSolverKind::parse(&config.solver.name)?;
    let costs = CostCoefficients::derive(config)?;
    info!(
        sepc_grid = costs.sepc_grid,
        net_storage = costs.net_storage,
        "derived annualized costs"
    );
    run_with_costs(config, &costs, profiles, solver)
}

/// Run the pipeline with externally supplied cost coefficients.
pub fn run_with_costs(
    config: &SizingConfig,
    costs: &CostCoefficients,
    profiles: &Profiles,
    solver: LpSolverKind,
) -> GridconResult<SizingOutcome> {
    let model = build_network(config, costs, profiles)?;
    let problem = assemble(&model.network, model.timesteps, model.timestep)?;
    let solution = solve(problem, solver)?;
    let breakdown = CostBreakdown::from_solution(&model, &solution);

    let mut diagnostics = model.diagnostics.clone();
    diagnostics.merge(slack_diagnostics(&model, &solution));

    Ok(SizingOutcome {
        model,
        solution,
        breakdown,
        diagnostics,
    })
}
