//! # gridcon-algo: Economics and LP Sizing
//!
//! Sizes the grid connection and battery storage of a small low-voltage
//! network by solving one linear program over a full year.
//!
//! ## Economics
//!
//! - [`economics::epc`]: equivalent periodic cost of a (repeated) investment
//! - [`costs::CostCoefficients`]: annualized grid and storage costs, with
//!   the primary reserve income offset
//! - [`costs::LossCosts`]: per-kWh costs of grid and storage losses
//!
//! ## Sizing
//!
//! The [`sizing`] module builds the flow network, assembles the LP with
//! `good_lp`, solves it and itemizes the annual costs.
//!
//! | Stage | Entry point |
//! |-------|-------------|
//! | Network | [`sizing::build_network`] |
//! | LP | [`sizing::assemble`] |
//! | Solve | [`sizing::solve`] |
//! | Report | [`sizing::CostBreakdown`] |
//!
//! ## Example
//!
//! ```no_run
//! use gridcon_algo::sizing::{run, Profiles, SizingConfig};
//!
//! let mut config = SizingConfig::default();
//! config.horizon.timesteps = 96;
//! let outcome = run(&config, &Profiles::zeros(96))?;
//! outcome.breakdown.check_accordance(config.solver.accordance_tolerance)?;
//! println!("{}", outcome.breakdown.render());
//! # Ok::<(), gridcon_core::GridconError>(())
//! ```

pub mod costs;
pub mod economics;
pub mod sizing;

pub use costs::{CostCoefficients, LossCosts};
pub use economics::{annuity_factor, epc, CostParameters};
pub use gridcon_core::Diagnostics;
pub use sizing::{
    assemble, build_network, run, solve, CostBreakdown, LpSolverKind, Profiles, SizingConfig,
    SizingOutcome, SizingSolution,
};
