//! Cost breakdown and accordance check of a solved sizing run.

use gridcon_core::{Diagnostics, FlowId, GridconError, GridconResult, Network, Node};
use serde::Serialize;
use tracing::warn;

use super::builder::SizingModel;
use super::solution::SizingSolution;
use crate::costs::CostCoefficients;

/// Slack energy below this many kWh counts as numerical noise.
const SLACK_NOISE_KWH: f64 = 1e-3;

/// Relative gap between itemized costs and the solver objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accordance {
    pub itemized: f64,
    pub objective: f64,
    pub gap_abs: f64,
    /// Relative gap (fraction)
    pub gap_rel: f64,
}

impl Accordance {
    pub fn new(itemized: f64, objective: f64) -> Self {
        let gap_abs = (itemized - objective).abs();
        // below 1 € the gap is judged in absolute terms
        let gap_rel = gap_abs / objective.abs().max(1.0);
        Self {
            itemized,
            objective,
            gap_abs,
            gap_rel,
        }
    }

    /// Itemized costs as a percentage of the objective, undefined for a
    /// zero objective
    pub fn percent(&self) -> Option<f64> {
        (self.objective.abs() > 1e-10).then(|| self.itemized / self.objective * 100.0)
    }

    pub fn within_tolerance(&self, tolerance: f64) -> bool {
        self.gap_rel <= tolerance
    }
}

/// Sized capacities and itemized annual costs.
#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    /// Capacity from lv towards the upstream grid (kW)
    pub grid_collection_capacity: f64,
    /// Capacity from the upstream grid into lv (kW)
    pub grid_supply_capacity: f64,
    /// Nominal storage capacity (kWh)
    pub storage_capacity: f64,
    pub coefficients: CostCoefficients,

    pub fixed_grid_costs: f64,
    pub fixed_storage_costs: f64,
    pub grid_loss_costs: f64,
    pub storage_loss_costs: f64,
    pub curtailment_costs: f64,
    pub slack_costs: f64,
    /// Variable costs of flows outside the categories above
    pub other_variable_costs: f64,

    pub curtailed_energy: f64,
    pub slack_energy: f64,

    pub accordance: Accordance,
}

impl CostBreakdown {
    /// Itemize every cost term of `solution` for the network in `model`.
    pub fn from_solution(model: &SizingModel, solution: &SizingSolution) -> Self {
        let network = &model.network;
        let handles = &model.handles;
        let link = network.links.get(handles.link);

        let capacity = |id: Option<FlowId>| {
            id.and_then(|id| solution.capacity(id))
                .map(|kw| kw.value())
                .unwrap_or(0.0)
        };
        let grid_supply_capacity = capacity(link.map(|l| l.forward_sized));
        let grid_collection_capacity = capacity(link.map(|l| l.reverse_sized));

        let mut fixed_grid_costs = 0.0;
        let mut fixed_storage_costs = 0.0;
        for id in network.flow_ids() {
            if let (Some(inv), Some(cap)) = (
                network.graph[id].capacity.investment(),
                solution.capacity(id),
            ) {
                fixed_grid_costs += inv.ep_costs * cap.value();
            }
        }
        for storage in &solution.storages {
            if let Some(Node::Storage(s)) = network.node(storage.node) {
                fixed_storage_costs += s.investment.ep_costs * storage.capacity;
            }
        }

        let grid_flows: Vec<FlowId> = network
            .links
            .iter()
            .flat_map(|l| [l.forward.input, l.forward.output, l.reverse.input, l.reverse.output])
            .collect();
        let storage_flows: Vec<FlowId> = solution
            .storages
            .iter()
            .flat_map(|s| [s.input, s.output])
            .collect();

        let mut grid_loss_costs = 0.0;
        let mut storage_loss_costs = 0.0;
        let mut curtailment_costs = 0.0;
        let mut slack_costs = 0.0;
        let mut other_variable_costs = 0.0;
        for id in network.flow_ids() {
            let cost = variable_cost(network, solution, id);
            if grid_flows.contains(&id) {
                grid_loss_costs += cost;
            } else if storage_flows.contains(&id) {
                storage_loss_costs += cost;
            } else if id == handles.curtailment {
                curtailment_costs += cost;
            } else if id == handles.slack {
                slack_costs += cost;
            } else {
                other_variable_costs += cost;
            }
        }

        let storage_capacity = solution
            .storage(handles.storage.node)
            .map(|s| s.capacity)
            .unwrap_or(0.0);

        let mut breakdown = Self {
            grid_collection_capacity,
            grid_supply_capacity,
            storage_capacity,
            coefficients: model.costs,
            fixed_grid_costs,
            fixed_storage_costs,
            grid_loss_costs,
            storage_loss_costs,
            curtailment_costs,
            slack_costs,
            other_variable_costs,
            curtailed_energy: solution.energy(handles.curtailment).value(),
            slack_energy: solution.energy(handles.slack).value(),
            accordance: Accordance::new(0.0, solution.objective),
        };
        breakdown.accordance = Accordance::new(breakdown.total_costs(), solution.objective);

        if breakdown.slack_used() {
            warn!(
                slack_energy_kwh = breakdown.slack_energy,
                "slack source supplied energy; the network cannot balance on its own"
            );
        }
        breakdown
    }

    pub fn total_fixed_costs(&self) -> f64 {
        self.fixed_grid_costs + self.fixed_storage_costs
    }

    pub fn total_variable_costs(&self) -> f64 {
        self.grid_loss_costs
            + self.storage_loss_costs
            + self.curtailment_costs
            + self.slack_costs
            + self.other_variable_costs
    }

    pub fn total_costs(&self) -> f64 {
        self.total_fixed_costs() + self.total_variable_costs()
    }

    /// Whether the slack source carried more than numerical noise
    pub fn slack_used(&self) -> bool {
        self.slack_energy > SLACK_NOISE_KWH
    }

    /// Fail with [`GridconError::AccordanceMismatch`] when itemized costs and
    /// the objective differ by more than `tolerance` (relative).
    pub fn check_accordance(&self, tolerance: f64) -> GridconResult<()> {
        if self.accordance.within_tolerance(tolerance) {
            return Ok(());
        }
        Err(GridconError::AccordanceMismatch {
            itemized: self.accordance.itemized,
            objective: self.accordance.objective,
            relative_gap: self.accordance.gap_rel,
        })
    }

    /// Render the report in the layout of the reference study.
    pub fn render(&self) -> String {
        let rule = "#".repeat(52);
        let mut s = String::new();

        s.push_str("CAPACITY OF GRID CONNECTION\n");
        s.push_str(&format!("{rule}\n\n"));
        s.push_str(&format!(
            "Grid collection capacity:   {:.3} kW\n",
            self.grid_collection_capacity
        ));
        s.push_str(&format!(
            "Grid supply capacity:       {:.3} kW\n",
            self.grid_supply_capacity
        ));
        s.push_str(&format!(
            " kN:                        {:.4} €/kW\n\n",
            self.coefficients.sepc_grid
        ));

        s.push_str("CAPACITY OF ELECTRIC ENERGY STORAGE\n");
        s.push_str(&format!("{rule}\n\n"));
        s.push_str(&format!(
            "Storage capacity:           {:.3} kWh\n",
            self.storage_capacity
        ));
        s.push_str(&format!(
            " kS:                        {:.4} €/kWh\n",
            self.coefficients.sepc_storage
        ));
        s.push_str(&format!(
            " PRL income:                {:.4} €/kWh\n",
            self.coefficients.primary_reserve_income
        ));
        s.push_str(&format!(
            " kS_netto:                  {:.4} €/kWh\n\n",
            self.coefficients.net_storage
        ));

        s.push_str("COST BREAKDOWN\n");
        s.push_str(&format!("{rule}\n\n"));
        let lines = [
            ("Fixed grid costs:", self.fixed_grid_costs),
            ("Fixed storage costs:", self.fixed_storage_costs),
            ("Total fixed costs:", self.total_fixed_costs()),
        ];
        for (label, value) in lines {
            s.push_str(&format!("{label:<28}{value:.2} €\n"));
        }
        s.push('\n');
        let lines = [
            ("Costs of grid losses:", self.grid_loss_costs),
            ("Costs of storage losses:", self.storage_loss_costs),
            ("Costs of curtailment:", self.curtailment_costs),
            ("Costs of slack energy:", self.slack_costs),
            ("Total variable costs:", self.total_variable_costs()),
        ];
        for (label, value) in lines {
            s.push_str(&format!("{label:<28}{value:.2} €\n"));
        }
        s.push('\n');
        s.push_str(&format!(
            "{:<28}{:.2} €\n",
            "Total annual costs:",
            self.total_costs()
        ));
        s.push_str(&format!("{}\n", "-".repeat(50)));
        s.push_str(&format!(
            "{:<28}{:.2} €\n",
            "Objective function:", self.accordance.objective
        ));
        match self.accordance.percent() {
            Some(percent) => s.push_str(&format!("{:<28}{:.4} %\n", "Accordance:", percent)),
            None => s.push_str(&format!(
                "{:<28}n/a (gap {:.2} €)\n",
                "Accordance:", self.accordance.gap_abs
            )),
        }
        if self.slack_used() {
            s.push_str(&format!(
                "\nWARNING: slack source supplied {:.3} kWh\n",
                self.slack_energy
            ));
        }
        s
    }
}

/// One warning per timestep in which the slack source carried more than
/// numerical noise.
pub fn slack_diagnostics(model: &SizingModel, solution: &SizingSolution) -> Diagnostics {
    let mut diag = Diagnostics::new();
    let dt = solution.timestep.value();
    for (t, power) in solution.flow(model.handles.slack).iter().enumerate() {
        let energy = power * dt;
        if energy > SLACK_NOISE_KWH {
            diag.add_warning_at_timestep(
                "solution",
                &format!("Slack source supplied {energy:.3} kWh"),
                t,
            );
        }
    }
    diag
}

fn variable_cost(network: &Network, solution: &SizingSolution, id: FlowId) -> f64 {
    let cost = network.graph[id].variable_cost;
    if cost == 0.0 {
        return 0.0;
    }
    cost * solution.energy(id).value()
}
