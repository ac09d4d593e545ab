//! Turns a flow network into a linear program over the full horizon.

use good_lp::{constraint, variable, variables, Constraint, Expression, ProblemVariables, Variable};
use gridcon_core::{
    Capacity, FlowId, GridconError, GridconResult, Hours, Network, Node, NodeIndex, SocBoundary,
};
use tracing::debug;

/// Decision variables of one storage.
#[derive(Debug, Clone)]
pub struct StorageVariables {
    pub node: NodeIndex,
    pub input: FlowId,
    pub output: FlowId,
    /// Installed nominal capacity (kWh)
    pub capacity: Variable,
    /// Stored energy before the first timestep (kWh)
    pub initial_level: Variable,
    /// Stored energy at the end of each timestep (kWh)
    pub levels: Vec<Variable>,
}

/// A fully assembled sizing LP, ready for the solve driver.
pub struct SizingProblem {
    pub(crate) vars: ProblemVariables,
    pub(crate) objective: Expression,
    pub(crate) constraints: Vec<Constraint>,
    /// Flow variables indexed by flow, then timestep
    pub flows: Vec<Vec<Variable>>,
    /// Investment variable of each flow, if it carries one
    pub flow_capacities: Vec<Option<Variable>>,
    pub storages: Vec<StorageVariables>,
    pub timesteps: usize,
    pub timestep: Hours,
}

impl SizingProblem {
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_flow_variables(&self) -> usize {
        self.flows.iter().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for SizingProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizingProblem")
            .field("flows", &self.flows.len())
            .field("storages", &self.storages.len())
            .field("constraints", &self.constraints.len())
            .field("timesteps", &self.timesteps)
            .finish()
    }
}

/// Assemble the LP for `network` over `timesteps` steps of duration `timestep`.
///
/// Variables:
/// - one non-negative flow per (flow, timestep)
/// - one capacity per investable flow, shared by all its per-timestep bounds
/// - capacity, initial level and per-timestep level for every storage
///
/// Constraints:
/// - bus balance: Σ inflows = Σ outflows at every bus and timestep
/// - transformer conversion: output = efficiency × input
/// - fixed flows pinned to their profile
/// - storage balance, SoC bounds, power limits and boundary condition
/// - capacity link equality for every bidirectional link
///
/// Objective: Σ capacity × ep_costs + Σ_t Σ_flows flow × variable_cost × Δt
pub fn assemble(
    network: &Network,
    timesteps: usize,
    timestep: Hours,
) -> GridconResult<SizingProblem> {
    let diagnostics = network.validate(timesteps)?;
    for issue in diagnostics.warnings() {
        debug!("{}", issue);
    }
    let dt = timestep.value();
    if !(dt > 0.0 && dt.is_finite()) {
        return Err(GridconError::InvalidParameter(format!(
            "timestep duration must be positive, got {}",
            timestep
        )));
    }

    let mut vars = variables!();
    let mut objective = Expression::from(0.0);
    let mut constraints: Vec<Constraint> = Vec::new();

    let edge_count = network.graph.edge_count();
    let mut flows: Vec<Vec<Variable>> = Vec::with_capacity(edge_count);
    let mut flow_capacities: Vec<Option<Variable>> = Vec::with_capacity(edge_count);

    // === Flow variables ===
    for id in network.flow_ids() {
        let flow = &network.graph[id];

        let capacity = match flow.capacity {
            Capacity::Invest(inv) => {
                let cap = vars.add(variable().min(0.0));
                objective += inv.ep_costs * cap;
                Some(cap)
            }
            Capacity::Unbounded => None,
        };

        let mut per_step = Vec::with_capacity(timesteps);
        for t in 0..timesteps {
            let x = vars.add(variable().min(0.0));
            if let Some(cap) = capacity {
                constraints.push(constraint!(x <= cap));
            }
            if let Some(profile) = &flow.profile {
                let value = profile.get(t).ok_or_else(|| {
                    GridconError::DataShapeMismatch(format!(
                        "profile of '{}' ends before timestep {}",
                        flow.name, t
                    ))
                })?;
                constraints.push(constraint!(x == value));
            }
            if flow.variable_cost != 0.0 {
                objective += (flow.variable_cost * dt) * x;
            }
            per_step.push(x);
        }

        flows.push(per_step);
        flow_capacities.push(capacity);
    }

    // === Node constraints ===
    let mut storages = Vec::new();
    for n in network.graph.node_indices() {
        match &network.graph[n] {
            Node::Bus(_) => {
                let inflows = network.inflows(n);
                let outflows = network.outflows(n);
                for t in 0..timesteps {
                    let mut balance = Expression::from(0.0);
                    for id in &inflows {
                        balance += flows[id.index()][t];
                    }
                    for id in &outflows {
                        balance -= flows[id.index()][t];
                    }
                    constraints.push(constraint!(balance == 0.0));
                }
            }
            Node::Transformer(tx) => {
                let input = single(network.inflows(n), &tx.name)?;
                let output = single(network.outflows(n), &tx.name)?;
                for t in 0..timesteps {
                    let x_in = flows[input.index()][t];
                    let x_out = flows[output.index()][t];
                    constraints.push(constraint!(x_out == tx.efficiency * x_in));
                }
            }
            Node::Storage(storage) => {
                let input = single(network.inflows(n), &storage.name)?;
                let output = single(network.outflows(n), &storage.name)?;

                let capacity = vars.add(variable().min(0.0));
                objective += storage.investment.ep_costs * capacity;

                let initial_level = vars.add(variable().min(0.0));
                constraints.push(constraint!(initial_level >= storage.min_soc * capacity));
                constraints.push(constraint!(initial_level <= storage.max_soc * capacity));

                let retention = 1.0 - storage.self_discharge;
                let charge = storage.charge_efficiency * dt;
                let discharge = dt / storage.discharge_efficiency;

                let mut levels = Vec::with_capacity(timesteps);
                let mut previous = initial_level;
                for t in 0..timesteps {
                    let level = vars.add(variable().min(0.0));
                    let x_in = flows[input.index()][t];
                    let x_out = flows[output.index()][t];

                    let mut next = Expression::from(0.0);
                    next += retention * previous;
                    next += charge * x_in;
                    next -= discharge * x_out;
                    constraints.push(constraint!(level == next));

                    constraints.push(constraint!(level >= storage.min_soc * capacity));
                    constraints.push(constraint!(level <= storage.max_soc * capacity));
                    constraints.push(constraint!(x_in <= storage.charge_power_ratio * capacity));
                    constraints.push(constraint!(x_out <= storage.discharge_power_ratio * capacity));

                    levels.push(level);
                    previous = level;
                }

                match storage.boundary {
                    SocBoundary::Free => {}
                    SocBoundary::Cyclic => {
                        constraints.push(constraint!(previous == initial_level));
                    }
                    SocBoundary::Fixed(fraction) => {
                        constraints.push(constraint!(initial_level == fraction * capacity));
                    }
                }

                storages.push(StorageVariables {
                    node: n,
                    input,
                    output,
                    capacity,
                    initial_level,
                    levels,
                });
            }
            Node::Source(_) | Node::Sink(_) => {}
        }
    }

    // === Capacity links ===
    for link in &network.links {
        let forward = flow_capacities[link.forward_sized.index()];
        let reverse = flow_capacities[link.reverse_sized.index()];
        match (forward, reverse) {
            (Some(forward), Some(reverse)) => {
                constraints.push(constraint!(reverse == forward));
            }
            _ => {
                return Err(GridconError::Network(format!(
                    "link '{}' references a flow without investment",
                    link.name
                )))
            }
        }
    }

    let problem = SizingProblem {
        vars,
        objective,
        constraints,
        flows,
        flow_capacities,
        storages,
        timesteps,
        timestep,
    };
    debug!(
        flow_variables = problem.num_flow_variables(),
        constraints = problem.num_constraints(),
        "assembled sizing problem"
    );
    Ok(problem)
}

fn single(ids: Vec<FlowId>, name: &str) -> GridconResult<FlowId> {
    match ids.as_slice() {
        [id] => Ok(*id),
        _ => Err(GridconError::Network(format!(
            "'{}' must have exactly one input and one output, found {}",
            name,
            ids.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcon_core::{Flow, Investment, LinkSpec, Storage, TimeSeries};

    fn small_network() -> Network {
        let mut network = Network::new();
        let mv = network.add_bus("mv");
        let lv = network.add_bus("lv");
        network.add_source("mv_source", mv, Flow::new("mv_source"));
        network.add_sink(
            "load",
            lv,
            Flow::new("load").with_profile(TimeSeries::constant(3, 2.0)),
        );
        network
            .add_bidirectional_link(
                mv,
                lv,
                LinkSpec {
                    name: "transformer".into(),
                    efficiency: 0.9,
                    ep_costs: 1.0,
                    forward_input_cost: 0.01,
                    reverse_output_cost: 0.01,
                },
            )
            .unwrap();
        network.add_storage(Storage::new("battery", Investment::new(1.0)), lv);
        network
    }

    #[test]
    fn test_problem_dimensions() {
        let network = small_network();
        let problem = assemble(&network, 3, Hours(1.0)).unwrap();

        // 8 flows × 3 timesteps
        assert_eq!(problem.num_flow_variables(), 24);
        assert_eq!(problem.storages.len(), 1);
        assert_eq!(problem.storages[0].levels.len(), 3);
        assert_eq!(
            problem.flow_capacities.iter().filter(|c| c.is_some()).count(),
            2
        );

        // buses 2×3, transformers 2×3, fixed 3, invest bounds 2×3,
        // storage 2 + 5×3, link 1
        assert_eq!(problem.num_constraints(), 6 + 6 + 3 + 6 + 2 + 15 + 1);
    }

    #[test]
    fn test_rejects_short_profile() {
        let network = small_network();
        assert!(matches!(
            assemble(&network, 4, Hours(1.0)),
            Err(GridconError::DataShapeMismatch(_))
        ));
    }

    #[test]
    fn test_rejects_zero_timestep() {
        let network = small_network();
        assert!(matches!(
            assemble(&network, 3, Hours(0.0)),
            Err(GridconError::InvalidParameter(_))
        ));
    }
}
