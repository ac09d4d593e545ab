//! Solve driver: hands the assembled LP to a `good_lp` backend and reads the
//! optimal assignment back into a [`SizingSolution`].

use std::str::FromStr;

use anyhow::anyhow;
use good_lp::solvers::clarabel::clarabel;
use good_lp::{Constraint, ResolutionError, Solution, SolverModel};
use gridcon_core::{GridconError, GridconResult};
use tracing::info;
use web_time::Instant;

use super::assembler::{SizingProblem, StorageVariables};
use super::solution::{SizingSolution, StorageResult};

/// LP backends compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LpSolverKind {
    #[default]
    Clarabel,
    #[cfg(feature = "solver-highs")]
    Highs,
}

impl LpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_LP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpSolverKind::Clarabel => "clarabel",
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => "highs",
        }
    }
}

const AVAILABLE_LP_SOLVERS: &[&str] = &[
    "clarabel",
    #[cfg(feature = "solver-highs")]
    "highs",
];

fn unknown_solver_error(label: &str) -> anyhow::Error {
    anyhow!(
        "unknown lp solver '{}'; supported values: {}",
        label,
        LpSolverKind::available().join(", ")
    )
}

impl FromStr for LpSolverKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "clarabel" => Ok(LpSolverKind::Clarabel),
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(LpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

impl LpSolverKind {
    /// Parse a solver name, reporting unknown names as configuration errors.
    pub fn parse(name: &str) -> GridconResult<Self> {
        name.parse()
            .map_err(|e: anyhow::Error| GridconError::Config(e.to_string()))
    }
}

/// Solve the assembled problem to optimality.
///
/// Anything other than an optimal solution is terminal: infeasible and
/// unbounded problems surface as [`GridconError::InfeasibleOrUnbounded`],
/// other backend failures as [`GridconError::Solver`].
pub fn solve(problem: SizingProblem, solver: LpSolverKind) -> GridconResult<SizingSolution> {
    let start = Instant::now();
    let SizingProblem {
        vars,
        objective,
        constraints,
        flows,
        flow_capacities,
        storages,
        timesteps,
        timestep,
    } = problem;

    info!(
        solver = solver.as_str(),
        constraints = constraints.len(),
        "solving sizing problem"
    );

    let unsolved = vars.minimise(objective.clone());
    let layout = Layout {
        flows: &flows,
        flow_capacities: &flow_capacities,
        storages: &storages,
    };

    let mut result = match solver {
        LpSolverKind::Clarabel => {
            let solution = solve_model(unsolved.using(clarabel), constraints)?;
            layout.extract(&solution, objective.eval_with(&solution))
        }
        #[cfg(feature = "solver-highs")]
        LpSolverKind::Highs => {
            let solution = solve_model(
                unsolved.using(good_lp::solvers::highs::highs),
                constraints,
            )?;
            layout.extract(&solution, objective.eval_with(&solution))
        }
    };

    result.timesteps = timesteps;
    result.timestep = timestep;
    result.solver = solver.as_str().to_string();
    result.solve_time = start.elapsed();

    info!(
        objective = result.objective,
        solve_time_ms = result.solve_time.as_millis() as u64,
        "solved sizing problem"
    );
    Ok(result)
}

fn solve_model<M>(model: M, constraints: Vec<Constraint>) -> GridconResult<M::Solution>
where
    M: SolverModel<Error = ResolutionError>,
{
    let mut model = model;
    for c in constraints {
        model = model.with(c);
    }
    model.solve().map_err(map_resolution_error)
}

fn map_resolution_error(err: ResolutionError) -> GridconError {
    match &err {
        ResolutionError::Infeasible | ResolutionError::Unbounded => {
            GridconError::InfeasibleOrUnbounded(err.to_string())
        }
        _ => GridconError::Solver(err.to_string()),
    }
}

struct Layout<'a> {
    flows: &'a [Vec<good_lp::Variable>],
    flow_capacities: &'a [Option<good_lp::Variable>],
    storages: &'a [StorageVariables],
}

impl Layout<'_> {
    fn extract<S: Solution>(&self, solution: &S, objective: f64) -> SizingSolution {
        let flows = self
            .flows
            .iter()
            .map(|steps| steps.iter().map(|&v| solution.value(v)).collect())
            .collect();
        let flow_capacities = self
            .flow_capacities
            .iter()
            .map(|cap| cap.map(|v| solution.value(v)))
            .collect();
        let storages = self
            .storages
            .iter()
            .map(|s| StorageResult {
                node: s.node,
                input: s.input,
                output: s.output,
                capacity: solution.value(s.capacity),
                initial_level: solution.value(s.initial_level),
                levels: s.levels.iter().map(|&v| solution.value(v)).collect(),
            })
            .collect();

        SizingSolution {
            flows,
            flow_capacities,
            storages,
            objective,
            ..SizingSolution::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_kind_parsing() {
        assert_eq!(LpSolverKind::parse("clarabel").unwrap(), LpSolverKind::Clarabel);
        assert_eq!(LpSolverKind::parse("CLARABEL").unwrap(), LpSolverKind::Clarabel);
        assert_eq!(LpSolverKind::default().as_str(), "clarabel");

        let err = LpSolverKind::parse("glpk").unwrap_err();
        assert!(matches!(err, GridconError::Config(_)));
        assert!(err.to_string().contains("supported values: clarabel"));
    }

    #[test]
    fn test_resolution_error_mapping() {
        assert!(matches!(
            map_resolution_error(ResolutionError::Infeasible),
            GridconError::InfeasibleOrUnbounded(_)
        ));
        assert!(matches!(
            map_resolution_error(ResolutionError::Unbounded),
            GridconError::InfeasibleOrUnbounded(_)
        ));
        assert!(matches!(
            map_resolution_error(ResolutionError::Other("numerical trouble")),
            GridconError::Solver(_)
        ));
    }
}
