//! Sizing solution data structures
//!
//! Read-only view of the optimal assignment, indexed by the same flow and
//! node indices as the network it was solved for.

use std::time::Duration;

use gridcon_core::{FlowId, Hours, KilowattHours, Kilowatts, NodeIndex};

/// Optimal operation and size of one storage.
#[derive(Debug, Clone)]
pub struct StorageResult {
    pub node: NodeIndex,
    pub input: FlowId,
    pub output: FlowId,
    /// Installed nominal capacity (kWh)
    pub capacity: f64,
    pub initial_level: f64,
    /// Stored energy at the end of each timestep (kWh)
    pub levels: Vec<f64>,
}

impl StorageResult {
    pub fn capacity(&self) -> KilowattHours {
        KilowattHours(self.capacity)
    }
}

/// Complete solution of a sizing problem
#[derive(Debug, Clone, Default)]
pub struct SizingSolution {
    /// Flow values (kW) indexed by flow, then timestep
    pub flows: Vec<Vec<f64>>,
    /// Installed capacity (kW) of each investable flow
    pub flow_capacities: Vec<Option<f64>>,
    pub storages: Vec<StorageResult>,
    /// LP objective evaluated at the optimal assignment (€/a)
    pub objective: f64,
    pub timesteps: usize,
    pub timestep: Hours,
    pub solver: String,
    pub solve_time: Duration,
}

impl SizingSolution {
    /// Flow values of `id` over the horizon
    pub fn flow(&self, id: FlowId) -> &[f64] {
        self.flows.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Installed capacity of an investable flow
    pub fn capacity(&self, id: FlowId) -> Option<Kilowatts> {
        self.flow_capacities
            .get(id.index())
            .copied()
            .flatten()
            .map(Kilowatts)
    }

    /// Energy carried by `id` over the horizon
    pub fn energy(&self, id: FlowId) -> KilowattHours {
        let total: f64 = self.flow(id).iter().sum();
        Kilowatts(total) * self.timestep
    }

    /// Highest flow value of `id`
    pub fn peak(&self, id: FlowId) -> Kilowatts {
        Kilowatts(self.flow(id).iter().copied().fold(0.0, f64::max))
    }

    pub fn storage(&self, node: NodeIndex) -> Option<&StorageResult> {
        self.storages.iter().find(|s| s.node == node)
    }

    /// Format a human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Sizing Solution Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Solver: {}\n", self.solver));
        s.push_str(&format!(
            "Horizon: {} steps of {}\n",
            self.timesteps, self.timestep
        ));
        s.push_str(&format!("Objective: {:.2} €\n", self.objective));
        let invested = self.flow_capacities.iter().flatten().count();
        s.push_str(&format!("Sized flows: {}\n", invested));
        for storage in &self.storages {
            s.push_str(&format!("Storage capacity: {}\n", storage.capacity()));
        }
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SizingSolution {
        SizingSolution {
            flows: vec![vec![1.0, 2.0, 3.0], vec![0.0, 4.0, 0.0]],
            flow_capacities: vec![None, Some(4.0)],
            storages: vec![StorageResult {
                node: NodeIndex::new(3),
                input: FlowId::new(0),
                output: FlowId::new(1),
                capacity: 10.0,
                initial_level: 1.0,
                levels: vec![1.0, 5.0, 9.0],
            }],
            objective: 12.5,
            timesteps: 3,
            timestep: Hours(0.5),
            solver: "clarabel".to_string(),
            solve_time: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_flow_accessors() {
        let solution = sample();
        assert_eq!(solution.flow(FlowId::new(0)), &[1.0, 2.0, 3.0]);
        assert_eq!(solution.flow(FlowId::new(9)), &[] as &[f64]);
        assert_eq!(solution.energy(FlowId::new(0)), KilowattHours(3.0));
        assert_eq!(solution.peak(FlowId::new(1)), Kilowatts(4.0));
        assert_eq!(solution.capacity(FlowId::new(0)), None);
        assert_eq!(solution.capacity(FlowId::new(1)), Some(Kilowatts(4.0)));
    }

    #[test]
    fn test_storage_lookup() {
        let solution = sample();
        let storage = solution.storage(NodeIndex::new(3)).unwrap();
        assert_eq!(storage.capacity(), KilowattHours(10.0));
        assert_eq!(storage.levels, vec![1.0, 5.0, 9.0]);
        assert!(solution.storage(NodeIndex::new(0)).is_none());
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert!(summary.contains("Solver: clarabel"));
        assert!(summary.contains("Objective: 12.50"));
        assert!(summary.contains("Storage capacity: 10.0000 kWh"));
    }
}
