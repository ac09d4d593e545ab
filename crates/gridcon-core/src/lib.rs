//! # gridcon-core: Flow-Network Model for Grid Connection Sizing
//!
//! Provides the data structures that describe a small electricity network as a
//! directed multi-commodity flow graph with investment decisions.
//!
//! ## Design Philosophy
//!
//! Networks are modeled as **directed multigraphs** where:
//! - **Nodes**: Buses, Sources, Sinks, Transformers and Storages
//! - **Edges**: Flows, one non-negative power flow per edge and timestep
//!
//! Nodes and flows are addressed by stable petgraph indices handed out when
//! they are added, so problem assembly never looks anything up by label.
//!
//! A physical bidirectional transformer cannot be one edge because flows are
//! non-negative. It is represented as a [`BidirectionalLink`]: two directional
//! transformers whose sized flows share one capacity. The pairing is created
//! in a single call and the equality of both capacities is part of the model.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridcon_core::*;
//!
//! let mut network = Network::new();
//! let mv = network.add_bus("b_el_mv");
//! let lv = network.add_bus("b_el_lv");
//!
//! network.add_source("mv_source", mv, Flow::new("mv_source"));
//! network.add_sink(
//!     "base_load",
//!     lv,
//!     Flow::new("base_load").with_profile(TimeSeries::constant(4, 10.0)),
//! );
//!
//! let link = network.add_bidirectional_link(
//!     mv,
//!     lv,
//!     LinkSpec {
//!         name: "transformer".to_string(),
//!         efficiency: 0.9315,
//!         ep_costs: 37.4,
//!         forward_input_cost: 0.0045,
//!         reverse_output_cost: 0.0048,
//!     },
//! );
//! assert!(link.is_ok());
//! assert_eq!(network.stats().num_buses, 2);
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Validation and diagnostic reporting
//! - [`error`] - Unified error taxonomy
//! - [`timeseries`] - Fixed-length profiles
//! - [`units`] - Unit-safe quantities

use petgraph::graph::{DiGraph, EdgeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod timeseries;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{GridconError, GridconResult};
pub use petgraph::graph::{EdgeIndex as FlowId, NodeIndex};
pub use timeseries::TimeSeries;
pub use units::{Hours, KilowattHours, Kilowatts};

/// Investment decision on a flow or a storage capacity.
///
/// The solver chooses the installed capacity; `ep_costs` is the annualized
/// cost per unit of capacity (€/kW/a or €/kWh/a).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub ep_costs: f64,
}

impl Investment {
    pub fn new(ep_costs: f64) -> Self {
        Self { ep_costs }
    }
}

/// Upper bound of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Capacity {
    /// Bounded only below by zero
    #[default]
    Unbounded,
    /// Capacity chosen by the solver
    Invest(Investment),
}

impl Capacity {
    pub fn investment(&self) -> Option<&Investment> {
        match self {
            Capacity::Invest(inv) => Some(inv),
            _ => None,
        }
    }
}

/// A directed power flow between two nodes.
#[derive(Debug, Clone)]
pub struct Flow {
    pub name: String,
    pub capacity: Capacity,
    /// Cost per kWh that passes through this flow (€/kWh)
    pub variable_cost: f64,
    /// Pins the flow to the profile value at every timestep
    pub profile: Option<TimeSeries>,
}

impl Flow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: Capacity::Unbounded,
            variable_cost: 0.0,
            profile: None,
        }
    }

    pub fn with_variable_cost(mut self, cost: f64) -> Self {
        self.variable_cost = cost;
        self
    }

    pub fn with_profile(mut self, profile: TimeSeries) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_investment(mut self, investment: Investment) -> Self {
        self.capacity = Capacity::Invest(investment);
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.profile.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Bus {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Sink {
    pub name: String,
}

/// Directional single-input/single-output converter: `output = efficiency × input`.
#[derive(Debug, Clone)]
pub struct Transformer {
    pub name: String,
    pub efficiency: f64,
}

/// How the stored energy at the start of the horizon is determined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocBoundary {
    /// Initial level is a free variable within the SoC bounds
    #[default]
    Free,
    /// Final level must equal the initial level
    Cyclic,
    /// Initial level fixed to a fraction of installed capacity
    Fixed(f64),
}

/// Energy storage with an investment decision on its nominal capacity.
#[derive(Debug, Clone)]
pub struct Storage {
    pub name: String,
    pub charge_efficiency: f64,
    pub discharge_efficiency: f64,
    /// Fraction of the stored energy lost per timestep
    pub self_discharge: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    /// Maximum charge power per kWh of capacity (kW/kWh)
    pub charge_power_ratio: f64,
    /// Maximum discharge power per kWh of capacity (kW/kWh)
    pub discharge_power_ratio: f64,
    pub boundary: SocBoundary,
    pub investment: Investment,
}

impl Storage {
    pub fn new(name: impl Into<String>, investment: Investment) -> Self {
        Self {
            name: name.into(),
            charge_efficiency: 1.0,
            discharge_efficiency: 1.0,
            self_discharge: 0.0,
            min_soc: 0.0,
            max_soc: 1.0,
            charge_power_ratio: 1.0,
            discharge_power_ratio: 1.0,
            boundary: SocBoundary::Free,
            investment,
        }
    }

    pub fn with_efficiencies(mut self, charge: f64, discharge: f64) -> Self {
        self.charge_efficiency = charge;
        self.discharge_efficiency = discharge;
        self
    }

    pub fn with_soc_limits(mut self, min_soc: f64, max_soc: f64) -> Self {
        self.min_soc = min_soc;
        self.max_soc = max_soc;
        self
    }

    pub fn with_self_discharge(mut self, fraction: f64) -> Self {
        self.self_discharge = fraction;
        self
    }

    pub fn with_power_ratios(mut self, charge: f64, discharge: f64) -> Self {
        self.charge_power_ratio = charge;
        self.discharge_power_ratio = discharge;
        self
    }

    pub fn with_boundary(mut self, boundary: SocBoundary) -> Self {
        self.boundary = boundary;
        self
    }
}

// Enum to represent different types of nodes in the graph
#[derive(Debug, Clone)]
pub enum Node {
    Bus(Bus),
    Source(Source),
    Sink(Sink),
    Transformer(Transformer),
    Storage(Storage),
}

impl Node {
    /// Returns a human-readable label for the node.
    pub fn label(&self) -> &str {
        match self {
            Node::Bus(bus) => &bus.name,
            Node::Source(source) => &source.name,
            Node::Sink(sink) => &sink.name,
            Node::Transformer(tx) => &tx.name,
            Node::Storage(storage) => &storage.name,
        }
    }
}

/// Indices of a transformer node and its two flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformerHandle {
    pub node: NodeIndex,
    pub input: FlowId,
    pub output: FlowId,
}

/// Indices of a storage node and its charge/discharge flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageHandle {
    pub node: NodeIndex,
    pub input: FlowId,
    pub output: FlowId,
}

/// Parameters of a bidirectional capacity-linked transformer pair.
#[derive(Debug, Clone)]
pub struct LinkSpec {
    pub name: String,
    /// One-way efficiency, identical in both directions
    pub efficiency: f64,
    /// Annualized cost of one kW of link capacity, split evenly between directions
    pub ep_costs: f64,
    /// Variable cost on the input of the forward direction (€/kWh)
    pub forward_input_cost: f64,
    /// Variable cost on the output of the reverse direction (€/kWh)
    pub reverse_output_cost: f64,
}

/// One physical asset split into two directional transformers.
///
/// `forward` carries energy from the upstream bus to the local bus, `reverse`
/// the other way. Both sized flows sit on the local bus side and share one
/// capacity: the assembled problem always contains the equality
/// `invest(forward_sized) == invest(reverse_sized)`.
#[derive(Debug, Clone)]
pub struct BidirectionalLink {
    pub name: String,
    pub forward: TransformerHandle,
    pub reverse: TransformerHandle,
    /// Forward output into the local bus
    pub forward_sized: FlowId,
    /// Reverse input from the local bus
    pub reverse_sized: FlowId,
}

/// The flow network graph
#[derive(Debug, Default)]
pub struct Network {
    pub graph: DiGraph<Node, Flow>,
    pub links: Vec<BidirectionalLink>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            links: Vec::new(),
        }
    }

    pub fn add_bus(&mut self, name: impl Into<String>) -> NodeIndex {
        self.graph.add_node(Node::Bus(Bus { name: name.into() }))
    }

    /// Add a source feeding `bus` through `flow`.
    pub fn add_source(
        &mut self,
        name: impl Into<String>,
        bus: NodeIndex,
        flow: Flow,
    ) -> (NodeIndex, FlowId) {
        let node = self.graph.add_node(Node::Source(Source { name: name.into() }));
        let edge = self.graph.add_edge(node, bus, flow);
        (node, edge)
    }

    /// Add a sink drawing from `bus` through `flow`.
    pub fn add_sink(
        &mut self,
        name: impl Into<String>,
        bus: NodeIndex,
        flow: Flow,
    ) -> (NodeIndex, FlowId) {
        let node = self.graph.add_node(Node::Sink(Sink { name: name.into() }));
        let edge = self.graph.add_edge(bus, node, flow);
        (node, edge)
    }

    pub fn add_transformer(
        &mut self,
        transformer: Transformer,
        from_bus: NodeIndex,
        to_bus: NodeIndex,
        input: Flow,
        output: Flow,
    ) -> TransformerHandle {
        let node = self.graph.add_node(Node::Transformer(transformer));
        let input = self.graph.add_edge(from_bus, node, input);
        let output = self.graph.add_edge(node, to_bus, output);
        TransformerHandle {
            node,
            input,
            output,
        }
    }

    /// Add a storage charged from and discharged into `bus`.
    pub fn add_storage(&mut self, storage: Storage, bus: NodeIndex) -> StorageHandle {
        let input_name = format!("{}_in", storage.name);
        let output_name = format!("{}_out", storage.name);
        self.add_storage_with_flows(storage, bus, Flow::new(input_name), Flow::new(output_name))
    }

    pub fn add_storage_with_flows(
        &mut self,
        storage: Storage,
        bus: NodeIndex,
        input: Flow,
        output: Flow,
    ) -> StorageHandle {
        let node = self.graph.add_node(Node::Storage(storage));
        let input = self.graph.add_edge(bus, node, input);
        let output = self.graph.add_edge(node, bus, output);
        StorageHandle {
            node,
            input,
            output,
        }
    }

    /// Add a capacity-linked transformer pair between `upstream` and `local`.
    ///
    /// Each direction carries half of `spec.ep_costs` on its local-side flow.
    pub fn add_bidirectional_link(
        &mut self,
        upstream: NodeIndex,
        local: NodeIndex,
        spec: LinkSpec,
    ) -> GridconResult<usize> {
        if !(spec.efficiency > 0.0 && spec.efficiency <= 1.0) {
            return Err(GridconError::InvalidParameter(format!(
                "link '{}' efficiency {} outside (0, 1]",
                spec.name, spec.efficiency
            )));
        }
        for bus in [upstream, local] {
            if !matches!(self.graph.node_weight(bus), Some(Node::Bus(_))) {
                return Err(GridconError::Network(format!(
                    "link '{}' must connect two buses",
                    spec.name
                )));
            }
        }

        let half = Investment::new(0.5 * spec.ep_costs);
        let forward_name = format!("{}_forward", spec.name);
        let reverse_name = format!("{}_reverse", spec.name);

        let forward = self.add_transformer(
            Transformer {
                name: forward_name.clone(),
                efficiency: spec.efficiency,
            },
            upstream,
            local,
            Flow::new(format!("{forward_name}_in")).with_variable_cost(spec.forward_input_cost),
            Flow::new(format!("{forward_name}_out")).with_investment(half),
        );
        let reverse = self.add_transformer(
            Transformer {
                name: reverse_name.clone(),
                efficiency: spec.efficiency,
            },
            local,
            upstream,
            Flow::new(format!("{reverse_name}_in")).with_investment(half),
            Flow::new(format!("{reverse_name}_out")).with_variable_cost(spec.reverse_output_cost),
        );

        self.links.push(BidirectionalLink {
            name: spec.name,
            forward,
            reverse,
            forward_sized: forward.output,
            reverse_sized: reverse.input,
        });
        Ok(self.links.len() - 1)
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(index)
    }

    pub fn flow(&self, id: FlowId) -> Option<&Flow> {
        self.graph.edge_weight(id)
    }

    /// Flows entering `node`
    pub fn inflows(&self, node: NodeIndex) -> Vec<FlowId> {
        let mut ids: Vec<FlowId> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        ids.sort();
        ids
    }

    /// Flows leaving `node`
    pub fn outflows(&self, node: NodeIndex) -> Vec<FlowId> {
        let mut ids: Vec<FlowId> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        ids.sort();
        ids
    }

    /// All flow indices in insertion order
    pub fn flow_ids(&self) -> impl Iterator<Item = FlowId> + '_ {
        self.graph.edge_indices()
    }

    pub fn bus_indices(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| matches!(self.graph[n], Node::Bus(_)))
            .collect()
    }

    pub fn transformers(&self) -> Vec<(NodeIndex, &Transformer)> {
        self.graph
            .node_indices()
            .filter_map(|n| match &self.graph[n] {
                Node::Transformer(tx) => Some((n, tx)),
                _ => None,
            })
            .collect()
    }

    pub fn storages(&self) -> Vec<(NodeIndex, &Storage)> {
        self.graph
            .node_indices()
            .filter_map(|n| match &self.graph[n] {
                Node::Storage(s) => Some((n, s)),
                _ => None,
            })
            .collect()
    }

    /// Compute basic statistics about the network
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();

        for node in self.graph.node_weights() {
            match node {
                Node::Bus(_) => stats.num_buses += 1,
                Node::Source(_) => stats.num_sources += 1,
                Node::Sink(_) => stats.num_sinks += 1,
                Node::Transformer(_) => stats.num_transformers += 1,
                Node::Storage(_) => stats.num_storages += 1,
            }
        }
        for flow in self.graph.edge_weights() {
            stats.num_flows += 1;
            if flow.is_fixed() {
                stats.num_fixed_flows += 1;
            }
            if flow.capacity.investment().is_some() {
                stats.num_investments += 1;
            }
        }
        stats.num_investments += stats.num_storages;
        stats.num_links = self.links.len();
        stats
    }

    /// Validate the network structure against a horizon of `timesteps`.
    ///
    /// Populates the provided `Diagnostics` with any warnings/errors found.
    pub fn validate_into(&self, timesteps: usize, diag: &mut Diagnostics) {
        if self.stats().num_buses == 0 {
            diag.add_error("structure", "Network has no buses");
            return;
        }

        for n in self.graph.node_indices() {
            let node = &self.graph[n];
            let inputs = self.graph.edges_directed(n, Direction::Incoming).count();
            let outputs = self.graph.edges_directed(n, Direction::Outgoing).count();
            let label = node.label();
            match node {
                Node::Bus(_) => {
                    if inputs + outputs == 0 {
                        diag.add_warning_with_entity("structure", "Bus has no flows", label);
                    }
                }
                Node::Source(_) => {
                    if inputs != 0 || outputs != 1 {
                        diag.add_error_with_entity(
                            "structure",
                            "Source must feed exactly one bus",
                            label,
                        );
                    }
                }
                Node::Sink(_) => {
                    if outputs != 0 || inputs != 1 {
                        diag.add_error_with_entity(
                            "structure",
                            "Sink must draw from exactly one bus",
                            label,
                        );
                    }
                }
                Node::Transformer(tx) => {
                    if inputs != 1 || outputs != 1 {
                        diag.add_error_with_entity(
                            "structure",
                            "Transformer must have one input and one output",
                            label,
                        );
                    }
                    if !(tx.efficiency > 0.0 && tx.efficiency <= 1.0) {
                        diag.add_error_with_entity(
                            "physical",
                            &format!("Efficiency {} outside (0, 1]", tx.efficiency),
                            label,
                        );
                    }
                }
                Node::Storage(s) => {
                    if inputs != 1 || outputs != 1 {
                        diag.add_error_with_entity(
                            "structure",
                            "Storage must have one input and one output",
                            label,
                        );
                    }
                    if !(0.0 <= s.min_soc && s.min_soc <= s.max_soc && s.max_soc <= 1.0) {
                        diag.add_error_with_entity(
                            "physical",
                            &format!("SoC limits [{}, {}] are inconsistent", s.min_soc, s.max_soc),
                            label,
                        );
                    }
                    if let SocBoundary::Fixed(f) = s.boundary {
                        if f < s.min_soc || f > s.max_soc {
                            diag.add_error_with_entity(
                                "physical",
                                &format!("Initial SoC {f} outside SoC limits"),
                                label,
                            );
                        }
                    }
                }
            }
            if !matches!(node, Node::Bus(_)) {
                let neighbours_are_buses = self
                    .graph
                    .neighbors_undirected(n)
                    .all(|m| matches!(self.graph[m], Node::Bus(_)));
                if !neighbours_are_buses {
                    diag.add_error_with_entity(
                        "structure",
                        "Component must connect to buses only",
                        label,
                    );
                }
            }
        }

        for flow in self.graph.edge_weights() {
            if let Some(profile) = &flow.profile {
                if profile.len() != timesteps {
                    diag.add_error_with_entity(
                        "shape",
                        &format!(
                            "Profile has {} samples, horizon has {} timesteps",
                            profile.len(),
                            timesteps
                        ),
                        &flow.name,
                    );
                }
            }
        }

        for link in &self.links {
            for id in [link.forward_sized, link.reverse_sized] {
                let investable = self
                    .flow(id)
                    .map(|f| f.capacity.investment().is_some())
                    .unwrap_or(false);
                if !investable {
                    diag.add_error_with_entity(
                        "reference",
                        "Linked flow carries no investment decision",
                        &link.name,
                    );
                }
            }
        }
    }

    /// Validate and convert error diagnostics into a [`GridconError`].
    pub fn validate(&self, timesteps: usize) -> GridconResult<Diagnostics> {
        let mut diag = Diagnostics::new();
        self.validate_into(timesteps, &mut diag);
        if let Some(issue) = diag.errors().find(|i| i.category == "shape") {
            return Err(GridconError::DataShapeMismatch(issue.to_string()));
        }
        if diag.has_errors() {
            let messages: Vec<String> = diag.errors().map(|i| i.to_string()).collect();
            return Err(GridconError::Network(messages.join("; ")));
        }
        Ok(diag)
    }

    /// Endpoints (tail, head) of a flow
    pub fn endpoints(&self, id: FlowId) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(id)
    }

    /// Label of a flow, or an empty string for unknown indices
    pub fn flow_label(&self, id: EdgeIndex) -> &str {
        self.flow(id).map(|f| f.name.as_str()).unwrap_or("")
    }
}

/// Statistics about a network's size
#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub num_buses: usize,
    pub num_sources: usize,
    pub num_sinks: usize,
    pub num_transformers: usize,
    pub num_storages: usize,
    pub num_flows: usize,
    pub num_fixed_flows: usize,
    pub num_investments: usize,
    pub num_links: usize,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} buses, {} sources, {} sinks, {} transformers, {} storages, {} flows ({} fixed), {} investments",
            self.num_buses,
            self.num_sources,
            self.num_sinks,
            self.num_transformers,
            self.num_storages,
            self.num_flows,
            self.num_fixed_flows,
            self.num_investments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_spec() -> LinkSpec {
        LinkSpec {
            name: "grid".to_string(),
            efficiency: 0.9,
            ep_costs: 10.0,
            forward_input_cost: 0.01,
            reverse_output_cost: 0.02,
        }
    }

    #[test]
    fn test_network_creation() {
        let mut network = Network::new();
        let mv = network.add_bus("mv");
        let lv = network.add_bus("lv");
        network.add_source("grid_source", mv, Flow::new("grid_source"));
        network.add_sink(
            "load",
            lv,
            Flow::new("load").with_profile(TimeSeries::constant(3, 1.0)),
        );
        network.add_bidirectional_link(mv, lv, link_spec()).unwrap();

        let stats = network.stats();
        assert_eq!(stats.num_buses, 2);
        assert_eq!(stats.num_sources, 1);
        assert_eq!(stats.num_sinks, 1);
        assert_eq!(stats.num_transformers, 2);
        assert_eq!(stats.num_flows, 6);
        assert_eq!(stats.num_fixed_flows, 1);
        assert_eq!(stats.num_investments, 2);
        assert_eq!(stats.num_links, 1);
        assert!(network.validate(3).is_ok());
    }

    #[test]
    fn test_link_splits_costs_on_local_side() {
        let mut network = Network::new();
        let mv = network.add_bus("mv");
        let lv = network.add_bus("lv");
        let idx = network.add_bidirectional_link(mv, lv, link_spec()).unwrap();
        let link = &network.links[idx];

        let forward = network.flow(link.forward_sized).unwrap();
        let reverse = network.flow(link.reverse_sized).unwrap();
        assert_eq!(forward.capacity.investment().unwrap().ep_costs, 5.0);
        assert_eq!(reverse.capacity.investment().unwrap().ep_costs, 5.0);

        // both sized flows touch the local bus
        assert_eq!(network.endpoints(link.forward_sized).unwrap().1, lv);
        assert_eq!(network.endpoints(link.reverse_sized).unwrap().0, lv);

        let fwd_in = network.flow(link.forward.input).unwrap();
        let rev_out = network.flow(link.reverse.output).unwrap();
        assert_eq!(fwd_in.variable_cost, 0.01);
        assert_eq!(rev_out.variable_cost, 0.02);
    }

    #[test]
    fn test_link_rejects_bad_efficiency() {
        let mut network = Network::new();
        let mv = network.add_bus("mv");
        let lv = network.add_bus("lv");
        let mut spec = link_spec();
        spec.efficiency = 0.0;
        assert!(matches!(
            network.add_bidirectional_link(mv, lv, spec),
            Err(GridconError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_inflows_outflows() {
        let mut network = Network::new();
        let lv = network.add_bus("lv");
        let (_, pv) = network.add_source("pv", lv, Flow::new("pv"));
        let (_, load) = network.add_sink("load", lv, Flow::new("load"));
        let storage = network.add_storage(Storage::new("battery", Investment::new(1.0)), lv);

        assert_eq!(network.inflows(lv), vec![pv, storage.output]);
        assert_eq!(network.outflows(lv), vec![load, storage.input]);
        assert_eq!(network.storages().len(), 1);
    }

    #[test]
    fn test_validation_profile_length() {
        let mut network = Network::new();
        let lv = network.add_bus("lv");
        network.add_sink(
            "load",
            lv,
            Flow::new("load").with_profile(TimeSeries::zeros(5)),
        );
        let err = network.validate(4).unwrap_err();
        assert!(matches!(err, GridconError::DataShapeMismatch(_)));
    }

    #[test]
    fn test_validation_empty() {
        let network = Network::new();
        let mut diag = Diagnostics::new();
        network.validate_into(4, &mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_validation_soc_limits() {
        let mut network = Network::new();
        let lv = network.add_bus("lv");
        network.add_storage(
            Storage::new("battery", Investment::new(1.0)).with_soc_limits(0.9, 0.1),
            lv,
        );
        assert!(matches!(
            network.validate(4),
            Err(GridconError::Network(_))
        ));
    }
}
