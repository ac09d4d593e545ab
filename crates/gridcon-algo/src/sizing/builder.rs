//! Builds the two-bus flow network of the sizing study.
//!
//! ```text
//!   mv_source ──►┌────────┐          forward (mv→lv, sized on output)       ┌────────┐◄── pv
//!                │  mv    │ ───────────────────────────────────────────────►│  lv    │◄── grid_excess (slack)
//!   mv_sink  ◄───│  bus   │ ◄───────────────────────────────────────────────│  bus   │──► base_load
//!                └────────┘          reverse (lv→mv, sized on input)        └────────┘──► machine_load
//!                                                                             ▲    │ ──► curtailment
//!                                                                             └ storage
//! ```

use gridcon_core::{
    Diagnostics, Flow, FlowId, GridconResult, Hours, Investment, LinkSpec, Network, NodeIndex,
    Storage, StorageHandle, TimeSeries,
};
use tracing::{debug, info, warn};

use super::config::SizingConfig;
use crate::costs::{CostCoefficients, LossCosts};

/// The three measured profiles on the lv bus, in absolute kW.
#[derive(Debug, Clone)]
pub struct Profiles {
    pub pv: TimeSeries,
    pub demand: TimeSeries,
    pub machine_load: TimeSeries,
}

impl Profiles {
    pub fn new(pv: TimeSeries, demand: TimeSeries, machine_load: TimeSeries) -> Self {
        Self {
            pv,
            demand,
            machine_load,
        }
    }

    /// All-zero profiles of length `len`
    pub fn zeros(len: usize) -> Self {
        Self::new(TimeSeries::zeros(len), TimeSeries::zeros(len), TimeSeries::zeros(len))
    }

    /// Fail fast unless every profile has `timesteps` valid samples.
    pub fn check(&self, timesteps: usize) -> GridconResult<()> {
        for (name, series) in self.named() {
            series.require_len(name, timesteps)?;
            series.require_non_negative(name)?;
        }
        Ok(())
    }

    fn named(&self) -> [(&'static str, &TimeSeries); 3] {
        [
            ("pv", &self.pv),
            ("demand", &self.demand),
            ("machine_load", &self.machine_load),
        ]
    }
}

/// Flow indices of every component the report needs to itemize.
#[derive(Debug, Clone, Copy)]
pub struct ModelHandles {
    pub mv_bus: NodeIndex,
    pub lv_bus: NodeIndex,
    pub mv_source: FlowId,
    pub mv_sink: FlowId,
    pub pv: FlowId,
    pub base_load: FlowId,
    pub machine_load: FlowId,
    pub slack: FlowId,
    pub curtailment: FlowId,
    /// Index into [`Network::links`]
    pub link: usize,
    pub storage: StorageHandle,
}

/// A network ready for problem assembly.
#[derive(Debug)]
pub struct SizingModel {
    pub network: Network,
    pub timesteps: usize,
    pub timestep: Hours,
    pub handles: ModelHandles,
    pub costs: CostCoefficients,
    pub losses: LossCosts,
    /// Warnings raised while building the network
    pub diagnostics: Diagnostics,
}

/// Build the sizing network from configuration, cost coefficients and profiles.
///
/// # Errors
///
/// [`gridcon_core::GridconError::InvalidParameter`] for out-of-range technical
/// parameters and [`gridcon_core::GridconError::DataShapeMismatch`] when a
/// profile does not cover the horizon.
pub fn build_network(
    config: &SizingConfig,
    costs: &CostCoefficients,
    profiles: &Profiles,
) -> GridconResult<SizingModel> {
    config.validate()?;
    let timesteps = config.horizon.timesteps;
    profiles.check(timesteps)?;

    let losses = LossCosts::from_config(config);
    let mut network = Network::new();

    let mv_bus = network.add_bus("b_el_mv");
    let lv_bus = network.add_bus("b_el_lv");

    // idealized upstream grid
    let (_, mv_source) = network.add_source("mv_source", mv_bus, Flow::new("mv_source"));
    let (_, mv_sink) = network.add_sink("mv_sink", mv_bus, Flow::new("mv_sink"));

    let (_, pv) = network.add_source(
        "pv",
        lv_bus,
        Flow::new("pv").with_profile(profiles.pv.clone()),
    );
    let (_, slack) = network.add_source(
        "grid_excess",
        lv_bus,
        Flow::new("grid_excess").with_variable_cost(config.energy.slack_cost),
    );
    let (_, base_load) = network.add_sink(
        "base_load",
        lv_bus,
        Flow::new("base_load").with_profile(profiles.demand.clone()),
    );
    let (_, machine_load) = network.add_sink(
        "machine_load",
        lv_bus,
        Flow::new("machine_load").with_profile(profiles.machine_load.clone()),
    );
    let (_, curtailment) = network.add_sink(
        "curtailment",
        lv_bus,
        Flow::new("curtailment").with_variable_cost(config.energy.lost_energy_cost),
    );

    let link = network.add_bidirectional_link(
        mv_bus,
        lv_bus,
        LinkSpec {
            name: "transformer".to_string(),
            efficiency: 1.0 - config.grid.loss_rate,
            ep_costs: costs.sepc_grid,
            forward_input_cost: losses.supply_input,
            reverse_output_cost: losses.collect_output,
        },
    )?;

    let s = &config.storage;
    let storage = Storage::new("storage", Investment::new(costs.net_storage))
        .with_efficiencies(s.charge_efficiency, s.discharge_efficiency)
        .with_soc_limits(s.min_soc, s.max_soc)
        .with_self_discharge(s.self_discharge)
        .with_power_ratios(s.charge_power_ratio, s.discharge_power_ratio)
        .with_boundary(s.initial_soc);
    let storage = network.add_storage_with_flows(
        storage,
        lv_bus,
        Flow::new("storage_in").with_variable_cost(losses.storage_input),
        Flow::new("storage_out"),
    );

    let mut diagnostics = network.validate(timesteps)?;
    for issue in diagnostics.warnings() {
        warn!("{}", issue);
    }

    let stats = network.stats();
    info!(timesteps, "built sizing network: {}", stats);
    debug!(
        supply_input = losses.supply_input,
        collect_output = losses.collect_output,
        storage_input = losses.storage_input,
        "loss costs"
    );

    if costs.net_storage < 0.0 {
        warn!(
            net_storage = costs.net_storage,
            "storage earns more reserve income than it costs; capacity is bounded only by its SoC limits"
        );
        diagnostics.add_warning_with_entity(
            "economics",
            &format!("Net storage cost {:.4} €/kWh is negative", costs.net_storage),
            "storage",
        );
    }

    Ok(SizingModel {
        network,
        timesteps,
        timestep: Hours(config.horizon.timestep_hours),
        handles: ModelHandles {
            mv_bus,
            lv_bus,
            mv_source,
            mv_sink,
            pv,
            base_load,
            machine_load,
            slack,
            curtailment,
            link,
            storage,
        },
        costs: *costs,
        losses,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcon_core::{Capacity, GridconError, Node, SocBoundary};

    fn short_config(timesteps: usize) -> SizingConfig {
        let mut config = SizingConfig::default();
        config.horizon.timesteps = timesteps;
        config
    }

    #[test]
    fn test_build_topology() {
        let config = short_config(4);
        let costs = CostCoefficients::derive(&config).unwrap();
        let model = build_network(&config, &costs, &Profiles::zeros(4)).unwrap();

        let stats = model.network.stats();
        assert_eq!(stats.num_buses, 2);
        assert_eq!(stats.num_sources, 3);
        assert_eq!(stats.num_sinks, 4);
        assert_eq!(stats.num_transformers, 2);
        assert_eq!(stats.num_storages, 1);
        assert_eq!(stats.num_fixed_flows, 3);
        assert_eq!(stats.num_links, 1);
        assert_eq!(model.timestep, Hours(0.25));
        assert!(!model.diagnostics.has_issues());
    }

    #[test]
    fn test_negative_net_storage_cost_is_diagnosed() {
        let config = short_config(4);
        let costs = CostCoefficients {
            sepc_grid: 10.0,
            sepc_storage: 5.0,
            primary_reserve_income: 8.0,
            net_storage: -3.0,
        };
        let model = build_network(&config, &costs, &Profiles::zeros(4)).unwrap();

        let issue = model.diagnostics.warnings().next().unwrap();
        assert_eq!(issue.category, "economics");
        assert_eq!(issue.entity.as_deref(), Some("storage"));
        assert!(issue.message.contains("-3.0000"));
    }

    #[test]
    fn test_transformer_costs_and_efficiency() {
        let config = short_config(4);
        let costs = CostCoefficients::derive(&config).unwrap();
        let model = build_network(&config, &costs, &Profiles::zeros(4)).unwrap();
        let network = &model.network;
        let link = &network.links[model.handles.link];

        for handle in [link.forward, link.reverse] {
            match network.node(handle.node) {
                Some(Node::Transformer(tx)) => assert!((tx.efficiency - 0.9315).abs() < 1e-12),
                other => panic!("expected transformer, got {:?}", other),
            }
        }

        let forward_sized = network.flow(link.forward_sized).unwrap();
        match forward_sized.capacity {
            Capacity::Invest(inv) => assert!((inv.ep_costs - 0.5 * costs.sepc_grid).abs() < 1e-12),
            other => panic!("expected investment, got {:?}", other),
        }
        let supply_in = network.flow(link.forward.input).unwrap();
        assert!((supply_in.variable_cost - 0.0685 * 0.065).abs() < 1e-15);
        let collect_out = network.flow(link.reverse.output).unwrap();
        assert!((collect_out.variable_cost - 0.0685 * 0.065 / 0.9315).abs() < 1e-15);
    }

    #[test]
    fn test_storage_parameters() {
        let mut config = short_config(4);
        config.storage.initial_soc = SocBoundary::Cyclic;
        let costs = CostCoefficients::derive(&config).unwrap();
        let model = build_network(&config, &costs, &Profiles::zeros(4)).unwrap();

        let (_, storage) = model.network.storages()[0];
        assert_eq!(storage.min_soc, 0.1);
        assert_eq!(storage.max_soc, 0.9);
        assert_eq!(storage.boundary, SocBoundary::Cyclic);
        assert!((storage.investment.ep_costs - costs.net_storage).abs() < 1e-12);

        let input = model.network.flow(model.handles.storage.input).unwrap();
        assert!((input.variable_cost - 0.065 * (1.0 - 0.95 * 0.95)).abs() < 1e-15);
    }

    #[test]
    fn test_profile_length_mismatch() {
        let config = short_config(4);
        let costs = CostCoefficients::derive(&config).unwrap();
        let profiles = Profiles::new(
            TimeSeries::zeros(4),
            TimeSeries::zeros(3),
            TimeSeries::zeros(4),
        );
        let err = build_network(&config, &costs, &profiles).unwrap_err();
        assert!(matches!(err, GridconError::DataShapeMismatch(_)));
        assert!(err.to_string().contains("demand"));
    }

    #[test]
    fn test_negative_profile_rejected() {
        let config = short_config(2);
        let costs = CostCoefficients::derive(&config).unwrap();
        let profiles = Profiles::new(
            TimeSeries::new(vec![1.0, -1.0]),
            TimeSeries::zeros(2),
            TimeSeries::zeros(2),
        );
        assert!(matches!(
            build_network(&config, &costs, &profiles),
            Err(GridconError::DataShapeMismatch(_))
        ));
    }
}
