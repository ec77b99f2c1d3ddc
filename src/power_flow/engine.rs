use tracing::{debug, warn};

use super::{
    accumulate_loads, aggregate_kpis, gd_impact, propagate, resolve_diversity_factor,
    sustainability_metrics, total_residential, CalcResult, NetworkTree,
};
use crate::config::EngineConfig;
use crate::domain::{
    CableCatalog, ComputedNode, EngineResult, IlluminationCatalog, MonteCarloResult, Node,
    ProjectParams, Seed,
};

/// The three engine entry points. All are pure: no I/O and no state kept between calls.
pub trait NetworkEngine {
    /// One deterministic load-flow pass.
    fn calculate(
        &self,
        scenario_id: &str,
        nodes: &[Node],
        params: &ProjectParams,
        cables: &CableCatalog,
        illumination: &IlluminationCatalog,
    ) -> CalcResult<EngineResult>;

    /// Upgrade undersized cables; returns the node list with new cable assignments.
    fn optimize(
        &self,
        scenario_id: &str,
        nodes: &[Node],
        params: &ProjectParams,
        cables: &CableCatalog,
        illumination: &IlluminationCatalog,
    ) -> CalcResult<Vec<Node>>;

    /// Risk of violations under load uncertainty.
    fn run_monte_carlo(
        &self,
        nodes: &[Node],
        params: &ProjectParams,
        cables: &CableCatalog,
        illumination: &IlluminationCatalog,
        iterations: usize,
        seed: Option<&Seed>,
    ) -> CalcResult<MonteCarloResult>;
}

/// Radial LV engine using the moment method.
#[derive(Debug, Clone, Default)]
pub struct LvNetworkEngine {
    config: EngineConfig,
}

impl LvNetworkEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn build_tree(&self, nodes: &[Node]) -> CalcResult<NetworkTree> {
        NetworkTree::build(nodes, &self.config.root_id)
    }

    /// Run the load and physics passes over an already validated tree.
    ///
    /// `nodes` must be the slice the tree was built from, or one with the same ids in the
    /// same order (only loads and cables may differ).
    pub fn evaluate(
        &self,
        tree: &NetworkTree,
        scenario_id: &str,
        nodes: &[Node],
        params: &ProjectParams,
        cables: &CableCatalog,
        illumination: &IlluminationCatalog,
    ) -> CalcResult<EngineResult> {
        let mut warnings: Vec<String> = tree
            .orphans()
            .iter()
            .map(|&i| {
                let node = &nodes[i];
                debug!(node = %node.id, parent = %node.parent_id, "orphan node");
                format!(
                    "Orphan node detected: {} has no valid parent ('{}')",
                    node.id, node.parent_id
                )
            })
            .collect();

        let residential = total_residential(nodes);
        let diversity_factor = resolve_diversity_factor(
            &self.config,
            &params.normative_table,
            params.consumer_class,
            residential,
        );
        debug!(
            scenario = scenario_id,
            nodes = nodes.len(),
            connected = tree.preorder().len(),
            residential,
            diversity_factor,
            "load-flow pass"
        );

        let loads = accumulate_loads(tree, nodes, diversity_factor, illumination);
        let physics = propagate(
            tree,
            nodes,
            &loads,
            cables,
            &self.config.physics,
            params.offset_solar_in_drop,
        )?;
        warnings.extend(physics.warnings);

        let computed: Vec<ComputedNode> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let mut out = ComputedNode::detached(node.clone());
                if tree.is_reachable(i) {
                    let load = &loads[i];
                    let segment = &physics.segments[i];
                    out.subtree_total_kva = load.subtree_kva;
                    out.subtree_total_solar_kva = load.subtree_solar_kva;
                    out.node_distributed_kva = load.distributed_kva;
                    out.node_concentrated_kva = load.concentrated_kva;
                    out.node_solar_kva = load.solar_kva;
                    out.calculated_load_amps = segment.amps;
                    out.accumulated_voltage_drop_pct = segment.drop_pct;
                    out.joule_loss_watts = segment.joule_loss_w;
                    out.solar_voltage_rise_pct = segment.rise_pct;
                    out.net_daytime_current_amps = segment.net_daytime_amps;
                    out.overloaded = segment.overloaded;
                }
                out
            })
            .collect();

        let kpis = aggregate_kpis(tree, nodes, &computed, illumination, params, diversity_factor);
        let root = &computed[tree.root()];
        let sustainability = sustainability_metrics(
            physics.summary.total_joule_loss_w,
            params,
            &self.config.sustainability,
        );
        let gd_impact = gd_impact(
            root,
            &physics.summary,
            &self.config.physics,
            &self.config.sustainability,
        );

        Ok(EngineResult {
            scenario_id: scenario_id.to_string(),
            nodes: computed,
            kpis,
            sustainability,
            gd_impact,
            warnings,
        })
    }
}

impl NetworkEngine for LvNetworkEngine {
    fn calculate(
        &self,
        scenario_id: &str,
        nodes: &[Node],
        params: &ProjectParams,
        cables: &CableCatalog,
        illumination: &IlluminationCatalog,
    ) -> CalcResult<EngineResult> {
        let tree = self.build_tree(nodes)?;
        let result = self.evaluate(&tree, scenario_id, nodes, params, cables, illumination)?;
        if !result.warnings.is_empty() {
            warn!(scenario = scenario_id, count = result.warnings.len(), "calculation finished with warnings");
        }
        Ok(result)
    }

    fn optimize(
        &self,
        scenario_id: &str,
        nodes: &[Node],
        params: &ProjectParams,
        cables: &CableCatalog,
        illumination: &IlluminationCatalog,
    ) -> CalcResult<Vec<Node>> {
        crate::optimizer::optimize_cables(self, scenario_id, nodes, params, cables, illumination)
            .map(|outcome| outcome.nodes)
    }

    fn run_monte_carlo(
        &self,
        nodes: &[Node],
        params: &ProjectParams,
        cables: &CableCatalog,
        illumination: &IlluminationCatalog,
        iterations: usize,
        seed: Option<&Seed>,
    ) -> CalcResult<MonteCarloResult> {
        crate::simulation::run_monte_carlo(self, nodes, params, cables, illumination, iterations, seed)
    }
}
