use itertools::Itertools;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

use super::perturb::perturb_network;
use super::rng::{derive_seed, iteration_seed, Mulberry32};
use super::stats::{histogram, mean, quantile, round2, stability_index};
use crate::domain::{
    CableCatalog, EngineResult, IlluminationCatalog, MonteCarloResult, Node, ProjectParams, Seed,
};
use crate::power_flow::{CalcResult, LvNetworkEngine, NetworkTree};

const SCENARIO_ID: &str = "MC";

/// Outcome of one perturbed calculation
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    peak_drop_pct: f64,
    failed: bool,
}

/// Thresholds an iteration is judged against
#[derive(Debug, Clone, Copy)]
struct FailureRule {
    drop_ceiling_pct: f64,
    rise_ceiling_pct: f64,
}

impl FailureRule {
    /// Drop above the ceiling, an overloaded segment, or rise above the rise ceiling.
    ///
    /// Only segments whose cable is in the catalog with a positive ampacity can overload.
    fn failed(&self, result: &EngineResult, root_id: &str, cables: &CableCatalog) -> bool {
        let overloaded = result.nodes.iter().any(|n| {
            n.id() != root_id
                && cables
                    .get(&n.node.cable_id)
                    .is_some_and(|c| c.ampacity > 0.0 && n.calculated_load_amps > c.ampacity)
        });

        result.kpis.max_voltage_drop_pct > self.drop_ceiling_pct
            || overloaded
            || result.gd_impact.max_voltage_rise_pct > self.rise_ceiling_pct
    }
}

#[allow(clippy::too_many_arguments)]
fn run_iteration(
    engine: &LvNetworkEngine,
    tree: &NetworkTree,
    rule: &FailureRule,
    seed: u32,
    index: usize,
    nodes: &[Node],
    params: &ProjectParams,
    cables: &CableCatalog,
    illumination: &IlluminationCatalog,
) -> CalcResult<Sample> {
    let mut rng = Mulberry32::new(iteration_seed(seed, index));
    let perturbed = perturb_network(&mut rng, nodes, &engine.config().monte_carlo);
    let result = engine.evaluate(tree, SCENARIO_ID, &perturbed, params, cables, illumination)?;

    Ok(Sample {
        peak_drop_pct: result.kpis.max_voltage_drop_pct,
        failed: rule.failed(&result, &engine.config().root_id, cables),
    })
}

/// Risk assessment under uniform load uncertainty.
///
/// Every iteration draws from its own PRNG stream derived from the run seed and the
/// iteration index, so results are identical whether iterations run serially or on the
/// rayon pool.
pub fn run_monte_carlo(
    engine: &LvNetworkEngine,
    nodes: &[Node],
    params: &ProjectParams,
    cables: &CableCatalog,
    illumination: &IlluminationCatalog,
    iterations: usize,
    seed: Option<&Seed>,
) -> CalcResult<MonteCarloResult> {
    let config = engine.config();
    let tree = engine.build_tree(nodes)?;
    let iterations = config.monte_carlo.clamp_iterations(iterations);
    let seed = derive_seed(seed);
    let rule = FailureRule {
        drop_ceiling_pct: config.drop_ceiling_pct(&params.profile),
        rise_ceiling_pct: config.physics.rise_ceiling_pct,
    };
    debug!(iterations, seed, ceiling = rule.drop_ceiling_pct, "starting Monte Carlo run");

    let run = |i: usize| {
        run_iteration(engine, &tree, &rule, seed, i, nodes, params, cables, illumination)
    };

    #[cfg(feature = "parallel")]
    let samples: Vec<Sample> = (0..iterations).into_par_iter().map(run).collect::<CalcResult<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let samples: Vec<Sample> = (0..iterations).map(run).collect::<CalcResult<_>>()?;

    let failures = samples.iter().filter(|s| s.failed).count();
    let peaks: Vec<f64> = samples
        .iter()
        .map(|s| s.peak_drop_pct)
        .sorted_by(f64::total_cmp)
        .collect();

    let failure_risk = failures as f64 / peaks.len().max(1) as f64;
    let p95 = quantile(&peaks, 0.95);

    let result = MonteCarloResult {
        stability_index: stability_index(failure_risk, p95, rule.drop_ceiling_pct),
        failure_risk,
        avg_peak_drop_pct: round2(mean(&peaks)),
        p95_peak_drop_pct: round2(p95),
        distribution: histogram(&peaks, config.monte_carlo.histogram_bins),
        iterations,
        seed,
    };

    info!(
        iterations,
        seed,
        failure_risk = result.failure_risk,
        stability_index = result.stability_index,
        "Monte Carlo run finished"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cable, LoadData};

    fn network(single_phase: u32, length: f64) -> Vec<Node> {
        vec![
            Node::new("TRAFO", ""),
            Node::new("P1", "TRAFO").with_span(length, "3x70+54.6mm² Al").with_loads(LoadData {
                single_phase,
                ..Default::default()
            }),
            Node::new("P2", "P1").with_span(length, "3x70+54.6mm² Al").with_loads(LoadData {
                single_phase,
                point_qty: 1,
                point_kva: 10.0,
                ..Default::default()
            }),
        ]
    }

    fn run(nodes: &[Node], iterations: usize, seed: Option<&Seed>) -> MonteCarloResult {
        run_monte_carlo(
            &LvNetworkEngine::default(),
            nodes,
            &ProjectParams::default(),
            &CableCatalog::default_aluminium(),
            &IlluminationCatalog::new(),
            iterations,
            seed,
        )
        .unwrap()
    }

    #[test]
    fn test_iteration_count_is_clamped() {
        let nodes = network(5, 30.0);
        assert_eq!(run(&nodes, 1, Some(&Seed::Number(1))).iterations, 10);
        assert_eq!(run(&nodes, 0, Some(&Seed::Number(1))).iterations, 10);
    }

    #[test]
    fn test_distribution_counts_every_iteration() {
        let result = run(&network(5, 30.0), 200, Some(&Seed::Number(3)));
        assert_eq!(result.distribution.len(), 20);
        assert_eq!(result.distribution.iter().map(|b| b.y).sum::<u32>(), 200);
        assert!(result.avg_peak_drop_pct > 0.0);
        assert!(result.p95_peak_drop_pct >= result.avg_peak_drop_pct - 0.01);
    }

    #[test]
    fn test_text_seed_is_hashed() {
        let result = run(&network(5, 30.0), 10, Some(&Seed::from("abc")));
        assert_eq!(result.seed, 0x1A47_E90B);
    }

    #[test]
    fn test_light_network_is_stable() {
        let result = run(&network(2, 10.0), 100, Some(&Seed::Number(9)));
        assert_eq!(result.failure_risk, 0.0);
        assert_eq!(result.stability_index, 1.0);
    }

    #[test]
    fn test_undersized_network_always_fails() {
        // 60 kVA far down a thin cable: several times the 6% ceiling on every draw
        let nodes = vec![
            Node::new("TRAFO", ""),
            Node::new("P1", "TRAFO").with_span(300.0, "thin").with_loads(LoadData {
                point_qty: 1,
                point_kva: 60.0,
                ..Default::default()
            }),
        ];
        let cables = CableCatalog::new().with_cable("thin", Cable { r: 1.9, x: 0.0, coef: 0.6, ampacity: 400.0 });
        let result = run_monte_carlo(
            &LvNetworkEngine::default(),
            &nodes,
            &ProjectParams::default(),
            &cables,
            &IlluminationCatalog::new(),
            50,
            Some(&Seed::Number(5)),
        )
        .unwrap();
        assert_eq!(result.failure_risk, 1.0);
        assert_eq!(result.stability_index, 0.0);
    }

    #[test]
    fn test_unknown_cable_never_counts_as_overload() {
        let engine = LvNetworkEngine::default();
        let nodes = vec![
            Node::new("TRAFO", ""),
            Node::new("P1", "TRAFO").with_span(1.0, "mystery").with_loads(LoadData {
                point_kva: 200.0,
                ..Default::default()
            }),
        ];
        let cables = CableCatalog::default_aluminium();
        let tree = engine.build_tree(&nodes).unwrap();
        let result = engine
            .evaluate(&tree, "t", &nodes, &ProjectParams::default(), &cables, &IlluminationCatalog::new())
            .unwrap();
        let rule = FailureRule { drop_ceiling_pct: 100.0, rise_ceiling_pct: 100.0 };
        assert!(!rule.failed(&result, "TRAFO", &cables));
    }
}
