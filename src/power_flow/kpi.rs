use super::{NetworkTree, PhysicsSummary};
use crate::config::{PhysicsConfig, SustainabilityConfig};
use crate::domain::{
    ComputedNode, GdImpactMetrics, IlluminationCatalog, Kpis, Node, ProjectParams,
    SustainabilityMetrics,
};

/// Loading summary over the nodes connected to the root.
pub fn aggregate_kpis(
    tree: &NetworkTree,
    nodes: &[Node],
    computed: &[ComputedNode],
    illumination: &IlluminationCatalog,
    params: &ProjectParams,
    diversity_factor: f64,
) -> Kpis {
    let root = &computed[tree.root()];
    let connected = || tree.preorder().iter().map(|&i| &nodes[i]);

    let transformer_occupancy_pct = if params.trafo_kva > 0.0 {
        root.subtree_total_kva / params.trafo_kva * 100.0
    } else {
        0.0
    };

    Kpis {
        total_load_kva: root.subtree_total_kva,
        diversified_load_kva: tree
            .preorder()
            .iter()
            .map(|&i| computed[i].node_distributed_kva)
            .sum(),
        point_load_kva: connected().map(|n| n.loads.point_kva).sum(),
        illumination_load_kva: connected()
            .map(|n| f64::from(n.loads.ip_qty) * illumination.unit_kva(&n.loads.ip_type))
            .sum(),
        transformer_occupancy_pct,
        max_voltage_drop_pct: computed
            .iter()
            .map(|n| n.accumulated_voltage_drop_pct)
            .fold(0.0, f64::max),
        total_customers: connected().map(|n| n.loads.customer_count()).sum(),
        diversity_factor,
    }
}

/// Annual loss energy, its cost and emissions, and a mitigation projection.
pub fn sustainability_metrics(
    total_joule_loss_w: f64,
    params: &ProjectParams,
    cfg: &SustainabilityConfig,
) -> SustainabilityMetrics {
    let price = params
        .energy_price_override()
        .unwrap_or(cfg.energy_price_per_kwh);

    let annual_energy_loss_kwh = total_joule_loss_w / 1000.0 * cfg.annual_hours * cfg.load_loss_factor;
    let annual_financial_loss = annual_energy_loss_kwh * price;
    let annual_co2_kg = annual_energy_loss_kwh * cfg.co2_kg_per_kwh;
    let trees_equivalent = if cfg.tree_co2_kg_per_year > 0.0 {
        annual_co2_kg / cfg.tree_co2_kg_per_year
    } else {
        0.0
    };

    SustainabilityMetrics {
        annual_energy_loss_kwh,
        annual_financial_loss,
        annual_co2_kg,
        potential_savings_10y: annual_financial_loss * cfg.projection_years * cfg.mitigation_fraction,
        potential_co2_prevented_10y_kg: annual_co2_kg * cfg.projection_years * cfg.mitigation_fraction,
        trees_equivalent,
    }
}

pub fn gd_impact(
    root: &ComputedNode,
    summary: &PhysicsSummary,
    physics: &PhysicsConfig,
    cfg: &SustainabilityConfig,
) -> GdImpactMetrics {
    let total_installed_kva = root.subtree_total_solar_kva;

    GdImpactMetrics {
        total_installed_kva,
        max_voltage_rise_pct: summary.max_voltage_rise_pct,
        has_reverse_flow: summary.max_reverse_amps > physics.reverse_flow_alarm_a,
        reverse_flow_amps: summary.max_reverse_amps,
        self_consumption_rate_pct: if total_installed_kva > 0.0 {
            cfg.self_consumption_rate_pct
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sustainability_defaults() {
        let cfg = SustainabilityConfig::default();
        let metrics = sustainability_metrics(1000.0, &ProjectParams::default(), &cfg);

        // 1 kW * 8760 h * 0.25
        assert!((metrics.annual_energy_loss_kwh - 2190.0).abs() < 1e-9);
        assert!((metrics.annual_financial_loss - 2190.0 * 0.85).abs() < 1e-9);
        assert!((metrics.annual_co2_kg - 2190.0 * 0.126).abs() < 1e-9);
        assert!((metrics.trees_equivalent - 2190.0 * 0.126 / 20.0).abs() < 1e-9);
        assert!((metrics.potential_savings_10y - metrics.annual_financial_loss * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_override() {
        let params = ProjectParams {
            energy_price_per_kwh: Some(2.0),
            ..Default::default()
        };
        let metrics = sustainability_metrics(1000.0, &params, &SustainabilityConfig::default());
        assert!((metrics.annual_financial_loss - 4380.0).abs() < 1e-9);
    }

    #[test]
    fn test_gd_impact_flags() {
        let mut root = ComputedNode::detached(Node::new("TRAFO", ""));
        let summary = PhysicsSummary {
            total_joule_loss_w: 0.0,
            max_voltage_rise_pct: 1.2,
            max_reverse_amps: 0.4,
        };
        let physics = PhysicsConfig::default();
        let cfg = SustainabilityConfig::default();

        let gd = gd_impact(&root, &summary, &physics, &cfg);
        assert!(!gd.has_reverse_flow);
        assert_eq!(gd.self_consumption_rate_pct, 0.0);

        root.subtree_total_solar_kva = 10.0;
        let summary = PhysicsSummary { max_reverse_amps: 3.0, ..summary };
        let gd = gd_impact(&root, &summary, &physics, &cfg);
        assert!(gd.has_reverse_flow);
        assert_eq!(gd.reverse_flow_amps, 3.0);
        assert_eq!(gd.self_consumption_rate_pct, 30.0);
    }
}
