use super::NetworkTree;
use crate::domain::{IlluminationCatalog, LoadData, Node};

/// Local and aggregated demand of one node (kVA)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeLoads {
    pub distributed_kva: f64,
    pub concentrated_kva: f64,
    pub solar_kva: f64,
    pub subtree_kva: f64,
    pub subtree_solar_kva: f64,
}

impl NodeLoads {
    /// Demand carried through the node towards its children
    pub fn downstream_kva(&self) -> f64 {
        self.subtree_kva - (self.distributed_kva + self.concentrated_kva)
    }
}

/// Split a node's own loads into distributed, concentrated and solar parts.
pub fn local_loads(
    loads: &LoadData,
    diversity_factor: f64,
    illumination: &IlluminationCatalog,
) -> NodeLoads {
    let distributed_kva = f64::from(loads.residential_count()) * diversity_factor;
    let lighting_kva = f64::from(loads.ip_qty) * illumination.unit_kva(&loads.ip_type);
    let concentrated_kva = lighting_kva + loads.point_kva;

    NodeLoads {
        distributed_kva,
        concentrated_kva,
        solar_kva: loads.solar_kva,
        subtree_kva: distributed_kva + concentrated_kva,
        subtree_solar_kva: loads.solar_kva,
    }
}

/// Bottom-up pass: subtree totals for every node reachable from the root.
///
/// Unreachable nodes keep all-zero loads.
pub fn accumulate_loads(
    tree: &NetworkTree,
    nodes: &[Node],
    diversity_factor: f64,
    illumination: &IlluminationCatalog,
) -> Vec<NodeLoads> {
    let mut out = vec![NodeLoads::default(); nodes.len()];

    for i in tree.postorder() {
        let mut acc = local_loads(&nodes[i].loads, diversity_factor, illumination);

        let (children_kva, children_solar_kva) = tree
            .children(i)
            .iter()
            .fold((0.0, 0.0), |(kva, solar), &c| {
                (kva + out[c].subtree_kva, solar + out[c].subtree_solar_kva)
            });

        acc.subtree_kva = acc.distributed_kva + acc.concentrated_kva + children_kva;
        acc.subtree_solar_kva = acc.solar_kva + children_solar_kva;
        out[i] = acc;
    }

    out
}
