use serde::{Deserialize, Serialize};

/// Loads attached to a single service point.
///
/// Counts are whole connections; kVA figures are installed or aggregate apparent power.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadData {
    /// Single-phase residential connections
    #[serde(alias = "mono")]
    pub single_phase: u32,

    /// Two-phase residential connections
    #[serde(alias = "bi")]
    pub two_phase: u32,

    /// Three-phase residential connections
    #[serde(alias = "tri")]
    pub three_phase: u32,

    /// Number of point (commercial) customers
    pub point_qty: u32,

    /// Aggregate kVA of the point loads
    pub point_kva: f64,

    /// Public-lighting fixture type, a key into the illumination catalog
    pub ip_type: String,

    /// Number of public-lighting fixtures
    pub ip_qty: u32,

    /// Installed solar generation (kVA)
    pub solar_kva: f64,

    /// Customers with solar generation at this point
    pub solar_qty: u32,
}

impl LoadData {
    /// Residential connections of any phase count.
    pub fn residential_count(&self) -> u32 {
        self.single_phase + self.two_phase + self.three_phase
    }

    /// Residential plus point customers.
    pub fn customer_count(&self) -> u32 {
        self.residential_count() + self.point_qty
    }
}

/// One service point (pole, box) or the root transformer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    /// Empty only for the root
    #[serde(default)]
    pub parent_id: String,

    /// Span length to the parent (m)
    #[serde(default, alias = "meters")]
    pub length_meters: f64,

    /// Cable on the incoming span, a key into the cable catalog
    #[serde(default, alias = "cable")]
    pub cable_id: String,

    #[serde(default)]
    pub loads: LoadData,
}

impl Node {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            ..Default::default()
        }
    }

    /// Set span length and cable
    pub fn with_span(mut self, length_meters: f64, cable_id: impl Into<String>) -> Self {
        self.length_meters = length_meters;
        self.cable_id = cable_id.into();
        self
    }

    pub fn with_loads(mut self, loads: LoadData) -> Self {
        self.loads = loads;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_counts() {
        let loads = LoadData {
            single_phase: 3,
            two_phase: 2,
            three_phase: 1,
            point_qty: 4,
            ..Default::default()
        };
        assert_eq!(loads.residential_count(), 6);
        assert_eq!(loads.customer_count(), 10);
    }

    #[test]
    fn test_deserialize_persistence_field_names() {
        let json = r#"{
            "id": "P1",
            "parentId": "TRAFO",
            "meters": 35.0,
            "cable": "3x70+54.6mm² Al",
            "loads": { "mono": 2, "tri": 1, "ipType": "IP 100W", "ipQty": 1 }
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.length_meters, 35.0);
        assert_eq!(node.cable_id, "3x70+54.6mm² Al");
        assert_eq!(node.loads.single_phase, 2);
        assert_eq!(node.loads.two_phase, 0);
        assert_eq!(node.loads.three_phase, 1);
        assert_eq!(node.loads.solar_kva, 0.0);
    }

    #[test]
    fn test_missing_loads_default_to_zero() {
        let node: Node = serde_json::from_str(r#"{ "id": "TRAFO" }"#).unwrap();
        assert!(node.parent_id.is_empty());
        assert_eq!(node.loads, LoadData::default());
    }
}
