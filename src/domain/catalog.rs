use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cable catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cable {
    /// Resistance (Ω/km)
    pub r: f64,

    /// Reactance (Ω/km), informational only
    #[serde(default)]
    pub x: f64,

    /// Voltage-drop coefficient for the moment method (% per kVA·hm)
    pub coef: f64,

    /// Thermal limit (A)
    pub ampacity: f64,
}

/// Cables keyed by id. Iteration follows key order so lookups and fallbacks are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CableCatalog(BTreeMap<String, Cable>);

impl CableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cable(mut self, id: impl Into<String>, cable: Cable) -> Self {
        self.0.insert(id.into(), cable);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Cable> {
        self.0.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up `id`, falling back to the first entry when it is unknown.
    ///
    /// Returns the cable and whether the fallback was taken, or `None` for an empty catalog.
    pub fn resolve(&self, id: &str) -> Option<(&Cable, bool)> {
        match self.0.get(id) {
            Some(cable) => Some((cable, false)),
            None => self.0.values().next().map(|cable| (cable, true)),
        }
    }

    /// Cable ids ordered by ampacity ascending; equal ratings keep key order.
    pub fn ampacity_ladder(&self) -> Vec<&str> {
        self.0
            .iter()
            .sorted_by(|a, b| a.1.ampacity.total_cmp(&b.1.ampacity))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// The six aluminium multiplexed cables of a typical LV overhead network.
    pub fn default_aluminium() -> Self {
        let entries = [
            ("2#16(25)mm² Al", 1.91, 0.10, 0.7779, 85.0),
            ("3x35+54.6mm² Al", 0.87, 0.09, 0.2416, 135.0),
            ("3x50+54.6mm² Al", 0.64, 0.09, 0.1784, 165.0),
            ("3x70+54.6mm² Al", 0.44, 0.08, 0.1248, 205.0),
            ("3x95+54.6mm² Al", 0.32, 0.08, 0.0891, 250.0),
            ("3x150+70mm² Al", 0.21, 0.08, 0.0573, 330.0),
        ];
        Self(
            entries
                .into_iter()
                .map(|(id, r, x, coef, ampacity)| (id.to_string(), Cable { r, x, coef, ampacity }))
                .collect(),
        )
    }
}

impl FromIterator<(String, Cable)> for CableCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Cable)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Public-lighting fixture type -> unit kVA
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IlluminationCatalog(BTreeMap<String, f64>);

impl IlluminationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(mut self, fixture_type: impl Into<String>, kva: f64) -> Self {
        self.0.insert(fixture_type.into(), kva);
        self
    }

    /// Unit kVA of a fixture type; unknown types draw nothing.
    pub fn unit_kva(&self, fixture_type: &str) -> f64 {
        self.0.get(fixture_type).copied().unwrap_or(0.0)
    }

    pub fn default_fixtures() -> Self {
        Self::new()
            .with_fixture("Sem IP", 0.0)
            .with_fixture("IP 70W", 0.07)
            .with_fixture("IP 100W", 0.10)
            .with_fixture("IP 150W", 0.15)
            .with_fixture("IP 250W", 0.25)
            .with_fixture("IP 400W", 0.40)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_fallback() {
        let catalog = CableCatalog::default_aluminium();

        let (cable, fallback) = catalog.resolve("3x70+54.6mm² Al").unwrap();
        assert_eq!(cable.ampacity, 205.0);
        assert!(!fallback);

        // First key in order is "2#16(25)mm² Al"
        let (cable, fallback) = catalog.resolve("does-not-exist").unwrap();
        assert_eq!(cable.ampacity, 85.0);
        assert!(fallback);

        assert!(CableCatalog::new().resolve("any").is_none());
    }

    #[test]
    fn test_ampacity_ladder_is_ascending() {
        let catalog = CableCatalog::default_aluminium();
        let ladder = catalog.ampacity_ladder();

        assert_eq!(ladder.len(), 6);
        assert_eq!(ladder[0], "2#16(25)mm² Al");
        assert_eq!(ladder[5], "3x150+70mm² Al");
        for pair in ladder.windows(2) {
            let lo = catalog.get(pair[0]).unwrap().ampacity;
            let hi = catalog.get(pair[1]).unwrap().ampacity;
            assert!(lo <= hi);
        }
    }

    #[test]
    fn test_unknown_fixture_draws_nothing() {
        let ips = IlluminationCatalog::default_fixtures();
        assert_eq!(ips.unit_kva("IP 150W"), 0.15);
        assert_eq!(ips.unit_kva("LED 30W"), 0.0);
    }

    #[test]
    fn test_catalog_deserializes_from_map() {
        let json = r#"{ "A": { "r": 0.44, "coef": 0.1248, "ampacity": 205 } }"#;
        let catalog: CableCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("A").unwrap().x, 0.0);
    }
}
