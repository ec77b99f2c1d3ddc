use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Consumer class column of a normative diversity table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum ConsumerClass {
    #[default]
    A,
    B,
    C,
    D,
}

/// One customer-count band of a diversity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityRow {
    #[serde(alias = "min")]
    pub min_customers: u32,
    #[serde(alias = "max")]
    pub max_customers: u32,
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "B")]
    pub b: f64,
    #[serde(rename = "C")]
    pub c: f64,
    #[serde(rename = "D")]
    pub d: f64,
}

impl DiversityRow {
    pub fn new(min_customers: u32, max_customers: u32, factors: [f64; 4]) -> Self {
        let [a, b, c, d] = factors;
        Self { min_customers, max_customers, a, b, c, d }
    }

    pub fn contains(&self, customers: u32) -> bool {
        (self.min_customers..=self.max_customers).contains(&customers)
    }

    pub fn factor(&self, class: ConsumerClass) -> f64 {
        match class {
            ConsumerClass::A => self.a,
            ConsumerClass::B => self.b,
            ConsumerClass::C => self.c,
            ConsumerClass::D => self.d,
        }
    }
}

/// Ordered, contiguous customer-count bands (kVA per connection by class).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiversityTable {
    pub rows: Vec<DiversityRow>,
}

impl DiversityTable {
    pub fn new(rows: Vec<DiversityRow>) -> Self {
        Self { rows }
    }

    /// First row whose band contains `customers`, else the last row.
    pub fn row_for(&self, customers: u32) -> Option<&DiversityRow> {
        self.rows
            .iter()
            .find(|row| row.contains(customers))
            .or_else(|| self.rows.last())
    }

    /// ANEEL PRODIST module 3 bands
    pub fn prodist() -> Self {
        Self::new(vec![
            DiversityRow::new(1, 5, [1.0, 1.6, 2.6, 4.0]),
            DiversityRow::new(6, 10, [0.9, 1.4, 2.2, 3.4]),
            DiversityRow::new(11, 15, [0.8, 1.2, 1.9, 3.0]),
            DiversityRow::new(16, 20, [0.7, 1.1, 1.7, 2.6]),
            DiversityRow::new(21, 25, [0.6, 0.9, 1.5, 2.3]),
            DiversityRow::new(26, 30, [0.5, 0.9, 1.4, 2.1]),
            DiversityRow::new(31, 40, [0.5, 0.8, 1.3, 2.0]),
            DiversityRow::new(41, 9999, [0.5, 0.8, 1.3, 2.0]),
        ])
    }

    /// ABNT bands
    pub fn abnt() -> Self {
        Self::new(vec![
            DiversityRow::new(1, 10, [1.60, 2.70, 4.50, 7.00]),
            DiversityRow::new(11, 20, [1.40, 2.30, 3.80, 6.00]),
            DiversityRow::new(21, 30, [1.20, 2.00, 3.30, 5.20]),
            DiversityRow::new(31, 50, [1.00, 1.80, 3.00, 4.80]),
            DiversityRow::new(51, 9999, [0.90, 1.50, 2.50, 4.00]),
        ])
    }
}
