use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated description of a product's environmental footprint.
///
/// Built only through [`crate::intake::ScoreRequest::validate`] or the CSV importer, so the
/// scoring engine can rely on every field constraint without checking again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "product_name")]
    pub name: String,
    pub materials: Vec<String>,
    pub weight_grams: f64,
    pub transport: TransportMode,
    pub packaging: PackagingKind,
    pub gwp: f64,
    pub cost: f64,
    pub circularity: f64,
}

impl ProductRecord {
    pub fn has_material(&self, candidates: &[&str]) -> bool {
        self.materials.iter().any(|material| {
            let material = material.trim();
            candidates
                .iter()
                .any(|candidate| material.eq_ignore_ascii_case(candidate))
        })
    }

    pub fn uses_plastic_or_styrofoam(&self) -> bool {
        self.has_material(&["plastic", "styrofoam"])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Air,
    Truck,
    Ship,
    Rail,
    Local,
}

impl TransportMode {
    pub const ALL: [TransportMode; 5] = [
        TransportMode::Air,
        TransportMode::Truck,
        TransportMode::Ship,
        TransportMode::Rail,
        TransportMode::Local,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Air => "air",
            TransportMode::Truck => "truck",
            TransportMode::Ship => "ship",
            TransportMode::Rail => "rail",
            TransportMode::Local => "local",
        }
    }

    /// Exact lookup of the lowercase wire label used by the intake boundary.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == raw)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackagingKind {
    NonRecyclable,
    Recyclable,
    Biodegradable,
    Reusable,
}

impl PackagingKind {
    pub const ALL: [PackagingKind; 4] = [
        PackagingKind::NonRecyclable,
        PackagingKind::Recyclable,
        PackagingKind::Biodegradable,
        PackagingKind::Reusable,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PackagingKind::NonRecyclable => "non-recyclable",
            PackagingKind::Recyclable => "recyclable",
            PackagingKind::Biodegradable => "biodegradable",
            PackagingKind::Reusable => "reusable",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == raw)
    }
}

impl fmt::Display for PackagingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Letter grade derived from the rating ladder. `F` only appears for inputs below every rung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    A,
    B,
    C,
    D,
    F,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::F => "F",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relative importance of the three weighted sub-metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    pub gwp_weight: f64,
    pub circularity_weight: f64,
    pub cost_weight: f64,
}

impl WeightConfig {
    pub const SUM_TOLERANCE: f64 = 0.01;

    pub fn total(&self) -> f64 {
        self.gwp_weight + self.circularity_weight + self.cost_weight
    }

    pub fn sums_to_one(&self) -> bool {
        (self.total() - 1.0).abs() <= Self::SUM_TOLERANCE
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            gwp_weight: 0.4,
            circularity_weight: 0.3,
            cost_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub rating: Rating,
}
