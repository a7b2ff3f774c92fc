//! Request boundary: raw payloads are checked field by field and turned into typed records
//! before anything reaches the scorer.

pub mod batch;

use crate::scoring::{PackagingKind, ProductRecord, TransportMode, WeightConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MAX_PRODUCT_NAME_CHARS: usize = 100;

const MISSING_FIELD: &str = "Missing data for required field.";

/// Scoring request as received from a client. Every field is optional here so that a
/// missing value is reported alongside the other problems instead of aborting the parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub product_name: Option<String>,
    pub materials: Option<Vec<String>>,
    pub weight_grams: Option<f64>,
    pub transport: Option<String>,
    pub packaging: Option<String>,
    pub gwp: Option<f64>,
    pub cost: Option<f64>,
    pub circularity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightsRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightsRequest {
    pub gwp_weight: Option<f64>,
    pub circularity_weight: Option<f64>,
    pub cost_weight: Option<f64>,
}

/// Output of a successful validation pass. `weights` is `None` when the client sent none.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub product: ProductRecord,
    pub weights: Option<WeightConfig>,
}

/// Field-level validation failures, keyed by field path (`weights.gwp_weight` for nested keys).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn messages_for(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (index, (field, messages)) in self.fields.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl ScoreRequest {
    /// Checks every constraint and reports all failures at once.
    pub fn validate(
        self,
        default_weights: &WeightConfig,
    ) -> Result<ValidatedRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = match self.product_name {
            Some(name) if name.trim().is_empty() => {
                errors.add("product_name", "Product name must not be empty.");
                None
            }
            Some(name) if name.chars().count() > MAX_PRODUCT_NAME_CHARS => {
                errors.add(
                    "product_name",
                    format!("Length must be at most {MAX_PRODUCT_NAME_CHARS} characters."),
                );
                None
            }
            Some(name) => Some(name),
            None => {
                errors.add("product_name", MISSING_FIELD);
                None
            }
        };

        let materials = match self.materials {
            Some(materials) if materials.is_empty() => {
                errors.add("materials", "At least one material is required.");
                None
            }
            Some(materials) => Some(materials),
            None => {
                errors.add("materials", MISSING_FIELD);
                None
            }
        };

        let weight_grams = require_number(&mut errors, "weight_grams", self.weight_grams)
            .filter(|value| {
                let valid = *value > 0.0;
                if !valid {
                    errors.add("weight_grams", "Must be greater than 0.");
                }
                valid
            });

        let transport = match self.transport {
            Some(raw) => TransportMode::parse(&raw).or_else(|| {
                errors.add("transport", one_of(TransportMode::ALL.map(|mode| mode.label())));
                None
            }),
            None => {
                errors.add("transport", MISSING_FIELD);
                None
            }
        };

        let packaging = match self.packaging {
            Some(raw) => PackagingKind::parse(&raw).or_else(|| {
                errors.add("packaging", one_of(PackagingKind::ALL.map(|kind| kind.label())));
                None
            }),
            None => {
                errors.add("packaging", MISSING_FIELD);
                None
            }
        };

        let gwp = require_range(&mut errors, "gwp", self.gwp, 0.0, None);
        let cost = require_range(&mut errors, "cost", self.cost, 0.0, None);
        let circularity = require_range(
            &mut errors,
            "circularity",
            self.circularity,
            0.0,
            Some(100.0),
        );

        let weights = self
            .weights
            .and_then(|weights| weights.resolve(default_weights, &mut errors));

        match (
            name,
            materials,
            weight_grams,
            transport,
            packaging,
            gwp,
            cost,
            circularity,
        ) {
            (
                Some(name),
                Some(materials),
                Some(weight_grams),
                Some(transport),
                Some(packaging),
                Some(gwp),
                Some(cost),
                Some(circularity),
            ) if errors.is_empty() => Ok(ValidatedRequest {
                product: ProductRecord {
                    name,
                    materials,
                    weight_grams,
                    transport,
                    packaging,
                    gwp,
                    cost,
                    circularity,
                },
                weights,
            }),
            _ => Err(errors),
        }
    }
}

impl WeightsRequest {
    fn resolve(
        self,
        defaults: &WeightConfig,
        errors: &mut ValidationErrors,
    ) -> Option<WeightConfig> {
        let before = errors.fields().len();
        let gwp_weight = weight_in_unit_range(
            errors,
            "weights.gwp_weight",
            self.gwp_weight,
            defaults.gwp_weight,
        );
        let circularity_weight = weight_in_unit_range(
            errors,
            "weights.circularity_weight",
            self.circularity_weight,
            defaults.circularity_weight,
        );
        let cost_weight = weight_in_unit_range(
            errors,
            "weights.cost_weight",
            self.cost_weight,
            defaults.cost_weight,
        );

        if errors.fields().len() != before {
            return None;
        }

        let weights = WeightConfig {
            gwp_weight,
            circularity_weight,
            cost_weight,
        };
        if !weights.sums_to_one() {
            errors.add("weights", "Weights must sum to 1.0");
            return None;
        }
        Some(weights)
    }
}

fn weight_in_unit_range(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<f64>,
    default: f64,
) -> f64 {
    let value = value.unwrap_or(default);
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        errors.add(
            field,
            "Must be greater than or equal to 0 and less than or equal to 1.",
        );
    }
    value
}

fn require_number(errors: &mut ValidationErrors, field: &str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(value) if value.is_finite() => Some(value),
        Some(_) => {
            errors.add(field, "Not a valid number.");
            None
        }
        None => {
            errors.add(field, MISSING_FIELD);
            None
        }
    }
}

fn require_range(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<f64>,
    min: f64,
    max: Option<f64>,
) -> Option<f64> {
    let value = require_number(errors, field, value)?;
    let within = value >= min && max.map_or(true, |max| value <= max);
    if within {
        return Some(value);
    }

    let message = match max {
        Some(max) => {
            format!("Must be greater than or equal to {min} and less than or equal to {max}.")
        }
        None => format!("Must be greater than or equal to {min}."),
    };
    errors.add(field, message);
    None
}

fn one_of<const N: usize>(labels: [&'static str; N]) -> String {
    format!("Must be one of: {}.", labels.join(", "))
}
