use super::{ScoreRequest, ValidatedRequest, ValidationErrors};
use crate::scoring::WeightConfig;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

/// Reads a CSV export of products (`materials` separated by `;`) and validates every row with
/// the same rules as the HTTP boundary. Any invalid row fails the whole batch.
pub fn read_products<R: Read>(
    reader: R,
    default_weights: &WeightConfig,
) -> Result<Vec<ValidatedRequest>, BatchImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut products = Vec::new();

    for (index, row) in csv_reader.deserialize::<ProductRow>().enumerate() {
        // Header occupies line 1.
        let line = index + 2;
        let row = row?;
        let validated = row
            .into_request()
            .validate(default_weights)
            .map_err(|errors| BatchImportError::InvalidRow { line, errors })?;
        products.push(validated);
    }

    Ok(products)
}

pub fn read_products_from_path<P: AsRef<Path>>(
    path: P,
    default_weights: &WeightConfig,
) -> Result<Vec<ValidatedRequest>, BatchImportError> {
    let file = std::fs::File::open(path)?;
    read_products(file, default_weights)
}

#[derive(Debug, thiserror::Error)]
pub enum BatchImportError {
    #[error("failed to read product batch: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid product CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row on line {line} rejected: {errors}")]
    InvalidRow {
        line: usize,
        errors: ValidationErrors,
    },
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    product_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    materials: Option<String>,
    #[serde(default)]
    weight_grams: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    transport: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    packaging: Option<String>,
    #[serde(default)]
    gwp: Option<f64>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    circularity: Option<f64>,
}

impl ProductRow {
    fn into_request(self) -> ScoreRequest {
        let materials = self.materials.map(|raw| {
            raw.split(';')
                .map(str::trim)
                .filter(|material| !material.is_empty())
                .map(str::to_string)
                .collect()
        });

        ScoreRequest {
            product_name: self.product_name,
            materials,
            weight_grams: self.weight_grams,
            transport: self.transport,
            packaging: self.packaging,
            gwp: self.gwp,
            cost: self.cost,
            circularity: self.circularity,
            weights: None,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
