use super::domain::{ProductRecord, Rating, ScoreResult, WeightConfig};
use super::profile::ScoringProfile;
use super::suggestions::rule_based_suggestions;
use serde::Serialize;

/// Stateless scorer that applies a [`ScoringProfile`] to validated product records.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    profile: ScoringProfile,
}

/// Every intermediate term of a score, in the order the formula applies them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub gwp_penalty: f64,
    pub cost_penalty: f64,
    pub circularity_bonus: f64,
    pub material_penalty: f64,
    pub transport_penalty: f64,
    pub packaging_penalty: f64,
    pub weight_penalty: f64,
    pub gwp_component: f64,
    pub circularity_component: f64,
    pub cost_component: f64,
    pub weighted_score: f64,
    pub raw_score: f64,
    pub score: f64,
}

impl Scorer {
    pub fn new(profile: ScoringProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Score in `[0, 100]`; `None` falls back to the profile's default weights.
    pub fn calculate_score(&self, product: &ProductRecord, weights: Option<&WeightConfig>) -> f64 {
        self.breakdown(product, weights).score
    }

    pub fn breakdown(
        &self,
        product: &ProductRecord,
        weights: Option<&WeightConfig>,
    ) -> ScoreBreakdown {
        let profile = &self.profile;
        let weights = weights.unwrap_or(&profile.default_weights);

        let gwp_penalty = (product.gwp * profile.gwp_multiplier).min(profile.gwp_penalty_cap);
        let cost_penalty = product.cost.min(profile.cost_penalty_cap);
        let circularity_bonus = product.circularity * profile.circularity_bonus_rate;

        let material_penalty = product
            .materials
            .iter()
            .map(|material| profile.material_penalty(material))
            .fold(0.0, |total, penalty| total + penalty);
        let transport_penalty = profile.transport_penalty(product.transport);
        let packaging_penalty = profile.packaging_penalty(product.packaging);

        let weight_penalty = if product.weight_grams > profile.weight_threshold_grams {
            (product.weight_grams - profile.weight_threshold_grams) * profile.weight_penalty_rate
        } else {
            0.0
        };

        let gwp_component = (100.0 - gwp_penalty) * weights.gwp_weight;
        // The bonus lifts the raw circularity percentage before weighting.
        let circularity_component =
            (product.circularity + circularity_bonus) * weights.circularity_weight;
        let cost_component = (100.0 - cost_penalty) * weights.cost_weight;

        let weighted_score = gwp_component + circularity_component + cost_component;
        let raw_score = weighted_score
            - material_penalty
            - transport_penalty
            - packaging_penalty
            - weight_penalty;

        ScoreBreakdown {
            gwp_penalty,
            cost_penalty,
            circularity_bonus,
            material_penalty,
            transport_penalty,
            packaging_penalty,
            weight_penalty,
            gwp_component,
            circularity_component,
            cost_component,
            weighted_score,
            raw_score,
            score: raw_score.clamp(0.0, 100.0),
        }
    }

    /// Walks the ladder highest rung first; anything below every rung (or NaN) is an `F`.
    pub fn get_rating(&self, score: f64) -> Rating {
        self.profile
            .rating_ladder
            .rungs()
            .into_iter()
            .find(|(_, threshold)| score >= *threshold)
            .map(|(rating, _)| rating)
            .unwrap_or(Rating::F)
    }

    pub fn evaluate(&self, product: &ProductRecord, weights: Option<&WeightConfig>) -> ScoreResult {
        let score = self.calculate_score(product, weights);
        ScoreResult {
            score,
            rating: self.get_rating(score),
        }
    }

    pub fn generate_suggestions(&self, product: &ProductRecord, score: f64) -> Vec<String> {
        rule_based_suggestions(product, score, &self.profile)
    }
}
