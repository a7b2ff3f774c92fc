use super::domain::{PackagingKind, Rating, TransportMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Upper bound on rule-based suggestions per submission.
pub const MAX_RULE_SUGGESTIONS: usize = 4;

/// Constants that drive the scoring formula, the rating ladder, and the rule-based advisor.
///
/// Every field has a default, so a profile file only needs to list the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringProfile {
    pub default_weights: super::WeightConfig,
    pub gwp_multiplier: f64,
    pub gwp_penalty_cap: f64,
    pub cost_penalty_cap: f64,
    pub circularity_bonus_rate: f64,
    pub material_penalties: BTreeMap<String, f64>,
    pub transport_penalties: TransportPenalties,
    pub packaging_penalties: PackagingPenalties,
    pub weight_threshold_grams: f64,
    pub weight_penalty_rate: f64,
    pub rating_ladder: RatingLadder,
    pub high_gwp_threshold: f64,
    pub low_circularity_threshold: f64,
    pub high_cost_threshold: f64,
    pub low_score_threshold: f64,
    pub max_rule_suggestions: usize,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        let material_penalties = [
            ("plastic", 15.0),
            ("styrofoam", 25.0),
            ("aluminum", 5.0),
            ("steel", 8.0),
            ("glass", 3.0),
            ("wood", -5.0),
            ("bamboo", -10.0),
            ("cardboard", -3.0),
        ]
        .into_iter()
        .map(|(name, penalty)| (name.to_string(), penalty))
        .collect();

        Self {
            default_weights: super::WeightConfig::default(),
            gwp_multiplier: 2.0,
            gwp_penalty_cap: 50.0,
            cost_penalty_cap: 30.0,
            circularity_bonus_rate: 0.3,
            material_penalties,
            transport_penalties: TransportPenalties::default(),
            packaging_penalties: PackagingPenalties::default(),
            weight_threshold_grams: 500.0,
            weight_penalty_rate: 0.02,
            rating_ladder: RatingLadder::default(),
            high_gwp_threshold: 10.0,
            low_circularity_threshold: 50.0,
            high_cost_threshold: 50.0,
            low_score_threshold: 60.0,
            max_rule_suggestions: MAX_RULE_SUGGESTIONS,
        }
    }
}

impl ScoringProfile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProfileError> {
        let mut profile: ScoringProfile = serde_json::from_str(raw)?;
        profile.material_penalties = profile
            .material_penalties
            .into_iter()
            .map(|(name, penalty)| (name.trim().to_ascii_lowercase(), penalty))
            .collect();
        profile.validate()?;
        Ok(profile)
    }

    /// Rejects overrides that would break weighting or rating classification.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let weights = &self.default_weights;
        for (name, value) in [
            ("gwp_weight", weights.gwp_weight),
            ("circularity_weight", weights.circularity_weight),
            ("cost_weight", weights.cost_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProfileError::Invalid(format!(
                    "default_weights.{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        if !weights.sums_to_one() {
            return Err(ProfileError::Invalid(format!(
                "default_weights must sum to 1.0, got {}",
                weights.total()
            )));
        }

        let rungs = self.rating_ladder.rungs();
        if rungs.iter().any(|(_, threshold)| !threshold.is_finite()) {
            return Err(ProfileError::Invalid(
                "rating_ladder thresholds must be finite".to_string(),
            ));
        }
        for pair in rungs.windows(2) {
            let ((upper, upper_threshold), (lower, lower_threshold)) = (pair[0], pair[1]);
            if upper_threshold < lower_threshold {
                return Err(ProfileError::Invalid(format!(
                    "rating_ladder {upper} ({upper_threshold}) must not sit below \
                     {lower} ({lower_threshold})"
                )));
            }
        }

        if self.max_rule_suggestions > MAX_RULE_SUGGESTIONS {
            return Err(ProfileError::Invalid(format!(
                "max_rule_suggestions must be at most {MAX_RULE_SUGGESTIONS}, got {}",
                self.max_rule_suggestions
            )));
        }
        Ok(())
    }

    /// Unknown materials carry no penalty.
    pub fn material_penalty(&self, material: &str) -> f64 {
        self.material_penalties
            .get(&material.trim().to_ascii_lowercase())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn transport_penalty(&self, mode: TransportMode) -> f64 {
        let penalties = &self.transport_penalties;
        match mode {
            TransportMode::Air => penalties.air,
            TransportMode::Truck => penalties.truck,
            TransportMode::Ship => penalties.ship,
            TransportMode::Rail => penalties.rail,
            TransportMode::Local => penalties.local,
        }
    }

    pub fn packaging_penalty(&self, kind: PackagingKind) -> f64 {
        let penalties = &self.packaging_penalties;
        match kind {
            PackagingKind::NonRecyclable => penalties.non_recyclable,
            PackagingKind::Recyclable => penalties.recyclable,
            PackagingKind::Biodegradable => penalties.biodegradable,
            PackagingKind::Reusable => penalties.reusable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportPenalties {
    pub air: f64,
    pub truck: f64,
    pub ship: f64,
    pub rail: f64,
    pub local: f64,
}

impl Default for TransportPenalties {
    fn default() -> Self {
        Self {
            air: 30.0,
            truck: 15.0,
            ship: 5.0,
            rail: 3.0,
            local: -5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PackagingPenalties {
    pub non_recyclable: f64,
    pub recyclable: f64,
    pub biodegradable: f64,
    pub reusable: f64,
}

impl Default for PackagingPenalties {
    fn default() -> Self {
        Self {
            non_recyclable: 20.0,
            recyclable: 0.0,
            biodegradable: -10.0,
            reusable: -15.0,
        }
    }
}

/// Minimum score for each passing grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct RatingLadder {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl RatingLadder {
    /// Rungs from the highest threshold down; classification depends on this order.
    pub fn rungs(&self) -> [(Rating, f64); 4] {
        [
            (Rating::A, self.a),
            (Rating::B, self.b),
            (Rating::C, self.c),
            (Rating::D, self.d),
        ]
    }
}

impl Default for RatingLadder {
    fn default() -> Self {
        Self {
            a: 80.0,
            b: 60.0,
            c: 40.0,
            d: 0.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("unable to read scoring profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scoring profile: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scoring profile rejected: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_lookup_ignores_case_and_unknowns() {
        let profile = ScoringProfile::default();
        assert_eq!(profile.material_penalty("Plastic"), 15.0);
        assert_eq!(profile.material_penalty("BAMBOO"), -10.0);
        assert_eq!(profile.material_penalty("unobtainium"), 0.0);
    }

    #[test]
    fn partial_profile_overrides_keep_remaining_defaults() {
        let profile = ScoringProfile::from_json(
            r#"{
                "weight_threshold_grams": 250,
                "material_penalties": { "Hemp": -8 },
                "packaging_penalties": { "non-recyclable": 25 }
            }"#,
        )
        .expect("profile parses");

        assert_eq!(profile.weight_threshold_grams, 250.0);
        assert_eq!(profile.material_penalty("hemp"), -8.0);
        assert_eq!(profile.material_penalty("plastic"), 0.0);
        assert_eq!(profile.packaging_penalty(PackagingKind::NonRecyclable), 25.0);
        assert_eq!(profile.packaging_penalty(PackagingKind::Reusable), -15.0);
        assert_eq!(profile.transport_penalty(TransportMode::Air), 30.0);
        assert_eq!(profile.rating_ladder, RatingLadder::default());
    }

    #[test]
    fn malformed_profile_is_rejected() {
        let err = ScoringProfile::from_json("{ not json").expect_err("parse fails");
        assert!(matches!(err, ProfileError::Parse(_)));
    }

    #[test]
    fn default_profile_passes_validation() {
        assert!(ScoringProfile::default().validate().is_ok());
    }

    #[test]
    fn default_weights_must_sum_to_one() {
        let err = ScoringProfile::from_json(
            r#"{ "default_weights": { "gwp_weight": 0.9, "circularity_weight": 0.9, "cost_weight": 0.9 } }"#,
        )
        .expect_err("sum of 2.7 rejected");
        assert!(matches!(err, ProfileError::Invalid(_)));
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn default_weights_must_stay_in_unit_range() {
        let err = ScoringProfile::from_json(
            r#"{ "default_weights": { "gwp_weight": 1.5, "circularity_weight": -0.2, "cost_weight": -0.3 } }"#,
        )
        .expect_err("out of range weight rejected");
        assert!(err.to_string().contains("default_weights.gwp_weight"));
    }

    #[test]
    fn rating_ladder_must_descend() {
        let err = ScoringProfile::from_json(r#"{ "rating_ladder": { "A": 10 } }"#)
            .expect_err("A below B rejected");
        assert!(matches!(err, ProfileError::Invalid(_)));
        assert!(err.to_string().contains("rating_ladder A"));

        let tied = ScoringProfile::from_json(r#"{ "rating_ladder": { "A": 60, "B": 60 } }"#)
            .expect("equal rungs are allowed");
        assert_eq!(tied.rating_ladder.a, 60.0);
    }

    #[test]
    fn rule_suggestion_cap_is_bounded() {
        let err = ScoringProfile::from_json(r#"{ "max_rule_suggestions": 7 }"#)
            .expect_err("cap above four rejected");
        assert!(matches!(err, ProfileError::Invalid(_)));

        let fewer = ScoringProfile::from_json(r#"{ "max_rule_suggestions": 2 }"#)
            .expect("smaller cap allowed");
        assert_eq!(fewer.max_rule_suggestions, 2);
    }
}
