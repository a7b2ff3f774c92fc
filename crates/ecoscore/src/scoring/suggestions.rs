use super::domain::{PackagingKind, ProductRecord, TransportMode};
use super::profile::ScoringProfile;

pub const HIGH_GWP_SUGGESTION: &str = "Switch to lower-carbon materials to cut GWP";
pub const PLASTIC_SUGGESTION: &str = "Replace plastic or styrofoam with recyclable materials";
pub const AIR_TRANSPORT_SUGGESTION: &str = "Move freight from air to ship or rail transport";
pub const PACKAGING_SUGGESTION: &str = "Use recyclable or biodegradable packaging";
pub const WEIGHT_SUGGESTION: &str = "Reduce product weight to lower shipping impact";
pub const CIRCULARITY_SUGGESTION: &str = "Design for reuse and disassembly";
pub const COST_SUGGESTION: &str = "Optimize sourcing to reduce cost";
pub const LOW_SCORE_SUGGESTION: &str = "Review the full supply chain for quick wins";

/// Deterministic advisor output: every rule is checked in a fixed order and the first
/// `max_rule_suggestions` matches are kept.
pub(crate) fn rule_based_suggestions(
    product: &ProductRecord,
    score: f64,
    profile: &ScoringProfile,
) -> Vec<String> {
    let rules = [
        (product.gwp > profile.high_gwp_threshold, HIGH_GWP_SUGGESTION),
        (product.uses_plastic_or_styrofoam(), PLASTIC_SUGGESTION),
        (product.transport == TransportMode::Air, AIR_TRANSPORT_SUGGESTION),
        (
            product.packaging == PackagingKind::NonRecyclable,
            PACKAGING_SUGGESTION,
        ),
        (
            product.weight_grams > profile.weight_threshold_grams,
            WEIGHT_SUGGESTION,
        ),
        (
            product.circularity < profile.low_circularity_threshold,
            CIRCULARITY_SUGGESTION,
        ),
        (product.cost > profile.high_cost_threshold, COST_SUGGESTION),
        (score < profile.low_score_threshold, LOW_SCORE_SUGGESTION),
    ];

    rules
        .into_iter()
        .filter(|(matched, _)| *matched)
        .map(|(_, suggestion)| suggestion.to_string())
        .take(profile.max_rule_suggestions)
        .collect()
}
