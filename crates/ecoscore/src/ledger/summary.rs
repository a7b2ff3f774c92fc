use super::Submission;
use crate::scoring::{PackagingKind, Rating, TransportMode};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MAX_TOP_ISSUES: usize = 5;
const HIGH_GWP_ISSUE_THRESHOLD: f64 = 10.0;
const LOW_CIRCULARITY_ISSUE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_products: usize,
    pub average_score: f64,
    pub ratings: BTreeMap<Rating, usize>,
    pub top_issues: Vec<IssueTag>,
}

impl SummaryStats {
    pub fn empty() -> Self {
        Self {
            total_products: 0,
            average_score: 0.0,
            ratings: BTreeMap::new(),
            top_issues: Vec::new(),
        }
    }
}

/// Recurring sustainability problems tracked across submissions, declared in ranking
/// tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueTag {
    #[serde(rename = "Plastic/Styrofoam used")]
    PlasticOrStyrofoam,
    #[serde(rename = "Air transport")]
    AirTransport,
    #[serde(rename = "Non-recyclable packaging")]
    NonRecyclablePackaging,
    #[serde(rename = "High GWP materials")]
    HighGwp,
    #[serde(rename = "Low circularity")]
    LowCircularity,
}

impl IssueTag {
    pub const ORDERED: [IssueTag; 5] = [
        IssueTag::PlasticOrStyrofoam,
        IssueTag::AirTransport,
        IssueTag::NonRecyclablePackaging,
        IssueTag::HighGwp,
        IssueTag::LowCircularity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IssueTag::PlasticOrStyrofoam => "Plastic/Styrofoam used",
            IssueTag::AirTransport => "Air transport",
            IssueTag::NonRecyclablePackaging => "Non-recyclable packaging",
            IssueTag::HighGwp => "High GWP materials",
            IssueTag::LowCircularity => "Low circularity",
        }
    }

    pub fn applies_to(&self, submission: &Submission) -> bool {
        let product = &submission.product;
        match self {
            IssueTag::PlasticOrStyrofoam => product.uses_plastic_or_styrofoam(),
            IssueTag::AirTransport => product.transport == TransportMode::Air,
            IssueTag::NonRecyclablePackaging => product.packaging == PackagingKind::NonRecyclable,
            IssueTag::HighGwp => product.gwp > HIGH_GWP_ISSUE_THRESHOLD,
            IssueTag::LowCircularity => product.circularity < LOW_CIRCULARITY_ISSUE_THRESHOLD,
        }
    }
}

/// Aggregates the full ledger contents. Issue counts are ranked by frequency; equal counts
/// keep the declaration order of [`IssueTag::ORDERED`].
pub fn summarize(submissions: &[Submission]) -> SummaryStats {
    if submissions.is_empty() {
        return SummaryStats::empty();
    }

    let total_products = submissions.len();
    let score_sum: f64 = submissions.iter().map(|submission| submission.score).sum();
    let average_score = round_one_decimal(score_sum / total_products as f64);

    let mut ratings = BTreeMap::new();
    for submission in submissions {
        *ratings.entry(submission.rating).or_insert(0) += 1;
    }

    let mut issue_counts: Vec<(IssueTag, usize)> = IssueTag::ORDERED
        .into_iter()
        .map(|tag| {
            let count = submissions
                .iter()
                .filter(|submission| tag.applies_to(submission))
                .count();
            (tag, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();
    // Stable sort keeps declaration order among ties.
    issue_counts.sort_by(|left, right| right.1.cmp(&left.1));

    let top_issues = issue_counts
        .into_iter()
        .take(MAX_TOP_ISSUES)
        .map(|(tag, _)| tag)
        .collect();

    SummaryStats {
        total_products,
        average_score,
        ratings,
        top_issues,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
