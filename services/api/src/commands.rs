use clap::Args;
use ecoscore::advisory::DisabledProvider;
use ecoscore::error::AppError;
use ecoscore::intake::batch::read_products_from_path;
use ecoscore::intake::{ScoreRequest, ValidatedRequest};
use ecoscore::ledger::{InMemoryLedger, Submission, SummaryStats};
use ecoscore::scoring::{ScoreBreakdown, ScoringProfile};
use ecoscore::{ScoreResponse, ScoringService, ScoringServiceError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type LocalScoringService = ScoringService<InMemoryLedger, DisabledProvider>;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file shaped like a `POST /score` body
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Optional scoring profile JSON overriding the built-in constants
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one product per row
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Optional scoring profile JSON overriding the built-in constants
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    /// Print the most recent submissions after the summary
    #[arg(long, default_value_t = 0)]
    pub(crate) history: usize,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { input, profile } = args;
    let service = local_service(load_profile(profile)?);

    let raw = std::fs::read_to_string(&input)?;
    let request: ScoreRequest = serde_json::from_str(&raw)?;
    let (breakdown, submission) = score_product(&service, request).await?;

    render_breakdown(&breakdown);
    let response = ScoreResponse::from(&submission);
    println!("\nResult");
    println!("  Product: {}", response.product_name);
    println!("  Score:   {:.1}", response.sustainability_score);
    println!("  Rating:  {}", response.rating);
    if !response.suggestions.is_empty() {
        println!("  Suggestions:");
        for suggestion in &response.suggestions {
            println!("    - {suggestion}");
        }
    }
    Ok(())
}

pub(crate) async fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        profile,
        history,
    } = args;
    let service = local_service(load_profile(profile)?);

    let products = read_products_from_path(&input, &service.scorer().profile().default_weights)?;
    let stats = score_batch(&service, products).await?;

    println!("Scored {} products from {}", stats.total_products, input.display());
    render_summary(&stats);

    if history > 0 {
        println!("\nRecent submissions");
        for submission in service.history(history)? {
            render_submission_line(&submission);
        }
    }
    Ok(())
}

fn load_profile(path: Option<PathBuf>) -> Result<ScoringProfile, AppError> {
    match path {
        Some(path) => ScoringProfile::from_path(&path)
            .map_err(|err| AppError::Config(ecoscore::config::ConfigError::Profile(err))),
        None => Ok(ScoringProfile::default()),
    }
}

fn local_service(profile: ScoringProfile) -> LocalScoringService {
    ScoringService::new(
        Arc::new(InMemoryLedger::new()),
        DisabledProvider,
        profile,
        Duration::from_secs(1),
    )
}

async fn score_product(
    service: &LocalScoringService,
    request: ScoreRequest,
) -> Result<(ScoreBreakdown, Submission), ScoringServiceError> {
    let validated = service.validate(request)?;
    let breakdown = service
        .scorer()
        .breakdown(&validated.product, validated.weights.as_ref());
    let submission = service.score(validated).await?;
    Ok((breakdown, submission))
}

async fn score_batch(
    service: &LocalScoringService,
    products: Vec<ValidatedRequest>,
) -> Result<SummaryStats, ScoringServiceError> {
    for product in products {
        service.score(product).await?;
    }
    service.summary()
}

fn render_breakdown(breakdown: &ScoreBreakdown) {
    println!("Score breakdown");
    println!("  GWP component:          {:>8.2}", breakdown.gwp_component);
    println!("  Circularity component:  {:>8.2}", breakdown.circularity_component);
    println!("  Cost component:         {:>8.2}", breakdown.cost_component);
    println!("  Weighted score:         {:>8.2}", breakdown.weighted_score);
    println!("  Material penalty:       {:>8.2}", -breakdown.material_penalty);
    println!("  Transport penalty:      {:>8.2}", -breakdown.transport_penalty);
    println!("  Packaging penalty:      {:>8.2}", -breakdown.packaging_penalty);
    println!("  Weight penalty:         {:>8.2}", -breakdown.weight_penalty);
    println!("  Raw score:              {:>8.2}", breakdown.raw_score);
}

fn render_summary(stats: &SummaryStats) {
    println!("  Average score: {:.1}", stats.average_score);
    if stats.ratings.is_empty() {
        println!("  Ratings: none");
    } else {
        let ratings: Vec<String> = stats
            .ratings
            .iter()
            .map(|(rating, count)| format!("{rating}={count}"))
            .collect();
        println!("  Ratings: {}", ratings.join(", "));
    }
    if stats.top_issues.is_empty() {
        println!("  Top issues: none");
    } else {
        println!("  Top issues:");
        for (rank, issue) in stats.top_issues.iter().enumerate() {
            println!("    {}. {}", rank + 1, issue.label());
        }
    }
}

fn render_submission_line(submission: &Submission) {
    println!(
        "  #{:<4} {:<32} {:>5.1} {}  ({})",
        submission.id,
        submission.product.name,
        submission.score,
        submission.rating,
        submission.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoscore::intake::batch::read_products;
    use ecoscore::ledger::IssueTag;
    use ecoscore::scoring::Rating;

    const BATCH: &str = "\
product_name,materials,weight_grams,transport,packaging,gwp,cost,circularity
Reusable Bottle,aluminum;plastic,300,ship,recyclable,5,10,80
High Impact Product,plastic;steel,1000,air,non-recyclable,15,5,20
";

    fn scenario_a() -> ScoreRequest {
        serde_json::from_str(
            r#"{
                "product_name": "Reusable Bottle",
                "materials": ["aluminum", "plastic"],
                "weight_grams": 300,
                "transport": "ship",
                "packaging": "recyclable",
                "gwp": 5,
                "cost": 10,
                "circularity": 80
            }"#,
        )
        .expect("request parses")
    }

    #[tokio::test]
    async fn score_product_returns_breakdown_and_submission() {
        let service = local_service(ScoringProfile::default());
        let (breakdown, submission) = score_product(&service, scenario_a())
            .await
            .expect("scores");

        assert_eq!(breakdown.score, submission.score);
        assert!((breakdown.weighted_score - 94.2).abs() < 1e-9);
        assert_eq!(submission.rating, Rating::B);
        assert_eq!(service.history(10).expect("history").len(), 1);
    }

    #[tokio::test]
    async fn score_product_surfaces_validation_errors() {
        let service = local_service(ScoringProfile::default());
        let mut request = scenario_a();
        request.transport = Some("teleport".to_string());

        let err = score_product(&service, request)
            .await
            .expect_err("invalid transport");
        assert!(matches!(err, ScoringServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn score_batch_summarizes_every_row() {
        let service = local_service(ScoringProfile::default());
        let products = read_products(BATCH.as_bytes(), &service.scorer().profile().default_weights)
            .expect("batch parses");

        let stats = score_batch(&service, products).await.expect("batch scores");
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.average_score, 34.6);
        assert_eq!(stats.top_issues.first(), Some(&IssueTag::PlasticOrStyrofoam));
    }
}
