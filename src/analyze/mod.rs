// src/analyze/mod.rs
//! Analysis pipeline entry: one model query, then shape detection →
//! normalization → deduplication over the returned text.

pub mod classifier;
pub mod dedup;
pub mod model_client;
pub mod normalizer;
pub mod response;
pub mod synthesizer;

use chrono::{DateTime, Utc};
use metrics::counter;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{PlanTable, PlanTier};
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::prompt::build_prompt;
use crate::types::Issue;

// Re-export convenient types.
pub use crate::analyze::classifier::classify;
pub use crate::analyze::dedup::dedupe;
pub use crate::analyze::model_client::{DynModelClient, ModelClient, ModelRequest};
pub use crate::analyze::response::{detect, RawResponse};
pub use crate::analyze::synthesizer::Synthesizer;

/// What the caller asks for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub product: String,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub competitor: Option<String>,
}

/// Which normalization path produced the issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Structured,
    PlainText,
}

impl ResponseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseMode::Structured => "structured",
            ResponseMode::PlainText => "plain_text",
        }
    }
}

/// Result of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub product: String,
    pub plan: PlanTier,
    pub mode: ResponseMode,
    pub issues: Vec<Issue>,
    pub duplicates_removed: usize,
}

/// Sole entry point: validate, build the prompt, query the model once,
/// then normalize whatever came back.
pub async fn analyze(
    client: &dyn ModelClient,
    plans: &PlanTable,
    request: &AnalyzeRequest,
) -> AnalyzeResult<Analysis> {
    counter!("analyze_requests_total").increment(1);
    let out = analyze_inner(client, plans, request).await;
    match &out {
        Ok(a) => {
            counter!("analyze_issues_total").increment(a.issues.len() as u64);
            counter!("analyze_duplicates_removed_total").increment(a.duplicates_removed as u64);
        }
        Err(e) => {
            warn!(kind = e.kind(), provider = client.provider_name(), error = %e, "analysis failed");
            counter!("analyze_errors_total", "kind" => e.kind()).increment(1);
        }
    }
    out
}

async fn analyze_inner(
    client: &dyn ModelClient,
    plans: &PlanTable,
    request: &AnalyzeRequest,
) -> AnalyzeResult<Analysis> {
    let product = request.product.trim();
    if product.is_empty() {
        return Err(AnalyzeError::Validation("product name must not be empty".into()));
    }

    let (tier, plan) = plans.resolve(request.plan.as_deref());
    let prompt = build_prompt(product, request.competitor.as_deref(), plan);
    debug!(plan = %tier, max_issues = plan.max_issues, "prompt built");

    let payload = client
        .query(&ModelRequest {
            product,
            prompt: &prompt,
            allowed_source_types: &plan.allowed_source_types,
        })
        .await?;

    // Everything below is synchronous; the thread-local RNG never crosses an await.
    let mut rng = rand::rng();
    let (mode, issues, duplicates_removed) =
        process_payload(&payload, &Synthesizer::default(), Utc::now(), &mut rng)?;

    info!(
        plan = %tier,
        provider = client.provider_name(),
        mode = mode.as_str(),
        issues = issues.len(),
        duplicates_removed,
        "analysis complete"
    );

    Ok(Analysis {
        product: product.to_string(),
        plan: tier,
        mode,
        issues,
        duplicates_removed,
    })
}

/// Pure part of the pipeline over an already-retrieved payload.
/// Returns (mode, issues, duplicates_removed).
///
/// Issue caps belong to the prompt and are not enforced here.
pub fn process_payload<R: Rng>(
    payload: &str,
    synth: &Synthesizer,
    now: DateTime<Utc>,
    rng: &mut R,
) -> AnalyzeResult<(ResponseMode, Vec<Issue>, usize)> {
    match detect(payload)? {
        RawResponse::Structured(raw) => {
            let issues = normalizer::normalize_structured(raw, synth, now, rng)?;
            Ok((ResponseMode::Structured, issues, 0))
        }
        RawResponse::PlainText(text) => {
            let issues = normalizer::normalize_plain_text(&text, now);
            if issues.is_empty() {
                return Err(AnalyzeError::Format(
                    "no numbered items or paragraphs in model response".into(),
                ));
            }
            let (issues, removed) = dedupe(issues);
            Ok((ResponseMode::PlainText, issues, removed))
        }
    }
}
