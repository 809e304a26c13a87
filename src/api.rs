use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::analyze::model_client::build_client_from_config;
use crate::analyze::{self, AnalyzeRequest, DynModelClient, ResponseMode};
use crate::config::{ModelConfig, PlanTable, PlanTier};
use crate::error::AnalyzeError;
use crate::export::{export_filename, render_issues_csv};
use crate::history::{History, HistoryEntry};
use crate::severity::SeverityCounts;
use crate::types::Issue;

#[derive(Clone)]
pub struct AppState {
    pub client: DynModelClient,
    pub plans: Arc<PlanTable>,
    pub history: Arc<History>,
}

impl AppState {
    pub fn new(client: DynModelClient, plans: PlanTable) -> Self {
        Self {
            client,
            plans: Arc::new(plans),
            history: Arc::new(History::with_capacity(500)),
        }
    }

    /// Model + plan config from the environment / default paths.
    pub fn from_env() -> anyhow::Result<Self> {
        let model = ModelConfig::load_default()?;
        let client = build_client_from_config(&model)?;
        let plans = PlanTable::load_default()?;
        Ok(Self::new(client, plans))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze_handler))
        .route("/export", post(export_handler))
        .route("/history", get(history_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResp {
    product: String,
    plan: PlanTier,
    mode: ResponseMode,
    duplicates_removed: usize,
    severity: SeverityCounts,
    issues: Vec<Issue>,
}

#[derive(Serialize)]
struct ErrorResp {
    error: String,
    kind: &'static str,
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = match self {
            AnalyzeError::Validation(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Format(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AnalyzeError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AnalyzeError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorResp {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResp>, AnalyzeError> {
    let a = analyze::analyze(state.client.as_ref(), &state.plans, &body).await?;
    state.history.push(&a);

    Ok(Json(AnalyzeResp {
        severity: SeverityCounts::tally(&a.issues),
        product: a.product,
        plan: a.plan,
        mode: a.mode,
        duplicates_removed: a.duplicates_removed,
        issues: a.issues,
    }))
}

#[derive(Deserialize)]
struct ExportReq {
    product: String,
    issues: Vec<Issue>,
}

async fn export_handler(Json(body): Json<ExportReq>) -> Response {
    match render_issues_csv(&body.issues) {
        Ok(csv) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                export_filename(&body.product)
            );
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = ?e, "csv export failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "export failed").into_response()
        }
    }
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn history_handler(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(q.limit.unwrap_or(10)))
}
