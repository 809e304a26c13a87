use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and describe the pipeline series.
    pub fn init(max_issue_cap: usize) -> anyhow::Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!("analyze_requests_total", "Analyze calls received.");
        describe_counter!("analyze_issues_total", "Issues returned to callers.");
        describe_counter!("analyze_errors_total", "Failed analyze calls, by error kind.");
        describe_counter!(
            "analyze_duplicates_removed_total",
            "Plain-text issues dropped as literal duplicates."
        );
        describe_counter!(
            "classifier_fallback_total",
            "Source labels that fell back to the default platform."
        );

        // Static gauge with the largest configured plan cap
        gauge!("plan_max_issue_cap").set(max_issue_cap as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
