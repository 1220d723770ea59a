//! Overview route: the dashboard's headline metric cards.
//!
//! Every value here is simulated. The cards exist to give the dashboard its
//! health-at-a-glance look; nothing is measured and the numbers never move.

use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// One metric card: a label, a display value, and a delta caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricCard {
    pub label: String,
    pub value: String,
    pub delta: String,
}

impl MetricCard {
    fn new(label: &str, value: &str, delta: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            delta: delta.to_string(),
        }
    }
}

/// Response for the overview endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    /// Headline cards, in display order
    pub metrics: Vec<MetricCard>,
    /// Daemon status banner
    pub daemon_status: String,
}

impl OverviewResponse {
    /// The fixed dashboard numbers.
    pub fn simulated() -> Self {
        Self {
            metrics: vec![
                MetricCard::new("Auto-Fixes Today", "72", "+5%"),
                MetricCard::new("Diagnosis Accuracy", "99.92%", "+0.02%"),
                MetricCard::new("System Uptime", "99.99%", "Stable"),
            ],
            daemon_status: "Daemon: Active".to_string(),
        }
    }
}

/// System overview metrics for the dashboard landing view
#[utoipa::path(
    get,
    path = "/overview",
    responses(
        (status = 200, description = "Simulated system metrics", body = OverviewResponse)
    )
)]
pub async fn get_overview() -> Json<OverviewResponse> {
    Json(OverviewResponse::simulated())
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/overview", get(get_overview))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_metrics_are_fixed() {
        let overview = OverviewResponse::simulated();
        assert_eq!(overview.metrics.len(), 3);
        assert_eq!(
            overview.metrics[0],
            MetricCard::new("Auto-Fixes Today", "72", "+5%")
        );
        assert_eq!(overview.metrics[1].value, "99.92%");
        assert_eq!(overview.metrics[2].delta, "Stable");
        assert_eq!(overview.daemon_status, "Daemon: Active");

        // Two calls, same numbers: nothing is measured.
        let again = OverviewResponse::simulated();
        assert_eq!(overview.metrics, again.metrics);
    }
}
