use crate::domain::model::HealthCheckResponse;
use crate::http::AppState;
use axum::extract::State;
use axum::Json;

const HEALTHY: &str = "Healthy";

/// `GET /health`
pub async fn get_health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        service_status: Some(HEALTHY.to_string()),
        dependencies_status: Some(HEALTHY.to_string()),
        app_version: Some(state.app_version.to_string()),
    })
}
