use crate::auth_gate::CallerIdentity;
use crate::domain::analytics::driving_ports::AnalyticsPort;
use crate::domain::clock::SystemClock;
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_analytics_driven_ports::DbTaskStatsReader;
use crate::routing_utils::{ApiErrorResponse, BasicErrorResponse, Json};
use crate::{AppState, SharedData, domain, dto};
use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Router};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

#[derive(OpenApi)]
#[openapi(
    paths(get_task_stats, get_task_trends),
    components(schemas(
        dto::StatusStat,
        dto::PriorityStat,
        dto::CategoryStat,
        dto::TaskStatsResponse,
        dto::TaskTrendsResponse
    ))
)]
pub struct AnalyticsApi;
/// Constant used to group analytics endpoints in OpenAPI documentation
pub const ANALYTICS_API_GROUP: &str = "Analytics";

/// Adds the per-caller aggregation routes. Must sit behind the auth gate.
pub fn analytics_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/stats",
            get(
                |State(app_state): AppState, Extension(caller): Extension<CallerIdentity>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let analytics_service = domain::analytics::AnalyticsService {
                        clock: SystemClock,
                    };

                    get_task_stats(caller.id, &mut ext_cxn, &analytics_service).await
                },
            ),
        )
        .route(
            "/trends",
            get(
                |State(app_state): AppState, Extension(caller): Extension<CallerIdentity>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let analytics_service = domain::analytics::AnalyticsService {
                        clock: SystemClock,
                    };

                    get_task_trends(caller.id, &mut ext_cxn, &analytics_service).await
                },
            ),
        )
}

/// Counts the caller's tasks by status, priority and category
#[utoipa::path(
    get,
    path = "/api/analytics/stats",
    tag = ANALYTICS_API_GROUP,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Grouped task counts", body = dto::TaskStatsResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn get_task_stats(
    owner_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    analytics_service: &impl AnalyticsPort,
) -> Result<Json<dto::TaskStatsResponse>, ApiErrorResponse> {
    info!("Computing task stats");
    let stats = analytics_service
        .task_stats(owner_id, &mut *ext_cxn, &DbTaskStatsReader {})
        .await?;

    Ok(Json(stats.into()))
}

/// Creation and completion timestamps from the last 30 days
#[utoipa::path(
    get,
    path = "/api/analytics/trends",
    tag = ANALYTICS_API_GROUP,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Trailing activity", body = dto::TaskTrendsResponse),
        (status = 401, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    )
)]
async fn get_task_trends(
    owner_id: Uuid,
    ext_cxn: &mut impl ExternalConnectivity,
    analytics_service: &impl AnalyticsPort,
) -> Result<Json<dto::TaskTrendsResponse>, ApiErrorResponse> {
    info!("Computing task trends");
    let trends = analytics_service
        .task_trends(owner_id, &mut *ext_cxn, &DbTaskStatsReader {})
        .await?;

    Ok(Json(trends.into()))
}
