use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::dashboard::{self, AdminOverview, DailySummaryQuery, RankDailySummary};
use crate::utils::jwt::Claims;
use crate::AppState;

/// System-wide counts (admin)
pub async fn admin_overview(State(state): State<AppState>) -> AppResult<Json<AdminOverview>> {
    Ok(Json(dashboard::admin_overview(&state.db).await?))
}

/// Trips, passengers and fares of a rank for one day, per route
pub async fn rank_daily_summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(rank_id): Path<Uuid>,
    Query(query): Query<DailySummaryQuery>,
) -> AppResult<Json<RankDailySummary>> {
    Ok(Json(dashboard::rank_daily_summary(&state.db, &claims, rank_id, query).await?))
}
