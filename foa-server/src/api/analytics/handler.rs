//! Analytics handlers
//!
//! Every report is recomputed from the order and customer collections on
//! each request.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::analytics;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{FoodTally, MonthlyFoodOrders, RevenueReport, Widget};

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// GET /api/admin/analytics/widgets
pub async fn widgets(State(state): State<ServerState>) -> AppResult<Json<Vec<Widget>>> {
    Ok(Json(analytics::dashboard_widgets(&state.store, state.config.business_offset)?))
}

/// GET /api/admin/analytics/most-purchased - top five foods
pub async fn most_purchased(State(state): State<ServerState>) -> AppResult<Json<Vec<FoodTally>>> {
    Ok(Json(analytics::most_purchased(&state.store)?))
}

/// GET /api/admin/analytics/revenue
pub async fn revenue(State(state): State<ServerState>) -> AppResult<Json<RevenueReport>> {
    Ok(Json(analytics::revenue_report(&state.store)?))
}

/// GET /api/admin/analytics/monthly?year=YYYY - defaults to the current year
pub async fn monthly(
    State(state): State<ServerState>,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<Vec<MonthlyFoodOrders>>> {
    let report = analytics::monthly_report(&state.store, query.year, state.config.business_offset)?;
    Ok(Json(report))
}

/// GET /api/admin/analytics/customers/{id}/top-foods
pub async fn customer_top_foods(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<FoodTally>>> {
    Ok(Json(analytics::customer_top_foods(&state.store, &id)?))
}
