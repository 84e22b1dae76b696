//! Dashboard handlers: KPIs, daily series and group summaries

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;

use super::filter::FilterQuery;
use crate::{AppError, AppState};
use cogs_core::models::{DailyRow, DictionaryEntry, GroupSummary, Kpis, ProductSummary};
use cogs_core::{report, DashboardFilter, FilteredSlice};

/// Values available to the dashboard selectors
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub sites: Vec<String>,
    pub customers: Vec<String>,
    pub products: Vec<String>,
    pub product_types: Vec<&'static str>,
    pub dictionary: Vec<DictionaryEntry>,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "line_items": state.dataset.line_items.len(),
        "days": state.dataset.daily.len(),
    }))
}

/// GET /api/options - Filter values and date bounds
pub async fn get_options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    let dataset = &state.dataset;
    let bounds = dataset.date_bounds();

    Json(OptionsResponse {
        date_start: bounds.map(|b| b.0),
        date_end: bounds.map(|b| b.1),
        sites: dataset.sites(),
        customers: dataset.customers(),
        products: dataset.products(),
        product_types: vec!["all", "generic", "brand"],
        dictionary: dataset.dictionary.clone(),
    })
}

/// Apply a selection to the shared dataset
pub(crate) fn apply_filter<'a>(
    state: &'a AppState,
    filter: &DashboardFilter,
) -> Result<FilteredSlice<'a>, AppError> {
    filter
        .apply(&state.dataset)
        .map_err(|e| AppError::bad_request(&e.to_string()))
}

/// GET /api/kpis - Headline figures for the selection
pub async fn get_kpis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Kpis>, AppError> {
    let filter = params.to_filter(&state.dataset)?;
    let slice = apply_filter(&state, &filter)?;
    Ok(Json(report::kpis(&slice)))
}

/// GET /api/daily - Daily series with margin columns
pub async fn get_daily(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Vec<DailyRow>>, AppError> {
    let filter = params.to_filter(&state.dataset)?;
    let slice = apply_filter(&state, &filter)?;
    Ok(Json(report::daily_rows(&slice)))
}

/// GET /api/sites - COGS by site
pub async fn get_sites(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Vec<GroupSummary>>, AppError> {
    let filter = params.to_filter(&state.dataset)?;
    let slice = apply_filter(&state, &filter)?;
    Ok(Json(report::site_summary(&slice)))
}

/// GET /api/customers - COGS by customer
pub async fn get_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Vec<GroupSummary>>, AppError> {
    let filter = params.to_filter(&state.dataset)?;
    let slice = apply_filter(&state, &filter)?;
    Ok(Json(report::customer_summary(&slice)))
}

/// GET /api/products - COGS by product
pub async fn get_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Json<Vec<ProductSummary>>, AppError> {
    let filter = params.to_filter(&state.dataset)?;
    let slice = apply_filter(&state, &filter)?;
    Ok(Json(report::product_summary(&slice)))
}
