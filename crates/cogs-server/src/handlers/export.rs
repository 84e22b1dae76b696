//! Export handler for the filtered line items

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Response, StatusCode},
};
use tracing::info;

use super::dashboard::apply_filter;
use super::filter::FilterQuery;
use crate::{AppError, AppState};
use cogs_core::export::line_items_to_csv;

/// GET /api/export - Download the filtered line items as CSV
pub async fn export_line_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterQuery>,
) -> Result<Response<Body>, AppError> {
    let filter = params.to_filter(&state.dataset)?;
    let slice = apply_filter(&state, &filter)?;

    let csv = line_items_to_csv(&slice.line_items)
        .map_err(|e| AppError::internal(&format!("Export failed: {}", e)))?;

    info!(rows = slice.line_items.len(), "Exported line items");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"filtered_line_items.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&format!("Failed to build response: {}", e)))?;

    Ok(response)
}
