//! Operation ledger handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ReciboError,
    ledger::{LedgerStats, OperationLedger},
    model::{OperationInput, ReceiptRecord},
    preview,
};

use super::super::state::AppState;
use super::{ApiError, run_blocking};

/// Query string for the history listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `recent` for newest first; anything else is insertion order
    pub order: Option<String>,
}

fn find(ledger: &OperationLedger, id: Uuid) -> Result<ReceiptRecord, ReciboError> {
    ledger
        .by_id(id)?
        .ok_or_else(|| ReciboError::NotFound(format!("No operation with id {}", id)))
}

/// POST /api/operations - validate, number and store an operation.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(input): Json<OperationInput>,
) -> Result<(StatusCode, Json<ReceiptRecord>), ApiError> {
    let ledger = state.ledger.clone();
    let record = run_blocking(move || {
        input.validate()?;
        ledger.append(input)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/operations - list stored operations.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ReceiptRecord>>, ApiError> {
    let ledger = state.ledger.clone();
    let recent = query.order.as_deref() == Some("recent");
    let records = run_blocking(move || {
        if recent {
            ledger.recent_first()
        } else {
            ledger.all()
        }
    })
    .await?;
    Ok(Json(records))
}

/// GET /api/operations/:id - one record.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceiptRecord>, ApiError> {
    let ledger = state.ledger.clone();
    let record = run_blocking(move || find(&ledger, id)).await?;
    Ok(Json(record))
}

/// GET /api/operations/:id/preview - plain-text preview.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ledger = state.ledger.clone();
    let record = run_blocking(move || find(&ledger, id)).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        preview::render_text(&record),
    ))
}

/// POST /api/operations/:id/print - send the ticket to the printer.
///
/// A print failure leaves the stored record untouched.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceiptRecord>, ApiError> {
    let ledger = state.ledger.clone();
    let printer = state.printer.clone();
    let record = run_blocking(move || {
        let record = find(&ledger, id)?;
        let mut session = super::printer::lock(&printer)?;
        session.print(&record)?;
        Ok(record)
    })
    .await?;
    Ok(Json(record))
}

/// GET /api/stats - aggregate view of the ledger.
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<LedgerStats>, ApiError> {
    let ledger = state.ledger.clone();
    let stats = run_blocking(move || ledger.stats()).await?;
    Ok(Json(stats))
}
