//! Printer session handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    error::ReciboError,
    session::{SessionState, ThermalSession},
};

use super::super::state::AppState;
use super::{ApiError, run_blocking};

/// Session snapshot returned by every printer endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    pub printer: &'static str,
    pub state: SessionState,
    pub connected: bool,
}

impl PrinterStatus {
    fn of(session: &ThermalSession) -> Self {
        Self {
            printer: session.config().name,
            state: session.state(),
            connected: session.is_connected(),
        }
    }
}

pub(super) fn lock(
    printer: &Mutex<ThermalSession>,
) -> Result<MutexGuard<'_, ThermalSession>, ReciboError> {
    printer
        .lock()
        .map_err(|_| ReciboError::InvalidState("Printer session lock poisoned".to_string()))
}

/// GET /api/printer - current session state.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<PrinterStatus>, ApiError> {
    let printer = state.printer.clone();
    let status = run_blocking(move || Ok(PrinterStatus::of(&*lock(&printer)?))).await?;
    Ok(Json(status))
}

/// POST /api/printer/connect - open the configured device.
pub async fn connect(State(state): State<Arc<AppState>>) -> Result<Json<PrinterStatus>, ApiError> {
    let printer = state.printer.clone();
    let filter = state.config.device_filter();
    let status = run_blocking(move || {
        let mut session = lock(&printer)?;
        session.open(&filter)?;
        Ok(PrinterStatus::of(&session))
    })
    .await?;
    Ok(Json(status))
}

/// POST /api/printer/disconnect - release the device.
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrinterStatus>, ApiError> {
    let printer = state.printer.clone();
    let status = run_blocking(move || {
        let mut session = lock(&printer)?;
        session.disconnect();
        Ok(PrinterStatus::of(&session))
    })
    .await?;
    Ok(Json(status))
}

/// POST /api/printer/test - print the fixed test page.
pub async fn test(State(state): State<Arc<AppState>>) -> Result<Json<PrinterStatus>, ApiError> {
    let printer = state.printer.clone();
    let status = run_blocking(move || {
        let mut session = lock(&printer)?;
        session.print_test_page()?;
        Ok(PrinterStatus::of(&session))
    })
    .await?;
    Ok(Json(status))
}
