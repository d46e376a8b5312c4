//! # HTTP Server for Operations and Receipt Printing
//!
//! JSON API over the ledger and the shared thermal session.
//!
//! ## Usage
//!
//! ```bash
//! recibo serve --listen 0.0.0.0:8080 --store data/operaciones.json
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | POST | `/api/operations` | validate and append (201) |
//! | GET | `/api/operations?order=recent` | history |
//! | GET | `/api/operations/:id` | one record by id |
//! | GET | `/api/operations/:id/preview` | plain-text preview |
//! | POST | `/api/operations/:id/print` | print the ticket |
//! | GET | `/api/stats` | count, total, last record |
//! | GET | `/api/printer` | session state |
//! | POST | `/api/printer/connect` | open the serial link |
//! | POST | `/api/printer/disconnect` | close the serial link |
//! | POST | `/api/printer/test` | print the test page |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::ReciboError;

/// Build the API router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Operations API
        .route(
            "/api/operations",
            post(handlers::operations::create).get(handlers::operations::list),
        )
        .route("/api/operations/:id", get(handlers::operations::show))
        .route(
            "/api/operations/:id/preview",
            get(handlers::operations::preview),
        )
        .route("/api/operations/:id/print", post(handlers::operations::print))
        .route("/api/stats", get(handlers::operations::stats))
        // Printer API
        .route("/api/printer", get(handlers::printer::status))
        .route("/api/printer/connect", post(handlers::printer::connect))
        .route("/api/printer/disconnect", post(handlers::printer::disconnect))
        .route("/api/printer/test", post(handlers::printer::test))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use recibo::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), recibo::error::ReciboError> {
/// let config = ServerConfig {
///     store_path: "data/operaciones.json".into(),
///     listen_addr: "0.0.0.0:8080".to_string(),
///     usb_vendor_id: 0x04b8,
///     device_path: None,
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), ReciboError> {
    let app_state = Arc::new(AppState::new(config.clone())?);

    // Try the printer once at boot; the API can reconnect later
    {
        let filter = config.device_filter();
        let session = app_state.printer.clone();
        tokio::task::spawn_blocking(move || {
            if let Ok(mut session) = session.lock() {
                session.connect(&filter);
            }
        })
        .await
        .map_err(|e| ReciboError::DeviceUnavailable(format!("Task error: {}", e)))?;
    }

    let app = router(app_state);

    tracing::info!(
        listen = %config.listen_addr,
        store = %config.store_path.display(),
        vendor_id = config.usb_vendor_id,
        "Recibo HTTP server starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            ReciboError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", config.listen_addr, e),
            ))
        })?;

    axum::serve(listener, app).await.map_err(|e| {
        ReciboError::Io(std::io::Error::other(format!("Server error: {}", e)))
    })?;

    Ok(())
}
