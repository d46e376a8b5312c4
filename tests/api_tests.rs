//! # HTTP API Tests
//!
//! Drives the router with `tower::ServiceExt::oneshot`, backed by a ledger
//! in a temp dir and an in-memory printer.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use recibo::printer::LineSettings;
use recibo::server::{AppState, ServerConfig, router};
use recibo::transport::{Connector, Transport};
use recibo::{DeviceFilter, OperationLedger, PrinterConfig, ReciboError, ThermalSession};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

#[derive(Clone, Default)]
struct Port {
    written: Arc<Mutex<Vec<u8>>>,
    absent: bool,
}

impl Transport for Port {
    fn write_all(&mut self, data: &[u8]) -> Result<(), ReciboError> {
        self.written.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        true
    }

    fn close(&mut self) -> Result<(), ReciboError> {
        Ok(())
    }
}

impl Connector for Port {
    fn open(
        &mut self,
        _filter: &DeviceFilter,
        _line: &LineSettings,
    ) -> Result<Box<dyn Transport>, ReciboError> {
        if self.absent {
            return Err(ReciboError::DeviceUnavailable("unplugged".to_string()));
        }
        Ok(Box::new(self.clone()))
    }
}

fn app(port: Port) -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("operaciones.json");
    let config = ServerConfig {
        store_path: store_path.clone(),
        listen_addr: "127.0.0.1:0".to_string(),
        usb_vendor_id: 0x04b8,
        device_path: None,
    };
    let ledger = OperationLedger::open(&store_path).unwrap();
    let session = ThermalSession::new(PrinterConfig::TM_T20II, port);
    let state = AppState::with_parts(config, ledger, session);
    (dir, router(Arc::new(state)))
}

fn deposit(amount: &str) -> Value {
    json!({
        "branch": "MIRAFLORES",
        "accountNumber": "2003004005006",
        "clientName": "Ana Quispe",
        "documentType": "DNI",
        "documentNumber": "45678912",
        "operationType": "DEPOSIT",
        "currency": "SOL",
        "amount": amount,
        "paymentMethod": "CASH",
        "cashReceived": amount
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// OPERATIONS
// ============================================================================

#[tokio::test]
async fn test_create_and_fetch() {
    let (_dir, app) = app(Port::default());

    let (status, created) = send_json(&app, "POST", "/api/operations", Some(deposit("150.00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["operationNumber"], "216-000001");
    assert_eq!(created["amount"], "150.00");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send_json(&app, "GET", &format!("/api/operations/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let (_dir, app) = app(Port::default());
    let mut body = deposit("150.00");
    body["accountNumber"] = json!("123");

    let (status, _) = send(&app, "POST", "/api/operations", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = send_json(&app, "GET", "/api/stats", None).await;
    assert_eq!(stats["count"], 0);
}

#[tokio::test]
async fn test_create_rejects_control_characters() {
    let (_dir, app) = app(Port::default());
    let mut body = deposit("150.00");
    body["branch"] = json!("MIRAFLORES\u{1d}V\u{0}\nEXTRA");

    let (status, _) = send(&app, "POST", "/api/operations", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = send_json(&app, "GET", "/api/operations", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_list_order_and_stats() {
    let (_dir, app) = app(Port::default());
    for amount in ["10.00", "20.50", "5.25"] {
        send(&app, "POST", "/api/operations", Some(deposit(amount))).await;
    }

    let (_, all) = send_json(&app, "GET", "/api/operations", None).await;
    let (_, recent) = send_json(&app, "GET", "/api/operations?order=recent", None).await;
    let numbers = |v: &Value| -> Vec<String> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r["operationNumber"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(numbers(&all), vec!["216-000001", "216-000002", "216-000003"]);
    assert_eq!(numbers(&recent), vec!["216-000003", "216-000002", "216-000001"]);

    let (status, stats) = send_json(&app, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["count"], 3);
    assert_eq!(stats["totalAmount"], "35.75");
    assert_eq!(stats["lastRecord"]["operationNumber"], "216-000003");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (_dir, app) = app(Port::default());
    let (status, _) = send(
        &app,
        "GET",
        "/api/operations/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preview_uses_grouped_amounts() {
    let (_dir, app) = app(Port::default());
    let (_, created) = send_json(&app, "POST", "/api/operations", Some(deposit("1234.50"))).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/operations/{}/preview", id), None).await;
    let text = String::from_utf8(body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("S/ 1,234.50"));
    assert!(text.contains("216-000001"));
}

// ============================================================================
// PRINTING
// ============================================================================

#[tokio::test]
async fn test_print_requires_connection() {
    let port = Port::default();
    let (_dir, app) = app(port.clone());
    let (_, created) = send_json(&app, "POST", "/api/operations", Some(deposit("150.00"))).await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/operations/{}/print", id);

    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, printer) = send_json(&app, "POST", "/api/printer/connect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(printer["state"], "connected");

    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(port.written.lock().unwrap().ends_with(&[0x1D, 0x56, 0x00]));
}

#[tokio::test]
async fn test_printer_lifecycle() {
    let port = Port::default();
    let (_dir, app) = app(port.clone());

    let (_, printer) = send_json(&app, "GET", "/api/printer", None).await;
    assert_eq!(printer["state"], "disconnected");
    assert_eq!(printer["connected"], false);

    send(&app, "POST", "/api/printer/connect", None).await;
    let (status, _) = send(&app, "POST", "/api/printer/connect", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/api/printer/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(port.written.lock().unwrap().starts_with(&[0x1B, 0x40]));

    let (_, printer) = send_json(&app, "POST", "/api/printer/disconnect", None).await;
    assert_eq!(printer["state"], "disconnected");
}

#[tokio::test]
async fn test_connect_without_device() {
    let (_dir, app) = app(Port {
        absent: true,
        ..Port::default()
    });

    let (status, _) = send(&app, "POST", "/api/printer/connect", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (_, printer) = send_json(&app, "GET", "/api/printer", None).await;
    assert_eq!(printer["state"], "disconnected");
}
