//! Server state and configuration.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::ReciboError;
use crate::ledger::OperationLedger;
use crate::printer::PrinterConfig;
use crate::session::ThermalSession;
use crate::transport::{DeviceFilter, SerialConnector};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the ledger file (e.g., "data/operaciones.json")
    pub store_path: PathBuf,
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// USB vendor id the printer must report
    pub usb_vendor_id: u16,
    /// Fixed serial device instead of vendor discovery; its vendor id is
    /// still checked when sysfs reports one
    pub device_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn device_filter(&self) -> DeviceFilter {
        DeviceFilter::vendor(self.usb_vendor_id)
    }
}

/// Application state shared across handlers.
///
/// The ledger serializes its own writers; the session sits behind a mutex
/// so only one request at a time owns the printer link.
pub struct AppState {
    pub config: ServerConfig,
    pub ledger: Arc<OperationLedger>,
    pub printer: Arc<Mutex<ThermalSession>>,
}

impl AppState {
    /// Open the ledger and prepare a disconnected printer session.
    pub fn new(config: ServerConfig) -> Result<Self, ReciboError> {
        let ledger = OperationLedger::open(&config.store_path)?;

        let printer = PrinterConfig::TM_T20II;
        let mut connector = SerialConnector::new(&printer);
        if let Some(device) = &config.device_path {
            connector = connector.with_device(device);
        }

        Ok(Self::with_parts(
            config,
            ledger,
            ThermalSession::new(printer, connector),
        ))
    }

    pub fn with_parts(config: ServerConfig, ledger: OperationLedger, session: ThermalSession) -> Self {
        Self {
            config,
            ledger: Arc::new(ledger),
            printer: Arc::new(Mutex::new(session)),
        }
    }
}
