//! # Recibo - Branch Operation Ledger and Thermal Receipts
//!
//! Recibo records cash operations at a bank branch and prints a receipt for
//! each one on an Epson ESC/POS thermal printer over USB serial. It provides:
//!
//! - **Ledger**: durable store that issues sequential `216-NNNNNN` numbers
//! - **Receipts**: ESC/POS ticket encoding for a stored operation
//! - **Session**: one serial link to the printer, one ticket per request
//! - **Preview**: the same record as grouped plain text for screens
//!
//! ## Quick Start
//!
//! ```no_run
//! use recibo::{
//!     ledger::OperationLedger,
//!     printer::PrinterConfig,
//!     session::ThermalSession,
//!     transport::{DeviceFilter, SerialConnector},
//! };
//! # fn input() -> recibo::model::OperationInput { unimplemented!() }
//!
//! let ledger = OperationLedger::open("data/operaciones.json")?;
//!
//! let op = input();
//! op.validate()?;
//! let record = ledger.append(op)?;
//! println!("{}", recibo::preview::render_text(&record));
//!
//! let config = PrinterConfig::TM_T20II;
//! let mut session = ThermalSession::new(config, SerialConnector::new(&config));
//! if session.connect(&DeviceFilter::from(&config)) {
//!     session.print(&record)?;
//! }
//!
//! # Ok::<(), recibo::ReciboError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | Operation input, records and operation numbers |
//! | [`ledger`] | Number issuance and persistent record store |
//! | [`receipt`] | ESC/POS ticket layout |
//! | [`protocol`] | ESC/POS command builders |
//! | [`session`] | Thermal printer connection lifecycle |
//! | [`transport`] | Serial device discovery and writes |
//! | [`printer`] | Printer configurations |
//! | [`preview`] | Plain-text record preview |
//! | [`format`] | Amount formatting per output channel |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently tested with:
//! - Epson TM-T20II (80mm paper, 203 DPI, USB serial)

pub mod error;
pub mod format;
pub mod ledger;
pub mod model;
pub mod preview;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod server;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use error::ReciboError;
pub use ledger::OperationLedger;
pub use printer::PrinterConfig;
pub use session::ThermalSession;
pub use transport::{DeviceFilter, SerialConnector};
