//! # Thermal Print Session
//!
//! One serial connection to one ESC/POS printer, through which exactly one
//! ticket is sent per print request.
//!
//! ## States
//!
//! ```text
//!                connect            open ok
//! Disconnected ──────────► Connecting ──────► Connected ◄─────┐
//!      ▲                       │                 │ print      │ done / write failed,
//!      │        declined / no  │                 ▼            │ port still present
//!      ├───────────────────────┘            Transmitting ─────┘
//!      │                                         │
//!      └───────── disconnect (any state) ◄───────┘ write failed, port gone
//! ```
//!
//! Thermal paper cannot be un-printed: a failed transmission is reported,
//! never retried. A print failure has no effect on the ledger record.
//!
//! ## Example
//!
//! ```no_run
//! use recibo::printer::PrinterConfig;
//! use recibo::session::ThermalSession;
//! use recibo::transport::{DeviceFilter, SerialConnector};
//! # fn record() -> recibo::model::ReceiptRecord { unimplemented!() }
//!
//! let config = PrinterConfig::TM_T20II;
//! let mut session = ThermalSession::new(config, SerialConnector::new(&config));
//!
//! if session.connect(&DeviceFilter::from(&config)) {
//!     session.print_receipt(&record());
//!     session.disconnect();
//! }
//! ```

use serde::Serialize;

use crate::error::ReciboError;
use crate::model::ReceiptRecord;
use crate::printer::PrinterConfig;
use crate::receipt;
use crate::transport::{Connector, DeviceFilter, Transport};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Transmitting,
}

/// # Thermal Session
///
/// Owns the printer link exclusively. The boolean methods (`connect`,
/// `print_receipt`, `test_print`) report expected failures as `false`; the
/// `Result` methods (`open`, `print`, `print_test_page`) carry the reason.
pub struct ThermalSession {
    config: PrinterConfig,
    connector: Box<dyn Connector>,
    transport: Option<Box<dyn Transport>>,
    state: SessionState,
}

impl ThermalSession {
    pub fn new<C: Connector + 'static>(config: PrinterConfig, connector: C) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            transport: None,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Open a device matching `filter`.
    ///
    /// Rejected with [`ReciboError::InvalidState`] while a link is held.
    pub fn open(&mut self, filter: &DeviceFilter) -> Result<(), ReciboError> {
        if self.transport.is_some() {
            return Err(ReciboError::InvalidState(
                "Printer already connected; disconnect first".to_string(),
            ));
        }

        self.state = SessionState::Connecting;
        match self.connector.open(filter, &self.config.line) {
            Ok(transport) => {
                self.transport = Some(transport);
                self.state = SessionState::Connected;
                tracing::info!(
                    printer = self.config.name,
                    vendor_id = filter.usb_vendor_id,
                    baud = self.config.line.baud_rate,
                    "Printer connected"
                );
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Open a device matching `filter`; `false` if none could be opened.
    pub fn connect(&mut self, filter: &DeviceFilter) -> bool {
        match self.open(filter) {
            Ok(()) => true,
            Err(ReciboError::DeviceUnavailable(reason)) => {
                tracing::debug!(%reason, "No printer connected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Printer connect rejected");
                false
            }
        }
    }

    /// Send the ticket for `record`.
    pub fn print(&mut self, record: &ReceiptRecord) -> Result<(), ReciboError> {
        self.ensure_connected()?;
        let data = receipt::encode(record, &self.config);
        self.transmit(&data)?;
        tracing::info!(
            operation_number = %record.operation_number,
            bytes = data.len(),
            "Receipt printed"
        );
        Ok(())
    }

    /// Send the ticket for `record`; `false` on any failure.
    pub fn print_receipt(&mut self, record: &ReceiptRecord) -> bool {
        match self.print(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    operation_number = %record.operation_number,
                    error = %e,
                    "Receipt not printed"
                );
                false
            }
        }
    }

    /// Send the fixed test page.
    pub fn print_test_page(&mut self) -> Result<(), ReciboError> {
        self.ensure_connected()?;
        self.transmit(&receipt::test_page(&self.config))
    }

    /// Send the fixed test page; `false` on any failure.
    pub fn test_print(&mut self) -> bool {
        match self.print_test_page() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Test page not printed");
                false
            }
        }
    }

    /// Release the link. Safe to call repeatedly and from any state.
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                tracing::debug!(error = %e, "Error while closing printer link");
            }
            tracing::info!(printer = self.config.name, "Printer disconnected");
        }
        self.state = SessionState::Disconnected;
    }

    fn ensure_connected(&self) -> Result<(), ReciboError> {
        if self.state != SessionState::Connected || self.transport.is_none() {
            return Err(ReciboError::InvalidState(format!(
                "Printer is {:?}, not connected",
                self.state
            )));
        }
        Ok(())
    }

    fn transmit(&mut self, data: &[u8]) -> Result<(), ReciboError> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(ReciboError::InvalidState("No printer link".to_string()));
        };

        self.state = SessionState::Transmitting;
        let result = transport.write_all(data);
        let alive = transport.is_alive();

        match result {
            Ok(()) => {
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(e) => {
                if alive {
                    self.state = SessionState::Connected;
                } else {
                    tracing::warn!("Printer link lost during transmission");
                    self.disconnect();
                }
                Err(match e {
                    ReciboError::Transmission(_) => e,
                    other => ReciboError::Transmission(other.to_string()),
                })
            }
        }
    }
}

impl Drop for ThermalSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::LineSettings;
    use std::sync::{Arc, Mutex};

    /// Shared view of what a fake printer received.
    #[derive(Clone, Default)]
    struct Paper {
        bytes: Arc<Mutex<Vec<u8>>>,
        closes: Arc<Mutex<usize>>,
        opens: Arc<Mutex<usize>>,
    }

    struct FakePort {
        paper: Paper,
        fail_after: Option<usize>,
        alive_after_failure: bool,
        failed: bool,
    }

    impl Transport for FakePort {
        fn write_all(&mut self, data: &[u8]) -> Result<(), ReciboError> {
            let mut bytes = self.paper.bytes.lock().unwrap();
            match self.fail_after {
                Some(limit) if bytes.len() + data.len() > limit => {
                    let room = limit.saturating_sub(bytes.len());
                    bytes.extend_from_slice(&data[..room]);
                    self.failed = true;
                    Err(ReciboError::Transmission("cable pulled".to_string()))
                }
                _ => {
                    bytes.extend_from_slice(data);
                    Ok(())
                }
            }
        }

        fn is_alive(&self) -> bool {
            !self.failed || self.alive_after_failure
        }

        fn close(&mut self) -> Result<(), ReciboError> {
            *self.paper.closes.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct FakeConnector {
        paper: Paper,
        vendor_id: u16,
        fail_after: Option<usize>,
        alive_after_failure: bool,
    }

    impl Connector for FakeConnector {
        fn open(
            &mut self,
            filter: &DeviceFilter,
            line: &LineSettings,
        ) -> Result<Box<dyn Transport>, ReciboError> {
            assert_eq!(*line, LineSettings::BAUD_9600_8N1);
            if filter.usb_vendor_id != self.vendor_id {
                return Err(ReciboError::DeviceUnavailable("no such device".to_string()));
            }
            *self.paper.opens.lock().unwrap() += 1;
            Ok(Box::new(FakePort {
                paper: self.paper.clone(),
                fail_after: self.fail_after,
                alive_after_failure: self.alive_after_failure,
                failed: false,
            }))
        }
    }

    fn session(fail_after: Option<usize>, alive_after_failure: bool) -> (ThermalSession, Paper) {
        let paper = Paper::default();
        let connector = FakeConnector {
            paper: paper.clone(),
            vendor_id: 0x04b8,
            fail_after,
            alive_after_failure,
        };
        (ThermalSession::new(PrinterConfig::TM_T20II, connector), paper)
    }

    const EPSON: DeviceFilter = DeviceFilter { usb_vendor_id: 0x04b8 };

    #[test]
    fn test_connect_and_test_print() {
        let (mut session, paper) = session(None, true);
        assert!(session.connect(&EPSON));
        assert_eq!(session.state(), SessionState::Connected);

        assert!(session.test_print());
        assert_eq!(
            *paper.bytes.lock().unwrap(),
            receipt::test_page(&PrinterConfig::TM_T20II)
        );
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[test]
    fn test_connect_non_matching_device() {
        let (mut session, paper) = session(None, true);
        assert!(!session.connect(&DeviceFilter::vendor(0x0403)));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(*paper.opens.lock().unwrap(), 0);
    }

    #[test]
    fn test_second_connect_rejected() {
        let (mut session, paper) = session(None, true);
        assert!(session.connect(&EPSON));
        assert!(!session.connect(&EPSON));
        assert!(matches!(
            session.open(&EPSON),
            Err(ReciboError::InvalidState(_))
        ));
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(*paper.opens.lock().unwrap(), 1);
    }

    #[test]
    fn test_print_while_disconnected_writes_nothing() {
        let (mut session, paper) = session(None, true);
        assert!(!session.test_print());
        assert!(matches!(
            session.print_test_page(),
            Err(ReciboError::InvalidState(_))
        ));
        assert!(paper.bytes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let (mut session, paper) = session(None, true);
        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);

        assert!(session.connect(&EPSON));
        session.disconnect();
        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(*paper.closes.lock().unwrap(), 1);

        // Reconnect after disconnect works
        assert!(session.connect(&EPSON));
    }

    #[test]
    fn test_failed_write_port_still_present() {
        let (mut session, paper) = session(Some(5), true);
        assert!(session.connect(&EPSON));

        let err = session.print_test_page().unwrap_err();
        assert!(matches!(err, ReciboError::Transmission(_)));
        assert_eq!(session.state(), SessionState::Connected);
        // Partial output stays on paper; nothing is resent
        assert_eq!(paper.bytes.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_failed_write_port_gone() {
        let (mut session, paper) = session(Some(5), false);
        assert!(session.connect(&EPSON));

        assert!(!session.test_print());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(*paper.closes.lock().unwrap(), 1);
    }

    #[test]
    fn test_drop_closes_link() {
        let (mut session, paper) = session(None, true);
        assert!(session.connect(&EPSON));
        drop(session);
        assert_eq!(*paper.closes.lock().unwrap(), 1);
    }
}
