//! # Printer Transport Layer
//!
//! Communication backends for sending ticket bytes to a printer.
//!
//! A [`Connector`] finds and opens a device matching a [`DeviceFilter`]; the
//! resulting [`Transport`] is owned by exactly one
//! [`ThermalSession`](crate::session::ThermalSession) until it disconnects.
//!
//! ## Available Transports
//!
//! - [`serial`]: USB serial TTY (Linux), selected by USB vendor id

pub mod serial;

pub use serial::{SerialConnector, SerialTransport};

use crate::error::ReciboError;
use crate::printer::{LineSettings, PrinterConfig};

/// Which device a connector may open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFilter {
    pub usb_vendor_id: u16,
}

impl DeviceFilter {
    pub fn vendor(usb_vendor_id: u16) -> Self {
        Self { usb_vendor_id }
    }
}

impl From<&PrinterConfig> for DeviceFilter {
    fn from(config: &PrinterConfig) -> Self {
        Self::vendor(config.usb_vendor_id)
    }
}

/// An open, writable link to a printer.
pub trait Transport: Send {
    /// Send every byte of `data`, in as many writes as the link needs.
    fn write_all(&mut self, data: &[u8]) -> Result<(), ReciboError>;

    /// Whether the underlying device is still present after a failure.
    fn is_alive(&self) -> bool;

    /// Flush and release the link.
    fn close(&mut self) -> Result<(), ReciboError>;
}

/// Finds and opens a device for a [`DeviceFilter`].
pub trait Connector: Send {
    /// Open a device matching `filter` with the given line settings.
    ///
    /// Returns [`ReciboError::DeviceUnavailable`] when nothing matches or
    /// the device cannot be opened.
    fn open(
        &mut self,
        filter: &DeviceFilter,
        line: &LineSettings,
    ) -> Result<Box<dyn Transport>, ReciboError>;
}
