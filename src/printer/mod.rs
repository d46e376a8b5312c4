//! # Printer Module
//!
//! This module provides printer-specific configurations.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware and serial link specifications

pub mod config;

pub use config::{EPSON_VENDOR_ID, LineSettings, Parity, PrinterConfig};
