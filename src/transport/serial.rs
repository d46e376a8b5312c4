//! # USB Serial Transport
//!
//! This module talks to ESC/POS printers through the TTY node the kernel
//! creates for a USB serial adapter (`/dev/ttyUSB0`, `/dev/ttyACM0`).
//!
//! ## Device Selection
//!
//! Only devices whose USB vendor id matches the [`DeviceFilter`] are
//! considered. For each entry in `/sys/class/tty`, the `device` link is
//! resolved and its ancestors are searched for an `idVendor` file:
//!
//! ```text
//! /sys/class/tty/ttyUSB0/device -> .../1-1/1-1:1.0/ttyUSB0
//!                                        └── 1-1/idVendor = "04b8"
//! ```
//!
//! The first match (in name order) is opened from `/dev`.
//!
//! A device path given with [`SerialConnector::with_device`] skips the
//! search but not the filter: if sysfs reports a USB vendor id for that node
//! and it differs, the open is refused. Nodes without USB vendor information
//! (on-board UARTs, pseudo terminals) are opened as given.
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary data is transmitted without
//! modification:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR,
//!   ICRNL and XON/XOFF disabled
//! - **No output processing**: OPOST disabled (no CR/LF translation)
//! - **No echo, non-canonical**: ECHO, ECHONL, ICANON, ISIG, IEXTEN disabled
//! - **Line**: speed, data bits, stop bits and parity from [`LineSettings`]
//!
//! ## Chunked Writes
//!
//! Ticket data is written in `chunk_size` pieces with a short pause between
//! them so a 9600 baud link is not flooded.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::{Connector, DeviceFilter, Transport};
use crate::error::ReciboError;
use crate::printer::{LineSettings, Parity, PrinterConfig};

/// Where the kernel lists TTY devices
pub const SYS_TTY_CLASS: &str = "/sys/class/tty";

/// Where device nodes live
pub const DEV_DIR: &str = "/dev";

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// How far up the sysfs tree to look for `idVendor`
const VENDOR_SEARCH_DEPTH: usize = 5;

/// # Serial Printer Transport
///
/// An open TTY configured for raw binary output.
///
/// ## Example
///
/// ```no_run
/// use recibo::printer::LineSettings;
/// use recibo::protocol::commands;
/// use recibo::transport::{SerialTransport, Transport};
///
/// let mut transport =
///     SerialTransport::open("/dev/ttyUSB0", &LineSettings::BAUD_9600_8N1, 64)?;
/// transport.write_all(&commands::init())?;
/// # Ok::<(), recibo::ReciboError>(())
/// ```
pub struct SerialTransport {
    file: File,
    path: PathBuf,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl SerialTransport {
    /// Open and configure a TTY.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - The path is not a TTY, or the line settings are unsupported
    pub fn open<P: AsRef<Path>>(
        device: P,
        line: &LineSettings,
        chunk_size: usize,
    ) -> Result<Self, ReciboError> {
        let path = device.as_ref();

        let file = OpenOptions::new().write(true).open(path).map_err(|e| {
            ReciboError::DeviceUnavailable(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty(file.as_raw_fd(), line)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            chunk_size: chunk_size.max(1),
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), ReciboError> {
        for chunk in data.chunks(self.chunk_size) {
            self.file.write_all(chunk).map_err(|e| {
                ReciboError::Transmission(format!("Write to {} failed: {}", self.path.display(), e))
            })?;

            if !self.chunk_delay.is_zero() {
                thread::sleep(self.chunk_delay);
            }
        }

        self.file
            .flush()
            .map_err(|e| ReciboError::Transmission(format!("Flush failed: {}", e)))
    }

    /// A USB adapter that was unplugged loses its `/dev` node.
    fn is_alive(&self) -> bool {
        self.path.exists()
    }

    fn close(&mut self) -> Result<(), ReciboError> {
        self.file.flush()?;
        Ok(())
    }
}

// ============================================================================
// DEVICE DISCOVERY
// ============================================================================

/// Find the first TTY whose USB vendor id matches `filter`.
///
/// `sys_class` is normally [`SYS_TTY_CLASS`] and `dev_dir` [`DEV_DIR`].
pub fn find_device(sys_class: &Path, dev_dir: &Path, filter: &DeviceFilter) -> Option<PathBuf> {
    let mut names: Vec<_> = fs::read_dir(sys_class)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .collect();
    names.sort();

    names.into_iter().find_map(|name| {
        let device = fs::canonicalize(sys_class.join(&name).join("device")).ok()?;
        (usb_vendor_id(&device)? == filter.usb_vendor_id).then(|| dev_dir.join(&name))
    })
}

/// USB vendor id of the TTY at `node`, if sysfs has one.
///
/// Symlinks such as `/dev/serial/by-id/...` are followed to the real node
/// first.
fn node_vendor_id(sys_class: &Path, node: &Path) -> Option<u16> {
    let node = fs::canonicalize(node).unwrap_or_else(|_| node.to_path_buf());
    let device = fs::canonicalize(sys_class.join(node.file_name()?).join("device")).ok()?;
    usb_vendor_id(&device)
}

/// Read `idVendor` from `dir` or the nearest ancestor that has one.
fn usb_vendor_id(dir: &Path) -> Option<u16> {
    dir.ancestors()
        .take(VENDOR_SEARCH_DEPTH)
        .find_map(|ancestor| fs::read_to_string(ancestor.join("idVendor")).ok())
        .and_then(|raw| u16::from_str_radix(raw.trim(), 16).ok())
}

/// # Serial Connector
///
/// Opens the TTY of the first USB device matching the filter, or a fixed
/// device path when one was given.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    sys_class: PathBuf,
    dev_dir: PathBuf,
    device: Option<PathBuf>,
    chunk_size: usize,
}

impl SerialConnector {
    pub fn new(config: &PrinterConfig) -> Self {
        Self {
            sys_class: PathBuf::from(SYS_TTY_CLASS),
            dev_dir: PathBuf::from(DEV_DIR),
            device: None,
            chunk_size: config.chunk_size,
        }
    }

    /// Search other roots instead of `/sys/class/tty` and `/dev`.
    pub fn with_roots<P: AsRef<Path>, Q: AsRef<Path>>(mut self, sys_class: P, dev_dir: Q) -> Self {
        self.sys_class = sys_class.as_ref().to_path_buf();
        self.dev_dir = dev_dir.as_ref().to_path_buf();
        self
    }

    /// Open `device` instead of searching for one.
    ///
    /// The vendor filter still applies when sysfs knows the node's USB vendor
    /// id; a node with no vendor information is opened without the check.
    pub fn with_device<P: AsRef<Path>>(mut self, device: P) -> Self {
        self.device = Some(device.as_ref().to_path_buf());
        self
    }
}

impl Connector for SerialConnector {
    fn open(
        &mut self,
        filter: &DeviceFilter,
        line: &LineSettings,
    ) -> Result<Box<dyn Transport>, ReciboError> {
        let path = match &self.device {
            Some(path) => {
                match node_vendor_id(&self.sys_class, path) {
                    Some(vendor) if vendor != filter.usb_vendor_id => {
                        return Err(ReciboError::DeviceUnavailable(format!(
                            "{} has USB vendor id {:04x}, expected {:04x}",
                            path.display(),
                            vendor,
                            filter.usb_vendor_id
                        )));
                    }
                    Some(_) => {}
                    None => tracing::debug!(
                        device = %path.display(),
                        "No USB vendor id for device, skipping vendor check"
                    ),
                }
                path.clone()
            }
            None => find_device(&self.sys_class, &self.dev_dir, filter).ok_or_else(|| {
                ReciboError::DeviceUnavailable(format!(
                    "No serial device with USB vendor id {:04x}",
                    filter.usb_vendor_id
                ))
            })?,
        };

        tracing::debug!(device = %path.display(), "Opening serial device");

        let transport = SerialTransport::open(&path, line, self.chunk_size).map_err(|e| match e {
            ReciboError::DeviceUnavailable(_) => e,
            other => ReciboError::DeviceUnavailable(other.to_string()),
        })?;
        Ok(Box::new(transport))
    }
}

// ============================================================================
// TTY CONFIGURATION
// ============================================================================

fn baud_constant(rate: u32) -> Option<libc::speed_t> {
    let speed = match rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        _ => return None,
    };
    Some(speed)
}

/// Configure a file descriptor as a raw serial line.
///
/// Note: IXON/IXOFF/IXANY disable XON/XOFF software flow control; 0x11 and
/// 0x13 may appear in command parameters.
fn configure_tty(fd: i32, line: &LineSettings) -> Result<(), ReciboError> {
    use std::mem::MaybeUninit;

    let speed = baud_constant(line.baud_rate).ok_or_else(|| {
        ReciboError::DeviceUnavailable(format!("Unsupported baud rate {}", line.baud_rate))
    })?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(ReciboError::DeviceUnavailable(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::PARODD | libc::CSTOPB);
    termios.c_cflag |= libc::CLOCAL | libc::CREAD;
    termios.c_cflag |= match line.data_bits {
        5 => libc::CS5,
        6 => libc::CS6,
        7 => libc::CS7,
        _ => libc::CS8,
    };
    if line.stop_bits == 2 {
        termios.c_cflag |= libc::CSTOPB;
    }
    match line.parity {
        Parity::None => {}
        Parity::Even => termios.c_cflag |= libc::PARENB,
        Parity::Odd => termios.c_cflag |= libc::PARENB | libc::PARODD,
    }

    let result = unsafe {
        libc::cfsetispeed(&mut termios, speed) | libc::cfsetospeed(&mut termios, speed)
    };
    if result != 0 {
        return Err(ReciboError::DeviceUnavailable(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(ReciboError::DeviceUnavailable(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
