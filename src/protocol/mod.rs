//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for Epson ESC/POS thermal receipt printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Basic printer commands (init, margin, feed, cut)
//! - [`text`]: Alignment, character size and encoded text lines
//! - [`cp437`]: Unicode to PC437 text encoding
//!
//! ## Usage Example
//!
//! ```
//! use recibo::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(text::Alignment::Center));
//! data.extend(text::size(2, 2));
//! data.extend(text::line("RECIBO"));
//! data.extend(text::size_normal());
//! data.extend(commands::feed_lines(4));
//! data.extend(commands::cut_full());
//!
//! // Send `data` to the printer via a transport...
//! ```

pub mod commands;
pub mod cp437;
pub mod text;
