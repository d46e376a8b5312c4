//! # Receipt Tickets
//!
//! Turns a [`ReceiptRecord`] into the ESC/POS byte stream for the thermal
//! printer, plus the fixed test page used to check the printer link.
//!
//! ## Ticket Layout
//!
//! ```text
//!          Interbank            (centered, 2x)
//! --------------------------------
//! MIRAFLORES
//! 2026/10/19 09:15:00
//! NRO. OPE 216-000001
//!
//! CUENTA: 2003004005006
//! DOC: 45678912
//!
//! DEPOSITO
//! IMPORTE: S/ 150.00
//!
//! --------------------------------
//! FORMA DE PAGO EFECTIVO
//! Efectivo: S/ 150.00
//! IMPUESTO RETENIDO: S/ 12.30   (only when > 0)
//!
//! GRACIAS POR SU PREFERENCIA
//! ```
//!
//! Amounts use [`fixed_2dp`]: no thousands separators on paper.

use rust_decimal::Decimal;

use crate::format::fixed_2dp;
use crate::model::ReceiptRecord;
use crate::printer::PrinterConfig;
use crate::protocol::commands::{self, LF};
use crate::protocol::text::{self, Alignment};

/// Merchant name printed at the top of every ticket.
pub const MERCHANT_NAME: &str = "Interbank";

/// Closing line of every ticket.
pub const COURTESY_LINE: &str = "GRACIAS POR SU PREFERENCIA";

/// # Ticket Builder
///
/// Accumulates ESC/POS commands line by line. Starts with `ESC @`.
///
/// ## Example
///
/// ```
/// use recibo::receipt::Ticket;
///
/// let bytes = Ticket::new(32)
///     .headline("CAJA")
///     .divider()
///     .line("OK")
///     .cut(4)
///     .build();
/// assert_eq!(&bytes[..2], &[0x1B, 0x40]);
/// ```
pub struct Ticket {
    data: Vec<u8>,
    columns: usize,
}

impl Ticket {
    /// Start a ticket for paper `columns` characters wide.
    pub fn new(columns: usize) -> Self {
        Self {
            data: commands::init(),
            columns,
        }
    }

    /// Append raw command bytes.
    pub fn raw(mut self, bytes: Vec<u8>) -> Self {
        self.data.extend(bytes);
        self
    }

    pub fn left_margin(self, dots: u16) -> Self {
        self.raw(commands::left_margin(dots))
    }

    pub fn line(self, content: &str) -> Self {
        self.raw(text::line(content))
    }

    pub fn blank(mut self) -> Self {
        self.data.push(LF);
        self
    }

    /// Full-width row of dashes.
    pub fn divider(self) -> Self {
        let dashes = "-".repeat(self.columns);
        self.line(&dashes)
    }

    /// Centered double-size line; leaves size normal and alignment left.
    pub fn headline(self, content: &str) -> Self {
        self.raw(text::align(Alignment::Center))
            .raw(text::size(2, 2))
            .line(content)
            .raw(text::size_normal())
            .raw(text::align(Alignment::Left))
    }

    /// Feed `lines` so the last line clears the blade, then cut fully.
    pub fn cut(self, lines: u8) -> Self {
        self.raw(commands::feed_lines(lines))
            .raw(commands::cut_full())
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Encode the complete ticket for one operation.
pub fn encode(record: &ReceiptRecord, config: &PrinterConfig) -> Vec<u8> {
    let op = &record.details;
    let symbol = op.currency.symbol();
    let date = record.created_at.format("%Y-%m-%d").to_string().replace('-', "/");
    let time = record.created_at.format("%H:%M:%S");

    let mut ticket = Ticket::new(config.columns)
        .blank()
        .left_margin(config.left_margin_dots)
        .headline(MERCHANT_NAME)
        .divider()
        .line(&op.branch)
        .line(&format!("{} {}", date, time))
        .line(&format!("NRO. OPE {}", record.operation_number))
        .blank()
        .line(&format!("CUENTA: {}", op.account_number))
        .line(&format!("DOC: {}", op.document_number))
        .blank()
        .line(op.operation_type.label())
        .line(&format!("IMPORTE: {} {}", symbol, fixed_2dp(op.amount)))
        .blank()
        .divider()
        .line(&format!("FORMA DE PAGO {}", op.payment_method.label()))
        .line(&format!("Efectivo: {} {}", symbol, fixed_2dp(op.cash_received)));

    if op.tax_withheld > Decimal::ZERO {
        ticket = ticket.line(&format!(
            "IMPUESTO RETENIDO: {} {}",
            symbol,
            fixed_2dp(op.tax_withheld)
        ));
    }

    ticket
        .blank()
        .line(COURTESY_LINE)
        .cut(config.feed_lines)
        .build()
}

/// Short fixed banner for checking the link, independent of any record.
pub fn test_page(config: &PrinterConfig) -> Vec<u8> {
    Ticket::new(config.columns)
        .raw(text::size(2, 2))
        .line("TEST 2X")
        .raw(text::size_normal())
        .line("Hola mundo")
        .cut(config.feed_lines)
        .build()
}

// ============================================================================
// TESTS
// ============================================================================
