//! # ESC/POS Printer Commands
//!
//! Basic control commands for Epson-compatible thermal receipt printers
//! (TM-T20II, TM-T88 and clones).
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - With parameters: `ESC d n`, `GS L nL nH`, `GS V m`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//!
//! ## Reference
//!
//! Based on the "ESC/POS Application Programming Guide" command reference
//! by Seiko Epson Corp.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for margins, character size and the cutter.
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets every mode (size, alignment,
/// margins, character table) to the power-on defaults.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## Example
///
/// ```
/// use recibo::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// LAYOUT
// ============================================================================

/// # Set Left Margin (GS L nL nH)
///
/// Moves the start of every printed line `dots` dot-columns to the right.
/// At 203 DPI, 32 dots is about 4mm.
///
/// | Format  | Bytes          |
/// |---------|----------------|
/// | ASCII   | GS L nL nH     |
/// | Hex     | 1D 4C nL nH    |
///
/// Takes effect at the beginning of a line.
///
/// ## Example
///
/// ```
/// use recibo::protocol::commands;
///
/// assert_eq!(commands::left_margin(32), vec![0x1D, 0x4C, 0x20, 0x00]);
/// ```
pub fn left_margin(dots: u16) -> Vec<u8> {
    let [lo, hi] = u16_le(dots);
    vec![GS, b'L', lo, hi]
}

// ============================================================================
// PAPER FEED AND CUT
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the line buffer, then feeds `lines` lines at the current line
/// spacing. Used before cutting so the last printed line clears the blade.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
#[inline]
pub fn feed_lines(lines: u8) -> Vec<u8> {
    vec![ESC, b'd', lines]
}

/// # Full Cut (GS V 0)
///
/// Cuts the paper completely at the current position.
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
#[inline]
pub fn cut_full() -> Vec<u8> {
    vec![GS, b'V', 0]
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use recibo::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(576), [0x40, 0x02]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_left_margin() {
        assert_eq!(left_margin(0), vec![0x1D, 0x4C, 0x00, 0x00]);
        assert_eq!(left_margin(32), vec![0x1D, 0x4C, 0x20, 0x00]);
        assert_eq!(left_margin(300), vec![0x1D, 0x4C, 0x2C, 0x01]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(4), vec![0x1B, 0x64, 0x04]);
        assert_eq!(feed_lines(0), vec![0x1B, 0x64, 0x00]);
    }

    #[test]
    fn test_cuts() {
        assert_eq!(cut_full(), vec![0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x00FF), [0xFF, 0x00]);
        assert_eq!(u16_le(0xFF00), [0x00, 0xFF]);
    }
}
