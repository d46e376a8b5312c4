//! # ESC/POS Text Commands
//!
//! Alignment, character size and encoded text lines.
//!
//! ## Text Alignment
//!
//! ```text
//! Left aligned (default)    |LEFT TEXT
//! Center aligned            |  CENTER TEXT
//! Right aligned             |      RIGHT TEXT
//! ```
//!
//! ## Character Size
//!
//! `GS ! n` packs both multipliers in one byte: the high nibble is
//! `width - 1`, the low nibble `height - 1`. `0x11` is double width and
//! double height, `0x00` is normal.

use super::commands::{ESC, GS, LF};
use super::cp437;

// ============================================================================
// TEXT ALIGNMENT
// ============================================================================

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC a n  |
/// | Hex     | 1B 61 n  |
///
/// Takes effect at the start of the next line and is reset by `ESC @`.
///
/// ## Example
///
/// ```
/// use recibo::protocol::text::{align, Alignment};
///
/// assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
/// ```
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// CHARACTER SIZE
// ============================================================================

/// # Select Character Size (GS ! n)
///
/// Multipliers are clamped to the supported 1–8 range.
///
/// ## Example
///
/// ```
/// use recibo::protocol::text::size;
///
/// assert_eq!(size(2, 2), vec![0x1D, 0x21, 0x11]);
/// assert_eq!(size(1, 3), vec![0x1D, 0x21, 0x02]);
/// ```
pub fn size(width_mult: u8, height_mult: u8) -> Vec<u8> {
    let w = width_mult.clamp(1, 8) - 1;
    let h = height_mult.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

/// Back to 1×1 characters.
#[inline]
pub fn size_normal() -> Vec<u8> {
    size(1, 1)
}

// ============================================================================
// TEXT LINES
// ============================================================================

/// Encode `text` for the printer's character table and terminate it with
/// `LF`.
pub fn line(text: &str) -> Vec<u8> {
    let mut out = cp437::encode(text);
    out.push(LF);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_size_packing() {
        assert_eq!(size_normal(), vec![0x1D, 0x21, 0x00]);
        assert_eq!(size(2, 1), vec![0x1D, 0x21, 0x10]);
        assert_eq!(size(8, 8), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_size_clamps() {
        assert_eq!(size(0, 0), vec![0x1D, 0x21, 0x00]);
        assert_eq!(size(12, 9), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_line_encodes_and_terminates() {
        assert_eq!(line("OK"), vec![b'O', b'K', 0x0A]);
        assert_eq!(line("Año"), vec![b'A', 0xA4, b'o', 0x0A]);
        assert_eq!(line(""), vec![0x0A]);
    }

    #[test]
    fn test_line_has_single_terminator() {
        let bytes = line("MIRAFLORES\nEXTRA\x1dV\x00");
        assert_eq!(bytes.iter().filter(|&&b| b == LF).count(), 1);
        assert!(!bytes.contains(&GS));
        assert_eq!(bytes.last(), Some(&LF));
    }
}
