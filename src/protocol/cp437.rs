//! # Code Page 437 Encoding
//!
//! Converts Unicode strings to the PC437 single-byte table, which is the
//! power-on default character table of ESC/POS printers (`ESC t 0`).
//!
//! Only the Latin letters and punctuation that show up in branch, client and
//! document names are mapped. Printable ASCII passes through unchanged;
//! control characters and anything else become `?` and are logged, so text
//! can never inject printer commands.

/// Encode a Unicode string as PC437 bytes.
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_control() {
            tracing::warn!(
                code_point = (ch as u32),
                "cp437: control character in text, replacing with '?'"
            );
            out.push(b'?');
        } else if ch.is_ascii() {
            out.push(ch as u8);
        } else if let Some(byte) = latin_to_cp437(ch) {
            out.push(byte);
        } else {
            tracing::warn!(
                character = %ch,
                code_point = (ch as u32),
                "cp437: unmapped character, replacing with '?'"
            );
            out.push(b'?');
        }
    }
    out
}

/// Map a non-ASCII character to its PC437 byte, if it has one.
fn latin_to_cp437(ch: char) -> Option<u8> {
    let byte = match ch {
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'à' => 0x85,
        'ç' => 0x87,
        'ê' => 0x88,
        'ë' => 0x89,
        'è' => 0x8A,
        'ï' => 0x8B,
        'î' => 0x8C,
        'ì' => 0x8D,
        'Ä' => 0x8E,
        'É' => 0x90,
        'ô' => 0x93,
        'ö' => 0x94,
        'ò' => 0x95,
        'û' => 0x96,
        'ù' => 0x97,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        'á' => 0xA0,
        'í' => 0xA1,
        'ó' => 0xA2,
        'ú' => 0xA3,
        'ñ' => 0xA4,
        'Ñ' => 0xA5,
        'ª' => 0xA6,
        'º' => 0xA7,
        '¿' => 0xA8,
        '¡' => 0xAD,
        '«' => 0xAE,
        '»' => 0xAF,
        '°' => 0xF8,
        '·' => 0xFA,
        // PC437 has no uppercase Á Í Ó Ú; print the bare letter instead of '?'
        'Á' => b'A',
        'Í' => b'I',
        'Ó' => b'O',
        'Ú' => b'U',
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("NRO. OPE 216-000001"), b"NRO. OPE 216-000001".to_vec());
    }

    #[test]
    fn test_spanish_letters() {
        assert_eq!(encode("ñÑ"), vec![0xA4, 0xA5]);
        assert_eq!(encode("é"), vec![0x82]);
        assert_eq!(encode("¿¡"), vec![0xA8, 0xAD]);
    }

    #[test]
    fn test_uppercase_accents_fold() {
        assert_eq!(encode("CAJÓN"), b"CAJON".to_vec());
    }

    #[test]
    fn test_control_bytes_replaced() {
        assert_eq!(encode("A\x1dV\x00\nB"), b"A?V??B".to_vec());
        assert_eq!(encode("\x1b@\t\r"), b"?@??".to_vec());
        assert_eq!(encode("\u{9b}"), vec![b'?']);
    }

    #[test]
    fn test_unmapped_replaced() {
        assert_eq!(encode("2×"), vec![b'2', b'?']);
        assert_eq!(encode("€"), vec![b'?']);
    }
}
