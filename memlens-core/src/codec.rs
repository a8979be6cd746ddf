//! Hex codec for debug adapter payloads
//!
//! Memory contents and addresses travel as hex text. Addresses are decoded
//! into `u64` so they never lose precision above 2^53.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Odd number of hex digits ({len})")]
    OddLength { len: usize },

    #[error("Invalid hex digit '{digit}' at offset {index}")]
    InvalidDigit { digit: char, index: usize },

    #[error("Hex value '{0}' does not fit in 64 bits")]
    Overflow(String),

    #[error("Empty hex value")]
    Empty,
}

/// Decode a string of hex digit pairs into bytes, most-significant nibble first.
///
/// Odd-length input is rejected instead of silently dropping the last nibble.
pub fn hex_to_bytes(text: &str) -> Result<Vec<u8>, HexError> {
    hex::decode(text).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            HexError::InvalidDigit { digit: c, index }
        }
        _ => HexError::OddLength { len: text.len() },
    })
}

/// Encode bytes as lowercase hex, two digits per byte.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parse an optionally `0x`-prefixed hex string as an unsigned 64-bit value.
pub fn hex_to_u64(text: &str) -> Result<u64, HexError> {
    let digits = strip_hex_prefix(text);

    if digits.is_empty() {
        return Err(HexError::Empty);
    }

    // from_str_radix tolerates a leading '+', the wire format does not
    if let Some((index, digit)) = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(HexError::InvalidDigit {
            digit,
            index: index + (text.len() - digits.len()),
        });
    }

    u64::from_str_radix(digits, 16).map_err(|_| HexError::Overflow(text.to_string()))
}

/// Format an address the way debug adapters print them: `0x` + lowercase hex.
pub fn format_address(address: u64) -> String {
    format!("{:#x}", address)
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}
