//! Hex digits as used in record data.
//!
//! Record data mostly shows hex digits in upper case. The generic record
//! data format of [RFC 3597] uses lower case. Decoding accepts both and
//! skips whitespace.
//!
//! [RFC 3597]: https://tools.ietf.org/html/rfc3597

pub use super::DecodeError;

use core::fmt;

/// Decodes hex digits.
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = s
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| {
            ch.to_digit(16)
                .map(|value| value as u8)
                .ok_or(DecodeError::IllegalChar(ch))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if digits.len() % 2 != 0 {
        return Err(DecodeError::ShortInput);
    }
    Ok(digits.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect())
}

/// Writes `octets` as upper case hex digits.
pub fn display<W: fmt::Write>(octets: &[u8], f: &mut W) -> fmt::Result {
    octets.iter().try_for_each(|octet| write!(f, "{:02X}", octet))
}

/// Writes `octets` as lower case hex digits.
pub fn display_lower<W: fmt::Write>(octets: &[u8], f: &mut W) -> fmt::Result {
    octets.iter().try_for_each(|octet| write!(f, "{:02x}", octet))
}

//============ Testing =======================================================
