//! Base 64 as used in record data.
//!
//! Only the original alphabet of [RFC 4648] with padding is used by the
//! DNS. Presentation format may split the encoded data into several
//! tokens, so whitespace is skipped when decoding.
//!
//! [RFC 4648]: https://tools.ietf.org/html/rfc4648

pub use super::DecodeError;

use core::fmt;

const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Returns the value of a single character.
fn value(ch: char) -> Result<u32, DecodeError> {
    match ch {
        'A'..='Z' => Ok(ch as u32 - 'A' as u32),
        'a'..='z' => Ok(ch as u32 - 'a' as u32 + 26),
        '0'..='9' => Ok(ch as u32 - '0' as u32 + 52),
        '+' => Ok(62),
        '/' => Ok(63),
        _ => Err(DecodeError::IllegalChar(ch)),
    }
}

/// Decodes base 64 text.
///
/// The input must consist of complete groups of four characters, the last
/// of which may be padded.
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    let mut res = Vec::with_capacity(s.len() / 4 * 3);
    let mut group = 0u32;
    let mut len = 0;
    let mut pad = 0;
    for ch in s.chars().filter(|ch| !ch.is_whitespace()) {
        if ch == '=' {
            // Padding may only take up the last two places of a group.
            if len < 2 {
                return Err(DecodeError::IllegalChar(ch));
            }
            pad += 1;
            group <<= 6;
        } else if pad > 0 {
            return Err(DecodeError::TrailingInput);
        } else {
            group = group << 6 | value(ch)?;
        }
        len += 1;
        if len == 4 {
            let octets = group.to_be_bytes();
            res.extend_from_slice(&octets[1..4 - pad]);
            if pad > 0 {
                // Nothing may follow a padded group.
                pad = 4;
            }
            group = 0;
            len = 0;
        }
    }
    if len != 0 {
        return Err(DecodeError::ShortInput);
    }
    Ok(res)
}

/// Writes the base 64 encoding of `octets`.
pub fn display<W: fmt::Write>(octets: &[u8], f: &mut W) -> fmt::Result {
    for chunk in octets.chunks(3) {
        let mut group = [0u8; 4];
        group[1..=chunk.len()].copy_from_slice(chunk);
        let group = u32::from_be_bytes(group);
        for i in 0..4 {
            if i <= chunk.len() {
                let index = (group >> (18 - 6 * i)) & 0x3F;
                f.write_char(char::from(ALPHABET[index as usize]))?;
            } else {
                f.write_char('=')?;
            }
        }
    }
    Ok(())
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"", "")]
    #[case(b"f", "Zg==")]
    #[case(b"fo", "Zm8=")]
    #[case(b"foo", "Zm9v")]
    #[case(b"foob", "Zm9vYg==")]
    #[case(b"fooba", "Zm9vYmE=")]
    #[case(b"foobar", "Zm9vYmFy")]
    fn rfc_vectors(#[case] octets: &[u8], #[case] text: &str) {
        let mut out = String::new();
        display(octets, &mut out).unwrap();
        assert_eq!(out, text);
        assert_eq!(decode(text).unwrap(), octets);
    }

    #[test]
    fn bad_input() {
        assert_eq!(decode("Zm9 vYmFy").unwrap(), b"foobar");
        assert_eq!(decode("FPucA").unwrap_err(), DecodeError::ShortInput);
        assert_eq!(
            decode("FPucA=").unwrap_err(),
            DecodeError::IllegalChar('=')
        );
        assert_eq!(decode("FP=c").unwrap_err(), DecodeError::TrailingInput);
        assert_eq!(decode("F===").unwrap_err(), DecodeError::IllegalChar('='));
        assert_eq!(
            decode("Zg==Zg==").unwrap_err(),
            DecodeError::TrailingInput
        );
        assert_eq!(decode("Zm9*").unwrap_err(), DecodeError::IllegalChar('*'));
    }
}
