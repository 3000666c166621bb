//! Text encodings of binary record data.

use core::fmt;

pub mod base16;
pub mod base64;

//------------ DecodeError ---------------------------------------------------

/// Encoded text could not be decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// A character that isn’t part of the encoding.
    IllegalChar(char),

    /// Data after the padding.
    TrailingInput,

    /// The text ended in the middle of a group.
    ShortInput,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodeError::IllegalChar(ch) => {
                write!(f, "illegal character '{}'", ch)
            }
            DecodeError::TrailingInput => f.write_str("trailing input"),
            DecodeError::ShortInput => f.write_str("incomplete input"),
        }
    }
}

impl std::error::Error for DecodeError {}
