//! The `<character-string>` of [RFC 1035].
//!
//! Despite the name, this is up to 255 octets of arbitrary binary data
//! behind a length octet. Its text form is optionally quoted and uses the
//! same backslash escapes as domain names.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::name::{parse_escape, NameError};
use super::wire::{ParseError, Parser, Composer};
use bytes::Bytes;
use core::{fmt, str};

//------------ CharStr -------------------------------------------------------

/// The content of a character string without its length octet.
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CharStr(Bytes);

impl CharStr {
    pub const MAX_LEN: usize = 255;

    pub fn empty() -> Self {
        CharStr(Bytes::new())
    }

    /// Fails if there are more than 255 octets.
    pub fn from_octets(octets: impl Into<Bytes>) -> Result<Self, CharStrError> {
        let octets = octets.into();
        if octets.len() > Self::MAX_LEN {
            Err(CharStrError)
        } else {
            Ok(CharStr(octets))
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    pub fn into_octets(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The length on the wire, including the length octet.
    pub fn compose_len(&self) -> usize {
        self.0.len() + 1
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let len = parser.parse_u8()? as usize;
        parser.parse_bytes(len).map(CharStr)
    }

    pub fn compose(&self, target: &mut Composer) {
        target.append_u8(self.0.len() as u8);
        target.append_slice(self.0.as_ref());
    }

    /// Decodes the escapes in `text`, which comes without quotes.
    pub fn from_text(text: &[u8]) -> Result<Self, CharStrError> {
        let mut res = Vec::with_capacity(text.len());
        let mut chars = text.iter().copied().peekable();
        while let Some(ch) = chars.next() {
            if ch == b'\\' {
                res.push(parse_escape(&mut chars).map_err(|_| CharStrError)?);
            } else {
                res.push(ch)
            }
        }
        Self::from_octets(res)
    }

    /// Displays the content without quotes.
    pub fn display_unquoted(&self) -> impl fmt::Display + '_ {
        struct Unquoted<'a>(&'a [u8]);

        impl<'a> fmt::Display for Unquoted<'a> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                for &ch in self.0 {
                    fmt_char(ch, f)?
                }
                Ok(())
            }
        }

        Unquoted(self.as_slice())
    }
}

fn fmt_char(ch: u8, f: &mut fmt::Formatter) -> fmt::Result {
    match ch {
        b'"' | b'\\' => write!(f, "\\{}", ch as char),
        b' ' => f.write_str(" "),
        _ if !(33..=126).contains(&ch) => write!(f, "\\{:03}", ch),
        _ => write!(f, "{}", ch as char),
    }
}

impl str::FromStr for CharStr {
    type Err = CharStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s.as_bytes())
    }
}

impl From<NameError> for CharStrError {
    fn from(_: NameError) -> Self {
        CharStrError
    }
}

impl fmt::Display for CharStr {
    /// Displays the string in quotes.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.display_unquoted())
    }
}

impl fmt::Debug for CharStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CharStr")
            .field(&format_args!("{}", self))
            .finish()
    }
}

//------------ CharStrError --------------------------------------------------

/// Too long or a broken escape sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CharStrError;

impl fmt::Display for CharStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("illegal character string")
    }
}

impl std::error::Error for CharStrError {}

//============ Testing =======================================================
