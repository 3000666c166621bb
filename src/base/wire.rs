//! Parsing and composing the wire format.
//!
//! DNS data travels in a well defined binary format. This module provides
//! the two tools everything else in the crate uses to deal with it: the
//! [`Parser`] walks over the octets of a complete message and the
//! [`Composer`] builds a message, optionally compressing domain names along
//! the way.
//!
//! Both operate on complete messages. This is necessary because compressed
//! domain names refer back to earlier parts of the message via their
//! position relative to the message start.

use super::name::Name;
use bytes::{BufMut, Bytes, BytesMut};
use core::fmt;
use std::collections::HashMap;

//------------ Parser --------------------------------------------------------

/// A parser for sequentially extracting data from a message.
///
/// The parser wraps a slice of the complete message and remembers the read
/// position. Methods allow reading out data and progressing the position
/// beyond processed data.
///
/// The parser can temporarily be limited to a shorter length via
/// [`parse_block`][Self::parse_block]. This is used for record data where
/// the length is given by the record’s RDLENGTH field. Domain names can
/// still follow compression pointers back into the part of the message
/// before the current position.
#[derive(Clone, Copy, Debug)]
pub struct Parser<'a> {
    /// The underlying message.
    octets: &'a [u8],

    /// The current position of the parser from the beginning of `octets`.
    pos: usize,

    /// The length of the octets sequence.
    ///
    /// This starts out as the length of the underlying sequence and is kept
    /// here to be able to temporarily limit the allowed length for
    /// `parse_block`.
    len: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser atop a message slice.
    pub fn from_slice(octets: &'a [u8]) -> Self {
        Parser {
            octets,
            pos: 0,
            len: octets.len(),
        }
    }

    /// Returns the entire underlying message.
    ///
    /// The slice covers the complete octets including anything beyond a
    /// temporary limit. It is what compression pointers refer to.
    pub fn message(&self) -> &'a [u8] {
        self.octets
    }

    /// Returns the current parse position as an index into the message.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of remaining octets to parse.
    pub fn remaining(&self) -> usize {
        self.len - self.pos
    }

    /// Returns the data left to parse.
    pub fn peek_all(&self) -> &'a [u8] {
        &self.octets[self.pos..self.len]
    }

    /// Returns the next `len` octets without advancing.
    pub fn peek(&self, len: usize) -> Result<&'a [u8], ParseError> {
        self.check_len(len)?;
        Ok(&self.octets[self.pos..self.pos + len])
    }

    /// Repositions the parser to the given index.
    pub fn seek(&mut self, pos: usize) -> Result<(), ParseError> {
        if pos > self.len {
            Err(ParseError::ShortInput)
        } else {
            self.pos = pos;
            Ok(())
        }
    }

    /// Advances the parser’s position by `len` octets.
    pub fn advance(&mut self, len: usize) -> Result<(), ParseError> {
        self.check_len(len)?;
        self.pos += len;
        Ok(())
    }

    /// Advances to the end of the parser.
    pub fn advance_to_end(&mut self) {
        self.pos = self.len
    }

    /// Checks that there are `len` octets left to parse.
    pub fn check_len(&self, len: usize) -> Result<(), ParseError> {
        if self.remaining() < len {
            Err(ParseError::ShortInput)
        } else {
            Ok(())
        }
    }

    /// Takes and returns the next `len` octets as a slice.
    pub fn parse_slice(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        let res = self.peek(len)?;
        self.pos += len;
        Ok(res)
    }

    /// Takes the next `len` octets as owned bytes.
    pub fn parse_bytes(&mut self, len: usize) -> Result<Bytes, ParseError> {
        self.parse_slice(len).map(Bytes::copy_from_slice)
    }

    /// Takes everything up to the current limit as owned bytes.
    pub fn parse_remaining(&mut self) -> Bytes {
        let res = Bytes::copy_from_slice(self.peek_all());
        self.advance_to_end();
        res
    }

    pub fn parse_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.parse_slice(1)?[0])
    }

    pub fn parse_u16(&mut self) -> Result<u16, ParseError> {
        let s = self.parse_slice(2)?;
        Ok(u16::from_be_bytes([s[0], s[1]]))
    }

    pub fn parse_u32(&mut self) -> Result<u32, ParseError> {
        let s = self.parse_slice(4)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }

    pub fn parse_i32(&mut self) -> Result<i32, ParseError> {
        self.parse_u32().map(|v| v as i32)
    }

    /// Parses a block of exactly `len` octets with the given closure.
    ///
    /// The parser is limited to the next `len` octets while `op` runs. If
    /// `op` doesn’t consume all of them, a form error is returned.
    pub fn parse_block<F, T>(
        &mut self,
        len: usize,
        op: F,
    ) -> Result<T, ParseError>
    where
        F: FnOnce(&mut Self) -> Result<T, ParseError>,
    {
        self.check_len(len)?;
        let end = self.pos + len;
        let old_len = self.len;
        self.len = end;
        let res = op(self);
        self.len = old_len;
        let res = res?;
        if self.pos != end {
            return Err(ParseError::form_error("trailing data in block"));
        }
        Ok(res)
    }
}

//------------ Composer ------------------------------------------------------

/// A buffer for building a wire-format message.
///
/// The composer appends data to a growing buffer. If created with
/// compression enabled, it keeps a table mapping the domain names it has
/// written so far to their positions and replaces repeated names or name
/// suffixes with compression pointers.
///
/// The compression table lives only as long as the composer itself. Every
/// call to encode a message creates a new composer, so no state can leak
/// from one message into the next.
#[derive(Clone, Debug, Default)]
pub struct Composer {
    /// The message data so far.
    target: BytesMut,

    /// The compression table, if compression is enabled.
    ///
    /// Keys are the wire-format label sequence of a name, values are the
    /// position within the message where that name starts.
    compress: Option<HashMap<Vec<u8>, u16>>,
}

impl Composer {
    /// Creates a new composer that compresses names where allowed.
    pub fn new() -> Self {
        Composer {
            target: BytesMut::with_capacity(512),
            compress: Some(HashMap::new()),
        }
    }

    /// Creates a new composer that never compresses.
    pub fn without_compression() -> Self {
        Composer {
            target: BytesMut::with_capacity(512),
            compress: None,
        }
    }

    /// Returns the length of the data composed so far.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Returns whether nothing has been composed yet.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Returns whether the composer compresses domain names.
    pub fn compresses(&self) -> bool {
        self.compress.is_some()
    }

    /// Returns a reference to the data composed so far.
    pub fn as_slice(&self) -> &[u8] {
        self.target.as_ref()
    }

    /// Returns a mutable reference to the data composed so far.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        self.target.as_mut()
    }

    /// Converts the composer into the composed data.
    pub fn freeze(self) -> Bytes {
        self.target.freeze()
    }

    pub fn append_slice(&mut self, slice: &[u8]) {
        self.target.extend_from_slice(slice)
    }

    pub fn append_u8(&mut self, value: u8) {
        self.target.put_u8(value)
    }

    pub fn append_u16(&mut self, value: u16) {
        self.target.put_u16(value)
    }

    pub fn append_u32(&mut self, value: u32) {
        self.target.put_u32(value)
    }

    pub fn append_i32(&mut self, value: i32) {
        self.target.put_i32(value)
    }

    /// Appends a domain name, compressing it if the composer allows.
    ///
    /// For every suffix of the name, starting with the whole name, the
    /// table is checked. On a hit, a pointer is written and we are done.
    /// Otherwise the current position is recorded for the suffix and its
    /// first label is written out.
    pub fn append_compressed_name(
        &mut self,
        name: &Name,
    ) -> Result<(), ComposeError> {
        let table = match self.compress {
            Some(ref mut table) => table,
            None => {
                self.target.extend_from_slice(name.as_wire());
                return Ok(());
            }
        };
        let wire = name.as_wire();
        let mut start = 0;
        loop {
            let suffix = &wire[start..];
            // The root label is always written as is.
            if suffix.len() == 1 {
                self.target.put_u8(0);
                return Ok(());
            }
            if let Some(&pos) = table.get(suffix) {
                self.target.put_u16(0xC000 | pos);
                return Ok(());
            }
            let pos = self.target.len();
            if pos < 0x4000 {
                table.insert(suffix.to_vec(), pos as u16);
            }
            let label_len = usize::from(suffix[0]);
            if label_len > 63 {
                return Err(ComposeError::LongLabel);
            }
            self.target.extend_from_slice(&suffix[..label_len + 1]);
            start += label_len + 1;
        }
    }

    /// Appends a domain name without ever compressing it.
    ///
    /// The name is still entered into the compression table so later names
    /// can point to it.
    pub fn append_uncompressed_name(&mut self, name: &Name) {
        if let Some(ref mut table) = self.compress {
            let wire = name.as_wire();
            let mut start = 0;
            let base = self.target.len();
            while wire.len() - start > 1 {
                let pos = base + start;
                if pos < 0x4000 {
                    table.entry(wire[start..].to_vec()).or_insert(pos as u16);
                }
                start += usize::from(wire[start]) + 1;
            }
        }
        self.target.extend_from_slice(name.as_wire())
    }

    /// Appends the canonical form of a domain name.
    ///
    /// This is the name uncompressed with all ASCII letters lowercased.
    pub fn append_canonical_name(&mut self, name: &Name) {
        self.target.extend_from_slice(name.to_lowercase().as_wire())
    }

    /// Appends data preceded by its length as a 16 bit integer.
    ///
    /// The closure `op` composes the data. If the data turns out to be
    /// longer than 65535 octets, an error is returned.
    pub fn compose_len_prefixed<F>(&mut self, op: F) -> Result<(), ComposeError>
    where
        F: FnOnce(&mut Self) -> Result<(), ComposeError>,
    {
        let pos = self.target.len();
        self.target.put_u16(0);
        op(self)?;
        let len = self.target.len() - pos - 2;
        let len = u16::try_from(len).map_err(|_| ComposeError::LongData)?;
        self.target[pos..pos + 2].copy_from_slice(&len.to_be_bytes());
        Ok(())
    }
}

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An attempt was made to go beyond the end of the parser.
    ShortInput,

    /// A compressed name took too many pointer hops.
    CompressionLoop,

    /// A formatting error occurred.
    Form(FormError),
}

impl ParseError {
    /// Creates a new parse error as a form error with the given message.
    pub fn form_error(msg: &'static str) -> Self {
        FormError::new(msg).into()
    }
}

//--- From

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

//--- Display and Error

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::CompressionLoop => {
                f.write_str("too many compression pointers")
            }
            ParseError::Form(ref err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ParseError {}

//------------ FormError -----------------------------------------------------

/// A formatting error occured.
///
/// This is a generic error for all kinds of error cases that result in data
/// not being accepted. For diagnostics, the error is being given a static
/// string describing the error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    /// Creates a new form error value with the given diagnostics string.
    pub fn new(msg: &'static str) -> Self {
        FormError(msg)
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FormError {}

//------------ ComposeError --------------------------------------------------

/// Data could not be composed into wire format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComposeError {
    /// A label was longer than 63 octets.
    LongLabel,

    /// A domain name was longer than 255 octets.
    LongName,

    /// A length-prefixed block was longer than 65535 octets.
    LongData,

    /// A section had more than 65535 entries.
    Overflow,
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ComposeError::LongLabel => "label longer than 63 octets",
            ComposeError::LongName => "domain name longer than 255 octets",
            ComposeError::LongData => "data longer than 65535 octets",
            ComposeError::Overflow => "too many records in section",
        })
    }
}

impl std::error::Error for ComposeError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_ints() {
        let mut parser = Parser::from_slice(b"\x01\x02\x03\x04\x05\x06\x07");
        assert_eq!(parser.parse_u8(), Ok(1));
        assert_eq!(parser.parse_u16(), Ok(0x0203));
        assert_eq!(parser.parse_u32(), Ok(0x04050607));
        assert_eq!(parser.parse_u8(), Err(ParseError::ShortInput));
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn parse_block_limits() {
        let mut parser = Parser::from_slice(b"\x00\x01\x00\x02\x00\x03");
        parser.advance(2).unwrap();
        assert_eq!(
            parser.parse_block(2, |p| p.parse_u16()),
            Ok(2)
        );
        assert_eq!(
            parser.parse_block(2, |p| p.parse_u32()),
            Err(ParseError::ShortInput)
        );

        let mut parser = Parser::from_slice(b"\x00\x01\x00\x02");
        assert!(parser.parse_block(4, |p| p.parse_u16()).is_err());
        assert_eq!(parser.pos(), 2);
    }

    #[test]
    fn compose_len_prefixed() {
        let mut target = Composer::without_compression();
        target
            .compose_len_prefixed(|t| {
                t.append_slice(b"foo");
                Ok(())
            })
            .unwrap();
        assert_eq!(target.as_slice(), b"\x00\x03foo");
    }

    #[test]
    fn compress_names() {
        let mut target = Composer::new();
        target.append_slice(&[0; 12]);
        let www: Name = "www.example.com".parse().unwrap();
        let mail: Name = "mail.example.com".parse().unwrap();
        target.append_compressed_name(&www).unwrap();
        target.append_compressed_name(&mail).unwrap();
        target.append_compressed_name(&www).unwrap();
        assert_eq!(
            &target.as_slice()[12..],
            b"\x03www\x07example\x03com\x00\
              \x04mail\xc0\x10\
              \xc0\x0c"
        );
    }

    #[test]
    fn uncompressed_names() {
        let mut target = Composer::without_compression();
        let www: Name = "www.example.com".parse().unwrap();
        target.append_compressed_name(&www).unwrap();
        target.append_compressed_name(&www).unwrap();
        assert_eq!(target.len(), 2 * www.wire_len());
    }
}
