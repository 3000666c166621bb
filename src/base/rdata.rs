//! The data part of records.
//!
//! Types for concrete record types live in [crate::rdata]. They implement
//! [`RecordData`] to report their type, mostly via [`RtypeRecordData`],
//! and [`ComposeRecordData`] to go onto the wire.
//!
//! Data of types we don’t know is kept as raw octets in
//! [`UnknownRecordData`] and uses the `\#` text form of [RFC 3597].
//!
//! [RFC 3597]: https://tools.ietf.org/html/rfc3597

use super::iana::Rtype;
use super::scan::{ScanError, Scanner};
use super::wire::{ComposeError, Composer, ParseError, Parser};
use crate::utils::base16;
use bytes::Bytes;
use core::cmp::Ordering;
use core::fmt;

//----------- RecordData -----------------------------------------------------

/// Record data of some type.
pub trait RecordData {
    /// The type of the record this data belongs to.
    ///
    /// Types covering more than one record type decide per value.
    fn rtype(&self) -> Rtype;
}

//----------- RtypeRecordData ------------------------------------------------

/// Record data that always belongs to the same record type.
pub trait RtypeRecordData {
    const RTYPE: Rtype;
}

impl<T: RtypeRecordData> RecordData for T {
    fn rtype(&self) -> Rtype {
        Self::RTYPE
    }
}

//----------- ComposeRecordData ----------------------------------------------

/// Record data with a wire format.
pub trait ComposeRecordData: RecordData {
    /// Appends the wire format of the record data.
    ///
    /// Embedded domain names are compressed if the record type allows it
    /// and the composer is compressing.
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError>;

    /// Appends the canonical wire format of the record data.
    ///
    /// Embedded domain names are never compressed and are lowercased.
    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError>;

    /// Appends the record data preceded by its length.
    fn compose_len_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.compose_len_prefixed(|target| self.compose_rdata(target))
    }

    /// Returns the canonical wire format as a vec.
    fn to_canonical_vec(&self) -> Result<Vec<u8>, ComposeError> {
        let mut target = Composer::without_compression();
        self.compose_canonical_rdata(&mut target)?;
        Ok(target.as_slice().to_vec())
    }

    /// Compares the canonical wire format of two values.
    ///
    /// Values that cannot be composed sort last.
    fn canonical_rdata_cmp(&self, other: &Self) -> Ordering
    where
        Self: Sized,
    {
        match (self.to_canonical_vec(), other.to_canonical_vec()) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => Ordering::Equal,
        }
    }
}

//------------ ParseRecordData -----------------------------------------------

/// Record data that can be taken from a message.
///
/// Returns `Ok(None)` for record types the implementing type doesn’t cover.
pub trait ParseRecordData: RecordData + Sized {
    /// Parses the record data.
    ///
    /// The parser ends with the record data and must be used up.
    fn parse_rdata(
        rtype: Rtype,
        parser: &mut Parser,
    ) -> Result<Option<Self>, ParseError>;
}

//------------ UnknownRecordData ---------------------------------------------

/// Raw record data of any type.
///
/// Only safe for types whose data cannot contain compressed names. Since
/// RFC 3597 only permits compression for the types of RFC 1035 and all of
/// those have their own type in [`crate::rdata`], this holds for anything
/// that ends up here.
#[derive(Clone, Eq, PartialEq)]
pub struct UnknownRecordData {
    rtype: Rtype,
    data: Bytes,
}

impl UnknownRecordData {
    /// Fails if `data` is longer than 65535 octets.
    pub fn from_octets(
        rtype: Rtype,
        data: impl Into<Bytes>,
    ) -> Result<Self, LongRecordData> {
        let data = data.into();
        if data.len() > 0xFFFF {
            Err(LongRecordData)
        } else {
            Ok(UnknownRecordData { rtype, data })
        }
    }

    /// Creates empty record data for the given type.
    ///
    /// Records in the prerequisite and update sections of UPDATE messages
    /// often have no data regardless of their type.
    pub fn empty(rtype: Rtype) -> Self {
        UnknownRecordData {
            rtype,
            data: Bytes::new(),
        }
    }

    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Takes everything left in `parser`.
    pub fn parse(rtype: Rtype, parser: &mut Parser) -> Self {
        UnknownRecordData {
            rtype,
            data: parser.parse_remaining(),
        }
    }

    /// Scans the `\#` form.
    pub fn scan(rtype: Rtype, scanner: &mut Scanner) -> Result<Self, ScanError> {
        if scanner.scan_str()? != "\\#" {
            return Err(ScanError::custom("'\\#' expected"));
        }
        Self::scan_without_marker(rtype, scanner)
    }

    /// Scans the `\#` form after the marker.
    ///
    /// Expects the length and then the data as one token of hex digits,
    /// which is left out for empty data.
    pub fn scan_without_marker(
        rtype: Rtype,
        scanner: &mut Scanner,
    ) -> Result<Self, ScanError> {
        let len = usize::from(scanner.scan_u16()?);
        let data = if scanner.continues() {
            base16::decode(scanner.scan_str()?)
                .map_err(|_| ScanError::custom("bad generic data"))?
        } else {
            Vec::new()
        };
        if data.len() != len {
            return Err(ScanError::custom(
                "length doesn’t match generic data",
            ));
        }
        scanner.finish()?;
        Ok(UnknownRecordData {
            rtype,
            data: data.into(),
        })
    }
}

impl PartialOrd for UnknownRecordData {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnknownRecordData {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.as_ref().cmp(other.data.as_ref())
    }
}

impl RecordData for UnknownRecordData {
    fn rtype(&self) -> Rtype {
        self.rtype
    }
}

impl ComposeRecordData for UnknownRecordData {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_slice(self.data.as_ref());
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for UnknownRecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\\# {}", self.data.len())?;
        if !self.data.is_empty() {
            f.write_str(" ")?;
            base16::display_lower(self.data.as_ref(), f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for UnknownRecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("UnknownRecordData(")?;
        fmt::Display::fmt(self, f)?;
        f.write_str(")")
    }
}

//------------ LongRecordData ------------------------------------------------

/// Record data exceeded 65535 octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LongRecordData;

impl fmt::Display for LongRecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("record data too long")
    }
}

impl std::error::Error for LongRecordData {}

//============ Testing ======================================================

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use core::fmt::Debug;

    /// Composes `data`, parses it back, and does the same with the
    /// canonical form. Test data must not contain upper case names.
    pub fn test_compose_parse<In, F>(data: &In, parse: F)
    where
        In: ComposeRecordData + PartialEq + Debug,
        F: Fn(&mut Parser) -> Result<In, ParseError>,
    {
        let mut target = Composer::without_compression();
        data.compose_rdata(&mut target).unwrap();
        let mut parser = Parser::from_slice(target.as_slice());
        let parsed = (parse)(&mut parser).unwrap();
        assert_eq!(parser.remaining(), 0);
        assert_eq!(*data, parsed);

        let canonical = data.to_canonical_vec().unwrap();
        let mut parser = Parser::from_slice(&canonical);
        assert_eq!(*data, (parse)(&mut parser).unwrap());
    }

    /// Checks scanning.
    pub fn test_scan<F, T>(input: &str, scan: F, expected: &T)
    where
        F: FnOnce(&mut Scanner) -> Result<T, ScanError>,
        T: Debug + PartialEq,
    {
        let mut scanner = Scanner::new(input).unwrap();
        assert_eq!(*expected, scan(&mut scanner).unwrap());
        assert!(scanner.finish().is_ok());
    }

    /// Checks that the data displays as `expected` and scans back.
    pub fn test_display_scan<F, T>(data: &T, scan: F, expected: &str)
    where
        F: FnOnce(&mut Scanner) -> Result<T, ScanError>,
        T: Debug + PartialEq + fmt::Display,
    {
        assert_eq!(data.to_string(), expected);
        test_scan(expected, scan, data);
    }

    #[test]
    fn unknown_generic_form() {
        let mut scanner = Scanner::new("\\# 4 0A000001").unwrap();
        let data = UnknownRecordData::scan(Rtype::A, &mut scanner).unwrap();
        assert_eq!(data.data().as_ref(), b"\x0a\x00\x00\x01");
        assert_eq!(data.to_string(), "\\# 4 0a000001");

        let mut scanner = Scanner::new("\\# 4 0A0000 01").unwrap();
        assert!(UnknownRecordData::scan(Rtype::A, &mut scanner).is_err());
        let mut scanner = Scanner::new("\\# 3 0A000001").unwrap();
        assert!(UnknownRecordData::scan(Rtype::A, &mut scanner).is_err());
        let mut scanner = Scanner::new("\\# 0").unwrap();
        let empty = UnknownRecordData::scan(Rtype::NULL, &mut scanner).unwrap();
        assert_eq!(empty.to_string(), "\\# 0");
    }

    #[test]
    fn unknown_wire() {
        let data =
            UnknownRecordData::from_octets(Rtype::from_int(4711), &b"abc"[..])
                .unwrap();
        test_compose_parse(&data, |parser| {
            Ok(UnknownRecordData::parse(Rtype::from_int(4711), parser))
        });
    }
}
