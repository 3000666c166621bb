//! Record data from [RFC 2930]: TKEY records.
//!
//! [RFC 2930]: https://tools.ietf.org/html/rfc2930

use super::rfc2845::{compose_sized, fmt_sized_base64, scan_sized_base64};
use crate::base::iana::{Rtype, TsigRcode};
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use bytes::Bytes;
use core::fmt;

/// Key agreement through GSS-API.
pub const MODE_GSSAPI: u16 = 3;

//------------ Tkey ---------------------------------------------------------

/// Tkey record data.
///
/// The record is used to establish shared secret keys between resolver
/// and server. The algorithm name is never compressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tkey {
    algorithm: Name,
    inception: u32,
    expiration: u32,
    mode: u16,
    error: TsigRcode,
    key: Bytes,
    other: Bytes,
}

impl Tkey {
    pub fn new(
        algorithm: Name,
        inception: u32,
        expiration: u32,
        mode: u16,
        error: TsigRcode,
        key: impl Into<Bytes>,
        other: impl Into<Bytes>,
    ) -> Self {
        Tkey {
            algorithm,
            inception,
            expiration,
            mode,
            error,
            key: key.into(),
            other: other.into(),
        }
    }

    pub fn algorithm(&self) -> &Name {
        &self.algorithm
    }

    /// Start of the key validity as seconds since the epoch.
    pub fn inception(&self) -> u32 {
        self.inception
    }

    /// End of the key validity as seconds since the epoch.
    pub fn expiration(&self) -> u32 {
        self.expiration
    }

    /// The key agreement mode.
    pub fn mode(&self) -> u16 {
        self.mode
    }

    pub fn error(&self) -> TsigRcode {
        self.error
    }

    pub fn key(&self) -> &Bytes {
        &self.key
    }

    pub fn other(&self) -> &Bytes {
        &self.other
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let algorithm = Name::parse(parser)?;
        let inception = parser.parse_u32()?;
        let expiration = parser.parse_u32()?;
        let mode = parser.parse_u16()?;
        let error = TsigRcode::parse(parser)?;
        let key_size = parser.parse_u16()?;
        let key = parser.parse_bytes(key_size.into())?;
        let other_size = parser.parse_u16()?;
        let other = parser.parse_bytes(other_size.into())?;
        Ok(Tkey::new(
            algorithm, inception, expiration, mode, error, key, other,
        ))
    }

    /// Scans the presentation format.
    ///
    /// This is `algorithm inception expiration mode error key-size [key]
    /// other-size [other]` with key and other data in Base 64.
    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let algorithm = scanner.scan_name()?;
        let inception = scanner.scan_u32()?;
        let expiration = scanner.scan_u32()?;
        let mode = scanner.scan_u16()?;
        let error = scanner.scan_from_str("bad TKEY error")?;
        let key = scan_sized_base64(scanner)?;
        let other = scan_sized_base64(scanner)?;
        Ok(Tkey::new(
            algorithm, inception, expiration, mode, error, key, other,
        ))
    }
}

impl RtypeRecordData for Tkey {
    const RTYPE: Rtype = Rtype::TKEY;
}

impl ComposeRecordData for Tkey {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_uncompressed_name(&self.algorithm);
        self.compose_fields(target)
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_canonical_name(&self.algorithm);
        self.compose_fields(target)
    }
}

impl Tkey {
    fn compose_fields(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u32(self.inception);
        target.append_u32(self.expiration);
        target.append_u16(self.mode);
        self.error.compose(target);
        compose_sized(&self.key, target)?;
        compose_sized(&self.other, target)
    }
}

impl fmt::Display for Tkey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} ",
            self.algorithm.fqdn(),
            self.inception,
            self.expiration,
            self.mode,
            self.error
        )?;
        fmt_sized_base64(&self.key, f)?;
        f.write_str(" ")?;
        fmt_sized_base64(&self.other, f)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::base::rdata::test::{test_compose_parse, test_display_scan};

    #[test]
    fn tkey_compose_parse_scan() {
        let rdata = Tkey::new(
            name("gss.microsoft.com"),
            1_000_000,
            1_086_400,
            MODE_GSSAPI,
            TsigRcode::NOERROR,
            &b"fooba"[..],
            Bytes::new(),
        );
        test_compose_parse(&rdata, Tkey::parse);
        test_display_scan(
            &rdata,
            Tkey::scan,
            "gss.microsoft.com. 1000000 1086400 3 NOERROR 5 Zm9vYmE= 0",
        );
    }

    #[test]
    fn tkey_wire_layout() {
        let rdata = Tkey::new(
            Name::root(),
            1,
            2,
            3,
            TsigRcode::BADKEY,
            &b"k"[..],
            &b"o"[..],
        );
        assert_eq!(
            rdata.to_canonical_vec().unwrap(),
            b"\x00\x00\x00\x00\x01\x00\x00\x00\x02\x00\x03\x00\x11\
              \x00\x01k\x00\x01o"
        );
    }
}
