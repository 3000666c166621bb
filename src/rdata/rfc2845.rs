//! Record data from [RFC 2845]: TSIG records.
//!
//! [RFC 2845]: https://tools.ietf.org/html/rfc2845

use crate::base::iana::{Rtype, TsigRcode};
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use crate::utils::base64;
use bytes::Bytes;
use core::fmt;
use time::OffsetDateTime;

//------------ Tsig ---------------------------------------------------------

/// Tsig record data.
///
/// The record carries the signature over a message. It is always the last
/// record of the additional section. The algorithm name is never
/// compressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tsig {
    algorithm: Name,
    time_signed: Time48,
    fudge: u16,
    mac: Bytes,
    original_id: u16,
    error: TsigRcode,
    other: Bytes,
}

impl Tsig {
    pub fn new(
        algorithm: Name,
        time_signed: Time48,
        fudge: u16,
        mac: impl Into<Bytes>,
        original_id: u16,
        error: TsigRcode,
        other: impl Into<Bytes>,
    ) -> Self {
        Tsig {
            algorithm,
            time_signed,
            fudge,
            mac: mac.into(),
            original_id,
            error,
            other: other.into(),
        }
    }

    /// The name of the MAC algorithm.
    pub fn algorithm(&self) -> &Name {
        &self.algorithm
    }

    /// Seconds since the epoch when the message was signed.
    pub fn time_signed(&self) -> Time48 {
        self.time_signed
    }

    /// Permitted clock skew in seconds.
    pub fn fudge(&self) -> u16 {
        self.fudge
    }

    pub fn mac(&self) -> &Bytes {
        &self.mac
    }

    /// The message ID before any forwarder changed it.
    pub fn original_id(&self) -> u16 {
        self.original_id
    }

    pub fn error(&self) -> TsigRcode {
        self.error
    }

    /// Other data. Only used with a BADTIME error.
    pub fn other(&self) -> &Bytes {
        &self.other
    }

    /// Returns whether `now` is within the fudge of the signing time.
    pub fn is_valid_at(&self, now: Time48) -> bool {
        now.eq_fudged(self.time_signed, self.fudge.into())
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let algorithm = Name::parse(parser)?;
        let time_signed = Time48::parse(parser)?;
        let fudge = parser.parse_u16()?;
        let mac_size = parser.parse_u16()?;
        let mac = parser.parse_bytes(mac_size.into())?;
        let original_id = parser.parse_u16()?;
        let error = TsigRcode::parse(parser)?;
        let other_len = parser.parse_u16()?;
        let other = parser.parse_bytes(other_len.into())?;
        Ok(Tsig::new(
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        ))
    }

    /// Scans the presentation format.
    ///
    /// This is `algorithm time fudge mac-size [mac] original-id error
    /// other-len [other]` with the MAC and other data in Base 64.
    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let algorithm = scanner.scan_name()?;
        let time_signed = Time48::from_u64(scanner.scan_int()?);
        let fudge = scanner.scan_u16()?;
        let mac = scan_sized_base64(scanner)?;
        let original_id = scanner.scan_u16()?;
        let error = scanner.scan_from_str("bad TSIG error")?;
        let other = scan_sized_base64(scanner)?;
        Ok(Tsig::new(
            algorithm,
            time_signed,
            fudge,
            mac,
            original_id,
            error,
            other,
        ))
    }
}

/// Scans a length followed by Base 64 data if the length isn’t zero.
pub(super) fn scan_sized_base64(
    scanner: &mut Scanner,
) -> Result<Bytes, ScanError> {
    let len = usize::from(scanner.scan_u16()?);
    if len == 0 {
        return Ok(Bytes::new());
    }
    let data = base64::decode(scanner.scan_str()?)
        .map_err(|_| ScanError::custom("bad base64 data"))?;
    if data.len() != len {
        return Err(ScanError::custom("length mismatch in base64 data"));
    }
    Ok(data.into())
}

/// Writes a length followed by Base 64 data if there is any.
pub(super) fn fmt_sized_base64(
    data: &[u8],
    f: &mut fmt::Formatter,
) -> fmt::Result {
    write!(f, "{}", data.len())?;
    if !data.is_empty() {
        f.write_str(" ")?;
        base64::display(data, f)?;
    }
    Ok(())
}

pub(super) fn compose_sized(
    data: &[u8],
    target: &mut Composer,
) -> Result<(), ComposeError> {
    let len = u16::try_from(data.len()).map_err(|_| ComposeError::LongData)?;
    target.append_u16(len);
    target.append_slice(data);
    Ok(())
}

impl RtypeRecordData for Tsig {
    const RTYPE: Rtype = Rtype::TSIG;
}

impl ComposeRecordData for Tsig {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_uncompressed_name(&self.algorithm);
        self.time_signed.compose(target);
        target.append_u16(self.fudge);
        compose_sized(&self.mac, target)?;
        target.append_u16(self.original_id);
        self.error.compose(target);
        compose_sized(&self.other, target)
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_canonical_name(&self.algorithm);
        self.time_signed.compose(target);
        target.append_u16(self.fudge);
        compose_sized(&self.mac, target)?;
        target.append_u16(self.original_id);
        self.error.compose(target);
        compose_sized(&self.other, target)
    }
}

impl fmt::Display for Tsig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} ",
            self.algorithm.fqdn(),
            self.time_signed,
            self.fudge
        )?;
        fmt_sized_base64(&self.mac, f)?;
        write!(f, " {} {} ", self.original_id, self.error)?;
        fmt_sized_base64(&self.other, f)
    }
}

//------------ Time48 --------------------------------------------------------

/// A 48-bit Unix timestamp.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time48(u64);

impl Time48 {
    /// Returns the timestamp of the current moment.
    pub fn now() -> Time48 {
        Self::from_u64(
            u64::try_from(OffsetDateTime::now_utc().unix_timestamp())
                .unwrap_or(0),
        )
    }

    /// Creates a value from a 64 bit integer.
    ///
    /// The upper 16 bits of the argument are dropped.
    pub fn from_u64(value: u64) -> Self {
        Time48(value & 0xFFFF_FFFF_FFFF)
    }

    /// Converts a value into its wire format.
    pub fn into_octets(self) -> [u8; 6] {
        let mut res = [0u8; 6];
        res.copy_from_slice(&self.0.to_be_bytes()[2..]);
        res
    }

    /// Returns whether the time is within a given period.
    ///
    /// Returns `true` iff `other` is at most `fudge` seconds before or after
    /// this value’s time.
    pub fn eq_fudged(self, other: Self, fudge: u64) -> bool {
        self.0.saturating_sub(fudge) <= other.0
            && self.0.saturating_add(fudge) >= other.0
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut buf = [0u8; 8];
        buf[2..].copy_from_slice(parser.parse_slice(6)?);
        Ok(Time48(u64::from_be_bytes(buf)))
    }

    pub fn compose(&self, target: &mut Composer) {
        target.append_slice(&self.into_octets())
    }
}

impl From<Time48> for u64 {
    fn from(value: Time48) -> u64 {
        value.0
    }
}

impl fmt::Display for Time48 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::base::rdata::test::{test_compose_parse, test_display_scan};

    #[test]
    fn tsig_compose_parse_scan() {
        let rdata = Tsig::new(
            name("hmac-md5.sig-alg.reg.int"),
            Time48::from_u64(1_700_000_000),
            300,
            &b"foobar"[..],
            4711,
            TsigRcode::NOERROR,
            Bytes::new(),
        );
        test_compose_parse(&rdata, Tsig::parse);
        test_display_scan(
            &rdata,
            Tsig::scan,
            "hmac-md5.sig-alg.reg.int. 1700000000 300 6 Zm9vYmFy 4711 \
             NOERROR 0",
        );
    }

    #[test]
    fn tsig_with_other() {
        let rdata = Tsig::new(
            name("hmac-sha256"),
            Time48::from_u64(1),
            10,
            Bytes::new(),
            1,
            TsigRcode::BADTIME,
            &b"\x00\x00\x65\x53\xf1\x00"[..],
        );
        test_compose_parse(&rdata, Tsig::parse);
        test_display_scan(
            &rdata,
            Tsig::scan,
            "hmac-sha256. 1 10 0 1 BADTIME 6 AABlU/EA",
        );
    }

    #[test]
    fn time48() {
        let time = Time48::from_u64(0x0102_0304_0506);
        assert_eq!(time.into_octets(), [1, 2, 3, 4, 5, 6]);
        let mut parser = Parser::from_slice(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(Time48::parse(&mut parser).unwrap(), time);
        assert!(time.eq_fudged(Time48::from_u64(0x0102_0304_0506 + 300), 300));
        assert!(!time.eq_fudged(Time48::from_u64(0x0102_0304_0506 + 301), 300));
        assert!(u64::from(Time48::now()) > 1_600_000_000);
    }
}
