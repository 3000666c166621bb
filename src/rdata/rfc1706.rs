//! Record data from [RFC 1706]: NSAP records.
//!
//! [RFC 1706]: https://tools.ietf.org/html/rfc1706

use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use crate::utils::base16;
use bytes::Bytes;
use core::fmt;

//------------ Nsap ---------------------------------------------------------

/// Nsap record data.
///
/// The record holds an OSI network service access point address as raw
/// octets. In presentation format the address is written as hex digits
/// following `0x`. Dots may be used to group the digits and are ignored.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Nsap {
    address: Bytes,
}

impl Nsap {
    pub fn from_octets(address: impl Into<Bytes>) -> Self {
        Nsap {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &Bytes {
        &self.address
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Self::from_octets(parser.parse_remaining()))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let token = scanner.scan_str()?;
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .ok_or(ScanError::custom("NSAP address must start with 0x"))?;
        let digits: String = digits.chars().filter(|&ch| ch != '.').collect();
        if digits.is_empty() {
            return Err(ScanError::custom("empty NSAP address"));
        }
        base16::decode(&digits)
            .map(Self::from_octets)
            .map_err(|_| ScanError::custom("bad NSAP address"))
    }
}

impl RtypeRecordData for Nsap {
    const RTYPE: Rtype = Rtype::NSAP;
}

impl ComposeRecordData for Nsap {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_slice(&self.address);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for Nsap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("0x")?;
        base16::display(&self.address, f)
    }
}

//============ Testing =======================================================
