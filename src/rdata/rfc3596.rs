//! The AAAA record of [RFC 3596].
//!
//! [RFC 3596]: https://tools.ietf.org/html/rfc3596

use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::{fmt, str::FromStr};
use std::net::{AddrParseError, Ipv6Addr};

//------------ Aaaa ----------------------------------------------------------

/// The IPv6 address of a host.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Aaaa(Ipv6Addr);

impl Aaaa {
    pub fn new(addr: Ipv6Addr) -> Self {
        Aaaa(addr)
    }

    pub fn addr(&self) -> Ipv6Addr {
        self.0
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut octets = [0u8; 16];
        octets.copy_from_slice(parser.parse_slice(16)?);
        Ok(Aaaa(octets.into()))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        scanner.scan_ipv6().map(Aaaa)
    }
}

impl From<Ipv6Addr> for Aaaa {
    fn from(addr: Ipv6Addr) -> Self {
        Aaaa(addr)
    }
}

impl From<Aaaa> for Ipv6Addr {
    fn from(rdata: Aaaa) -> Self {
        rdata.0
    }
}

impl FromStr for Aaaa {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Aaaa)
    }
}

impl RtypeRecordData for Aaaa {
    const RTYPE: Rtype = Rtype::AAAA;
}

impl ComposeRecordData for Aaaa {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_slice(&self.0.octets());
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for Aaaa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

//============ Testing =======================================================
