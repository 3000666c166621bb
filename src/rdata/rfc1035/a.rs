//! The A record.

use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::{fmt, str::FromStr};
use std::net::{AddrParseError, Ipv4Addr};

//------------ A -------------------------------------------------------------

/// The IPv4 address of a host.
///
/// Four octets on the wire, dotted quad in text. See [RFC 1035, section
/// 3.4.1][1].
///
/// [1]: https://tools.ietf.org/html/rfc1035#section-3.4.1
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct A(Ipv4Addr);

impl A {
    pub fn new(addr: Ipv4Addr) -> Self {
        A(addr)
    }

    pub fn from_octets(a: u8, b: u8, c: u8, d: u8) -> Self {
        A(Ipv4Addr::new(a, b, c, d))
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.0
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut octets = [0u8; 4];
        octets.copy_from_slice(parser.parse_slice(4)?);
        Ok(A(octets.into()))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        scanner.scan_ipv4().map(A)
    }
}

impl From<Ipv4Addr> for A {
    fn from(addr: Ipv4Addr) -> Self {
        A(addr)
    }
}

impl From<A> for Ipv4Addr {
    fn from(rdata: A) -> Self {
        rdata.0
    }
}

impl FromStr for A {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(A)
    }
}

impl RtypeRecordData for A {
    const RTYPE: Rtype = Rtype::A;
}

impl ComposeRecordData for A {
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

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

//============ Testing =======================================================
