//! The SOA record.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;

//------------ Soa ----------------------------------------------------------

/// The start of a zone.
///
/// Besides the primary server and the responsible mailbox, this carries
/// the serial and timers that secondaries use to keep their copy current.
/// The last field doubles as the TTL for negative answers. See
/// [RFC 1035, section 3.3.13][1] and [RFC 2308].
///
/// [1]: https://tools.ietf.org/html/rfc1035#section-3.3.13
/// [RFC 2308]: https://tools.ietf.org/html/rfc2308
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Soa {
    mname: Name,
    rname: Name,
    serial: u32,
    refresh: u32,
    retry: u32,
    expire: u32,
    minimum: u32,
}

impl Soa {
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    pub fn mname(&self) -> &Name {
        &self.mname
    }

    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// Compared with serial number arithmetic of RFC 1982.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn refresh(&self) -> u32 {
        self.refresh
    }

    pub fn retry(&self) -> u32 {
        self.retry
    }

    /// The upper limit of time the zone is authoritative.
    pub fn expire(&self) -> u32 {
        self.expire
    }

    /// The minimum TTL to be exported with any RR from this zone.
    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Self::new(
            Name::parse(parser)?,
            Name::parse(parser)?,
            parser.parse_u32()?,
            parser.parse_u32()?,
            parser.parse_u32()?,
            parser.parse_u32()?,
            parser.parse_u32()?,
        ))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(
            scanner.scan_name()?,
            scanner.scan_name()?,
            scanner.scan_u32()?,
            scanner.scan_u32()?,
            scanner.scan_u32()?,
            scanner.scan_u32()?,
            scanner.scan_u32()?,
        ))
    }

    fn compose_fixed(&self, target: &mut Composer) {
        target.append_u32(self.serial);
        target.append_u32(self.refresh);
        target.append_u32(self.retry);
        target.append_u32(self.expire);
        target.append_u32(self.minimum);
    }
}

//--- RtypeRecordData, ComposeRecordData

impl RtypeRecordData for Soa {
    const RTYPE: Rtype = Rtype::SOA;
}

impl ComposeRecordData for Soa {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_compressed_name(&self.mname)?;
        target.append_compressed_name(&self.rname)?;
        self.compose_fixed(target);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_canonical_name(&self.mname);
        target.append_canonical_name(&self.rname);
        self.compose_fixed(target);
        Ok(())
    }
}

//--- Display

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname.fqdn(),
            self.rname.fqdn(),
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::base::rdata::test::{
        test_compose_parse, test_display_scan, test_scan,
    };

    #[test]
    fn soa_compose_parse_scan() {
        let rdata = Soa::new(
            name("m.example.com"),
            name("r.example.com"),
            11,
            12,
            13,
            14,
            15,
        );
        test_compose_parse(&rdata, Soa::parse);
        test_display_scan(
            &rdata,
            Soa::scan,
            "m.example.com. r.example.com. 11 12 13 14 15",
        );
        test_scan(
            "m.example.com. r.example.com. ( 11 ; serial\n 12 13 14 15 )",
            Soa::scan,
            &rdata,
        );
    }
}
