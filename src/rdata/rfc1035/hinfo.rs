//! The HINFO record.

use crate::base::charstr::CharStr;
use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;

//------------ Hinfo --------------------------------------------------------

/// CPU and operating system of a host.
///
/// See [RFC 1035, section 3.3.2][1].
///
/// [1]: https://tools.ietf.org/html/rfc1035#section-3.3.2
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Hinfo {
    cpu: CharStr,
    os: CharStr,
}

impl Hinfo {
    pub fn new(cpu: CharStr, os: CharStr) -> Self {
        Hinfo { cpu, os }
    }

    pub fn cpu(&self) -> &CharStr {
        &self.cpu
    }

    pub fn os(&self) -> &CharStr {
        &self.os
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Self::new(CharStr::parse(parser)?, CharStr::parse(parser)?))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(scanner.scan_charstr()?, scanner.scan_charstr()?))
    }
}

impl RtypeRecordData for Hinfo {
    const RTYPE: Rtype = Rtype::HINFO;
}

impl ComposeRecordData for Hinfo {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        self.cpu.compose(target);
        self.os.compose(target);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for Hinfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.cpu, self.os)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::rdata::test::{test_compose_parse, test_display_scan};

    #[test]
    fn compose_parse_scan() {
        let rdata = Hinfo::new(
            "cpu".parse().unwrap(),
            "some os".parse().unwrap(),
        );
        test_compose_parse(&rdata, Hinfo::parse);
        test_display_scan(&rdata, Hinfo::scan, "\"cpu\" \"some os\"");
    }
}
