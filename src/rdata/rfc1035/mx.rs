//! The MX record.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::cmp::Ordering;
use core::fmt;

//------------ Mx ------------------------------------------------------------

/// A mail exchange for the owner name.
///
/// Of several exchanges, those with a lower preference are tried first.
/// See [RFC 1035, section 3.3.9][1].
///
/// [1]: https://tools.ietf.org/html/rfc1035#section-3.3.9
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Mx {
    preference: u16,
    exchange: Name,
}

impl Mx {
    pub fn new(preference: u16, exchange: Name) -> Self {
        Mx {
            preference,
            exchange,
        }
    }

    pub fn preference(&self) -> u16 {
        self.preference
    }

    pub fn exchange(&self) -> &Name {
        &self.exchange
    }

    /// Orders by preference only, as used when sorting answers.
    pub fn preference_cmp(&self, other: &Self) -> Ordering {
        self.preference.cmp(&other.preference)
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let preference = parser.parse_u16()?;
        Ok(Mx::new(preference, Name::parse(parser)?))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let preference = scanner.scan_u16()?;
        Ok(Mx::new(preference, scanner.scan_name()?))
    }
}

impl RtypeRecordData for Mx {
    const RTYPE: Rtype = Rtype::MX;
}

impl ComposeRecordData for Mx {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u16(self.preference);
        target.append_compressed_name(&self.exchange)
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_u16(self.preference);
        target.append_canonical_name(&self.exchange);
        Ok(())
    }
}

impl fmt::Display for Mx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange.fqdn())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::base::rdata::test::{test_compose_parse, test_display_scan};

    #[test]
    fn compose_parse_scan() {
        let rdata = Mx::new(10, name("mx1.example.org"));
        test_compose_parse(&rdata, Mx::parse);
        test_display_scan(&rdata, Mx::scan, "10 mx1.example.org.");
    }

    #[test]
    fn preference_order() {
        let low = Mx::new(10, name("b.example"));
        let high = Mx::new(20, name("a.example"));
        assert_eq!(low.preference_cmp(&high), Ordering::Less);
    }
}
