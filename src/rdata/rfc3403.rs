//! Record data from [RFC 3403]: NAPTR records.
//!
//! [RFC 3403]: https://tools.ietf.org/html/rfc3403

use crate::base::charstr::CharStr;
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::cmp::Ordering;
use core::fmt;

//------------ Naptr ---------------------------------------------------------

/// Naptr record data.
///
/// The Naming Authority Pointer record applies a rewrite rule to a string
/// producing either a new domain name or a URI. The replacement name is
/// never compressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Naptr {
    order: u16,
    preference: u16,
    flags: CharStr,
    services: CharStr,
    regexp: CharStr,
    replacement: Name,
}

impl Naptr {
    pub fn new(
        order: u16,
        preference: u16,
        flags: CharStr,
        services: CharStr,
        regexp: CharStr,
        replacement: Name,
    ) -> Self {
        Naptr {
            order,
            preference,
            flags,
            services,
            regexp,
            replacement,
        }
    }

    pub fn order(&self) -> u16 {
        self.order
    }

    pub fn preference(&self) -> u16 {
        self.preference
    }

    pub fn flags(&self) -> &CharStr {
        &self.flags
    }

    pub fn services(&self) -> &CharStr {
        &self.services
    }

    pub fn regexp(&self) -> &CharStr {
        &self.regexp
    }

    pub fn replacement(&self) -> &Name {
        &self.replacement
    }

    /// Orders by order and then by preference.
    pub fn order_cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.preference.cmp(&other.preference))
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Self::new(
            parser.parse_u16()?,
            parser.parse_u16()?,
            CharStr::parse(parser)?,
            CharStr::parse(parser)?,
            CharStr::parse(parser)?,
            Name::parse(parser)?,
        ))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(
            scanner.scan_u16()?,
            scanner.scan_u16()?,
            scanner.scan_charstr()?,
            scanner.scan_charstr()?,
            scanner.scan_charstr()?,
            scanner.scan_name()?,
        ))
    }
}

impl RtypeRecordData for Naptr {
    const RTYPE: Rtype = Rtype::NAPTR;
}

impl ComposeRecordData for Naptr {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u16(self.order);
        target.append_u16(self.preference);
        self.flags.compose(target);
        self.services.compose(target);
        self.regexp.compose(target);
        target.append_uncompressed_name(&self.replacement);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_u16(self.order);
        target.append_u16(self.preference);
        self.flags.compose(target);
        self.services.compose(target);
        self.regexp.compose(target);
        target.append_canonical_name(&self.replacement);
        Ok(())
    }
}

impl fmt::Display for Naptr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.order,
            self.preference,
            self.flags,
            self.services,
            self.regexp,
            self.replacement.fqdn()
        )
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::base::rdata::test::{test_compose_parse, test_display_scan};

    #[test]
    fn naptr_compose_parse_scan() {
        let rdata = Naptr::new(
            100,
            50,
            "s".parse().unwrap(),
            "http+I2L+I2C+I2R".parse().unwrap(),
            "".parse().unwrap(),
            name("_http._tcp.example.com"),
        );
        test_compose_parse(&rdata, Naptr::parse);
        test_display_scan(
            &rdata,
            Naptr::scan,
            "100 50 \"s\" \"http+I2L+I2C+I2R\" \"\" _http._tcp.example.com.",
        );
    }

    #[test]
    fn naptr_order() {
        let mk = |order, pref| {
            Naptr::new(
                order,
                pref,
                CharStr::empty(),
                CharStr::empty(),
                CharStr::empty(),
                Name::root(),
            )
        };
        assert_eq!(mk(10, 20).order_cmp(&mk(20, 10)), Ordering::Less);
        assert_eq!(mk(10, 20).order_cmp(&mk(10, 10)), Ordering::Greater);
    }
}
