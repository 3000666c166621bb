//! Record data from [RFC 4408]: SPF records.
//!
//! [RFC 4408]: https://tools.ietf.org/html/rfc4408

use crate::base::charstr::CharStr;
use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use crate::rdata::rfc1035::Txt;
use core::fmt;

//------------ Spf ----------------------------------------------------------

/// Spf record data.
///
/// The record has the same format as a TXT record and contains a sender
/// policy.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Spf(Txt);

impl Spf {
    pub fn new(strings: Vec<CharStr>) -> Self {
        Spf(Txt::new(strings))
    }

    /// Returns an iterator over the character strings.
    pub fn iter(&self) -> impl Iterator<Item = &CharStr> {
        self.0.iter()
    }

    /// Returns the policy as the concatenation of all strings.
    pub fn text(&self) -> Vec<u8> {
        self.0.text()
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Txt::parse(parser).map(Spf)
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Txt::scan(scanner).map(Spf)
    }
}

impl From<Txt> for Spf {
    fn from(txt: Txt) -> Self {
        Spf(txt)
    }
}

impl RtypeRecordData for Spf {
    const RTYPE: Rtype = Rtype::SPF;
}

impl ComposeRecordData for Spf {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        self.0.compose_rdata(target)
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.0.compose_canonical_rdata(target)
    }
}

impl fmt::Display for Spf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::rdata::test::{test_compose_parse, test_display_scan};

    #[test]
    fn spf_compose_parse_scan() {
        let rdata = Spf::new(vec!["v=spf1 -all".parse().unwrap()]);
        test_compose_parse(&rdata, Spf::parse);
        test_display_scan(&rdata, Spf::scan, "\"v=spf1 -all\"");
        assert_eq!(rdata.text(), b"v=spf1 -all");
    }
}
