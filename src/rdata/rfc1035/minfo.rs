//! The MINFO record.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;

//------------ Minfo --------------------------------------------------------

/// The mailboxes in charge of a mailing list. Experimental.
///
/// `rmailbx` runs the list, `emailbx` receives errors about it. A root
/// name in either place points back at the owner or the sender
/// respectively. See [RFC 1035, section 3.3.7][1].
///
/// [1]: https://tools.ietf.org/html/rfc1035#section-3.3.7
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Minfo {
    rmailbx: Name,
    emailbx: Name,
}

impl Minfo {
    pub fn new(rmailbx: Name, emailbx: Name) -> Self {
        Minfo { rmailbx, emailbx }
    }

    pub fn rmailbx(&self) -> &Name {
        &self.rmailbx
    }

    pub fn emailbx(&self) -> &Name {
        &self.emailbx
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let rmailbx = Name::parse(parser)?;
        Ok(Minfo::new(rmailbx, Name::parse(parser)?))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let rmailbx = scanner.scan_name()?;
        Ok(Minfo::new(rmailbx, scanner.scan_name()?))
    }
}

impl RtypeRecordData for Minfo {
    const RTYPE: Rtype = Rtype::MINFO;
}

impl ComposeRecordData for Minfo {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_compressed_name(&self.rmailbx)?;
        target.append_compressed_name(&self.emailbx)
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_canonical_name(&self.rmailbx);
        target.append_canonical_name(&self.emailbx);
        Ok(())
    }
}

impl fmt::Display for Minfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.rmailbx.fqdn(), self.emailbx.fqdn())
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
        let rdata = Minfo::new(
            name("owner-list.example.com"),
            name("list-errors.example.com"),
        );
        test_compose_parse(&rdata, Minfo::parse);
        test_display_scan(
            &rdata,
            Minfo::scan,
            "owner-list.example.com. list-errors.example.com.",
        );
    }
}
