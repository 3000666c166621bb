//! Record data from [RFC 2163]: PX records.
//!
//! [RFC 2163]: https://tools.ietf.org/html/rfc2163

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::cmp::Ordering;
use core::fmt;

//------------ Px -----------------------------------------------------------

/// Px record data.
///
/// The record maps between RFC 822 mail domains and X.400 addresses. Its
/// names are never compressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Px {
    preference: u16,
    map822: Name,
    mapx400: Name,
}

impl Px {
    pub fn new(preference: u16, map822: Name, mapx400: Name) -> Self {
        Px {
            preference,
            map822,
            mapx400,
        }
    }

    pub fn preference(&self) -> u16 {
        self.preference
    }

    /// The RFC 822 part of the mapping.
    pub fn map822(&self) -> &Name {
        &self.map822
    }

    /// The X.400 part of the mapping.
    pub fn mapx400(&self) -> &Name {
        &self.mapx400
    }

    pub fn preference_cmp(&self, other: &Self) -> Ordering {
        self.preference.cmp(&other.preference)
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Self::new(
            parser.parse_u16()?,
            Name::parse(parser)?,
            Name::parse(parser)?,
        ))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(
            scanner.scan_u16()?,
            scanner.scan_name()?,
            scanner.scan_name()?,
        ))
    }
}

impl RtypeRecordData for Px {
    const RTYPE: Rtype = Rtype::PX;
}

impl ComposeRecordData for Px {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u16(self.preference);
        target.append_uncompressed_name(&self.map822);
        target.append_uncompressed_name(&self.mapx400);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_u16(self.preference);
        target.append_canonical_name(&self.map822);
        target.append_canonical_name(&self.mapx400);
        Ok(())
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.preference,
            self.map822.fqdn(),
            self.mapx400.fqdn()
        )
    }
}

//============ Testing =======================================================
