//! Record data from [RFC 2782]: SRV records.
//!
//! [RFC 2782]: https://tools.ietf.org/html/rfc2782

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::cmp::Ordering;
use core::fmt;

//------------ Srv ---------------------------------------------------------

/// Srv record data.
///
/// The record names a host providing a service together with its port.
/// The target name is never compressed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Srv {
    priority: u16,
    weight: u16,
    port: u16,
    target: Name,
}

impl Srv {
    pub fn new(priority: u16, weight: u16, port: u16, target: Name) -> Self {
        Srv {
            priority,
            weight,
            port,
            target,
        }
    }

    /// Lower priorities must be tried first.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Selects among targets of equal priority. Larger weights are picked
    /// more often.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn target(&self) -> &Name {
        &self.target
    }

    /// Orders by ascending priority and then by descending weight.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.weight.cmp(&self.weight))
    }

    /// Orders by descending weight and then by ascending priority.
    pub fn weight_cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| self.priority.cmp(&other.priority))
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Self::new(
            parser.parse_u16()?,
            parser.parse_u16()?,
            parser.parse_u16()?,
            Name::parse(parser)?,
        ))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(
            scanner.scan_u16()?,
            scanner.scan_u16()?,
            scanner.scan_u16()?,
            scanner.scan_name()?,
        ))
    }
}

impl RtypeRecordData for Srv {
    const RTYPE: Rtype = Rtype::SRV;
}

impl ComposeRecordData for Srv {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u16(self.priority);
        target.append_u16(self.weight);
        target.append_u16(self.port);
        target.append_uncompressed_name(&self.target);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_u16(self.priority);
        target.append_u16(self.weight);
        target.append_u16(self.port);
        target.append_canonical_name(&self.target);
        Ok(())
    }
}

impl fmt::Display for Srv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority,
            self.weight,
            self.port,
            self.target.fqdn()
        )
    }
}

//============ Testing =======================================================
