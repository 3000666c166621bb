//! Record data from [RFC 6891]: OPT records.
//!
//! The OPT record is a pseudo record that marks EDNS support. It
//! requisitions the class and TTL fields of the record for its own
//! purposes. Accessors for those live on [`Record`]. The record data
//! itself is a sequence of options.
//!
//! [`Record`]: crate::base::Record
//! [RFC 6891]: https://tools.ietf.org/html/rfc6891

use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData, UnknownRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use bytes::Bytes;
use core::fmt;

/// The option code of the DNS cookie option.
pub const COOKIE: u16 = 10;

//------------ Opt ----------------------------------------------------------

/// OPT record data.
///
/// The data is a list of options, each with a 16 bit code and some
/// octets. It is shown in the generic format since there is no commonly
/// agreed upon presentation format.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Opt {
    options: Vec<OptOption>,
}

impl Opt {
    /// Creates OPT record data without any options.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(options: Vec<OptOption>) -> Self {
        Opt { options }
    }

    pub fn options(&self) -> &[OptOption] {
        &self.options
    }

    /// Returns the first option with the given code.
    pub fn first(&self, code: u16) -> Option<&OptOption> {
        self.options.iter().find(|opt| opt.code == code)
    }

    pub fn push(&mut self, option: OptOption) {
        self.options.push(option)
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut options = Vec::new();
        while parser.remaining() > 0 {
            let code = parser.parse_u16()?;
            let len = usize::from(parser.parse_u16()?);
            options.push(OptOption::new(code, parser.parse_bytes(len)?));
        }
        Ok(Opt { options })
    }

    /// Scans the generic record data format.
    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let data = UnknownRecordData::scan(Rtype::OPT, scanner)?;
        Self::parse(&mut Parser::from_slice(data.data()))
            .map_err(|_| ScanError::custom("malformed OPT data"))
    }
}

impl RtypeRecordData for Opt {
    const RTYPE: Rtype = Rtype::OPT;
}

impl ComposeRecordData for Opt {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        for option in &self.options {
            target.append_u16(option.code);
            let len = u16::try_from(option.data.len())
                .map_err(|_| ComposeError::LongData)?;
            target.append_u16(len);
            target.append_slice(&option.data);
        }
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for Opt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut target = Composer::without_compression();
        if self.compose_rdata(&mut target).is_err() {
            return Err(fmt::Error);
        }
        match UnknownRecordData::from_octets(Rtype::OPT, target.freeze()) {
            Ok(data) => fmt::Display::fmt(&data, f),
            Err(_) => Err(fmt::Error),
        }
    }
}

//------------ OptOption ----------------------------------------------------

/// A single EDNS option.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OptOption {
    code: u16,
    data: Bytes,
}

impl OptOption {
    pub fn new(code: u16, data: impl Into<Bytes>) -> Self {
        OptOption {
            code,
            data: data.into(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

//============ Testing =======================================================
