//! The NULL record.

use crate::base::iana::Rtype;
use crate::base::rdata::{
    ComposeRecordData, RtypeRecordData, UnknownRecordData,
};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use bytes::Bytes;
use core::fmt;

//------------ Null ---------------------------------------------------------

/// Arbitrary data of up to 65535 octets. Experimental.
///
/// NULL records have no zone file form of their own, so text uses the
/// generic `\#` notation. See [RFC 1035, section 3.3.10][1].
///
/// [1]: https://tools.ietf.org/html/rfc1035#section-3.3.10
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Null {
    data: Bytes,
}

impl Null {
    /// Fails if `data` is longer than 65535 octets.
    pub fn from_octets(data: impl Into<Bytes>) -> Result<Self, ComposeError> {
        let data = data.into();
        if data.len() > 0xFFFF {
            Err(ComposeError::LongData)
        } else {
            Ok(Null { data })
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Null {
            data: parser.parse_remaining(),
        })
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        UnknownRecordData::scan(Rtype::NULL, scanner).map(|data| Null {
            data: data.data().clone(),
        })
    }
}

//--- RtypeRecordData, ComposeRecordData

impl RtypeRecordData for Null {
    const RTYPE: Rtype = Rtype::NULL;
}

impl ComposeRecordData for Null {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_slice(self.data.as_ref());
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

//--- Display

impl fmt::Display for Null {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match UnknownRecordData::from_octets(Rtype::NULL, self.data.clone()) {
            Ok(data) => fmt::Display::fmt(&data, f),
            Err(_) => Err(fmt::Error),
        }
    }
}

//============ Testing =======================================================
