//! Record data from [RFC 4255]: SSHFP records.
//!
//! [RFC 4255]: https://tools.ietf.org/html/rfc4255

use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use crate::utils::base16;
use bytes::Bytes;
use core::fmt;

//------------ Sshfp --------------------------------------------------------

/// Sshfp record data.
///
/// The record publishes the fingerprint of an SSH host key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Sshfp {
    algorithm: u8,
    fingerprint_type: u8,
    fingerprint: Bytes,
}

impl Sshfp {
    pub fn new(
        algorithm: u8,
        fingerprint_type: u8,
        fingerprint: impl Into<Bytes>,
    ) -> Self {
        Sshfp {
            algorithm,
            fingerprint_type,
            fingerprint: fingerprint.into(),
        }
    }

    /// The public key algorithm: 1 is RSA, 2 is DSA.
    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    /// The fingerprint type: 1 is SHA-1.
    pub fn fingerprint_type(&self) -> u8 {
        self.fingerprint_type
    }

    pub fn fingerprint(&self) -> &Bytes {
        &self.fingerprint
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let algorithm = parser.parse_u8()?;
        let fingerprint_type = parser.parse_u8()?;
        Ok(Self::new(
            algorithm,
            fingerprint_type,
            parser.parse_remaining(),
        ))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(
            scanner.scan_u8()?,
            scanner.scan_u8()?,
            scanner.scan_hex_tail()?,
        ))
    }
}

impl RtypeRecordData for Sshfp {
    const RTYPE: Rtype = Rtype::SSHFP;
}

impl ComposeRecordData for Sshfp {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u8(self.algorithm);
        target.append_u8(self.fingerprint_type);
        target.append_slice(&self.fingerprint);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for Sshfp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ", self.algorithm, self.fingerprint_type)?;
        base16::display(&self.fingerprint, f)
    }
}

//============ Testing =======================================================
