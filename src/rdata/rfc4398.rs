//! Record data from [RFC 4398]: CERT records.
//!
//! [RFC 4398]: https://tools.ietf.org/html/rfc4398

use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use crate::utils::base64;
use bytes::Bytes;
use core::fmt;

/// Certificate type mnemonics.
const CERT_TYPES: &[(u16, &str)] = &[
    (1, "PKIX"),
    (2, "SPKI"),
    (3, "PGP"),
    (4, "IPKIX"),
    (5, "ISPKI"),
    (6, "IPGP"),
    (7, "ACPKIX"),
    (8, "IACPKIX"),
    (253, "URI"),
    (254, "OID"),
];

//------------ Cert ---------------------------------------------------------

/// Cert record data.
///
/// The record stores a certificate or a certificate revocation list.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Cert {
    cert_type: u16,
    key_tag: u16,
    algorithm: u8,
    certificate: Bytes,
}

impl Cert {
    pub fn new(
        cert_type: u16,
        key_tag: u16,
        algorithm: u8,
        certificate: impl Into<Bytes>,
    ) -> Self {
        Cert {
            cert_type,
            key_tag,
            algorithm,
            certificate: certificate.into(),
        }
    }

    pub fn cert_type(&self) -> u16 {
        self.cert_type
    }

    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn certificate(&self) -> &Bytes {
        &self.certificate
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let cert_type = parser.parse_u16()?;
        let key_tag = parser.parse_u16()?;
        let algorithm = parser.parse_u8()?;
        Ok(Self::new(
            cert_type,
            key_tag,
            algorithm,
            parser.parse_remaining(),
        ))
    }

    /// Scans the presentation format.
    ///
    /// The certificate type may be given as a number or a mnemonic.
    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let token = scanner.scan_str()?;
        let cert_type = match CERT_TYPES
            .iter()
            .find(|(_, mnemonic)| mnemonic.eq_ignore_ascii_case(token))
        {
            Some(&(value, _)) => value,
            None => token
                .parse()
                .map_err(|_| ScanError::custom("bad certificate type"))?,
        };
        Ok(Self::new(
            cert_type,
            scanner.scan_u16()?,
            scanner.scan_u8()?,
            scanner.scan_base64_tail()?,
        ))
    }
}

impl RtypeRecordData for Cert {
    const RTYPE: Rtype = Rtype::CERT;
}

impl ComposeRecordData for Cert {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_u16(self.cert_type);
        target.append_u16(self.key_tag);
        target.append_u8(self.algorithm);
        target.append_slice(&self.certificate);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for Cert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match CERT_TYPES.iter().find(|(value, _)| *value == self.cert_type) {
            Some((_, mnemonic)) => f.write_str(mnemonic)?,
            None => write!(f, "{}", self.cert_type)?,
        }
        write!(f, " {} {} ", self.key_tag, self.algorithm)?;
        base64::display(&self.certificate, f)
    }
}

//============ Testing =======================================================
