//! Record data from [RFC 1183]: RP, AFSDB, X25, ISDN, and RT.
//!
//! None of these types may compress the domain names in their record data.
//!
//! [RFC 1183]: https://tools.ietf.org/html/rfc1183

use crate::base::charstr::CharStr;
use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::cmp::Ordering;
use core::fmt;

//------------ Rp -----------------------------------------------------------

/// Rp record data.
///
/// The Responsible Person record names the mailbox of the person
/// responsible for the owner name and a domain with TXT records containing
/// further information.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rp {
    mbox: Name,
    txt: Name,
}

impl Rp {
    pub fn new(mbox: Name, txt: Name) -> Self {
        Rp { mbox, txt }
    }

    /// The mailbox of the responsible person.
    pub fn mbox(&self) -> &Name {
        &self.mbox
    }

    /// The domain name with TXT records for the responsible person.
    pub fn txt(&self) -> &Name {
        &self.txt
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Self::new(Name::parse(parser)?, Name::parse(parser)?))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Ok(Self::new(scanner.scan_name()?, scanner.scan_name()?))
    }
}

impl RtypeRecordData for Rp {
    const RTYPE: Rtype = Rtype::RP;
}

impl ComposeRecordData for Rp {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_uncompressed_name(&self.mbox);
        target.append_uncompressed_name(&self.txt);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_canonical_name(&self.mbox);
        target.append_canonical_name(&self.txt);
        Ok(())
    }
}

impl fmt::Display for Rp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.mbox.fqdn(), self.txt.fqdn())
    }
}

//------------ Afsdb and Rt -------------------------------------------------

/// Creates a record data type with a 16 bit value and a domain name.
macro_rules! preference_name_type {
    ( $(#[$attr:meta])* ( $target:ident, $rtype:ident, $pref:ident,
                          $name:ident ) ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $target {
            $pref: u16,
            $name: Name,
        }

        impl $target {
            pub fn new($pref: u16, $name: Name) -> Self {
                $target { $pref, $name }
            }

            pub fn $pref(&self) -> u16 {
                self.$pref
            }

            pub fn $name(&self) -> &Name {
                &self.$name
            }

            /// Compares two values by their numeric field.
            pub fn preference_cmp(&self, other: &Self) -> Ordering {
                self.$pref.cmp(&other.$pref)
            }

            pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
                Ok(Self::new(parser.parse_u16()?, Name::parse(parser)?))
            }

            pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
                Ok(Self::new(scanner.scan_u16()?, scanner.scan_name()?))
            }
        }

        impl RtypeRecordData for $target {
            const RTYPE: Rtype = Rtype::$rtype;
        }

        impl ComposeRecordData for $target {
            fn compose_rdata(
                &self,
                target: &mut Composer,
            ) -> Result<(), ComposeError> {
                target.append_u16(self.$pref);
                target.append_uncompressed_name(&self.$name);
                Ok(())
            }

            fn compose_canonical_rdata(
                &self,
                target: &mut Composer,
            ) -> Result<(), ComposeError> {
                target.append_u16(self.$pref);
                target.append_canonical_name(&self.$name);
                Ok(())
            }
        }

        impl fmt::Display for $target {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{} {}", self.$pref, self.$name.fqdn())
            }
        }
    }
}

preference_name_type! {
    /// Afsdb record data.
    ///
    /// The record names an AFS database server or a DCE authenticated name
    /// server. The subtype distinguishes the two.
    (Afsdb, AFSDB, subtype, hostname)
}

preference_name_type! {
    /// Rt record data.
    ///
    /// The Route Through record names an intermediate host that can route
    /// traffic for the owner. Lower preferences are preferred.
    (Rt, RT, preference, intermediate)
}

//------------ X25 ----------------------------------------------------------

/// X25 record data.
///
/// The record contains the PSDN address of the owner as a string of
/// decimal digits.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct X25 {
    psdn_address: CharStr,
}

impl X25 {
    pub fn new(psdn_address: CharStr) -> Self {
        X25 { psdn_address }
    }

    pub fn psdn_address(&self) -> &CharStr {
        &self.psdn_address
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        CharStr::parse(parser).map(Self::new)
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        scanner.scan_charstr().map(Self::new)
    }
}

impl RtypeRecordData for X25 {
    const RTYPE: Rtype = Rtype::X25;
}

impl ComposeRecordData for X25 {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        self.psdn_address.compose(target);
        Ok(())
    }

    fn compose_canonical_rdata(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        self.compose_rdata(target)
    }
}

impl fmt::Display for X25 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.psdn_address, f)
    }
}

//------------ Isdn ---------------------------------------------------------

/// Isdn record data.
///
/// The record contains an ISDN address and an optional subaddress.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Isdn {
    address: CharStr,
    sa: Option<CharStr>,
}

impl Isdn {
    pub fn new(address: CharStr, sa: Option<CharStr>) -> Self {
        Isdn { address, sa }
    }

    pub fn address(&self) -> &CharStr {
        &self.address
    }

    pub fn sa(&self) -> Option<&CharStr> {
        self.sa.as_ref()
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let address = CharStr::parse(parser)?;
        let sa = if parser.remaining() > 0 {
            Some(CharStr::parse(parser)?)
        } else {
            None
        };
        Ok(Self::new(address, sa))
    }

    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let address = scanner.scan_charstr()?;
        let sa = if scanner.continues() {
            Some(scanner.scan_charstr()?)
        } else {
            None
        };
        Ok(Self::new(address, sa))
    }
}

impl RtypeRecordData for Isdn {
    const RTYPE: Rtype = Rtype::ISDN;
}

impl ComposeRecordData for Isdn {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        self.address.compose(target);
        if let Some(ref sa) = self.sa {
            sa.compose(target)
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

impl fmt::Display for Isdn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.address, f)?;
        if let Some(ref sa) = self.sa {
            write!(f, " {}", sa)?;
        }
        Ok(())
    }
}

//============ Testing =======================================================
