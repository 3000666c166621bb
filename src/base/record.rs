//! Resource Records.
//!
//! This module defines the type [`Record`] for a complete resource record:
//! owner name, class, TTL, and record data of any of the supported types.
//! The record type is derived from the data.
//!
//! Records can be parsed from and composed into wire format, and parsed
//! from and displayed in the presentation format of zone files. OPT
//! records put their EDNS parameters into the class and TTL fields. The
//! record provides accessors that interpret these fields accordingly.
//!
//! Finally, the module contains the comparison functions used to order
//! sets of records of the same type, e.g., MX records by preference.

use super::iana::{Class, Rtype};
use super::name::Name;
use super::rdata::{ComposeRecordData, RecordData, UnknownRecordData};
use super::scan::{ScanError, Scanner};
use super::wire::{ComposeError, Composer, ParseError, Parser};
use crate::rdata::{AllRecordData, Opt};
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

//------------ Record --------------------------------------------------------

/// A DNS resource record.
///
/// All information available through the DNS is stored in resource records.
/// They have a three part key of a domain name, resource record type, and
/// class. Data is arranged in a tree which is navigated using the domain
/// name. Each node in the tree carries a label, starting with the root
/// label as the top-most node. The tree is traversed by stepping through
/// the name from right to left, finding a child node carring the label of
/// each step. The domain name resulting from this traversal is part of the
/// record itself. It is called the *owner* of the record.
///
/// The record type describes the kind of data the record holds, such as
/// IP addresses. The class, finally, describes which sort of network the
/// information is for. The DNS was originally intended to be used for
/// networks other than the Internet as well. In practice, the only
/// relevant class is IN, the Internet.
///
/// In addition, each record has a time-to-live or TTL value which says how
/// many seconds the information may be cached.
///
/// Records used in the prerequisite and update sections of UPDATE messages
/// often carry no record data at all. Such records hold empty unknown
/// data of their record type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The owner of the record.
    owner: Name,

    /// The class of the record.
    class: Class,

    /// The time-to-live value of the record.
    ttl: u32,

    /// The record data. The value also specifies the record’s type.
    data: AllRecordData,
}

/// # Creation and Element Access
///
impl Record {
    /// Creates a new record from its parts.
    pub fn new(
        owner: Name,
        class: Class,
        ttl: u32,
        data: impl Into<AllRecordData>,
    ) -> Self {
        Record {
            owner,
            class,
            ttl,
            data: data.into(),
        }
    }

    /// Creates a new record without record data.
    pub fn empty(owner: Name, rtype: Rtype, class: Class, ttl: u32) -> Self {
        Record::new(owner, class, ttl, UnknownRecordData::empty(rtype))
    }

    /// Returns a reference to the owner domain name.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    pub fn set_owner(&mut self, owner: Name) {
        self.owner = owner
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.data.rtype()
    }

    /// Returns the record class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Sets the record’s class.
    pub fn set_class(&mut self, class: Class) {
        self.class = class
    }

    /// Returns the record’s time-to-live.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Sets the record’s time-to-live.
    pub fn set_ttl(&mut self, ttl: u32) {
        self.ttl = ttl
    }

    /// Return a reference to the record data.
    pub fn data(&self) -> &AllRecordData {
        &self.data
    }

    /// Returns a mutable reference to the record data.
    pub fn data_mut(&mut self) -> &mut AllRecordData {
        &mut self.data
    }

    /// Replaces the record data with empty data of the same type.
    pub fn clear_data(&mut self) {
        self.data = UnknownRecordData::empty(self.rtype()).into()
    }

    /// Returns whether the record carries no record data.
    pub fn has_empty_data(&self) -> bool {
        matches!(self.data, AllRecordData::Unknown(ref data) if data.data().is_empty())
    }

    /// Trades the record for its record data.
    pub fn into_data(self) -> AllRecordData {
        self.data
    }

    /// Trades the record for its owner name and data.
    pub fn into_owner_and_data(self) -> (Name, AllRecordData) {
        (self.owner, self.data)
    }
}

/// # EDNS
///
/// An OPT record uses the class field for the requestor’s UDP payload
/// size and the TTL field for the extended rcode, the EDNS version, and
/// the EDNS flags. These methods interpret the fields this way regardless
/// of the record type.
impl Record {
    /// The DO bit in the EDNS flags.
    pub const DNSSEC_OK: u16 = 0x8000;

    /// Creates a new OPT record.
    pub fn opt(
        udp_payload_size: u16,
        ext_rcode: u8,
        version: u8,
        flags: u16,
    ) -> Self {
        Record::new(
            Name::root(),
            Class::from_int(udp_payload_size),
            (u32::from(ext_rcode) << 24)
                | (u32::from(version) << 16)
                | u32::from(flags),
            Opt::empty(),
        )
    }

    /// Returns whether this is an OPT record.
    pub fn is_opt(&self) -> bool {
        self.rtype() == Rtype::OPT
    }

    /// The UDP payload size the sender can receive.
    pub fn udp_payload_size(&self) -> u16 {
        self.class.to_int()
    }

    /// The upper eight bits of the extended rcode.
    pub fn ext_rcode(&self) -> u8 {
        (self.ttl >> 24) as u8
    }

    /// The EDNS version.
    pub fn edns_version(&self) -> u8 {
        (self.ttl >> 16) as u8
    }

    /// The EDNS flags.
    pub fn edns_flags(&self) -> u16 {
        self.ttl as u16
    }

    /// Returns whether the DO bit is set.
    pub fn dnssec_ok(&self) -> bool {
        self.edns_flags() & Self::DNSSEC_OK != 0
    }

    /// Sets or clears the DO bit.
    pub fn set_dnssec_ok(&mut self, value: bool) {
        if value {
            self.ttl |= u32::from(Self::DNSSEC_OK)
        } else {
            self.ttl &= !u32::from(Self::DNSSEC_OK)
        }
    }
}

/// # Parsing and Composing
///
impl Record {
    /// Parses a record from the current position of the parser.
    ///
    /// Record data that is empty but not allowed to be by the record type
    /// is kept as empty unknown data.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let owner = Name::parse(parser)?;
        let rtype = Rtype::parse(parser)?;
        let class = Class::parse(parser)?;
        let ttl = parser.parse_u32()?;
        let rdlen = parser.parse_u16()?;
        let data = parser.parse_block(rdlen.into(), |parser| {
            if rdlen == 0 {
                Ok(AllRecordData::parse(rtype, parser).unwrap_or_else(|_| {
                    UnknownRecordData::empty(rtype).into()
                }))
            } else {
                AllRecordData::parse(rtype, parser)
            }
        })?;
        Ok(Record {
            owner,
            class,
            ttl,
            data,
        })
    }

    /// Appends the wire format of the record.
    pub fn compose(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_compressed_name(&self.owner)?;
        self.rtype().compose(target);
        self.class.compose(target);
        target.append_u32(self.ttl);
        self.data.compose_len_rdata(target)
    }

    /// Appends the canonical wire format of the record.
    pub fn compose_canonical(
        &self,
        target: &mut Composer,
    ) -> Result<(), ComposeError> {
        target.append_canonical_name(&self.owner);
        self.rtype().compose(target);
        self.class.compose(target);
        target.append_u32(self.ttl);
        target.compose_len_prefixed(|target| {
            self.data.compose_canonical_rdata(target)
        })
    }

    /// Returns the canonical wire format of the record.
    pub fn to_canonical_vec(&self) -> Result<Vec<u8>, ComposeError> {
        let mut target = Composer::without_compression();
        self.compose_canonical(&mut target)?;
        Ok(target.as_slice().to_vec())
    }
}

/// # Scanning
///
impl Record {
    /// Scans a record from an entry in presentation format.
    ///
    /// The entry is `owner [ttl] [class] type [rdata]` where TTL and class
    /// may appear in either order. The TTL defaults to zero and the class
    /// to IN. Without record data, the record has empty data.
    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        Self::scan_entry(scanner).map(|(record, _)| record)
    }

    /// Scans a record and reports whether the entry contained a TTL.
    pub(crate) fn scan_entry(
        scanner: &mut Scanner,
    ) -> Result<(Self, bool), ScanError> {
        let owner = scanner.scan_name()?;
        let mut ttl = None;
        let mut class = None;
        while ttl.is_none() || class.is_none() {
            let token = match scanner.peek() {
                Some(token) => token.as_str(),
                None => break,
            };
            if ttl.is_none()
                && !token.is_empty()
                && token.bytes().all(|ch| ch.is_ascii_digit())
            {
                ttl = Some(scanner.scan_u32()?);
                continue;
            }
            if class.is_none() && !(token.eq_ignore_ascii_case("ANY")) {
                if let Ok(value) = Class::from_str(token) {
                    class = Some(value);
                    scanner.next_token()?;
                    continue;
                }
            }
            if class.is_none() && token.eq_ignore_ascii_case("ANY") {
                // ANY is a class and a type. It is the class if a type
                // follows.
                let mut lookahead = scanner.clone();
                lookahead.next_token()?;
                let type_follows = lookahead
                    .peek()
                    .map(|token| Rtype::from_str(token.as_str()).is_ok())
                    .unwrap_or(false);
                if type_follows {
                    class = Some(Class::ANY);
                    scanner.next_token()?;
                    continue;
                }
            }
            break;
        }
        let rtype = if scanner.continues() {
            scanner.scan_from_str("unknown record type")?
        } else {
            Rtype::ANY
        };
        let data = if scanner.continues() {
            AllRecordData::scan(rtype, scanner)?
        } else {
            UnknownRecordData::empty(rtype).into()
        };
        scanner.finish()?;
        let record = Record {
            owner,
            class: class.unwrap_or(Class::IN),
            ttl: ttl.unwrap_or(0),
            data,
        };
        Ok((record, ttl.is_some()))
    }
}

//--- FromStr

impl FromStr for Record {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Record::scan(&mut Scanner::new(s)?)
    }
}

//--- Display

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.owner.fqdn(),
            self.ttl,
            self.class,
            self.rtype()
        )?;
        if !self.has_empty_data() {
            write!(f, "\t{}", self.data)?;
        }
        Ok(())
    }
}

//------------ Sorting -------------------------------------------------------

/// Compares two records with the default order for their record type.
///
/// MX records are ordered by preference, SRV records by priority and then
/// by descending weight, RT, AFSDB, and PX records by preference, and NAPTR
/// records by order and then preference. Everything else is ordered by
/// its canonical record data.
pub fn default_cmp(left: &Record, right: &Record) -> Ordering {
    use AllRecordData::*;

    match (&left.data, &right.data) {
        (Mx(left), Mx(right)) => left.preference_cmp(right),
        (Srv(left), Srv(right)) => left.priority_cmp(right),
        (Rt(left), Rt(right)) => left.preference_cmp(right),
        (Afsdb(left), Afsdb(right)) => left.preference_cmp(right),
        (Px(left), Px(right)) => left.preference_cmp(right),
        (Naptr(left), Naptr(right)) => left.order_cmp(right),
        (left, right) => left.canonical_rdata_cmp(right),
    }
}

/// Compares two records by a named attribute of their record data.
///
/// Known attributes are `preference` for MX, RT, AFSDB, PX, and NAPTR,
/// `priority` and `weight` for SRV, and `order` for NAPTR. Returns `None`
/// if the attribute is not known for the records.
pub fn attribute_cmp(
    attribute: &str,
    left: &Record,
    right: &Record,
) -> Option<Ordering> {
    use AllRecordData::*;

    let res = match (attribute, &left.data, &right.data) {
        ("preference", Mx(left), Mx(right)) => left.preference_cmp(right),
        ("preference", Rt(left), Rt(right)) => left.preference_cmp(right),
        ("preference", Px(left), Px(right)) => left.preference_cmp(right),
        ("preference", Afsdb(left), Afsdb(right)) => {
            left.preference_cmp(right)
        }
        ("preference", Naptr(left), Naptr(right)) => left
            .preference()
            .cmp(&right.preference())
            .then_with(|| left.order().cmp(&right.order())),
        ("order", Naptr(left), Naptr(right)) => left.order_cmp(right),
        ("priority", Srv(left), Srv(right)) => left.priority_cmp(right),
        ("weight", Srv(left), Srv(right)) => left.weight_cmp(right),
        _ => return None,
    };
    Some(res)
}

/// Sorts a slice of records by their default order.
pub fn sort_by_default(records: &mut [Record]) {
    records.sort_by(default_cmp)
}

/// Returns the records of the given type in their default order.
pub fn rrsort<'a, I>(rtype: Rtype, records: I) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut res: Vec<_> = records
        .into_iter()
        .filter(|record| record.rtype() == rtype)
        .cloned()
        .collect();
    sort_by_default(&mut res);
    res
}

/// Returns the records of the given type ordered by an attribute.
///
/// If the attribute isn’t known for the type, the default order is used.
pub fn rrsort_by<'a, I>(
    rtype: Rtype,
    attribute: &str,
    records: I,
) -> Vec<Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut res: Vec<_> = records
        .into_iter()
        .filter(|record| record.rtype() == rtype)
        .cloned()
        .collect();
    res.sort_by(|left, right| {
        attribute_cmp(attribute, left, right)
            .unwrap_or_else(|| default_cmp(left, right))
    });
    res
}

//============ Testing =======================================================
