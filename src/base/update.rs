//! Building dynamic update messages.
//!
//! [RFC 2136] reuses the sections of a DNS message for dynamic updates.
//! The question section names the zone, the answer section contains
//! prerequisites, and the authority section the actual updates. Both
//! prerequisites and updates are expressed as resource records whose
//! class and TTL fields have special meaning.
//!
//! The functions in this module create these records from an entry in
//! presentation format, e.g.,
//!
//! ```
//! use netdns::base::update::{rr_add, yxrrset};
//! use netdns::base::{Class, Message, Section};
//!
//! let mut msg = Message::new_update("example.com".parse().unwrap(), Class::IN, 1);
//! msg.push(Section::PREREQUISITE, yxrrset("host.example.com A").unwrap());
//! msg.push(Section::UPDATE, rr_add("host.example.com A 10.1.2.3").unwrap());
//! ```
//!
//! [RFC 2136]: https://tools.ietf.org/html/rfc2136

use super::header::Header;
use super::iana::{Class, Opcode, Rtype};
use super::message::Message;
use super::name::Name;
use super::question::Question;
use super::record::Record;
use super::scan::{ScanError, Scanner};

/// The TTL of added records if the entry doesn’t have one.
pub const DEFAULT_ADD_TTL: u32 = 86400;

impl Message {
    /// Creates a new UPDATE message for the given zone.
    ///
    /// The zone section receives an entry for the SOA of the zone.
    pub fn new_update(zone: Name, class: Class, id: u16) -> Self {
        let mut res = Message::new();
        let mut header = Header::new();
        header.set_id(id);
        header.set_opcode(Opcode::UPDATE);
        *res.header_mut() = header;
        res.push_question(Question::new(zone, Rtype::SOA, class));
        res
    }
}

fn scan(entry: &str) -> Result<(Record, bool), ScanError> {
    Record::scan_entry(&mut Scanner::new(entry)?)
}

/// Creates a prerequisite that an RRset exists.
///
/// Without record data, the RRset must exist with any value. With data,
/// it must exist with exactly this value.
pub fn yxrrset(entry: &str) -> Result<Record, ScanError> {
    let (mut record, _) = scan(entry)?;
    record.set_ttl(0);
    if record.has_empty_data() {
        record.set_class(Class::ANY);
    }
    Ok(record)
}

/// Creates a prerequisite that an RRset does not exist.
pub fn nxrrset(entry: &str) -> Result<Record, ScanError> {
    let (mut record, _) = scan(entry)?;
    record.set_ttl(0);
    record.set_class(Class::NONE);
    record.clear_data();
    Ok(record)
}

/// Creates a prerequisite that a name is in use.
pub fn yxdomain(entry: &str) -> Result<Record, ScanError> {
    let (record, _) = scan(entry)?;
    Ok(Record::empty(
        record.into_owner_and_data().0,
        Rtype::ANY,
        Class::ANY,
        0,
    ))
}

/// Creates a prerequisite that a name is not in use.
pub fn nxdomain(entry: &str) -> Result<Record, ScanError> {
    let (record, _) = scan(entry)?;
    Ok(Record::empty(
        record.into_owner_and_data().0,
        Rtype::ANY,
        Class::NONE,
        0,
    ))
}

/// Creates an update that adds a record.
///
/// If the entry has no TTL, [`DEFAULT_ADD_TTL`] is used.
pub fn rr_add(entry: &str) -> Result<Record, ScanError> {
    let (mut record, has_ttl) = scan(entry)?;
    if !has_ttl {
        record.set_ttl(DEFAULT_ADD_TTL);
    }
    Ok(record)
}

/// Creates an update that deletes records.
///
/// With record data, only that record is deleted. Without it, the whole
/// RRset is deleted or, if there is no type either, all RRsets of the name.
pub fn rr_del(entry: &str) -> Result<Record, ScanError> {
    let (mut record, _) = scan(entry)?;
    record.set_ttl(0);
    if record.has_empty_data() {
        record.set_class(Class::ANY);
    } else {
        record.set_class(Class::NONE);
    }
    Ok(record)
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::message::Section;
    use crate::base::name::test::name;
    use rstest::rstest;

    #[rstest]
    #[case(yxrrset("host.example.com A").unwrap(), Class::ANY, 0, Rtype::A, true)]
    #[case(yxrrset("host.example.com A 10.1.2.3").unwrap(), Class::IN, 0, Rtype::A, false)]
    #[case(nxrrset("host.example.com 300 A").unwrap(), Class::NONE, 0, Rtype::A, true)]
    #[case(yxdomain("host.example.com").unwrap(), Class::ANY, 0, Rtype::ANY, true)]
    #[case(nxdomain("host.example.com").unwrap(), Class::NONE, 0, Rtype::ANY, true)]
    #[case(rr_add("host.example.com A 10.1.2.3").unwrap(), Class::IN, 86400, Rtype::A, false)]
    #[case(rr_add("host.example.com 0 A 10.1.2.3").unwrap(), Class::IN, 0, Rtype::A, false)]
    #[case(rr_del("host.example.com A 10.1.2.3").unwrap(), Class::NONE, 0, Rtype::A, false)]
    #[case(rr_del("host.example.com A").unwrap(), Class::ANY, 0, Rtype::A, true)]
    #[case(rr_del("host.example.com").unwrap(), Class::ANY, 0, Rtype::ANY, true)]
    fn update_records(
        #[case] record: Record,
        #[case] class: Class,
        #[case] ttl: u32,
        #[case] rtype: Rtype,
        #[case] empty: bool,
    ) {
        assert_eq!(record.owner(), &name("host.example.com"));
        assert_eq!(record.class(), class);
        assert_eq!(record.ttl(), ttl);
        assert_eq!(record.rtype(), rtype);
        assert_eq!(record.has_empty_data(), empty);
    }

    #[test]
    fn update_message() {
        let mut msg = Message::new_update(name("example.com"), Class::IN, 7);
        msg.push(Section::PREREQUISITE, nxdomain("host.example.com").unwrap());
        msg.push(Section::UPDATE, rr_add("host.example.com A 10.1.2.3").unwrap());
        assert_eq!(msg.header().opcode(), Opcode::UPDATE);
        assert!(!msg.header().rd());
        assert_eq!(msg.zone()[0].ztype(), Rtype::SOA);

        let parsed = Message::from_wire(&msg.to_wire().unwrap()).unwrap();
        assert_eq!(parsed.counts().zocount(), 1);
        assert_eq!(parsed.counts().prcount(), 1);
        assert_eq!(parsed.counts().upcount(), 1);
        assert_eq!(parsed.prerequisite()[0].class(), Class::NONE);
        assert!(parsed.prerequisite()[0].has_empty_data());
        assert_eq!(parsed.update()[0].to_string(), "host.example.com.\t86400\tIN\tA\t10.1.2.3");
    }
}
