//! Complete DNS messages.
//!
//! This module defines the type [`Message`] which owns the header and the
//! content of the four sections of a DNS message. Messages are turned into
//! their wire format via [`Message::to_wire`] and read from it via
//! [`Message::from_wire`].
//!
//! In UPDATE messages, the four sections are called the zone,
//! prerequisite, update, and additional sections. The type [`Section`]
//! provides these names as aliases.

use super::header::{Header, HeaderCounts};
use super::iana::{Class, Opcode, Rcode, Rtype};
use super::name::Name;
use super::question::Question;
use super::record::Record;
use super::wire::{ComposeError, Composer, ParseError, Parser};
use crate::rdata::{AllRecordData, Mx};
use bytes::Bytes;
use core::fmt;
use core::str::FromStr;
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

//------------ Section -------------------------------------------------------

/// One of the four sections of a DNS message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

impl Section {
    /// The zone section of an UPDATE message.
    pub const ZONE: Section = Section::Question;

    /// The prerequisite section of an UPDATE message.
    pub const PREREQUISITE: Section = Section::Answer;

    /// The update section of an UPDATE message.
    pub const UPDATE: Section = Section::Authority;

    /// Returns the index of the section in the header counts.
    pub fn index(self) -> usize {
        match self {
            Section::Question => 0,
            Section::Answer => 1,
            Section::Authority => 2,
            Section::Additional => 3,
        }
    }

    /// Returns the name of the section in a message with the given opcode.
    pub fn name(self, opcode: Opcode) -> &'static str {
        let update = opcode == Opcode::UPDATE;
        match self {
            Section::Question if update => "ZONE",
            Section::Question => "QUESTION",
            Section::Answer if update => "PREREQUISITE",
            Section::Answer => "ANSWER",
            Section::Authority if update => "UPDATE",
            Section::Authority => "AUTHORITY",
            Section::Additional => "ADDITIONAL",
        }
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    /// Parses a section name.
    ///
    /// Both the regular names and the UPDATE names are accepted in any
    /// case. The prerequisite section may also be called `pre` or `prereq`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "question" | "zone" => Ok(Section::Question),
            "answer" | "pre" | "prereq" | "prerequisite" => Ok(Section::Answer),
            "authority" | "update" => Ok(Section::Authority),
            "additional" => Ok(Section::Additional),
            _ => Err(UnknownSection),
        }
    }
}

//------------ Message -------------------------------------------------------

/// A DNS message.
///
/// The message keeps the header, the questions, and the records of the
/// three record sections. The section counts it keeps are those of the
/// header of a received message and are updated when records are pushed
/// or popped. They are never trusted when composing: [`to_wire`] always
/// writes the actual number of entries in each section.
///
/// A message received from the network also remembers where it came from
/// and how large it was.
///
/// [`to_wire`]: Message::to_wire
#[derive(Clone, Debug, Default)]
pub struct Message {
    header: Header,
    counts: HeaderCounts,
    question: Vec<Question>,
    answer: Vec<Record>,
    authority: Vec<Record>,
    additional: Vec<Record>,

    /// The address of the server the message was received from.
    answer_from: Option<SocketAddr>,

    /// The size of the message as received.
    answer_size: usize,

    /// The presentation form of records added via `unique_push`.
    seen: HashSet<String>,
}

/// # Creation
///
impl Message {
    /// Creates a new, empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for a single question.
    pub fn query(question: impl Into<Question>, id: u16) -> Self {
        let mut res = Self::new();
        res.header.set_id(id);
        res.push_question(question.into());
        res
    }

    /// Creates the start of a reply to `query`.
    ///
    /// The reply copies the ID, the opcode, the RD and CD flags, and the
    /// question section of the query and has the QR flag set.
    pub fn reply_to(query: &Message) -> Self {
        let mut res = Self::new();
        res.header.set_id(query.header.id());
        res.header.set_opcode(query.header.opcode());
        res.header.set_qr(true);
        res.header.set_rd(query.header.rd());
        res.header.set_cd(query.header.cd());
        for question in &query.question {
            res.push_question(question.clone());
        }
        res
    }
}

/// # Header Access
///
impl Message {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the section counts.
    ///
    /// For a received message, these are the counts declared in its
    /// header. They may be larger than the actual sections if the message
    /// was truncated.
    pub fn counts(&self) -> HeaderCounts {
        self.counts
    }

    pub fn id(&self) -> u16 {
        self.header.id()
    }

    pub fn set_id(&mut self, id: u16) {
        self.header.set_id(id)
    }

    /// Returns whether the message is a response with an rcode of
    /// NOERROR or NXDOMAIN.
    pub fn is_success(&self) -> bool {
        matches!(self.header.rcode(), Rcode::NOERROR | Rcode::NXDOMAIN)
    }
}

/// # Section Access
///
impl Message {
    pub fn question(&self) -> &[Question] {
        &self.question
    }

    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    /// Returns the first question, if there is one.
    pub fn first_question(&self) -> Option<&Question> {
        self.question.first()
    }

    /// Returns the zone section of an UPDATE message.
    pub fn zone(&self) -> &[Question] {
        &self.question
    }

    /// Returns the prerequisite section of an UPDATE message.
    pub fn prerequisite(&self) -> &[Record] {
        &self.answer
    }

    /// Returns the update section of an UPDATE message.
    pub fn update(&self) -> &[Record] {
        &self.authority
    }

    /// Returns the records of the given section.
    ///
    /// The question section has no records, so this is empty.
    pub fn records(&self, section: Section) -> &[Record] {
        match section {
            Section::Question => &[],
            Section::Answer => &self.answer,
            Section::Authority => &self.authority,
            Section::Additional => &self.additional,
        }
    }

    /// Returns the OPT record of the message, if present.
    pub fn opt(&self) -> Option<&Record> {
        self.additional.iter().find(|record| record.is_opt())
    }

    /// Returns the TSIG record of the message, if present.
    ///
    /// A TSIG record has to be the last record of the message.
    pub fn tsig(&self) -> Option<&Record> {
        self.additional
            .last()
            .filter(|record| record.rtype() == Rtype::TSIG)
    }

    fn records_mut(&mut self, section: Section) -> Option<&mut Vec<Record>> {
        match section {
            Section::Question => None,
            Section::Answer => Some(&mut self.answer),
            Section::Authority => Some(&mut self.authority),
            Section::Additional => Some(&mut self.additional),
        }
    }

    fn bump_count(&mut self, section: Section, up: bool) {
        let index = section.index();
        let count = self.counts.get(index);
        let count = if up {
            count.saturating_add(1)
        } else {
            count.saturating_sub(1)
        };
        self.counts.set(index, count)
    }
}

/// # Modification
///
impl Message {
    /// Appends a question.
    pub fn push_question(&mut self, question: Question) {
        self.question.push(question);
        self.bump_count(Section::Question, true);
    }

    /// Removes the last question.
    pub fn pop_question(&mut self) -> Option<Question> {
        let res = self.question.pop();
        if res.is_some() {
            self.bump_count(Section::Question, false);
        }
        res
    }

    /// Appends a record to a section.
    ///
    /// If the section is the question section, the owner, type, and class
    /// of the record become a new question.
    ///
    /// In UPDATE messages, records added to the prerequisite and update
    /// sections take on the class of the zone unless their class is NONE
    /// or ANY.
    pub fn push(&mut self, section: Section, mut record: Record) {
        if self.header.opcode() == Opcode::UPDATE
            && matches!(section, Section::PREREQUISITE | Section::UPDATE)
        {
            if let Some(zone) = self.question.first() {
                if !matches!(record.class(), Class::NONE | Class::ANY) {
                    record.set_class(zone.zclass());
                }
            }
        }
        let rtype = record.rtype();
        let class = record.class();
        match self.records_mut(section) {
            Some(records) => records.push(record),
            None => {
                self.question.push(Question::new(
                    record.into_owner_and_data().0,
                    rtype,
                    class,
                ));
            }
        }
        self.bump_count(section, true);
    }

    /// Appends a record unless an equal one was added this way before.
    ///
    /// Records are compared via their presentation format. Returns whether
    /// the record was added.
    pub fn unique_push(&mut self, section: Section, record: Record) -> bool {
        if !self.seen.insert(record.to_string()) {
            return false;
        }
        self.push(section, record);
        true
    }

    /// Removes the last record of a section.
    ///
    /// For the question section, the question is returned as a record
    /// without data.
    pub fn pop(&mut self, section: Section) -> Option<Record> {
        let res = match self.records_mut(section) {
            Some(records) => records.pop(),
            None => self.question.pop().map(|question| {
                let (qtype, qclass) = (question.qtype(), question.qclass());
                Record::empty(question.into_qname(), qtype, qclass, 0)
            }),
        };
        if res.is_some() {
            self.bump_count(section, false);
        }
        res
    }

    /// Removes the TSIG record if it is the last record of the message.
    pub fn pop_tsig(&mut self) -> Option<Record> {
        if self.tsig().is_some() {
            self.pop(Section::Additional)
        } else {
            None
        }
    }

    /// Removes all OPT records.
    pub fn remove_opt(&mut self) {
        let before = self.additional.len();
        self.additional.retain(|record| !record.is_opt());
        for _ in self.additional.len()..before {
            self.bump_count(Section::Additional, false);
        }
    }
}

/// # Origin
///
impl Message {
    /// Returns the address of the server a received message came from.
    pub fn answer_from(&self) -> Option<SocketAddr> {
        self.answer_from
    }

    /// Returns the size in octets of a received message.
    pub fn answer_size(&self) -> usize {
        self.answer_size
    }

    pub fn set_answer_from(&mut self, addr: SocketAddr, size: usize) {
        self.answer_from = Some(addr);
        self.answer_size = size;
    }
}

/// # Typed Access to the Answer
///
impl Message {
    fn answer_data(&self) -> impl Iterator<Item = &AllRecordData> + '_ {
        self.answer.iter().map(Record::data)
    }

    /// Returns the addresses of all A and AAAA records in the answer.
    pub fn each_address(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.answer_data().filter_map(|data| match *data {
            AllRecordData::A(ref a) => Some(a.addr().into()),
            AllRecordData::Aaaa(ref aaaa) => Some(aaaa.addr().into()),
            _ => None,
        })
    }

    /// Returns the name servers of all NS records in the answer.
    pub fn each_ns(&self) -> impl Iterator<Item = &Name> + '_ {
        self.answer_data().filter_map(|data| match *data {
            AllRecordData::Ns(ref ns) => Some(ns.nsdname()),
            _ => None,
        })
    }

    /// Returns the targets of all CNAME records in the answer.
    pub fn each_cname(&self) -> impl Iterator<Item = &Name> + '_ {
        self.answer_data().filter_map(|data| match *data {
            AllRecordData::Cname(ref cname) => Some(cname.cname()),
            _ => None,
        })
    }

    /// Returns the data of all MX records in the answer.
    pub fn each_mx(&self) -> impl Iterator<Item = &Mx> + '_ {
        self.answer_data().filter_map(|data| match *data {
            AllRecordData::Mx(ref mx) => Some(mx),
            _ => None,
        })
    }

    /// Returns the targets of all PTR records in the answer.
    pub fn each_ptr(&self) -> impl Iterator<Item = &Name> + '_ {
        self.answer_data().filter_map(|data| match *data {
            AllRecordData::Ptr(ref ptr) => Some(ptr.ptrdname()),
            _ => None,
        })
    }
}

/// # Parsing and Composing
///
impl Message {
    /// Creates a message from its wire format.
    ///
    /// If the data ends before all the entries declared in the header have
    /// been read, the message is returned with what could be read provided
    /// the TC flag is set. Otherwise, this is an error. Data after the last
    /// record is ignored.
    pub fn from_wire(octets: &[u8]) -> Result<Self, ParseError> {
        let mut parser = Parser::from_slice(octets);
        let mut res = Message {
            header: Header::parse(&mut parser)?,
            counts: HeaderCounts::parse(&mut parser)?,
            ..Default::default()
        };
        match res.parse_sections(&mut parser) {
            Ok(()) => Ok(res),
            Err(ParseError::ShortInput) if res.header.tc() => {
                debug!(
                    "truncated message {}: keeping {} answers",
                    res.header.id(),
                    res.answer.len()
                );
                Ok(res)
            }
            Err(err) => Err(err),
        }
    }

    fn parse_sections(&mut self, parser: &mut Parser) -> Result<(), ParseError> {
        for _ in 0..self.counts.qdcount() {
            self.question.push(Question::parse(parser)?);
        }
        for _ in 0..self.counts.ancount() {
            self.answer.push(Record::parse(parser)?);
        }
        for _ in 0..self.counts.nscount() {
            self.authority.push(Record::parse(parser)?);
        }
        for _ in 0..self.counts.arcount() {
            self.additional.push(Record::parse(parser)?);
        }
        Ok(())
    }

    /// Appends the wire format of the message to a composer.
    ///
    /// The section counts are taken from the actual sections.
    pub fn compose(&self, target: &mut Composer) -> Result<(), ComposeError> {
        self.header.compose(target);
        let mut counts = HeaderCounts::new();
        for (index, len) in [
            self.question.len(),
            self.answer.len(),
            self.authority.len(),
            self.additional.len(),
        ]
        .into_iter()
        .enumerate()
        {
            counts.set(
                index,
                u16::try_from(len).map_err(|_| ComposeError::Overflow)?,
            );
        }
        counts.compose(target);
        for question in &self.question {
            question.compose(target)?;
        }
        for record in self
            .answer
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            record.compose(target)?;
        }
        Ok(())
    }

    /// Returns the wire format of the message with compressed names.
    pub fn to_wire(&self) -> Result<Bytes, ComposeError> {
        let mut target = Composer::new();
        self.compose(&mut target)?;
        Ok(target.freeze())
    }

    /// Returns the wire format of the message without any compression.
    pub fn to_wire_uncompressed(&self) -> Result<Bytes, ComposeError> {
        let mut target = Composer::without_compression();
        self.compose(&mut target)?;
        Ok(target.freeze())
    }
}

//--- Display

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let header = &self.header;
        let opcode = header.opcode();
        if let Some(addr) = self.answer_from {
            writeln!(
                f,
                ";; Answer received from {} ({} bytes)\n;;",
                addr, self.answer_size
            )?;
        }
        writeln!(f, ";; HEADER SECTION")?;
        writeln!(f, ";; id = {}", header.id())?;
        if opcode == Opcode::UPDATE {
            writeln!(
                f,
                ";; qr = {}    opcode = {}    rcode = {}",
                header.qr(),
                opcode,
                header.rcode()
            )?;
            writeln!(
                f,
                ";; zocount = {}  prcount = {}  upcount = {}  adcount = {}",
                self.counts.zocount(),
                self.counts.prcount(),
                self.counts.upcount(),
                self.counts.adcount()
            )?;
        } else {
            writeln!(
                f,
                ";; qr = {}    opcode = {}    aa = {}    tc = {}    rd = {}",
                header.qr(),
                opcode,
                header.aa(),
                header.tc(),
                header.rd()
            )?;
            writeln!(
                f,
                ";; ra = {}    ad = {}    cd = {}    rcode = {}",
                header.ra(),
                header.ad(),
                header.cd(),
                header.rcode()
            )?;
            writeln!(
                f,
                ";; qdcount = {}  ancount = {}  nscount = {}  arcount = {}",
                self.counts.qdcount(),
                self.counts.ancount(),
                self.counts.nscount(),
                self.counts.arcount()
            )?;
        }

        self.fmt_section_head(f, Section::Question)?;
        for question in &self.question {
            writeln!(f, ";; {}", question)?;
        }
        for section in [Section::Answer, Section::Authority, Section::Additional]
        {
            self.fmt_section_head(f, section)?;
            for record in self.records(section) {
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}

impl Message {
    fn fmt_section_head(
        &self,
        f: &mut fmt::Formatter,
        section: Section,
    ) -> fmt::Result {
        let count = self.counts.get(section.index());
        writeln!(
            f,
            "\n;; {} SECTION ({} record{})",
            section.name(self.header.opcode()),
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}

//------------ UnknownSection ------------------------------------------------

/// A section name was not recognized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnknownSection;

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown section")
    }
}

impl std::error::Error for UnknownSection {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use crate::rdata::{Cname, Ns, A};

    fn record(s: &str) -> Record {
        s.parse().unwrap()
    }

    fn sample() -> Message {
        let mut msg = Message::query(
            Question::new_in(name("www.example.com"), Rtype::A),
            0x1234,
        );
        msg.header_mut().set_qr(true);
        msg.header_mut().set_rd(true);
        msg.push(
            Section::Answer,
            record("www.example.com. 300 IN CNAME web.example.com."),
        );
        msg.push(Section::Answer, record("web.example.com. 300 IN A 192.0.2.1"));
        msg.push(
            Section::Authority,
            record("example.com. 3600 IN NS ns1.example.com."),
        );
        msg.push(
            Section::Additional,
            record("ns1.example.com. 3600 IN A 192.0.2.53"),
        );
        msg
    }

    #[test]
    fn wire_round_trip() {
        let msg = sample();
        let compressed = msg.to_wire().unwrap();
        let uncompressed = msg.to_wire_uncompressed().unwrap();
        assert!(compressed.len() < uncompressed.len());

        for wire in [compressed, uncompressed] {
            let parsed = Message::from_wire(&wire).unwrap();
            assert_eq!(parsed.id(), 0x1234);
            assert!(parsed.header().qr());
            assert_eq!(parsed.question(), msg.question());
            assert_eq!(parsed.answer(), msg.answer());
            assert_eq!(parsed.authority(), msg.authority());
            assert_eq!(parsed.additional(), msg.additional());
            assert_eq!(parsed.counts().ancount(), 2);
        }
    }

    #[test]
    fn counts_are_recomputed() {
        let mut msg = sample();
        msg.counts.set_ancount(17);
        let wire = msg.to_wire().unwrap();
        assert_eq!(&wire[6..8], b"\0\x02");
    }

    #[test]
    fn truncated_message() {
        let mut msg = sample();
        let wire = msg.to_wire().unwrap();
        let short = &wire[..wire.len() - 5];
        assert_eq!(
            Message::from_wire(short).unwrap_err(),
            ParseError::ShortInput
        );

        msg.header_mut().set_tc(true);
        let wire = msg.to_wire().unwrap();
        let partial = Message::from_wire(&wire[..wire.len() - 5]).unwrap();
        assert_eq!(partial.answer().len(), 2);
        assert_eq!(partial.authority().len(), 1);
        assert!(partial.additional().is_empty());
        assert_eq!(partial.counts().arcount(), 1);

        assert!(Message::from_wire(&wire[..11]).is_err());
    }

    #[test]
    fn trailing_data_is_ignored() {
        let mut wire = sample().to_wire().unwrap().to_vec();
        wire.extend_from_slice(b"garbage");
        assert_eq!(Message::from_wire(&wire).unwrap().answer().len(), 2);
    }

    #[test]
    fn push_pop() {
        let mut msg = sample();
        let popped = msg.pop(Section::Additional).unwrap();
        assert_eq!(popped.rtype(), Rtype::A);
        assert_eq!(msg.counts().arcount(), 0);
        assert!(msg.pop(Section::Additional).is_none());
        assert_eq!(msg.counts().arcount(), 0);

        let question = msg.pop(Section::Question).unwrap();
        assert_eq!(question.owner(), &name("www.example.com"));
        assert!(question.has_empty_data());
        assert_eq!(msg.counts().qdcount(), 0);

        let rr = record("a.example.com. 10 IN A 10.0.0.1");
        assert!(msg.unique_push(Section::Additional, rr.clone()));
        assert!(!msg.unique_push(Section::Additional, rr.clone()));
        assert!(!msg.unique_push(Section::Answer, rr));
        assert_eq!(msg.additional().len(), 1);
    }

    #[test]
    fn update_class_rewrite() {
        let mut msg = Message::new();
        msg.header_mut().set_opcode(Opcode::UPDATE);
        msg.push_question(Question::new(name("example.com"), Rtype::SOA, Class::CH));
        msg.push(Section::UPDATE, record("a.example.com. 10 IN A 10.0.0.1"));
        msg.push(Section::UPDATE, record("b.example.com. 0 ANY A"));
        msg.push(Section::Additional, record("c.example.com. 10 IN A 10.0.0.1"));
        assert_eq!(msg.update()[0].class(), Class::CH);
        assert_eq!(msg.update()[1].class(), Class::ANY);
        assert_eq!(msg.additional()[0].class(), Class::IN);

        let text = msg.to_string();
        assert!(text.contains(";; ZONE SECTION (1 record)"));
        assert!(text.contains(";; PREREQUISITE SECTION (0 records)"));
        assert!(text.contains(";; UPDATE SECTION (2 records)"));
        assert!(text.contains("zocount = 1"));
    }

    #[test]
    fn display() {
        let text = sample().to_string();
        assert!(text.starts_with(";; HEADER SECTION\n;; id = 4660\n"));
        assert!(text.contains(";; QUESTION SECTION (1 record)\n"));
        assert!(text.contains(";; www.example.com.\tIN\tA\n"));
        assert!(text.contains(";; ANSWER SECTION (2 records)\n"));
        assert!(text.contains("web.example.com.\t300\tIN\tA\t192.0.2.1\n"));
    }

    #[test]
    fn typed_answers() {
        let msg = sample();
        assert_eq!(
            msg.each_address().collect::<Vec<_>>(),
            [IpAddr::from([192, 0, 2, 1])]
        );
        assert_eq!(
            msg.each_cname().collect::<Vec<_>>(),
            [&name("web.example.com")]
        );
        assert_eq!(msg.each_ns().count(), 0);
        assert_eq!(msg.each_mx().count(), 0);

        let mut reply = Message::reply_to(&msg);
        reply.push(
            Section::Answer,
            Record::new(name("example.com"), Class::IN, 0, Ns::new(name("ns"))),
        );
        reply.push(
            Section::Answer,
            Record::new(name("x"), Class::IN, 0, Cname::new(name("y"))),
        );
        reply.push(
            Section::Answer,
            Record::new(name("x"), Class::IN, 0, A::from_octets(1, 2, 3, 4)),
        );
        assert_eq!(reply.id(), 0x1234);
        assert!(reply.header().qr() && reply.header().rd());
        assert_eq!(reply.each_ns().collect::<Vec<_>>(), [&name("ns")]);
        assert_eq!(reply.each_address().count(), 1);
    }

    #[test]
    fn section_names() {
        assert_eq!("prereq".parse::<Section>().unwrap(), Section::Answer);
        assert_eq!("UPDATE".parse::<Section>().unwrap(), Section::Authority);
        assert_eq!("zone".parse::<Section>().unwrap(), Section::Question);
        assert!("nope".parse::<Section>().is_err());
    }
}
