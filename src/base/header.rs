//! The message header.
//!
//! The twelve octet header of [RFC 1035], section 4.1.1, is kept in two
//! parts. [`Header`] holds the ID, opcode, rcode, and flags, all of which
//! can be changed freely. [`HeaderCounts`] holds the four section counts
//! which a [`Message`][super::Message] keeps in step with its sections.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::iana::{Opcode, Rcode};
use super::wire::{Composer, ParseError, Parser};
use core::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, OnceLock};

//------------ Header --------------------------------------------------------

/// The ID and the second 16 bit word of the header.
///
/// ```text
///   0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|Z |AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// A new header is all zeros which makes it a QUERY with NOERROR.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    id: u16,
    word: u16,
}

const QR: u16 = 0x8000;
const AA: u16 = 0x0400;
const TC: u16 = 0x0200;
const RD: u16 = 0x0100;
const RA: u16 = 0x0080;
const Z: u16 = 0x0040;
const AD: u16 = 0x0020;
const CD: u16 = 0x0010;

const OPCODE_SHIFT: u16 = 11;
const OPCODE_MASK: u16 = 0x7800;
const RCODE_MASK: u16 = 0x000F;

macro_rules! flag {
    ( $( $(#[$attr:meta])* ($get:ident, $set:ident, $bit:expr) )* ) => {
        $(
            $(#[$attr])*
            pub fn $get(self) -> bool {
                self.word & $bit != 0
            }

            pub fn $set(&mut self, set: bool) {
                if set {
                    self.word |= $bit
                } else {
                    self.word &= !$bit
                }
            }
        )*
    }
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message ID.
    ///
    /// A server copies the ID of a query into its response so the client
    /// can tell which query is being answered.
    pub fn id(self) -> u16 {
        self.id
    }

    pub fn set_id(&mut self, id: u16) {
        self.id = id
    }

    pub fn opcode(self) -> Opcode {
        Opcode::from_int(((self.word & OPCODE_MASK) >> OPCODE_SHIFT) as u8)
    }

    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.word = self.word & !OPCODE_MASK
            | (u16::from(opcode.to_int()) << OPCODE_SHIFT) & OPCODE_MASK;
    }

    /// Returns the four bit response code.
    ///
    /// Extended response codes need the OPT record, too.
    pub fn rcode(self) -> Rcode {
        Rcode::from_int((self.word & RCODE_MASK) as u8)
    }

    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.word =
            self.word & !RCODE_MASK | u16::from(rcode.to_int()) & RCODE_MASK;
    }

    flag! {
        /// Whether the message is a response.
        (qr, set_qr, QR)

        /// Whether the responding server is authoritative for the answer.
        (aa, set_aa, AA)

        /// Whether the message was truncated to fit into a datagram.
        (tc, set_tc, TC)

        /// Whether the query asks for recursion.
        (rd, set_rd, RD)

        /// Whether the server offers recursion.
        (ra, set_ra, RA)

        /// The reserved bit. Always zero on the wire.
        (z, set_z, Z)

        /// Whether all data in the response has been validated.
        (ad, set_ad, AD)

        /// Whether the client disabled validation.
        (cd, set_cd, CD)
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Header {
            id: parser.parse_u16()?,
            word: parser.parse_u16()?,
        })
    }

    pub fn compose(&self, target: &mut Composer) {
        target.append_u16(self.id);
        target.append_u16(self.word);
    }
}

//------------ HeaderCounts --------------------------------------------------

/// The four section counts.
///
/// UPDATE messages reuse the sections for zone, prerequisites, updates,
/// and additional data. The counts have aliases under these names.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderCounts([u16; 4]);

macro_rules! count {
    ( $( ($get:ident, $set:ident, $alias:ident, $set_alias:ident, $idx:expr) )* ) => {
        $(
            pub fn $get(self) -> u16 {
                self.0[$idx]
            }

            pub fn $set(&mut self, value: u16) {
                self.0[$idx] = value
            }

            pub fn $alias(self) -> u16 {
                self.0[$idx]
            }

            pub fn $set_alias(&mut self, value: u16) {
                self.0[$idx] = value
            }
        )*
    }
}

impl HeaderCounts {
    pub fn new() -> Self {
        Self::default()
    }

    count! {
        (qdcount, set_qdcount, zocount, set_zocount, 0)
        (ancount, set_ancount, prcount, set_prcount, 1)
        (nscount, set_nscount, upcount, set_upcount, 2)
        (arcount, set_arcount, adcount, set_adcount, 3)
    }

    /// Returns the count of the section with index `section`.
    ///
    /// Panics if `section` is larger than 3.
    pub fn get(self, section: usize) -> u16 {
        self.0[section]
    }

    pub fn set(&mut self, section: usize, value: u16) {
        self.0[section] = value
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut res = Self::default();
        for count in &mut res.0 {
            *count = parser.parse_u16()?;
        }
        Ok(res)
    }

    pub fn compose(&self, target: &mut Composer) {
        self.0.iter().for_each(|&count| target.append_u16(count))
    }
}

//------------ IdGenerator ---------------------------------------------------

/// Hands out message IDs.
///
/// IDs come from an atomic counter that wraps after 65535, so one
/// generator can be shared by several resolvers and threads.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU16,
}

impl IdGenerator {
    /// Creates a generator whose first ID is `start`.
    pub const fn new(start: u16) -> Self {
        IdGenerator {
            next: AtomicU16::new(start),
        }
    }

    /// Creates a generator starting somewhere random.
    pub fn random() -> Self {
        Self::new(rand::random())
    }

    /// Returns the generator shared by the whole process.
    ///
    /// It starts at a random ID the first time it is used.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<IdGenerator>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::random())).clone()
    }

    pub fn next_id(&self) -> u16 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fields_are_independent() {
        let mut header = Header::new();
        header.set_opcode(Opcode::UPDATE);
        header.set_rcode(Rcode::REFUSED);
        let fields: [(fn(Header) -> bool, fn(&mut Header, bool)); 8] = [
            (Header::qr, Header::set_qr),
            (Header::aa, Header::set_aa),
            (Header::tc, Header::set_tc),
            (Header::rd, Header::set_rd),
            (Header::ra, Header::set_ra),
            (Header::z, Header::set_z),
            (Header::ad, Header::set_ad),
            (Header::cd, Header::set_cd),
        ];
        for (get, set) in fields {
            assert!(!get(header));
            set(&mut header, true);
            assert!(get(header));
            assert_eq!(header.opcode(), Opcode::UPDATE);
            assert_eq!(header.rcode(), Rcode::REFUSED);
            set(&mut header, false);
        }
        assert_eq!(header, {
            let mut expected = Header::new();
            expected.set_opcode(Opcode::UPDATE);
            expected.set_rcode(Rcode::REFUSED);
            expected
        });
    }

    #[test]
    fn wire_layout() {
        let mut header = Header::new();
        header.set_id(0xBEEF);
        header.set_qr(true);
        header.set_opcode(Opcode::UPDATE);
        header.set_rd(true);
        header.set_cd(true);
        header.set_rcode(Rcode::NXDOMAIN);
        let mut target = Composer::without_compression();
        header.compose(&mut target);
        assert_eq!(target.as_slice(), b"\xBE\xEF\xA9\x13");

        let mut parser = Parser::from_slice(b"\xBE\xEF\xA9\x13");
        assert_eq!(Header::parse(&mut parser).unwrap(), header);
    }

    #[test]
    fn update_aliases() {
        let mut counts = HeaderCounts::new();
        counts.set_zocount(1);
        counts.set_prcount(2);
        counts.set_upcount(3);
        counts.set_adcount(4);
        assert_eq!(counts.qdcount(), 1);
        assert_eq!(counts.ancount(), 2);
        assert_eq!(counts.nscount(), 3);
        assert_eq!(counts.arcount(), 4);
        let mut target = Composer::without_compression();
        counts.compose(&mut target);
        assert_eq!(target.as_slice(), b"\0\x01\0\x02\0\x03\0\x04");
    }

    #[test]
    fn id_generator_wraps() {
        let ids = IdGenerator::new(65534);
        assert_eq!(ids.next_id(), 65534);
        assert_eq!(ids.next_id(), 65535);
        assert_eq!(ids.next_id(), 0);
    }

    #[test]
    fn shared_generator() {
        let first = IdGenerator::shared();
        let second = IdGenerator::shared();
        assert!(Arc::ptr_eq(&first, &second));
        let id = first.next_id();
        assert_ne!(second.next_id(), id);
    }
}
