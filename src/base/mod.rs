//! DNS data and messages.
//!
//! Going from the wire format to values is called *parsing* here, going
//! the other way *composing*. Reading the zone file text form is
//! *scanning*. Parsing and composing always work on a complete message
//! held in memory since compressed names may point anywhere before them.
//! The [wire] module has the [`Parser`][wire::Parser] and
//! [`Composer`][wire::Composer] for this. Most code only needs
//! [`Message::from_wire`] and [`Message::to_wire`].
//!
//! Submodules:
//!
//! * [charstr]: character strings,
//! * [header]: the message header and ID generation,
//! * [iana]: record types, classes, opcodes, and response codes,
//! * [name]: domain names,
//! * [question] and [record]: the entries of the message sections,
//! * [rdata]: the record data traits and unknown record data,
//! * [message]: complete messages,
//! * [scan]: the zone file text form,
//! * [update]: dynamic update messages.

pub use self::charstr::CharStr;
pub use self::header::{Header, HeaderCounts, IdGenerator};
pub use self::iana::{Class, Opcode, Rcode, Rtype};
pub use self::message::{Message, Section};
pub use self::name::Name;
pub use self::question::Question;
pub use self::record::Record;

pub mod charstr;
pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod question;
pub mod rdata;
pub mod record;
pub mod scan;
pub mod update;
pub mod wire;
