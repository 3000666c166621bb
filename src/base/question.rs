//! A single question in a DNS message.
//!
//! This module defines the type `Question` which represents an entry in
//! the question section of a DNS message. In UPDATE messages, the same
//! section is called the zone section and its single entry names the zone
//! to be updated.

use super::iana::{Class, Rtype};
use super::name::{Name, NameError};
use super::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;
use core::str::FromStr;

//------------ Question ------------------------------------------------------

/// A question in a DNS message.
///
/// In DNS, a question describes what is requested in a query. It consists
/// of three elements: a domain name, a record type, and a class.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Question {
    /// The domain name of the question.
    qname: Name,

    /// The record type of the question.
    qtype: Rtype,

    /// The class of the question.
    qclass: Class,
}

/// # Creation and Conversion
///
impl Question {
    /// Creates a new question from its three components.
    pub fn new(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates a new question from a name and record type, assuming class IN.
    pub fn new_in(qname: Name, qtype: Rtype) -> Self {
        Question {
            qname,
            qtype,
            qclass: Class::IN,
        }
    }

    /// Creates a question from the mnemonics of its type and class.
    ///
    /// If the two are given in swapped order, i.e., `qtype` is a class
    /// mnemonic and `qclass` a type mnemonic, they are swapped back. Both
    /// may also be given in the generic `TYPE###` and `CLASS###` forms.
    pub fn from_mnemonics(
        qname: Name,
        qtype: &str,
        qclass: &str,
    ) -> Result<Self, QuestionError> {
        if let (Ok(qtype), Ok(qclass)) =
            (Rtype::from_str(qtype), Class::from_str(qclass))
        {
            return Ok(Question::new(qname, qtype, qclass));
        }
        match (Class::from_str(qtype), Rtype::from_str(qclass)) {
            (Ok(qclass), Ok(qtype)) => Ok(Question::new(qname, qtype, qclass)),
            _ => Err(QuestionError::Mnemonic),
        }
    }

    /// Converts the question into the qname.
    pub fn into_qname(self) -> Name {
        self.qname
    }
}

/// # Field Access
///
impl Question {
    /// Returns a reference to the domain name in the question.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns the record type of the question.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the class of the question.
    pub fn qclass(&self) -> Class {
        self.qclass
    }

    pub fn set_qname(&mut self, qname: Name) {
        self.qname = qname
    }

    pub fn set_qtype(&mut self, qtype: Rtype) {
        self.qtype = qtype
    }

    pub fn set_qclass(&mut self, qclass: Class) {
        self.qclass = qclass
    }

    /// The zone name of an UPDATE message.
    pub fn zname(&self) -> &Name {
        &self.qname
    }

    /// The type of the zone section entry, always SOA.
    pub fn ztype(&self) -> Rtype {
        self.qtype
    }

    /// The class of the zone being updated.
    pub fn zclass(&self) -> Class {
        self.qclass
    }
}

/// # Parsing and Composing
///
impl Question {
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Question::new(
            Name::parse(parser)?,
            Rtype::parse(parser)?,
            Class::parse(parser)?,
        ))
    }

    pub fn compose(&self, target: &mut Composer) -> Result<(), ComposeError> {
        target.append_compressed_name(&self.qname)?;
        self.qtype.compose(target);
        self.qclass.compose(target);
        Ok(())
    }
}

//--- From

impl From<(Name, Rtype, Class)> for Question {
    fn from((name, rtype, class): (Name, Rtype, Class)) -> Self {
        Question::new(name, rtype, class)
    }
}

impl From<(Name, Rtype)> for Question {
    fn from((name, rtype): (Name, Rtype)) -> Self {
        Question::new(name, rtype, Class::IN)
    }
}

//--- FromStr

impl FromStr for Question {
    type Err = QuestionError;

    /// Parses a question from `name [type [class]]`.
    ///
    /// Type and class default to A and IN. They may appear in either order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let qname = Name::from_str(words.next().ok_or(QuestionError::Empty)?)?;
        let res = match (words.next(), words.next()) {
            (None, _) => Question::new_in(qname, Rtype::A),
            (Some(first), None) => match Rtype::from_str(first) {
                Ok(qtype) => Question::new_in(qname, qtype),
                Err(_) => Question::new(
                    qname,
                    Rtype::A,
                    Class::from_str(first)
                        .map_err(|_| QuestionError::Mnemonic)?,
                ),
            },
            (Some(first), Some(second)) => {
                Question::from_mnemonics(qname, first, second)?
            }
        };
        if words.next().is_some() {
            return Err(QuestionError::TrailingData);
        }
        Ok(res)
    }
}

//--- Display

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.qname.fqdn(), self.qclass, self.qtype)
    }
}

//------------ QuestionError -------------------------------------------------

/// A question could not be created from text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuestionError {
    /// The domain name was missing.
    Empty,

    /// The domain name was malformed.
    Name(NameError),

    /// Unknown type or class mnemonic.
    Mnemonic,

    /// There was more text than a question.
    TrailingData,
}

impl From<NameError> for QuestionError {
    fn from(err: NameError) -> Self {
        QuestionError::Name(err)
    }
}

impl fmt::Display for QuestionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QuestionError::Empty => f.write_str("missing domain name"),
            QuestionError::Name(ref err) => fmt::Display::fmt(err, f),
            QuestionError::Mnemonic => f.write_str("unknown type or class"),
            QuestionError::TrailingData => f.write_str("trailing data"),
        }
    }
}

impl std::error::Error for QuestionError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::name::test::name;
    use rstest::rstest;

    #[rstest]
    #[case("example.com A IN")]
    #[case("example.com IN A")]
    #[case("example.com TYPE1 CLASS1")]
    #[case("example.com CLASS1 TYPE1")]
    #[case("example.com")]
    #[case("example.com. A")]
    fn question_from_str(#[case] text: &str) {
        assert_eq!(
            text.parse::<Question>().unwrap(),
            Question::new(name("example.com"), Rtype::A, Class::IN)
        );
    }

    #[test]
    fn swapped_mnemonics() {
        let question =
            Question::from_mnemonics(name("example.com"), "CH", "TXT").unwrap();
        assert_eq!(question.qtype(), Rtype::TXT);
        assert_eq!(question.qclass(), Class::CH);
        assert!(
            Question::from_mnemonics(name("example.com"), "FOO", "IN").is_err()
        );
        assert!("example.com MX IN bar".parse::<Question>().is_err());
    }

    #[test]
    fn compose_parse() {
        let question = Question::new(name("example.com"), Rtype::MX, Class::IN);
        let mut target = Composer::new();
        question.compose(&mut target).unwrap();
        question.compose(&mut target).unwrap();
        assert_eq!(target.len(), 13 + 4 + 2 + 4);
        let mut parser = Parser::from_slice(target.as_slice());
        assert_eq!(Question::parse(&mut parser).unwrap(), question);
        assert_eq!(Question::parse(&mut parser).unwrap(), question);
        assert_eq!(parser.remaining(), 0);
        assert_eq!(question.to_string(), "example.com.\tIN\tMX");
    }
}
