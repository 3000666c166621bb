//! The TXT record.

use crate::base::charstr::CharStr;
use crate::base::iana::Rtype;
use crate::base::rdata::{ComposeRecordData, RtypeRecordData};
use crate::base::scan::{ScanError, Scanner};
use crate::base::wire::{ComposeError, Composer, ParseError, Parser};
use core::fmt;

//------------ Txt ----------------------------------------------------------

/// TXT record data.
///
/// TXT records hold descriptive text. While it may appear as a single text,
/// it internally consists of a sequence of one or more character strings.
/// The record holds these strings in that sequence.
///
/// The TXT record type is defined in [RFC 1035, section 3.3.14][1].
///
/// [1]: https://tools.ietf.org/html/rfc1035#section-3.3.14
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Txt {
    strings: Vec<CharStr>,
}

impl Txt {
    /// Creates new TXT record data from a sequence of character strings.
    pub fn new(strings: Vec<CharStr>) -> Self {
        Txt { strings }
    }

    /// Creates new TXT record data from a single text.
    ///
    /// The text is split into character strings of at most 255 octets.
    pub fn build_from_slice(text: &[u8]) -> Self {
        let mut strings = Vec::new();
        for chunk in text.chunks(CharStr::MAX_LEN) {
            if let Ok(s) = CharStr::from_octets(chunk.to_vec()) {
                strings.push(s)
            }
        }
        if strings.is_empty() {
            strings.push(CharStr::empty())
        }
        Txt { strings }
    }

    /// Returns an iterator over the character strings.
    pub fn iter(&self) -> impl Iterator<Item = &CharStr> {
        self.strings.iter()
    }

    /// Returns the content of all strings concatenated.
    pub fn text(&self) -> Vec<u8> {
        self.strings
            .iter()
            .flat_map(|s| s.as_slice().iter().copied())
            .collect()
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut strings = Vec::new();
        while parser.remaining() > 0 {
            strings.push(CharStr::parse(parser)?)
        }
        Ok(Txt { strings })
    }

    /// Scans the record data.
    ///
    /// Every remaining token of the entry is one character string.
    pub fn scan(scanner: &mut Scanner) -> Result<Self, ScanError> {
        let mut strings = vec![scanner.scan_charstr()?];
        while scanner.continues() {
            strings.push(scanner.scan_charstr()?)
        }
        Ok(Txt { strings })
    }
}

//--- RtypeRecordData, ComposeRecordData

impl RtypeRecordData for Txt {
    const RTYPE: Rtype = Rtype::TXT;
}

impl ComposeRecordData for Txt {
    fn compose_rdata(&self, target: &mut Composer) -> Result<(), ComposeError> {
        for s in &self.strings {
            s.compose(target)
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

//--- Display

impl fmt::Display for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for s in &self.strings {
            if !first {
                f.write_str(" ")?;
            } else {
                first = false;
            }
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::rdata::test::{
        test_compose_parse, test_display_scan, test_scan,
    };

    #[test]
    fn txt_compose_parse_scan() {
        let rdata = Txt::new(vec![
            "foo".parse().unwrap(),
            "bar baz".parse().unwrap(),
        ]);
        test_compose_parse(&rdata, Txt::parse);
        test_display_scan(&rdata, Txt::scan, "\"foo\" \"bar baz\"");
        test_scan("foo \"bar baz\"", Txt::scan, &rdata);
        assert_eq!(rdata.text(), b"foobar baz");
    }

    #[test]
    fn txt_long_text() {
        let rdata = Txt::build_from_slice(&[b'a'; 300]);
        assert_eq!(rdata.iter().count(), 2);
        assert_eq!(rdata.text().len(), 300);
    }
}
