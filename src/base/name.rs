//! Domain names.
//!
//! A domain name is a sequence of labels. In wire format, each label is
//! preceded by its length and the sequence ends with the empty root label.
//! Labels can be at most 63 octets long and the complete name including all
//! length octets at most 255 octets.
//!
//! The [`Name`] type keeps a domain name in this uncompressed wire format.
//! It is always absolute. Its presentation format, i.e., the dotted text
//! representation, is provided via the `FromStr` and `Display` traits.
//!
//! In presentation format, a label can contain any octet. Octets that have
//! a special meaning in zone files or that are not printable are escaped
//! with a backslash. A backslash followed by three decimal digits encodes
//! the octet with that value, a backslash followed by any other character
//! encodes that character itself.

use super::wire::{ComposeError, ParseError, Parser};
use bytes::Bytes;
use core::cmp::Ordering;
use core::{fmt, hash, str};

/// The maximum length of a label.
pub const MAX_LABEL_LEN: usize = 63;

/// The maximum length of a domain name in wire format.
pub const MAX_NAME_LEN: usize = 255;

/// The maximum number of compression pointers followed for a single name.
pub const MAX_COMPRESSION_HOPS: usize = 128;

//------------ Name ----------------------------------------------------------

/// An absolute domain name.
///
/// The name is kept in wire format without compression. Comparisons and
/// hashing ignore ASCII case as required by the DNS.
#[derive(Clone)]
pub struct Name {
    wire: Bytes,
}

/// # Creation and Conversion
///
impl Name {
    /// Returns the root name.
    pub fn root() -> Self {
        Name {
            wire: Bytes::from_static(b"\0"),
        }
    }

    /// Creates a name from a sequence of labels.
    ///
    /// The labels must not include the root label. An empty label anywhere
    /// in the sequence is an error.
    pub fn from_labels<'a, I>(labels: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut wire = Vec::new();
        for label in labels {
            push_label(&mut wire, label)?;
        }
        wire.push(0);
        if wire.len() > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        Ok(Name { wire: wire.into() })
    }

    /// Creates a name from uncompressed wire format data.
    ///
    /// The slice must contain exactly one complete name.
    pub fn from_wire_slice(slice: &[u8]) -> Result<Self, NameError> {
        let mut pos = 0;
        loop {
            let len = match slice.get(pos) {
                Some(len) => usize::from(*len),
                None => return Err(NameError::ShortInput),
            };
            if len == 0 {
                break;
            }
            if len > MAX_LABEL_LEN {
                return Err(NameError::LongLabel);
            }
            pos += len + 1;
        }
        if pos + 1 != slice.len() {
            return Err(NameError::TrailingData);
        }
        if slice.len() > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        Ok(Name {
            wire: Bytes::copy_from_slice(slice),
        })
    }

    /// Parses a possibly compressed name from the parser.
    ///
    /// Compression pointers must point to a position strictly before the
    /// pointer itself. Only [`MAX_COMPRESSION_HOPS`] pointers are followed
    /// for a single name. After returning, the parser is positioned right
    /// after the name as it appears in the parsed data, i.e., after the
    /// first pointer if there was one.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut wire = Vec::new();

        // First, read labels straight from the parser until we either find
        // the root label or a pointer.
        let mut pos = loop {
            let len = parser.parse_u8()?;
            match len & 0xC0 {
                0x00 if len == 0 => {
                    wire.push(0);
                    return Self::from_parsed(wire);
                }
                0x00 => {
                    let label = parser.parse_slice(usize::from(len))?;
                    wire.push(len);
                    wire.extend_from_slice(label);
                    if wire.len() >= MAX_NAME_LEN {
                        return Err(ParseError::form_error("long domain name"));
                    }
                }
                0xC0 => {
                    let here = parser.pos() - 1;
                    let low = parser.parse_u8()?;
                    let target = (usize::from(len & 0x3F) << 8) | usize::from(low);
                    if target >= here {
                        return Err(ParseError::form_error(
                            "compression pointer points forward",
                        ));
                    }
                    break target;
                }
                _ => {
                    return Err(ParseError::form_error("unknown label type"))
                }
            }
        };

        // Now we follow pointers through the whole message.
        let message = parser.message();
        let mut hops = 1;
        loop {
            let len = *message.get(pos).ok_or(ParseError::ShortInput)?;
            match len & 0xC0 {
                0x00 if len == 0 => {
                    wire.push(0);
                    return Self::from_parsed(wire);
                }
                0x00 => {
                    let start = pos + 1;
                    let end = start + usize::from(len);
                    let label =
                        message.get(start..end).ok_or(ParseError::ShortInput)?;
                    wire.push(len);
                    wire.extend_from_slice(label);
                    if wire.len() >= MAX_NAME_LEN {
                        return Err(ParseError::form_error("long domain name"));
                    }
                    pos = end;
                }
                0xC0 => {
                    hops += 1;
                    if hops > MAX_COMPRESSION_HOPS {
                        return Err(ParseError::CompressionLoop);
                    }
                    let low =
                        *message.get(pos + 1).ok_or(ParseError::ShortInput)?;
                    let target = (usize::from(len & 0x3F) << 8) | usize::from(low);
                    if target >= pos {
                        return Err(ParseError::form_error(
                            "compression pointer points forward",
                        ));
                    }
                    pos = target;
                }
                _ => {
                    return Err(ParseError::form_error("unknown label type"))
                }
            }
        }
    }

    fn from_parsed(wire: Vec<u8>) -> Result<Self, ParseError> {
        if wire.len() > MAX_NAME_LEN {
            Err(ParseError::form_error("long domain name"))
        } else {
            Ok(Name { wire: wire.into() })
        }
    }

    /// Returns the uncompressed wire format of the name.
    pub fn as_wire(&self) -> &[u8] {
        self.wire.as_ref()
    }

    /// Returns the length of the uncompressed wire format.
    pub fn wire_len(&self) -> usize {
        self.wire.len()
    }

    /// Returns a copy of the name with all ASCII letters lowercased.
    pub fn to_lowercase(&self) -> Self {
        Name {
            wire: self.wire.to_ascii_lowercase().into(),
        }
    }

    /// Appends the wire format to a vec.
    ///
    /// This never compresses and is mostly useful for assembling data for
    /// signatures.
    pub fn compose_canonical(&self, target: &mut Vec<u8>) {
        target.extend(self.wire.iter().map(u8::to_ascii_lowercase))
    }
}

/// # Properties and Label Access
///
impl Name {
    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.wire.len() == 1
    }

    /// Returns an iterator over the labels, not including the root label.
    pub fn labels(&self) -> LabelIter {
        LabelIter {
            wire: self.wire.as_ref(),
        }
    }

    /// Returns the number of labels, not including the root label.
    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// Returns the first label or `None` for the root name.
    pub fn first(&self) -> Option<&[u8]> {
        self.labels().next()
    }

    /// Returns the parent of the name or `None` for the root name.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            let len = usize::from(self.wire[0]) + 1;
            Some(Name {
                wire: self.wire.slice(len..),
            })
        }
    }

    /// Returns whether `base` is a suffix of this name.
    ///
    /// The comparison ignores ASCII case. Every name ends with the root.
    pub fn ends_with(&self, base: &Name) -> bool {
        let mut labels: Vec<_> = self.labels().collect();
        let base_labels: Vec<_> = base.labels().collect();
        if base_labels.len() > labels.len() {
            return false;
        }
        let tail = labels.split_off(labels.len() - base_labels.len());
        tail.iter()
            .zip(base_labels.iter())
            .all(|(l, r)| l.eq_ignore_ascii_case(r))
    }

    /// Returns whether two names are equal ignoring ASCII case.
    ///
    /// This is also what `==` does.
    pub fn eq_ignore_case(&self, other: &Name) -> bool {
        self.wire.eq_ignore_ascii_case(&other.wire)
    }

    /// Returns whether two names have exactly the same octets.
    pub fn eq_exact(&self, other: &Name) -> bool {
        self.wire == other.wire
    }

    /// Returns a new name with the labels of `self` followed by `suffix`.
    pub fn append(&self, suffix: &Name) -> Result<Self, NameError> {
        Name::from_labels(self.labels().chain(suffix.labels()))
    }

    /// Returns a new name with `label` prepended.
    pub fn prepend(&self, label: &[u8]) -> Result<Self, NameError> {
        Name::from_labels(core::iter::once(label).chain(self.labels()))
    }

    /// Returns a value that displays the name with a trailing dot.
    ///
    /// This is the form used in zone files and in record data. The root
    /// name is displayed as a single dot.
    pub fn fqdn(&self) -> impl fmt::Display + '_ {
        struct Fqdn<'a>(&'a Name);

        impl<'a> fmt::Display for Fqdn<'a> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if self.0.is_root() {
                    f.write_str(".")
                } else {
                    write!(f, "{}.", self.0)
                }
            }
        }

        Fqdn(self)
    }

    /// Compares two names in canonical DNS order.
    ///
    /// Names are compared label by label starting from the root, each label
    /// compared as lowercase octets.
    pub fn canonical_cmp(&self, other: &Name) -> Ordering {
        let left: Vec<_> = self.labels().collect();
        let right: Vec<_> = other.labels().collect();
        for (l, r) in left.iter().rev().zip(right.iter().rev()) {
            let l = l.iter().map(u8::to_ascii_lowercase);
            let r = r.iter().map(u8::to_ascii_lowercase);
            match l.cmp(r) {
                Ordering::Equal => {}
                res => return res,
            }
        }
        left.len().cmp(&right.len())
    }
}

/// Appends a label in wire format to `wire`.
fn push_label(wire: &mut Vec<u8>, label: &[u8]) -> Result<(), NameError> {
    if label.is_empty() {
        return Err(NameError::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(NameError::LongLabel);
    }
    wire.push(label.len() as u8);
    wire.extend_from_slice(label);
    if wire.len() >= MAX_NAME_LEN {
        return Err(NameError::LongName);
    }
    Ok(())
}

//--- FromStr

impl str::FromStr for Name {
    type Err = NameError;

    /// Creates a name from its presentation format.
    ///
    /// A trailing dot is optional. Both the empty string and a single dot
    /// are the root name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "." {
            return Ok(Name::root());
        }
        let mut labels = Vec::new();
        let mut label = Vec::new();
        let mut chars = s.as_bytes().iter().copied().peekable();
        let mut trailing_dot = false;
        while let Some(ch) = chars.next() {
            trailing_dot = false;
            match ch {
                b'.' => {
                    if label.is_empty() {
                        return Err(NameError::EmptyLabel);
                    }
                    labels.push(core::mem::take(&mut label));
                    trailing_dot = true;
                }
                b'\\' => label.push(parse_escape(&mut chars)?),
                _ => label.push(ch),
            }
        }
        if !label.is_empty() {
            labels.push(label);
        } else if !trailing_dot {
            return Err(NameError::EmptyLabel);
        }
        Name::from_labels(labels.iter().map(Vec::as_slice))
    }
}

/// Parses the part of an escape sequence after the backslash.
///
/// Three decimal digits are the octet with that value. Anything else is
/// the next octet itself.
pub(crate) fn parse_escape<I>(
    chars: &mut core::iter::Peekable<I>,
) -> Result<u8, NameError>
where
    I: Iterator<Item = u8> + Clone,
{
    let first = chars.next().ok_or(NameError::BadEscape)?;
    if !first.is_ascii_digit() {
        return Ok(first);
    }
    let mut lookahead = chars.clone();
    match (lookahead.next(), lookahead.next()) {
        (Some(second), Some(third))
            if second.is_ascii_digit() && third.is_ascii_digit() =>
        {
            let value = u32::from(first - b'0') * 100
                + u32::from(second - b'0') * 10
                + u32::from(third - b'0');
            let value = u8::try_from(value).map_err(|_| NameError::BadEscape)?;
            chars.next();
            chars.next();
            Ok(value)
        }
        _ => Ok(first),
    }
}

/// Writes a label in presentation format.
pub(crate) fn fmt_label(label: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    for &ch in label {
        match ch {
            b'"' | b'$' | b'(' | b')' | b';' | b'@' | b'\\' | b'.' => {
                write!(f, "\\{}", ch as char)?
            }
            _ if !(33..=126).contains(&ch) => write!(f, "\\{:03}", ch)?,
            _ => write!(f, "{}", ch as char)?,
        }
    }
    Ok(())
}

//--- PartialEq, Eq, and Hash

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.eq_ignore_case(other)
    }
}

impl Eq for Name {}

impl hash::Hash for Name {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for ch in self.wire.iter() {
            ch.to_ascii_lowercase().hash(state)
        }
    }
}

//--- PartialOrd and Ord

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_cmp(other)
    }
}

//--- Display and Debug

impl fmt::Display for Name {
    /// Formats the domain name.
    ///
    /// This will produce the domain name in ‘common display format’ without
    /// the trailing dot with the exception of a root name which will be just
    /// a dot.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        let mut first = true;
        for label in self.labels() {
            if !first {
                f.write_str(".")?;
            }
            first = false;
            fmt_label(label, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({})", self.fqdn())
    }
}

//--- Serialize and Deserialize

#[cfg(feature = "serde")]
impl serde::Serialize for Name {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.fqdn())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Name {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

//--- Compose helpers

impl Name {
    /// Checks that the name can be written.
    ///
    /// Names created through this module are always valid, so this only
    /// exists to give callers a uniform error path.
    pub fn check_compose(&self) -> Result<(), ComposeError> {
        if self.wire.len() > MAX_NAME_LEN {
            Err(ComposeError::LongName)
        } else {
            Ok(())
        }
    }
}

//------------ LabelIter -----------------------------------------------------

/// An iterator over the labels of a name.
///
/// The root label is not included.
#[derive(Clone, Debug)]
pub struct LabelIter<'a> {
    wire: &'a [u8],
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(*self.wire.first()?);
        if len == 0 {
            return None;
        }
        let (label, tail) = self.wire[1..].split_at(len);
        self.wire = tail;
        Some(label)
    }
}

//------------ NameError -----------------------------------------------------

/// A domain name could not be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// An escape sequence was incomplete or out of range.
    BadEscape,

    /// A label was empty, i.e., there were two consecutive dots.
    EmptyLabel,

    /// A label was longer than 63 octets.
    LongLabel,

    /// The name was longer than 255 octets.
    LongName,

    /// Wire data ended before the name did.
    ShortInput,

    /// There was data after the end of the name.
    TrailingData,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            NameError::BadEscape => "invalid escape sequence",
            NameError::EmptyLabel => "empty label",
            NameError::LongLabel => "label longer than 63 octets",
            NameError::LongName => "domain name longer than 255 octets",
            NameError::ShortInput => "unexpected end of input",
            NameError::TrailingData => "trailing data",
        })
    }
}

impl std::error::Error for NameError {}

//============ Testing =======================================================
