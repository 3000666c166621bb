//! Scanning of data from its presentation format.
//!
//! Resource records have a text representation used in zone files and in
//! the output of diagnostic tools. Such an *entry* consists of tokens
//! separated by white space. A token can be quoted with double quotes in
//! which case it may contain white space. A backslash escapes the following
//! character or, if followed by three decimal digits, stands for the octet
//! with that value. Parentheses allow an entry to span multiple lines and a
//! semicolon starts a comment that lasts until the end of the line.
//!
//! The [`Scanner`] splits an entry into its tokens and provides methods to
//! convert them into the various data types used by record data.

use super::charstr::CharStr;
use super::name::Name;
use crate::utils::{base16, base64};
use bytes::Bytes;
use core::fmt;
use core::str::FromStr;
use std::net::{Ipv4Addr, Ipv6Addr};

//------------ Token ---------------------------------------------------------

/// A single token of an entry.
///
/// The token keeps escape sequences as they were. Only the surrounding
/// quotes of a quoted token are removed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    /// Returns the raw text of the token.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns whether the token was quoted.
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }
}

//------------ Scanner -------------------------------------------------------

/// A scanner for a single entry in presentation format.
#[derive(Clone, Debug)]
pub struct Scanner {
    tokens: Vec<Token>,
    pos: usize,
}

impl Scanner {
    /// Creates a scanner by splitting `text` into tokens.
    pub fn new(text: &str) -> Result<Self, ScanError> {
        Ok(Scanner {
            tokens: tokenize(text)?,
            pos: 0,
        })
    }

    /// Returns whether there are tokens left.
    pub fn continues(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Returns the number of tokens left.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    /// Takes the next token.
    pub fn next_token(&mut self) -> Result<&Token, ScanError> {
        let res = self.tokens.get(self.pos).ok_or(ScanError::EndOfEntry)?;
        self.pos += 1;
        Ok(res)
    }

    /// Takes the next token as a string.
    pub fn scan_str(&mut self) -> Result<&str, ScanError> {
        self.next_token().map(Token::as_str)
    }

    /// Takes the next token if it is equal to `expected` ignoring case.
    pub fn skip_if(&mut self, expected: &str) -> bool {
        match self.peek() {
            Some(token) if token.text.eq_ignore_ascii_case(expected) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Takes a domain name.
    pub fn scan_name(&mut self) -> Result<Name, ScanError> {
        let token = self.next_token()?;
        Name::from_str(&token.text).map_err(|_| ScanError::custom("bad domain name"))
    }

    /// Takes a character string.
    pub fn scan_charstr(&mut self) -> Result<CharStr, ScanError> {
        let token = self.next_token()?;
        CharStr::from_text(token.text.as_bytes())
            .map_err(|_| ScanError::custom("bad character string"))
    }

    /// Takes a token and converts it via `FromStr`.
    pub fn scan_from_str<T: FromStr>(
        &mut self,
        what: &'static str,
    ) -> Result<T, ScanError> {
        self.scan_str()?.parse().map_err(|_| ScanError::custom(what))
    }

    /// Takes a decimal integer.
    ///
    /// Only digits are allowed. Values out of range are an error.
    pub fn scan_int<T: FromStr>(&mut self) -> Result<T, ScanError> {
        let token = self.scan_str()?;
        if token.is_empty() || !token.bytes().all(|ch| ch.is_ascii_digit()) {
            return Err(ScanError::custom("expected decimal number"));
        }
        token
            .parse()
            .map_err(|_| ScanError::custom("decimal number overflow"))
    }

    pub fn scan_u8(&mut self) -> Result<u8, ScanError> {
        self.scan_int()
    }

    pub fn scan_u16(&mut self) -> Result<u16, ScanError> {
        self.scan_int()
    }

    pub fn scan_u32(&mut self) -> Result<u32, ScanError> {
        self.scan_int()
    }

    pub fn scan_ipv4(&mut self) -> Result<Ipv4Addr, ScanError> {
        self.scan_from_str("expected IPv4 address")
    }

    pub fn scan_ipv6(&mut self) -> Result<Ipv6Addr, ScanError> {
        self.scan_from_str("expected IPv6 address")
    }

    /// Takes the rest of the entry as one Base 16 encoded value.
    ///
    /// White space between tokens is ignored.
    pub fn scan_hex_tail(&mut self) -> Result<Bytes, ScanError> {
        let text = self.tail_text();
        base16::decode(&text)
            .map(Into::into)
            .map_err(|_| ScanError::custom("bad hex data"))
    }

    /// Takes the rest of the entry as one Base 64 encoded value.
    pub fn scan_base64_tail(&mut self) -> Result<Bytes, ScanError> {
        let text = self.tail_text();
        base64::decode(&text)
            .map(Into::into)
            .map_err(|_| ScanError::custom("bad base64 data"))
    }

    /// Takes all remaining tokens concatenated without separators.
    fn tail_text(&mut self) -> String {
        let mut res = String::new();
        while let Some(token) = self.tokens.get(self.pos) {
            res.push_str(&token.text);
            self.pos += 1;
        }
        res
    }

    /// Checks that all tokens have been consumed.
    pub fn finish(&self) -> Result<(), ScanError> {
        if self.continues() {
            Err(ScanError::TrailingTokens)
        } else {
            Ok(())
        }
    }
}

/// Splits an entry into tokens.
fn tokenize(text: &str) -> Result<Vec<Token>, ScanError> {
    let mut res = Vec::new();
    let mut chars = text.chars().peekable();
    let mut parens = 0usize;
    let mut current: Option<String> = None;

    fn flush(res: &mut Vec<Token>, current: &mut Option<String>) {
        if let Some(text) = current.take() {
            res.push(Token { text, quoted: false })
        }
    }

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let next = chars.next().ok_or(ScanError::custom(
                    "escape sequence at end of entry",
                ))?;
                let token = current.get_or_insert_with(String::new);
                token.push('\\');
                token.push(next);
            }
            '"' => {
                flush(&mut res, &mut current);
                let mut quoted = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => {
                            quoted.push('\\');
                            quoted.push(chars.next().ok_or(
                                ScanError::UnbalancedQuotes,
                            )?);
                        }
                        Some(ch) => quoted.push(ch),
                        None => return Err(ScanError::UnbalancedQuotes),
                    }
                }
                res.push(Token {
                    text: quoted,
                    quoted: true,
                });
            }
            ';' => {
                flush(&mut res, &mut current);
                for ch in chars.by_ref() {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                flush(&mut res, &mut current);
                parens += 1;
            }
            ')' => {
                flush(&mut res, &mut current);
                parens = parens
                    .checked_sub(1)
                    .ok_or(ScanError::UnbalancedParens)?;
            }
            ch if ch.is_whitespace() => flush(&mut res, &mut current),
            ch => current.get_or_insert_with(String::new).push(ch),
        }
    }
    flush(&mut res, &mut current);
    if parens != 0 {
        return Err(ScanError::UnbalancedParens);
    }
    Ok(res)
}

//------------ ScanError -----------------------------------------------------

/// An error happened while scanning presentation format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScanError {
    /// The entry ended before all required data was found.
    EndOfEntry,

    /// There were tokens left after all data was scanned.
    TrailingTokens,

    /// A quoted token was not closed.
    UnbalancedQuotes,

    /// Parentheses did not match.
    UnbalancedParens,

    /// Some other problem with the data.
    Custom(&'static str),
}

impl ScanError {
    pub fn custom(msg: &'static str) -> Self {
        ScanError::Custom(msg)
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ScanError::EndOfEntry => f.write_str("unexpected end of entry"),
            ScanError::TrailingTokens => f.write_str("trailing data"),
            ScanError::UnbalancedQuotes => f.write_str("unbalanced quotes"),
            ScanError::UnbalancedParens => {
                f.write_str("unbalanced parentheses")
            }
            ScanError::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ScanError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    fn texts(s: &str) -> Vec<String> {
        tokenize(s)
            .unwrap()
            .into_iter()
            .map(|token| token.text)
            .collect()
    }

    #[test]
    fn tokens() {
        assert_eq!(texts("a  b\tc"), ["a", "b", "c"]);
        assert_eq!(texts("a \"b c\" d"), ["a", "b c", "d"]);
        assert_eq!(texts("a\\ b c"), ["a\\ b", "c"]);
        assert_eq!(texts("a ( b\n c ) ; comment\n"), ["a", "b", "c"]);
        assert_eq!(texts("\"\""), [""]);
        assert_eq!(texts("\"a\\\"b\""), ["a\\\"b"]);
        assert!(tokenize("\"abc").is_err());
        assert!(tokenize("( abc").is_err());
        assert!(tokenize("abc )").is_err());
    }

    #[test]
    fn scan_values() {
        let mut scanner =
            Scanner::new("example.com. 10 \"foo bar\" 192.0.2.1 0A 0b").unwrap();
        assert_eq!(
            scanner.scan_name().unwrap(),
            "example.com".parse::<Name>().unwrap()
        );
        assert_eq!(scanner.scan_u16().unwrap(), 10);
        assert_eq!(scanner.scan_charstr().unwrap().as_slice(), b"foo bar");
        assert_eq!(
            scanner.scan_ipv4().unwrap(),
            Ipv4Addr::new(192, 0, 2, 1)
        );
        assert_eq!(scanner.scan_hex_tail().unwrap().as_ref(), b"\x0a\x0b");
        assert!(scanner.finish().is_ok());
        assert_eq!(scanner.scan_u8(), Err(ScanError::EndOfEntry));
    }

    #[test]
    fn scan_int_strict() {
        assert!(Scanner::new("-1").unwrap().scan_u16().is_err());
        assert!(Scanner::new("70000").unwrap().scan_u16().is_err());
        assert!(Scanner::new("1e3").unwrap().scan_u32().is_err());
    }
}
